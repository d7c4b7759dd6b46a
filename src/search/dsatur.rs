use std::cmp::{max, Ord, Ordering, Reverse};

use bit_set::BitSet;
use priority_queue::PriorityQueue;

use crate::color::VertexId;
use crate::graph::Graph;

/** selection key of an uncolored vertex: saturation first, degree second,
lowest index last (the index is part of the key so ties are total). */
#[derive(PartialEq, Eq)]
struct DSatInfo {
    dsat: usize,
    degree: usize,
    vertex: Reverse<VertexId>,
}

impl Ord for DSatInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dsat.cmp(&other.dsat)
            .then_with(|| self.degree.cmp(&other.degree))
            .then_with(|| self.vertex.cmp(&other.vertex))
    }
}

// `PartialOrd` needs to be implemented as well.
impl PartialOrd for DSatInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/** DSATUR greedy coloring of the current graph.
    1. choose the uncolored vertex seeing the most colors (ties: larger degree, then lower index)
    2. assign it the smallest color not seen by a colored neighbor
    3. a neighbor's saturation grows only if the assigned color is new among ITS colored neighbors
    4. repeat until every vertex is colored

returns (number of colors used, color of each current vertex).
The color count is a valid upper bound on the chromatic number of the quotient. */
pub fn heuristic_coloring(g:&Graph) -> (usize, Vec<usize>) {
    let n = g.n;
    if n == 0 { return (0, Vec::new()); }
    let mut remaining_vertices:PriorityQueue<VertexId, DSatInfo> = PriorityQueue::new();
    for v in 0..n {
        remaining_vertices.push(v, DSatInfo { dsat:0, degree:g.degree(v), vertex:Reverse(v) });
    }
    let mut colors:Vec<Option<usize>> = vec![None ; n]; // colors[v] -> color assigned to vertex v
    let mut adj_colors:Vec<BitSet> = vec![BitSet::default() ; n]; // adj_colors[v] -> colors v sees
    let mut last_color:usize = 0;
    while let Some((current_vertex, _)) = remaining_vertices.pop() {
        // assign the smallest color not seen
        let mut color:usize = 0;
        while adj_colors[current_vertex].contains(color) { color += 1; }
        colors[current_vertex] = Some(color);
        last_color = max(last_color, color);
        // update saturation degree information
        for conflict_vertex in g.adj[current_vertex].iter()
        .filter(|conflict_vertex| colors[*conflict_vertex].is_none()) {
            if !adj_colors[conflict_vertex].contains(color) {
                adj_colors[conflict_vertex].insert(color);
                remaining_vertices.change_priority_by(&conflict_vertex, |p| { p.dsat += 1; });
            }
        }
    }
    (last_color + 1, colors.into_iter().map(|c| c.unwrap()).collect())
}
