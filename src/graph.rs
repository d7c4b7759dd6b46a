use std::collections::VecDeque;

use bit_set::BitSet;

use crate::color::VertexId;

/** A quotient graph: the working object of the Zykov recursion.

Each current vertex stands for a set of original vertices that were
contracted into it (`mapping`). Branching derives fresh graphs through
[`Graph::merge`] ("same color") and [`Graph::add_edge`] ("different
color"); neither operator mutates its input. The mappings partition
`[0, orig_n)` and no vertex is ever adjacent to itself. */
#[derive(Debug, Clone)]
pub struct Graph {
    /// current number of vertices (after contractions)
    pub n: usize,
    /// number of vertices of the original graph
    pub orig_n: usize,
    /// adj[i]: bitset of the current neighbors of i (symmetric)
    pub adj: Vec<BitSet>,
    /// mapping[i]: original vertices collapsed into current vertex i
    pub mapping: Vec<Vec<VertexId>>,
}

impl Graph {
    /** constructs an uncontracted edgeless graph on `n` vertices */
    pub fn new(n:usize) -> Self {
        Self {
            n,
            orig_n: n,
            adj: vec![BitSet::with_capacity(n); n],
            mapping: (0..n).map(|i| vec![i]).collect(),
        }
    }

    /// number of neighbors of u in the current graph
    pub fn degree(&self, u:VertexId) -> usize { self.adj[u].len() }

    /// returns true iff u and v are adjacent in the current graph
    pub fn are_adjacent(&self, u:VertexId, v:VertexId) -> bool { self.adj[u].contains(v) }

    /// returns the number of edges in the current graph
    pub fn nb_edges(&self) -> usize {
        let mut m = 0;
        for row in &self.adj { // at the end: m = ∑ d(v)
            m += row.len();
        }
        m / 2 // m = (∑ d(v)) / 2
    }

    /** inserts the undirected edge {u,v} in place (graph construction only) */
    pub fn insert_edge(&mut self, u:VertexId, v:VertexId) {
        if u < self.n && v < self.n && u != v {
            self.adj[u].insert(v);
            self.adj[v].insert(u);
        }
    }

    /** Zykov "same color" branch: identifies vertices i and j.

    Slot j disappears and every index above it shifts down by one; the
    surviving slot keeps i's position and the concatenation of both
    mappings. The merged vertex is adjacent to every vertex that was
    adjacent to i or to j. A would-be self-loop is silently dropped;
    callers reach this through the branching-pair selection, which only
    produces non-adjacent pairs. */
    pub fn merge(&self, i:VertexId, j:VertexId) -> Graph {
        let n = self.n - 1;
        // new index of an old vertex k != j
        let slot = |k:VertexId| if k < j { k } else { k - 1 };
        let merged = slot(i);
        let mut adj = vec![BitSet::with_capacity(n); n];
        let mut mapping = Vec::with_capacity(n);
        for k in 0..self.n {
            if k == j { continue; }
            let a = slot(k);
            if k == i {
                let mut m = self.mapping[i].clone();
                m.extend_from_slice(&self.mapping[j]);
                mapping.push(m);
                for w in self.adj[i].iter().chain(self.adj[j].iter()) {
                    if w != i && w != j {
                        adj[a].insert(slot(w));
                    }
                }
            } else {
                mapping.push(self.mapping[k].clone());
                for w in self.adj[k].iter() {
                    let t = if w == j { merged } else { slot(w) };
                    adj[a].insert(t);
                }
            }
        }
        Graph { n, orig_n: self.orig_n, adj, mapping }
    }

    /** Zykov "different color" branch: the same graph with edge {i,j} added.
    Set semantics: adding an existing edge returns a structurally identical graph. */
    pub fn add_edge(&self, i:VertexId, j:VertexId) -> Graph {
        let mut g = self.clone();
        g.insert_edge(i, j);
        g
    }
}

/** finds the connected components of the current graph using BFS.
Each component is the sorted-by-discovery list of its current vertex indices. */
pub fn connected_components(g:&Graph) -> Vec<Vec<VertexId>> {
    let mut components = Vec::new();
    let mut visited = BitSet::with_capacity(g.n);
    for start in 0..g.n {
        if visited.contains(start) { continue; }
        let mut queue = VecDeque::new();
        queue.push_back(start);
        visited.insert(start);
        let mut comp = vec![start];
        while let Some(v) = queue.pop_front() {
            for w in g.adj[v].iter() {
                if !visited.contains(w) {
                    visited.insert(w);
                    queue.push_back(w);
                    comp.push(w);
                }
            }
        }
        components.push(comp);
    }
    components
}

/** extracts the subgraph induced by `vertices`, keeping `orig_n` and the
per-vertex mappings of the full graph (so colorings still lift to the
original vertex set). */
pub fn extract_subgraph(g:&Graph, vertices:&[VertexId]) -> Graph {
    let k = vertices.len();
    let mut adj = vec![BitSet::with_capacity(k); k];
    let mut mapping = Vec::with_capacity(k);
    for &v in vertices {
        mapping.push(g.mapping[v].clone());
    }
    for a in 0..k {
        for b in a + 1..k {
            if g.are_adjacent(vertices[a], vertices[b]) {
                adj[a].insert(b);
                adj[b].insert(a);
            }
        }
    }
    Graph { n: k, orig_n: g.orig_n, adj, mapping }
}
