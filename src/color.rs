use bit_set::BitSet;

use crate::graph::Graph;

/** Vertex Id */
pub type VertexId = usize;

/** Sentinel standing for "no coloring known yet" (larger than any feasible color count). */
pub const INF: usize = 1_000_000_000;

/** A coloring of the ORIGINAL vertex set.
`coloring[v]` is the color of original vertex `v`, or `-1` while unassigned.
`num_colors` starts at the `INF` sentinel and only decreases. */
#[derive(Debug, Clone)]
pub struct ColoringSolution {
    /// number of colors used (INF until a first coloring is recorded)
    pub num_colors: usize,
    /// color of each original vertex, -1 if unassigned
    pub coloring: Vec<i32>,
}

impl ColoringSolution {
    /** creates an empty solution carrying the INF sentinel */
    pub fn new() -> Self {
        Self { num_colors: INF, coloring: Vec::new() }
    }
}

impl Default for ColoringSolution {
    fn default() -> Self { Self::new() }
}


/** checker result.
Returns the number of distinct colors if the coloring is proper,
otherwise, provides an explanation on why the coloring is incorrect.
*/
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CheckerResult {
    /// coloring is proper; provides the number of distinct colors used
    Ok(usize),
    /// some vertex carries no color
    VertexNotColored(VertexId),
    /// some vertex carries a color outside [0, num_colors)
    ColorOutOfRange(VertexId),
    /// both endpoints of an edge carry the same color
    ConflictingEdge(VertexId, VertexId),
}

/**
checks a color vector against a graph.
returns the number of distinct colors used if the coloring is proper.
*/
pub fn check_coloring(g:&Graph, num_colors:usize, coloring:&[i32]) -> CheckerResult {
    // every vertex must carry a color within range
    let mut used = BitSet::new();
    for v in 0..g.n {
        match coloring.get(v) {
            None => return CheckerResult::VertexNotColored(v),
            Some(c) if *c < 0 => return CheckerResult::VertexNotColored(v),
            Some(c) if *c as usize >= num_colors => return CheckerResult::ColorOutOfRange(v),
            Some(c) => { used.insert(*c as usize); }
        }
    }
    // check conflicts
    for u in 0..g.n {
        for w in g.adj[u].iter() {
            if u < w && coloring[u] == coloring[w] {
                return CheckerResult::ConflictingEdge(u, w);
            }
        }
    }
    CheckerResult::Ok(used.len())
}
