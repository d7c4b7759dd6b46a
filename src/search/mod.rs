//! Bounding heuristics and the Zykov branch-and-bound engine.

/// greedy DSATUR coloring (upper bound)
pub mod dsatur;

/// Bron-Kerbosch maximum clique (lower bound)
pub mod max_clique;

/// Zykov branching, search engine and tree decomposition
pub mod zykov;
