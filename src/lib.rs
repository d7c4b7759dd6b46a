//! Exact graph coloring via parallel Zykov branch-and-bound

// #![warn(clippy::all, clippy::pedantic)]
// useful additional warnings if docs are missing, or crates imported but unused, etc.
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unsafe_code)]
#![warn(unused_extern_crates)]
#![warn(variant_size_differences)]

// not sure if already by default in clippy
#![warn(clippy::similar_names)]
#![warn(clippy::shadow_unrelated)]
#![warn(clippy::shadow_same)]
#![warn(clippy::shadow_reuse)]


/// vertex ids, coloring solutions, solution checker
pub mod color;

/// read graphs in the DIMACS .col format
pub mod dimacs;

/// quotient graph model and the Zykov branching operators
pub mod graph;

/// bounding heuristics and the branch-and-bound engine
pub mod search;

/// distribution of components and subproblems across peer workers
pub mod parallel;

/// final output report rendering
pub mod report;
