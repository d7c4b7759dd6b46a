use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::color::{ColoringSolution, VertexId, INF};
use crate::graph::Graph;
use crate::search::dsatur::heuristic_coloring;
use crate::search::max_clique::heuristic_max_clique;

/// minimum vertices to spawn the two children as parallel tasks
pub const MIN_VERTICES_FOR_TASK: usize = 30;
/// maximum depth for fine-grain task parallelism
pub const MAX_TASK_DEPTH: usize = 4;
/// depth at which the worker-level decomposition stops
pub const DECOMP_DEPTH: usize = 2;

/** The incumbent of one worker.

The color count doubles as an atomic so pruning reads stay lock-free;
a stale (larger) value only weakens pruning and is corrected on the
next read. The coloring vector is replaced under the mutex. */
#[derive(Debug)]
pub struct SharedBest {
    bound: AtomicUsize,
    sol: Mutex<ColoringSolution>,
}

impl SharedBest {
    /** a fresh incumbent carrying the INF sentinel */
    pub fn new() -> Self {
        Self { bound: AtomicUsize::new(INF), sol: Mutex::new(ColoringSolution::new()) }
    }

    /// current bound; monotonically decreasing
    pub fn bound(&self) -> usize {
        self.bound.load(Ordering::Relaxed)
    }

    /** records a coloring of the current graph if it improves the incumbent,
    lifting it to the original vertex set through the graph's mapping */
    pub fn offer(&self, g:&Graph, ub:usize, coloring:&[usize]) {
        let mut sol = self.sol.lock().unwrap();
        if ub < sol.num_colors {
            sol.num_colors = ub;
            sol.coloring = vec![-1; g.orig_n];
            for (i, merged) in g.mapping.iter().enumerate() {
                for orig in merged {
                    sol.coloring[*orig] = coloring[i] as i32;
                }
            }
            self.bound.store(ub, Ordering::Relaxed);
        }
    }

    /// clones the incumbent out of the cell
    pub fn snapshot(&self) -> ColoringSolution {
        self.sol.lock().unwrap().clone()
    }
}

impl Default for SharedBest {
    fn default() -> Self { Self::new() }
}

/** Per-worker branch log. Every branch-and-bound node appends one line
under the internal mutex; the disabled variant is a no-op sink. */
#[derive(Debug)]
pub struct BranchLog {
    out: Option<Mutex<BufWriter<File>>>,
}

impl BranchLog {
    /** opens (truncating) a log file */
    pub fn to_file(path:&Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("unable to open log file {}", path.display()))?;
        Ok(Self { out: Some(Mutex::new(BufWriter::new(file))) })
    }

    /** a log that drops everything (library and test use) */
    pub fn disabled() -> Self {
        Self { out: None }
    }

    /// one line per node: time, depth, both bounds and their witnesses
    fn record(&self, elapsed:f64, depth:usize, lb:usize, clique:&[VertexId], ub:usize, coloring:&[usize]) {
        let out = match &self.out {
            None => return,
            Some(out) => out,
        };
        let mut line = format!("Time: {:.6} sec, Depth: {}, Lower bound: {}, Clique: [", elapsed, depth, lb);
        for v in clique {
            line.push_str(&format!("{} ", v));
        }
        line.push_str(&format!("], Upper bound: {}, Coloring: [", ub));
        for c in coloring {
            line.push_str(&format!("{} ", c));
        }
        line.push(']');
        let mut stream = out.lock().unwrap();
        let _ = writeln!(stream, "{}", line);
        let _ = stream.flush();
    }
}

/** Everything a branch-and-bound invocation needs besides the graph:
the wall clock, the incumbent, the completion flag and the node log. */
#[derive(Debug)]
pub struct SearchCtx<'a> {
    start: Instant,
    time_limit: f64,
    /// the worker's incumbent, shared by all of its tasks
    pub best: &'a SharedBest,
    completed: &'a AtomicBool,
    log: &'a BranchLog,
}

impl<'a> SearchCtx<'a> {
    /** bundles the shared pieces of one worker's search */
    pub fn new(
        start:Instant,
        time_limit:f64,
        best:&'a SharedBest,
        completed:&'a AtomicBool,
        log:&'a BranchLog,
    ) -> Self {
        Self { start, time_limit, best, completed, log }
    }

    /// seconds since the solve started
    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn out_of_time(&self) -> bool {
        self.elapsed() >= self.time_limit
    }
}

/** selects a branching pair: two non-adjacent vertices maximizing the
degree sum, first pair found on the `i < j` scan winning ties.
Returns `None` when the graph is a clique (the subproblem is fully
branched and its chromatic number is `n`). */
pub fn select_branching_pair(g:&Graph) -> Option<(VertexId, VertexId)> {
    let degrees:Vec<usize> = (0..g.n).map(|v| g.degree(v)).collect();
    let mut best:Option<(VertexId, VertexId)> = None;
    let mut best_score = 0;
    for i in 0..g.n {
        for j in i + 1..g.n {
            if !g.are_adjacent(i, j) {
                let score = degrees[i] + degrees[j];
                if best.is_none() || score > best_score {
                    best_score = score;
                    best = Some((i, j));
                }
            }
        }
    }
    best
}

/** Recursive Zykov branch-and-bound.

Per invocation: check the time gate (clearing the completion flag on
expiry), compute the clique lower bound and the DSATUR upper bound, log
the node, offer the coloring to the incumbent, prune on `lb == ub` or
`lb >= incumbent`, otherwise branch on the selected pair into the merge
and add-edge children. Children become parallel tasks while the graph
is large and the depth small; the join waits for both. */
pub fn branch_and_bound(g:&Graph, ctx:&SearchCtx, depth:usize) {
    if ctx.out_of_time() {
        ctx.completed.store(false, Ordering::Relaxed);
        return;
    }
    let (lb, clique) = heuristic_max_clique(g);
    let (ub, coloring) = heuristic_coloring(g);
    ctx.log.record(ctx.elapsed(), depth, lb, &clique, ub, &coloring);
    ctx.best.offer(g, ub, &coloring);
    if lb == ub { return; } // subproblem solved exactly
    if lb >= ctx.best.bound() { return; } // no improvement possible below this node
    let (v1, v2) = match select_branching_pair(g) {
        None => return, // the graph is a clique
        Some(pair) => pair,
    };
    let child_merge = g.merge(v1, v2);
    let child_edge = g.add_edge(v1, v2);
    if g.n >= MIN_VERTICES_FOR_TASK && depth < MAX_TASK_DEPTH {
        rayon::join(
            || branch_and_bound(&child_merge, ctx, depth + 1),
            || branch_and_bound(&child_edge, ctx, depth + 1),
        );
    } else {
        branch_and_bound(&child_merge, ctx, depth + 1);
        branch_and_bound(&child_edge, ctx, depth + 1);
    }
}

/** Unrolls the search tree to `decomp_depth`, emitting every surviving
subproblem into `tasks` as a self-contained graph.

The recursion mirrors the engine but prunes only against the context's
(dummy, INF) incumbent, so only `lb == ub` can cut a subtree. Runs out
of time silently: the completion flag is deliberately left untouched so
start-up overhead never taints the completeness signal. */
pub fn decompose(g:&Graph, depth:usize, decomp_depth:usize, tasks:&mut Vec<Graph>, ctx:&SearchCtx) {
    if ctx.out_of_time() { return; }
    if depth >= decomp_depth {
        tasks.push(g.clone());
        return;
    }
    let (lb, _) = heuristic_max_clique(g);
    let (ub, _) = heuristic_coloring(g);
    if lb == ub { return; }
    if lb >= ctx.best.bound() { return; }
    let (v1, v2) = match select_branching_pair(g) {
        None => return,
        Some(pair) => pair,
    };
    decompose(&g.merge(v1, v2), depth + 1, decomp_depth, tasks, ctx);
    decompose(&g.add_edge(v1, v2), depth + 1, decomp_depth, tasks, ctx);
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{check_coloring, CheckerResult};

    fn cycle(n:usize) -> Graph {
        let mut g = Graph::new(n);
        for v in 0..n {
            g.insert_edge(v, (v + 1) % n);
        }
        g
    }

    fn complete(n:usize) -> Graph {
        let mut g = Graph::new(n);
        for u in 0..n {
            for v in u + 1..n {
                g.insert_edge(u, v);
            }
        }
        g
    }

    fn petersen() -> Graph {
        let mut g = Graph::new(10);
        for v in 0..5 {
            g.insert_edge(v, (v + 1) % 5); // outer cycle
            g.insert_edge(v, v + 5); // spoke
            g.insert_edge(5 + v, 5 + (v + 2) % 5); // inner pentagram
        }
        g
    }

    /// runs the engine sequentially with a fresh incumbent, returns the solution
    fn solve_alone(g:&Graph) -> ColoringSolution {
        let best = SharedBest::new();
        let completed = AtomicBool::new(true);
        let log = BranchLog::disabled();
        let ctx = SearchCtx::new(Instant::now(), 3600.0, &best, &completed, &log);
        branch_and_bound(g, &ctx, 0);
        assert!(completed.load(Ordering::Relaxed));
        best.snapshot()
    }

    #[test]
    fn test_branching_pair_prefers_high_degrees() {
        // star center 0 with leaves 1..=3: leaves are mutually non-adjacent
        let mut g = Graph::new(4);
        g.insert_edge(0, 1);
        g.insert_edge(0, 2);
        g.insert_edge(0, 3);
        let (v1, v2) = select_branching_pair(&g).unwrap();
        assert!(!g.are_adjacent(v1, v2));
        assert_eq!((v1, v2), (1, 2)); // all candidate pairs tie, the scan keeps the first
    }

    #[test]
    fn test_branching_pair_on_clique() {
        assert_eq!(select_branching_pair(&complete(4)), None);
        assert_eq!(select_branching_pair(&Graph::new(0)), None);
    }

    #[test]
    fn test_branching_pair_isolated_vertices() {
        let g = Graph::new(2);
        assert_eq!(select_branching_pair(&g), Some((0, 1)));
    }

    #[test]
    fn test_engine_complete_graph() {
        let sol = solve_alone(&complete(4));
        assert_eq!(sol.num_colors, 4);
        assert!(matches!(check_coloring(&complete(4), 4, &sol.coloring), CheckerResult::Ok(4)));
    }

    #[test]
    fn test_engine_cycles() {
        assert_eq!(solve_alone(&cycle(6)).num_colors, 2);
        assert_eq!(solve_alone(&cycle(5)).num_colors, 3);
    }

    #[test]
    fn test_engine_single_vertex() {
        assert_eq!(solve_alone(&Graph::new(1)).num_colors, 1);
    }

    #[test]
    fn test_engine_petersen() {
        let g = petersen();
        let sol = solve_alone(&g);
        assert_eq!(sol.num_colors, 3);
        assert!(matches!(check_coloring(&g, 3, &sol.coloring), CheckerResult::Ok(3)));
    }

    #[test]
    fn test_incumbent_only_improves() {
        let g = cycle(5);
        let best = SharedBest::new();
        best.offer(&g, 4, &[0, 1, 2, 3, 0]);
        assert_eq!(best.bound(), 4);
        best.offer(&g, 5, &[0, 1, 2, 3, 4]);
        assert_eq!(best.bound(), 4); // worse offers are ignored
        best.offer(&g, 3, &[0, 1, 0, 1, 2]);
        assert_eq!(best.bound(), 3);
        assert_eq!(best.snapshot().coloring, vec![0, 1, 0, 1, 2]);
    }

    #[test]
    fn test_offer_lifts_through_mapping() {
        let g = cycle(5).merge(0, 2); // {0,2} collapsed into current vertex 0
        let best = SharedBest::new();
        best.offer(&g, 3, &[0, 1, 2, 1]);
        let sol = best.snapshot();
        assert_eq!(sol.coloring[0], 0);
        assert_eq!(sol.coloring[2], 0); // same super-vertex, same color
        assert_eq!(sol.coloring.len(), 5);
    }

    #[test]
    fn test_time_gate_clears_completion() {
        let g = cycle(5);
        let best = SharedBest::new();
        let completed = AtomicBool::new(true);
        let log = BranchLog::disabled();
        let ctx = SearchCtx::new(Instant::now(), 0.0, &best, &completed, &log);
        branch_and_bound(&g, &ctx, 0);
        assert!(!completed.load(Ordering::Relaxed));
        assert_eq!(best.bound(), INF); // nothing recorded past the gate
    }

    #[test]
    fn test_decompose_emits_root_at_depth_zero() {
        let g = petersen();
        let best = SharedBest::new();
        let completed = AtomicBool::new(true);
        let log = BranchLog::disabled();
        let ctx = SearchCtx::new(Instant::now(), 3600.0, &best, &completed, &log);
        let mut tasks = Vec::new();
        decompose(&g, 0, 0, &mut tasks, &ctx);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].n, 10);
    }

    #[test]
    fn test_decompose_prunes_closed_subtrees() {
        // both children of C5 close their gap immediately, nothing reaches depth 2
        let g = cycle(5);
        let best = SharedBest::new();
        let completed = AtomicBool::new(true);
        let log = BranchLog::disabled();
        let ctx = SearchCtx::new(Instant::now(), 3600.0, &best, &completed, &log);
        let mut tasks = Vec::new();
        decompose(&g, 0, DECOMP_DEPTH, &mut tasks, &ctx);
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_decompose_timeout_is_silent() {
        let g = petersen();
        let best = SharedBest::new();
        let completed = AtomicBool::new(true);
        let log = BranchLog::disabled();
        let ctx = SearchCtx::new(Instant::now(), 0.0, &best, &completed, &log);
        let mut tasks = Vec::new();
        decompose(&g, 0, DECOMP_DEPTH, &mut tasks, &ctx);
        assert!(tasks.is_empty());
        assert!(completed.load(Ordering::Relaxed)); // the flag is left untouched here
    }
}
