use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use rayon::ThreadPool;

use crate::color::INF;
use crate::graph::{connected_components, extract_subgraph, Graph};
use crate::search::zykov::{branch_and_bound, decompose, BranchLog, SearchCtx, SharedBest, DECOMP_DEPTH};

/** How a solve is spread over the machine: `workers` peer workers
(the `mpirun -np` analogue), each running a task pool of `threads`
threads against its own incumbent. */
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// number of peer workers
    pub workers: usize,
    /// threads in each worker's task pool
    pub threads: usize,
    /// wall-clock budget in seconds
    pub time_limit: f64,
    /// depth at which the single-component search tree is decomposed
    pub decomp_depth: usize,
}

impl SolverConfig {
    /** a configuration with the default decomposition depth */
    pub fn new(workers:usize, threads:usize, time_limit:f64) -> Self {
        Self { workers, threads, time_limit, decomp_depth: DECOMP_DEPTH }
    }
}

/** the reduced result of a solve */
#[derive(Debug)]
pub struct SolveOutcome {
    /// number of colors of the best coloring found (INF if none was found)
    pub num_colors: usize,
    /// color of each original vertex (-1 where no worker colored it)
    pub coloring: Vec<i32>,
    /// false iff some branch-and-bound node hit the time gate
    pub within_time_limit: bool,
}

/// what one worker contributes to the final reduction
struct WorkerResult {
    rank: usize,
    num_colors: usize,
    coloring: Vec<i32>,
}

/** Solves the chromatic number problem on `full`.

Multiple connected components are spread over the workers (component
`i` to worker `i mod W`) and reduced with MAX on the color count and
element-wise MAX on the coloring, every vertex being colored by exactly
one worker. A single component is first decomposed into a flat list of
subproblems, task `i` going to worker `i mod W`; the reduction keeps
the smallest color count, ties broken by the lowest rank, and that
worker's coloring wins. Per-worker branch logs are written into
`log_dir` when it is given. */
pub fn solve(full:&Graph, cfg:&SolverConfig, log_dir:Option<&Path>) -> Result<SolveOutcome> {
    let start = Instant::now();
    if full.n == 0 {
        return Ok(SolveOutcome { num_colors: 0, coloring: Vec::new(), within_time_limit: true });
    }
    let workers = cfg.workers.max(1);
    let completed = AtomicBool::new(true);
    let components = connected_components(full);

    let logs = open_logs(workers, log_dir)?;
    let pools = build_pools(workers, cfg.threads.max(1))?;

    let (num_colors, coloring) = if components.len() > 1 {
        let results = run_component_workers(full, &components, cfg, start, &completed, logs, pools)?;
        reduce_components(full.orig_n, &results)
    } else {
        let sub = extract_subgraph(full, &components[0]);
        // deterministic decomposition, identical for every worker
        let dummy = SharedBest::new();
        let no_log = BranchLog::disabled();
        let decomp_ctx = SearchCtx::new(start, cfg.time_limit, &dummy, &completed, &no_log);
        let mut tasks:Vec<Graph> = Vec::new();
        decompose(&sub, 0, cfg.decomp_depth, &mut tasks, &decomp_ctx);
        if tasks.is_empty() {
            tasks.push(sub);
        }
        let results = run_task_workers(&tasks, cfg, start, &completed, logs, pools)?;
        reduce_tasks(full.orig_n, &results)
    };

    Ok(SolveOutcome {
        num_colors,
        coloring,
        within_time_limit: completed.load(Ordering::Relaxed),
    })
}

fn open_logs(workers:usize, log_dir:Option<&Path>) -> Result<Vec<BranchLog>> {
    (0..workers)
        .map(|rank| match log_dir {
            None => Ok(BranchLog::disabled()),
            Some(dir) => BranchLog::to_file(&dir.join(format!("branch_log_rank_{}.txt", rank))),
        })
        .collect()
}

fn build_pools(workers:usize, threads:usize) -> Result<Vec<ThreadPool>> {
    (0..workers)
        .map(|_| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .context("unable to build a worker thread pool")
        })
        .collect()
}

/** one worker per rank; each solves its assigned components in order,
keeping the MAX of the per-component color counts and the colors of the
vertices it owns */
fn run_component_workers(
    full:&Graph,
    components:&[Vec<usize>],
    cfg:&SolverConfig,
    start:Instant,
    completed:&AtomicBool,
    logs:Vec<BranchLog>,
    pools:Vec<ThreadPool>,
) -> Result<Vec<WorkerResult>> {
    let workers = logs.len();
    std::thread::scope(|scope| {
        let handles:Vec<_> = logs
            .into_iter()
            .zip(pools)
            .enumerate()
            .map(|(rank, (log, pool))| {
                scope.spawn(move || {
                    let mut local_best:usize = 0;
                    let mut local_coloring = vec![-1i32; full.orig_n];
                    for (i, comp) in components.iter().enumerate() {
                        if i % workers != rank { continue; }
                        let sub = extract_subgraph(full, comp);
                        let comp_best = SharedBest::new();
                        let ctx = SearchCtx::new(start, cfg.time_limit, &comp_best, completed, &log);
                        pool.install(|| branch_and_bound(&sub, &ctx, 0));
                        let sol = comp_best.snapshot();
                        local_best = local_best.max(sol.num_colors);
                        for &v in comp {
                            local_coloring[v] = sol.coloring.get(v).copied().unwrap_or(-1);
                        }
                    }
                    WorkerResult { rank, num_colors: local_best, coloring: local_coloring }
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().map_err(|_| anyhow!("worker thread panicked")))
            .collect()
    })
}

/** one worker per rank; each spawns its assigned subproblems into its
task pool, all sharing the worker's incumbent, and reports it */
fn run_task_workers(
    tasks:&[Graph],
    cfg:&SolverConfig,
    start:Instant,
    completed:&AtomicBool,
    logs:Vec<BranchLog>,
    pools:Vec<ThreadPool>,
) -> Result<Vec<WorkerResult>> {
    let workers = logs.len();
    std::thread::scope(|scope| {
        let handles:Vec<_> = logs
            .into_iter()
            .zip(pools)
            .enumerate()
            .map(|(rank, (log, pool))| {
                scope.spawn(move || {
                    let local_best = SharedBest::new();
                    let ctx = SearchCtx::new(start, cfg.time_limit, &local_best, completed, &log);
                    let ctx_ref = &ctx;
                    pool.install(|| {
                        rayon::scope(|s| {
                            for (i, task) in tasks.iter().enumerate() {
                                if i % workers != rank { continue; }
                                s.spawn(move |_| branch_and_bound(task, ctx_ref, cfg.decomp_depth));
                            }
                        });
                    });
                    let sol = local_best.snapshot();
                    WorkerResult { rank, num_colors: sol.num_colors, coloring: sol.coloring }
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().map_err(|_| anyhow!("worker thread panicked")))
            .collect()
    })
}

/** the disjoint-union reduction: χ(G1 ⊔ G2) = max(χ(G1), χ(G2)), and
the coloring vectors merge element-wise (unowned entries stay -1, so
the MAX keeps the owning worker's color) */
fn reduce_components(orig_n:usize, results:&[WorkerResult]) -> (usize, Vec<i32>) {
    let mut num_colors = 0;
    let mut coloring = vec![-1i32; orig_n];
    for r in results {
        num_colors = num_colors.max(r.num_colors);
        for (slot, c) in coloring.iter_mut().zip(&r.coloring) {
            *slot = (*slot).max(*c);
        }
    }
    (num_colors, coloring)
}

/** the subproblem reduction: smallest color count wins, ties broken by
the lowest rank, and the winning worker's coloring is kept */
fn reduce_tasks(orig_n:usize, results:&[WorkerResult]) -> (usize, Vec<i32>) {
    let mut best_value = INF;
    let mut best_rank = 0;
    for r in results {
        if r.num_colors < best_value {
            best_value = r.num_colors;
            best_rank = r.rank;
        }
    }
    let winner = results.iter().find(|r| r.rank == best_rank);
    let coloring = match winner {
        Some(r) if r.coloring.len() == orig_n => r.coloring.clone(),
        _ => vec![-1; orig_n], // nobody colored anything within the budget
    };
    (best_value, coloring)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{check_coloring, CheckerResult};
    use crate::dimacs::read_graph_from_col;

    fn solve_with(g:&Graph, workers:usize, threads:usize) -> SolveOutcome {
        let cfg = SolverConfig::new(workers, threads, 3600.0);
        solve(g, &cfg, None).unwrap()
    }

    /// the solver must agree on the color count for every (workers, threads) combination
    fn assert_chromatic(path:&str, expected:usize) {
        let g = read_graph_from_col(path).unwrap();
        for workers in [1, 2, 4] {
            for threads in [1, 2, 4] {
                let outcome = solve_with(&g, workers, threads);
                assert_eq!(outcome.num_colors, expected, "{} with {} workers, {} threads", path, workers, threads);
                assert!(outcome.within_time_limit);
                assert!(matches!(
                    check_coloring(&g, outcome.num_colors, &outcome.coloring),
                    CheckerResult::Ok(_)
                ));
            }
        }
    }

    #[test]
    fn test_triangle() {
        assert_chromatic("insts/triangle.col", 3);
    }

    #[test]
    fn test_cycle4() {
        assert_chromatic("insts/cycle4.col", 2);
    }

    #[test]
    fn test_cycle5() {
        assert_chromatic("insts/cycle5.col", 3);
    }

    #[test]
    fn test_petersen() {
        assert_chromatic("insts/petersen.col", 3);
    }

    #[test]
    fn test_k4() {
        assert_chromatic("insts/k4.col", 4);
    }

    #[test]
    fn test_two_triangles() {
        assert_chromatic("insts/two_triangles.col", 3);
    }

    #[test]
    fn test_two_triangles_colors_both_components() {
        let g = read_graph_from_col("insts/two_triangles.col").unwrap();
        let outcome = solve_with(&g, 2, 1);
        assert_eq!(outcome.num_colors, 3);
        assert!(outcome.coloring.iter().all(|c| (0..3).contains(c)));
    }

    #[test]
    fn test_empty_graph() {
        let outcome = solve_with(&Graph::new(0), 2, 1);
        assert_eq!(outcome.num_colors, 0);
        assert!(outcome.coloring.is_empty());
        assert!(outcome.within_time_limit);
    }

    #[test]
    fn test_single_vertex() {
        let outcome = solve_with(&Graph::new(1), 1, 1);
        assert_eq!(outcome.num_colors, 1);
        assert_eq!(outcome.coloring, vec![0]);
    }

    #[test]
    fn test_edgeless_graph() {
        let outcome = solve_with(&Graph::new(4), 1, 1);
        assert_eq!(outcome.num_colors, 1);
    }

    #[test]
    fn test_disjoint_union_law() {
        // C5 ⊔ K4: χ = max(3, 4) = 4
        let mut g = Graph::new(9);
        for v in 0..5 {
            g.insert_edge(v, (v + 1) % 5);
        }
        for u in 5..9 {
            for v in u + 1..9 {
                g.insert_edge(u, v);
            }
        }
        let outcome = solve_with(&g, 2, 1);
        assert_eq!(outcome.num_colors, 4);
    }

    #[test]
    fn test_zero_time_budget() {
        let g = read_graph_from_col("insts/petersen.col").unwrap();
        let cfg = SolverConfig::new(1, 1, 0.0);
        let outcome = solve(&g, &cfg, None).unwrap();
        assert!(!outcome.within_time_limit);
        assert_eq!(outcome.num_colors, INF);
        assert!(outcome.coloring.iter().all(|c| *c == -1));
    }
}
