//! Parallel exact graph coloring solver (Zykov branch-and-bound)

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

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{App, Arg};
use serde_json::json;

use zykov_color::dimacs::read_graph_from_col;
use zykov_color::parallel::{solve, SolverConfig};
use zykov_color::report::{instance_base_name, Report};

/** reads the worker-local thread count from the environment.
Unset, unparsable or zero means one thread. */
fn threads_from_env() -> usize {
    let threads = match std::env::var("OMP_NUM_THREADS") {
        Err(_) => 0,
        Ok(value) => value.parse().unwrap_or(0),
    };
    if threads == 0 { 1 } else { threads }
}

/// the invocation as one line, the way the report states it
fn cmd_line() -> String {
    let mut line = String::new();
    for arg in std::env::args() {
        line += &arg;
        line += " ";
    }
    line
}

/**
reads an instance, solves it within the time limit, writes the final
report and the per-worker branch logs.

Exits non-zero on usage errors and I/O failures; hitting the time
limit is not an error (the report then carries
`is_within_time_limit: false` and the best coloring found so far).
*/
pub fn main() {
    if let Err(e) = run() {
        eprintln!("solver: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // parse arguments
    let main_args = App::new("solver")
        .about("exact graph coloring (parallel Zykov branch-and-bound)")
        .arg(Arg::with_name("instance")
            .help("input graph, DIMACS .col format")
            .required(true))
        .arg(Arg::with_name("time")
            .help("time limit in seconds")
            .required(true))
        .arg(Arg::with_name("workers")
            .short("w").long("workers").takes_value(true)
            .help("number of peer workers (default 1)"))
        .arg(Arg::with_name("output")
            .short("o").long("output").takes_value(true)
            .help("output directory (default ../build/output)"))
        .arg(Arg::with_name("perf")
            .short("p").long("perf").takes_value(true)
            .help("performance stats file (JSON)"))
        .get_matches();
    let inst_filename = main_args.value_of("instance").unwrap();
    let time_limit:f64 = main_args.value_of("time").unwrap().parse()
        .context("unable to parse the time given")?;
    let workers:usize = match main_args.value_of("workers") {
        None => 1,
        Some(w) => w.parse().context("unable to parse the worker count")?,
    };
    let threads = threads_from_env();
    let output_root = Path::new(main_args.value_of("output").unwrap_or("../build/output"));
    let perf_file:Option<String> = main_args.value_of("perf").map(|e| {
        println!("printing perfs in: {}\n", e);
        e.to_string()
    });

    // the report and the branch logs must be writable before the search starts
    let log_dir = output_root.join("log");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("unable to create the log directory {}", log_dir.display()))?;

    println!("reading instance: {}...", inst_filename);
    let graph = read_graph_from_col(inst_filename)?;
    println!("\t{} \t vertices", graph.n);
    println!("\t{} \t edges", graph.nb_edges());
    println!("time limit: {}", time_limit);
    println!("=======================");

    let t_start = Instant::now();
    let cfg = SolverConfig::new(workers, threads, time_limit);
    let outcome = solve(&graph, &cfg, Some(&log_dir))?;
    let wall_time = t_start.elapsed().as_secs_f64();
    println!("search took {:.3} seconds. Nb colors: {}", wall_time, outcome.num_colors);

    let report = Report {
        instance_name: instance_base_name(inst_filename),
        cmd_line: cmd_line(),
        nb_vertices: graph.orig_n,
        nb_edges: graph.nb_edges(),
        time_limit,
        workers,
        threads,
        wall_time,
        within_time_limit: outcome.within_time_limit,
        num_colors: outcome.num_colors,
        coloring: &outcome.coloring,
    };
    let out_path = report.write(output_root)?;
    println!("Output written to {}", out_path.display());

    // export statistics
    if let Some(filename) = perf_file {
        let stats = json!({
            "primal_list": vec![outcome.num_colors],
            "time_searched": wall_time,
            "inst_name": inst_filename,
        });
        fs::write(&filename, serde_json::to_string(&stats).unwrap())
            .with_context(|| format!("unable to write the stats file {}", filename))?;
    }
    Ok(())
}
