use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// version string advertised in the output report
pub const SOLVER_VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

/** strips directory and extension from an instance path */
pub fn instance_base_name(path:&str) -> String {
    match Path::new(path).file_stem() {
        None => path.to_string(),
        Some(stem) => stem.to_string_lossy().into_owned(),
    }
}

/** Everything the final report states about a finished solve.
Rendered as a key/value header followed by one `vertex color` line per
original vertex. */
#[derive(Debug)]
pub struct Report<'a> {
    /// instance base name (no directory, no extension)
    pub instance_name: String,
    /// the full command line of the invocation
    pub cmd_line: String,
    /// number of vertices of the original graph
    pub nb_vertices: usize,
    /// number of edges of the original graph
    pub nb_edges: usize,
    /// wall-clock budget the solver was given, in seconds
    pub time_limit: f64,
    /// number of peer workers
    pub workers: usize,
    /// threads in each worker's task pool
    pub threads: usize,
    /// seconds actually spent
    pub wall_time: f64,
    /// whether the search ran to completion within the budget
    pub within_time_limit: bool,
    /// number of colors of the reported coloring
    pub num_colors: usize,
    /// color of each original vertex
    pub coloring: &'a [i32],
}

impl Report<'_> {
    /** renders the report content */
    pub fn render(&self) -> String {
        let mut out = String::new();
        out += &format!("problem_instance_file_name: {}\n", self.instance_name);
        out += &format!("cmd_line: {}\n", self.cmd_line);
        out += &format!("solver_version: {}\n", SOLVER_VERSION);
        out += &format!("number_of_vertices: {}\n", self.nb_vertices);
        out += &format!("number_of_edges: {}\n", self.nb_edges);
        out += &format!("time_limit_sec: {}\n", self.time_limit);
        out += &format!("number_of_mpi_processes: {}\n", self.workers);
        out += &format!("number_of_threads_per_process: {}\n", self.threads);
        out += &format!("wall_time_sec: {}\n", self.wall_time);
        out += &format!("is_within_time_limit: {}\n", self.within_time_limit);
        out += &format!("number_of_colors: {}\n", self.num_colors);
        for (v, c) in self.coloring.iter().enumerate() {
            out += &format!("{} {}\n", v, c);
        }
        out
    }

    /** writes the report into `dir` as `<base>_<workers>.output`, returns the path */
    pub fn write(&self, dir:&Path) -> Result<PathBuf> {
        let path = dir.join(format!("{}_{}.output", self.instance_name, self.workers));
        fs::write(&path, self.render())
            .with_context(|| format!("unable to write the output file {}", path.display()))?;
        Ok(path)
    }
}
