use std::fs;

use anyhow::{anyhow, Context, Result};
use nom::branch::alt;
use nom::bytes::complete::{tag, take, take_until};
use nom::character::complete::{digit1, multispace0, space1};
use nom::IResult;

use crate::graph::Graph;


/// skips a single comment line ("c ...")
fn skip_comment(s:&str) -> IResult<&str, &str> {
    let (s, _) = tag("c")(s)?;
    let (s, txt) = take_until("\n")(s)?;
    let (s, _) = take(1usize)(s)?;
    Ok((s, txt))
}

/// skips any other non-edge line (the reference reader ignores unknown lines)
fn skip_line(s:&str) -> IResult<&str, &str> {
    let (s, txt) = take_until("\n")(s)?;
    let (s, _) = take(1usize)(s)?;
    Ok((s, txt))
}

/// reads two integers separated by spaces, consuming trailing whitespace
fn read_two_integers(s:&str) -> IResult<&str, (usize, usize)> {
    let (s, a) = digit1(s)?;
    let (s, _) = space1(s)?;
    let (s, b) = digit1(s)?;
    let (s, _) = multispace0(s)?;
    Ok((s, (a.parse().unwrap(), b.parse().unwrap())))
}

/// reads the header line containing (n,m)
pub fn read_header(s:&str) -> IResult<&str, (usize, usize)> {
    let (s, _) = alt((tag("p edge"), tag("p col")))(s)?;
    let (s, _) = space1(s)?;
    read_two_integers(s)
}

/// reads an edge line (WARNING: indices start at 1 in the DIMACS format)
pub fn read_edge(s:&str) -> IResult<&str, (usize, usize)> {
    let (s, _) = tag("e")(s)?;
    let (s, _) = space1(s)?;
    read_two_integers(s)
}

/** parses the content of a .col file into a graph.

Comment lines may appear anywhere; duplicate edges are absorbed by the
set semantics of the adjacency rows; edges naming an out-of-range
vertex are silently dropped, as in the reference reader. */
pub fn parse_col(content:&str) -> Result<Graph> {
    let mut head = content;
    // leading whitespace and comments before the header
    loop {
        let (trimmed, _) = multispace0::<&str, nom::error::Error<&str>>(head).unwrap_or((head, ""));
        head = trimmed;
        match skip_comment(head) {
            Ok((after_comment, _)) => { head = after_comment; }
            Err(_) => break,
        }
    }
    let (mut body, (n, _m)) = read_header(head)
        .map_err(|_| anyhow!("missing or malformed 'p edge' header line"))?;
    let mut g = Graph::new(n);
    loop {
        if body.is_empty() { break; }
        if let Ok((rest, (u, v))) = read_edge(body) {
            body = rest;
            if u >= 1 && v >= 1 && u <= n && v <= n {
                g.insert_edge(u - 1, v - 1);
            }
            continue;
        }
        if let Ok((rest, _)) = skip_comment(body) {
            body = rest;
            continue;
        }
        match skip_line(body) {
            Ok((rest, _)) => { body = rest; }
            Err(_) => break, // last line without a newline
        }
    }
    Ok(g)
}

/** reads a graph from a .col file (1-indexed vertices) */
pub fn read_graph_from_col(filename:&str) -> Result<Graph> {
    let content = fs::read_to_string(filename)
        .with_context(|| format!("unable to read instance file {}", filename))?
        .replace('\r', "");
    parse_col(&content)
        .with_context(|| format!("instance file {} is not a valid .col file", filename))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_header() {
        let s = "p edge 2 1\ne 1 2";
        assert_eq!(read_header(s).unwrap().0, "e 1 2");
        assert_eq!(read_header(s).unwrap().1, (2, 1));
    }

    #[test]
    fn test_read_header_col() {
        let s = "p col 2 1\ne 1 2";
        assert_eq!(read_header(s).unwrap().1, (2, 1));
    }

    #[test]
    fn test_read_edge() {
        let s = "e 1 2\n";
        assert_eq!(read_edge(s).unwrap().1, (1, 2));
        assert_eq!(read_edge(s).unwrap().0, "");
    }

    #[test]
    fn test_parse_with_comments() {
        let s = "c a comment\np edge 3 3\ne 1 2\nc another comment\ne 2 3\ne 1 3\n";
        let g = parse_col(s).unwrap();
        assert_eq!(g.n, 3);
        assert_eq!(g.nb_edges(), 3);
        assert!(g.are_adjacent(0, 1));
        assert!(g.are_adjacent(1, 2));
        assert!(g.are_adjacent(0, 2));
    }

    #[test]
    fn test_parse_duplicate_edges_absorbed() {
        let s = "p edge 2 3\ne 1 2\ne 1 2\ne 2 1\n";
        let g = parse_col(s).unwrap();
        assert_eq!(g.nb_edges(), 1);
    }

    #[test]
    fn test_parse_out_of_range_ignored() {
        let s = "p edge 2 2\ne 1 2\ne 1 7\n";
        let g = parse_col(s).unwrap();
        assert_eq!(g.nb_edges(), 1);
    }

    #[test]
    fn test_parse_missing_header() {
        let s = "c only comments here\n";
        assert!(parse_col(s).is_err());
    }

    #[test]
    fn test_read_instance_file() {
        let g = read_graph_from_col("insts/petersen.col").unwrap();
        assert_eq!(g.n, 10);
        assert_eq!(g.nb_edges(), 15);
    }
}
