use bit_set::BitSet;

use crate::color::VertexId;
use crate::graph::Graph;

/** computes a maximum clique of the current graph with Bron-Kerbosch.

The clique size is a lower bound on the chromatic number, and the Zykov
operators preserve the implication for the original graph. Exponential
in the worst case; the outer time budget caps its effective runtime.

returns (clique size, clique vertices as current indices) */
pub fn heuristic_max_clique(g:&Graph) -> (usize, Vec<VertexId>) {
    let mut candidates = BitSet::with_capacity(g.n);
    for v in 0..g.n {
        candidates.insert(v);
    }
    let mut r = Vec::new();
    let mut best = Vec::new();
    bron_kerbosch(g, &mut r, candidates, BitSet::with_capacity(g.n), &mut best);
    (best.len(), best)
}

/// pivot u in P ∪ X maximizing |P ∩ N(u)| (first maximum wins)
fn choose_pivot(g:&Graph, p:&BitSet, x:&BitSet) -> VertexId {
    let mut pivot = 0;
    let mut best_count = -1i64;
    for u in p.iter().chain(x.iter()) {
        let count = p.intersection(&g.adj[u]).count() as i64;
        if count > best_count {
            best_count = count;
            pivot = u;
        }
    }
    pivot
}

/** recursive enumeration of maximal cliques, keeping the largest seen.
R is the clique under construction, P the candidates, X the excluded vertices;
only P ∖ N(pivot) is expanded. */
fn bron_kerbosch(g:&Graph, r:&mut Vec<VertexId>, mut p:BitSet, mut x:BitSet, best:&mut Vec<VertexId>) {
    if p.is_empty() && x.is_empty() {
        if r.len() > best.len() {
            *best = r.clone();
        }
        return;
    }
    let pivot = choose_pivot(g, &p, &x);
    let expand:Vec<VertexId> = p.difference(&g.adj[pivot]).collect();
    for v in expand {
        r.push(v);
        let mut new_p = p.clone();
        new_p.intersect_with(&g.adj[v]);
        let mut new_x = x.clone();
        new_x.intersect_with(&g.adj[v]);
        bron_kerbosch(g, r, new_p, new_x, best);
        r.pop();
        p.remove(v);
        x.insert(v);
        if p.is_empty() { break; }
    }
}
