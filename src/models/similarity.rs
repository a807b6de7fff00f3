//! Edge-based tour comparison.
//!
//! A genome is viewed as a closed tour through a virtual depot node. Every
//! separator is mapped onto the depot, so a multi-salesman genome becomes a
//! set of undirected edges that does not depend on leg order or travel
//! direction.

use crate::models::{Gene, GenomeLayout, Token};
use std::collections::HashSet;
use std::fmt;

/// Sentinel node value standing for the depot.
pub const DEPOT_NODE: i64 = -1;

/// Delimiter between edge labels in a canonical signature.
pub const SIGNATURE_DELIMITER: &str = "|";

/// An undirected edge between two nodes, stored with the smaller node first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge(i64, i64);

impl Edge {
    fn new(u: i64, v: i64) -> Self {
        if u < v { Self(u, v) } else { Self(v, u) }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.0, self.1)
    }
}

fn node(layout: &GenomeLayout, gene: Gene) -> i64 {
    match layout.classify(gene) {
        Token::City(index) => index as i64,
        Token::Separator => DEPOT_NODE,
    }
}

/// Edges of the closed tour, in traversal order. Duplicates are kept.
pub fn edges<'a>(layout: &'a GenomeLayout, genes: &'a [Gene]) -> impl Iterator<Item = Edge> + 'a {
    let nodes = genes.iter().map(move |&gene| node(layout, gene));
    let starts = std::iter::once(DEPOT_NODE).chain(nodes.clone());
    let ends = nodes.chain(std::iter::once(DEPOT_NODE));

    starts.zip(ends).map(|(u, v)| Edge::new(u, v))
}

pub fn edge_set(layout: &GenomeLayout, genes: &[Gene]) -> HashSet<Edge> {
    edges(layout, genes).collect()
}

/// Share of `lhs`'s distinct edges that also occur in `rhs`.
///
/// The divisor is the size of `lhs`'s own edge set, so the measure is only
/// symmetric when both edge sets have the same size. Genomes of different
/// lengths have similarity 0.
pub fn similarity(layout: &GenomeLayout, lhs: &[Gene], rhs: &[Gene]) -> f64 {
    if lhs.len() != rhs.len() {
        return 0.0;
    }

    let lhs_edges = edge_set(layout, lhs);
    let rhs_edges = edge_set(layout, rhs);
    let shared = rhs_edges.iter().filter(|e| lhs_edges.contains(e)).count();

    shared as f64 / lhs_edges.len() as f64
}

/// Order-independent fingerprint of a tour: its sorted edge labels joined by
/// [`SIGNATURE_DELIMITER`].
pub fn canonical_signature(layout: &GenomeLayout, genes: &[Gene]) -> String {
    let mut labels: Vec<String> = edges(layout, genes).map(|e| e.to_string()).collect();
    labels.sort_unstable();
    labels.join(SIGNATURE_DELIMITER)
}
