//! Similarity score and rule labels for a candidate against the requested product.

use std::fmt;

use crate::graph::{Graph, NodeKey};
use crate::ingest::ProductRecord;
use crate::search::constraints::has_all_tags;
use crate::{AltgraphError, Result};

/// Highest score a candidate can reach.
pub const MAX_SCORE: u8 = 5;

/// A human-readable reason attached to a ranked alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    SameCategory,
    SimilarCategory,
    AllTagsMatched,
    CheaperThanOriginal,
    SameBrand,
    DifferentBrand,
}

impl Rule {
    pub fn label(&self) -> &'static str {
        match self {
            Rule::SameCategory => "Same Category",
            Rule::SimilarCategory => "Similar Category",
            Rule::AllTagsMatched => "All tags matched",
            Rule::CheaperThanOriginal => "Cheaper than original",
            Rule::SameBrand => "Same brand",
            Rule::DifferentBrand => "Different brand",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Score `candidate` relative to `requested`, 0..=5.
///
/// +3 same category, otherwise +1 if the two category nodes share an edge;
/// +1 same brand; +1 strictly cheaper.
pub fn score(graph: &Graph, requested: &str, candidate: &str) -> Result<u8> {
    let (req, cand) = lookup_pair(graph, requested, candidate)?;
    Ok(score_products(graph, req, cand))
}

/// Rule labels for `candidate`, in fixed order: category, tags (only when every
/// required tag matched), price (only when cheaper), brand.
pub fn explain(
    graph: &Graph,
    requested: &str,
    candidate: &str,
    required_tags: &[String],
) -> Result<Vec<String>> {
    let (req, cand) = lookup_pair(graph, requested, candidate)?;
    Ok(explain_products(req, cand, required_tags)
        .iter()
        .map(|r| r.label().to_string())
        .collect())
}

pub(crate) fn score_products(graph: &Graph, requested: &ProductRecord, candidate: &ProductRecord) -> u8 {
    let mut score = 0;

    if requested.category == candidate.category {
        score += 3;
    } else if graph.are_adjacent(
        &NodeKey::category(&requested.category),
        &NodeKey::category(&candidate.category),
    ) {
        score += 1;
    }

    if requested.brand == candidate.brand {
        score += 1;
    }

    if candidate.price < requested.price {
        score += 1;
    }

    score
}

/// The category label only checks equality; it says "Similar" even when the
/// score gave no similarity credit.
pub(crate) fn explain_products(
    requested: &ProductRecord,
    candidate: &ProductRecord,
    required_tags: &[String],
) -> Vec<Rule> {
    let mut rules = Vec::with_capacity(4);

    if requested.category == candidate.category {
        rules.push(Rule::SameCategory);
    } else {
        rules.push(Rule::SimilarCategory);
    }

    if has_all_tags(candidate, required_tags) {
        rules.push(Rule::AllTagsMatched);
    }

    if candidate.price < requested.price {
        rules.push(Rule::CheaperThanOriginal);
    }

    if candidate.brand == requested.brand {
        rules.push(Rule::SameBrand);
    } else {
        rules.push(Rule::DifferentBrand);
    }

    rules
}

fn lookup_pair<'g>(
    graph: &'g Graph,
    requested: &str,
    candidate: &str,
) -> Result<(&'g ProductRecord, &'g ProductRecord)> {
    let req = graph
        .product(requested)
        .ok_or_else(|| AltgraphError::UnknownNode(NodeKey::product(requested).to_string()))?;
    let cand = graph
        .product(candidate)
        .ok_or_else(|| AltgraphError::UnknownNode(NodeKey::product(candidate).to_string()))?;
    Ok((req, cand))
}
