// src/resolver/fuzzy.rs

use crate::resolver::normalize::tokenize;
use std::collections::HashSet;
use std::str::FromStr;

/// Which token set the overlap is measured against.
///
/// `Union` is plain Jaccard similarity. `Query` measures how much of the
/// query's own tokens appear in the candidate, so a short query like
/// "Seven Palm" fully matches "Seven Palm Jumeirah".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapBasis {
    Query,
    Union,
}

impl FromStr for OverlapBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "query" => Ok(OverlapBasis::Query),
            "union" | "jaccard" => Ok(OverlapBasis::Union),
            other => Err(format!("expected 'query' or 'union', got '{other}'")),
        }
    }
}

/// |a ∩ b| / |a ∪ b|, or 0.0 when either side is empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    intersection / union
}

/// |query ∩ candidate| / |query|, or 0.0 when either side is empty.
pub fn query_overlap(query: &HashSet<String>, candidate: &HashSet<String>) -> f64 {
    if query.is_empty() || candidate.is_empty() {
        return 0.0;
    }
    query.intersection(candidate).count() as f64 / query.len() as f64
}

/// Jaccard similarity of two strings' token sets.
pub fn similarity(a: &str, b: &str) -> f64 {
    jaccard(&tokenize(a), &tokenize(b))
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch<'a> {
    pub candidate: &'a str,
    pub index: usize,
    pub score: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher {
    threshold: f64,
    basis: OverlapBasis,
}

impl FuzzyMatcher {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            basis: OverlapBasis::Union,
        }
    }

    pub fn with_basis(mut self, basis: OverlapBasis) -> Self {
        self.basis = basis;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn score(&self, query: &HashSet<String>, candidate: &HashSet<String>) -> f64 {
        match self.basis {
            OverlapBasis::Union => jaccard(query, candidate),
            OverlapBasis::Query => query_overlap(query, candidate),
        }
    }

    /// Best candidate scoring at least the threshold (and above zero).
    /// On equal scores the earlier candidate is kept.
    pub fn best_match<'a, I>(&self, query: &str, candidates: I) -> Option<FuzzyMatch<'a>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let query_tokens = tokenize(query);
        let mut best: Option<FuzzyMatch<'a>> = None;

        for (index, candidate) in candidates.into_iter().enumerate() {
            let score = self.score(&query_tokens, &tokenize(candidate));
            if score <= 0.0 || score < self.threshold {
                continue;
            }
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(FuzzyMatch {
                    candidate,
                    index,
                    score,
                });
            }
        }

        best
    }
}
