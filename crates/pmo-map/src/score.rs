//! Similarity scoring between field names.
//!
//! Uses Jaro-Winkler similarity on normalized names. Two forms are compared
//! (separator-free and sorted tokens) and the better one wins, so
//! `sampleID`, `sample_id` and `ID sample` all land close together.

use rapidfuzz::distance::jaro_winkler;
use serde::Serialize;

use crate::utils::{compact_text, sorted_tokens};

/// Highest score a [`Scorer`] may return.
pub const MAX_SCORE: f64 = 100.0;

/// Similarity between two strings on a 0-100 scale.
///
/// Implementations must be deterministic and should be symmetric.
pub trait Scorer {
    fn score(&self, left: &str, right: &str) -> f64;
}

/// Default scorer: Jaro-Winkler over normalized field names.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyScorer;

impl Scorer for FuzzyScorer {
    fn score(&self, left: &str, right: &str) -> f64 {
        let left_compact = compact_text(left);
        let right_compact = compact_text(right);
        if left_compact.is_empty() || right_compact.is_empty() {
            return 0.0;
        }
        if left_compact == right_compact {
            return MAX_SCORE;
        }

        let compact = jaro_winkler::similarity(left_compact.chars(), right_compact.chars());
        let tokens = jaro_winkler::similarity(sorted_tokens(left).chars(), sorted_tokens(right).chars());

        (compact.max(tokens) * MAX_SCORE).clamp(0.0, MAX_SCORE)
    }
}

impl<S: Scorer + ?Sized> Scorer for &S {
    fn score(&self, left: &str, right: &str) -> f64 {
        (**self).score(left, right)
    }
}

/// Best source candidate found for one target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate<'a> {
    /// Position of the candidate in the pool it was drawn from.
    #[serde(skip)]
    pub index: usize,
    pub source: &'a str,
    /// The target name or synonym that produced the score.
    pub matched_on: &'a str,
    pub score: f64,
}

/// Highest-scoring entry of `pool` for `needle`.
///
/// Ties keep the earliest pool entry. Returns `None` only for an empty pool.
pub fn best_candidate<'a, S: Scorer + ?Sized>(
    scorer: &S,
    needle: &'a str,
    pool: &[&'a str],
) -> Option<Candidate<'a>> {
    let mut best: Option<Candidate<'a>> = None;
    for (index, source) in pool.iter().copied().enumerate() {
        let score = scorer.score(needle, source);
        let better = match &best {
            None => true,
            Some(current) => score > current.score,
        };
        if better {
            best = Some(Candidate {
                index,
                source,
                matched_on: needle,
                score,
            });
        }
    }
    best
}

/// Best candidate across a target's name and its synonyms.
///
/// Names are tried in order; a later name replaces the running best only with
/// a strictly higher score, so ties favour the primary name.
pub fn best_candidate_for_names<'a, S, I>(
    scorer: &S,
    names: I,
    pool: &[&'a str],
) -> Option<Candidate<'a>>
where
    S: Scorer + ?Sized,
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<Candidate<'a>> = None;
    for name in names {
        let Some(candidate) = best_candidate(scorer, name, pool) else {
            continue;
        };
        let better = match &best {
            None => true,
            Some(current) => candidate.score > current.score,
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_after_normalization_scores_max() {
        let scorer = FuzzyScorer;
        assert_eq!(scorer.score("sampleID", "sample_id"), MAX_SCORE);
        assert_eq!(scorer.score("Collection Date", "collection_date"), MAX_SCORE);
    }

    #[test]
    fn unrelated_names_score_low() {
        let scorer = FuzzyScorer;
        assert!(scorer.score("target1", "x") < 60.0);
        assert_eq!(scorer.score("target1", ""), 0.0);
        assert_eq!(scorer.score("--", "sample"), 0.0);
    }

    #[test]
    fn score_is_symmetric_and_bounded() {
        let scorer = FuzzyScorer;
        let pairs = [("patientName", "patient_id"), ("reads", "read_count"), ("a", "b")];
        for (left, right) in pairs {
            let forward = scorer.score(left, right);
            assert_eq!(forward, scorer.score(right, left));
            assert!((0.0..=MAX_SCORE).contains(&forward));
        }
    }

    #[test]
    fn word_order_does_not_matter() {
        let scorer = FuzzyScorer;
        assert_eq!(scorer.score("date_collection", "collection_date"), MAX_SCORE);
    }

    #[test]
    fn ties_keep_first_pool_entry() {
        let pool = ["alpha", "alpha", "beta"];
        let best = best_candidate(&FuzzyScorer, "alpha", &pool).expect("candidate");
        assert_eq!(best.index, 0);
        assert_eq!(best.score, MAX_SCORE);
        assert!(best_candidate(&FuzzyScorer, "alpha", &[]).is_none());
    }

    #[test]
    fn synonym_wins_only_when_strictly_better() {
        let pool = ["subject"];
        let best =
            best_candidate_for_names(&FuzzyScorer, ["specimen_name", "subject"], &pool).expect("candidate");
        assert_eq!(best.matched_on, "subject");
        assert_eq!(best.score, MAX_SCORE);

        let pool = ["sample"];
        let best = best_candidate_for_names(&FuzzyScorer, ["sample", "sample"], &pool).expect("candidate");
        assert_eq!(best.matched_on, "sample");
    }
}
