//! Collector that folds a full result set into one combined artifact.
//!
//! Results arrive in completion order; the collector orders them by chunk
//! index and concatenates payloads with a stage-specific joiner. The output
//! is a pure function of the result set — completion order never matters.

use crate::dispatch::UnitResult;
use crate::error::{PolyscribeError, Result};
use std::collections::BTreeMap;

/// Join convention between chunk payloads, per pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joiner {
    /// Single space — transcribed media chunks.
    Space,
    /// Blank-line paragraph break — reformatted text chunks.
    Paragraph,
    /// Newline — translated chunks.
    Line,
}

impl Joiner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Joiner::Space => " ",
            Joiner::Paragraph => "\n\n",
            Joiner::Line => "\n",
        }
    }
}

/// Combines a full result set into one artifact.
///
/// Fails if the result index set is not exactly `{0..N-1}` — a missing or
/// duplicate index means the dispatcher contract was violated, which is
/// fatal to the job. An empty result set combines to an empty artifact.
pub fn combine(results: &[UnitResult], joiner: Joiner) -> Result<String> {
    let mut ordered: BTreeMap<usize, &str> = BTreeMap::new();

    for result in results {
        if ordered.insert(result.index, &result.payload).is_some() {
            return Err(PolyscribeError::IncompleteResults {
                message: format!("duplicate result for chunk {}", result.index),
            });
        }
    }

    for (expected, &actual) in ordered.keys().enumerate() {
        if actual != expected {
            return Err(PolyscribeError::IncompleteResults {
                message: format!(
                    "missing result for chunk {expected} ({} results)",
                    results.len()
                ),
            });
        }
    }

    Ok(ordered
        .values()
        .copied()
        .collect::<Vec<_>>()
        .join(joiner.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::UnitResult;

    fn success(index: usize, payload: &str) -> UnitResult {
        UnitResult::success(index, payload.to_string())
    }

    #[test]
    fn empty_results_combine_to_empty_string() {
        assert_eq!(combine(&[], Joiner::Space).unwrap(), "");
    }

    #[test]
    fn single_result_is_its_payload() {
        let results = vec![success(0, "hello world")];
        assert_eq!(combine(&results, Joiner::Space).unwrap(), "hello world");
    }

    #[test]
    fn results_join_in_index_order() {
        let results = vec![success(0, "a"), success(1, "b"), success(2, "c")];
        assert_eq!(combine(&results, Joiner::Space).unwrap(), "a b c");
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let in_order = vec![success(0, "a"), success(1, "b"), success(2, "c")];
        let reordered = vec![success(2, "c"), success(0, "a"), success(1, "b")];
        let reversed = vec![success(2, "c"), success(1, "b"), success(0, "a")];

        let expected = combine(&in_order, Joiner::Line).unwrap();
        assert_eq!(combine(&reordered, Joiner::Line).unwrap(), expected);
        assert_eq!(combine(&reversed, Joiner::Line).unwrap(), expected);
    }

    #[test]
    fn joiner_conventions() {
        let results = vec![success(0, "one"), success(1, "two")];
        assert_eq!(combine(&results, Joiner::Space).unwrap(), "one two");
        assert_eq!(combine(&results, Joiner::Paragraph).unwrap(), "one\n\ntwo");
        assert_eq!(combine(&results, Joiner::Line).unwrap(), "one\ntwo");
    }

    #[test]
    fn missing_index_is_an_error() {
        let results = vec![success(0, "a"), success(2, "c")];
        let error = combine(&results, Joiner::Space).unwrap_err();
        match error {
            PolyscribeError::IncompleteResults { message } => {
                assert!(message.contains("missing result for chunk 1"));
            }
            other => panic!("Expected IncompleteResults, got {:?}", other),
        }
    }

    #[test]
    fn index_set_not_starting_at_zero_is_an_error() {
        let results = vec![success(1, "b"), success(2, "c")];
        assert!(matches!(
            combine(&results, Joiner::Space),
            Err(PolyscribeError::IncompleteResults { .. })
        ));
    }

    #[test]
    fn duplicate_index_is_an_error() {
        let results = vec![success(0, "a"), success(0, "again"), success(1, "b")];
        let error = combine(&results, Joiner::Space).unwrap_err();
        match error {
            PolyscribeError::IncompleteResults { message } => {
                assert!(message.contains("duplicate result for chunk 0"));
            }
            other => panic!("Expected IncompleteResults, got {:?}", other),
        }
    }

    #[test]
    fn fallback_payloads_fold_in_like_any_other() {
        let results = vec![
            success(0, "transformed"),
            UnitResult::fallback(1, "original text".to_string()),
            success(2, "also transformed"),
        ];
        assert_eq!(
            combine(&results, Joiner::Space).unwrap(),
            "transformed original text also transformed"
        );
    }

    #[test]
    fn empty_payloads_are_preserved_not_skipped() {
        // A degraded media unit contributes empty text; the fold does not
        // inspect content, so the joiner still separates its neighbors.
        let results = vec![
            success(0, "before"),
            UnitResult::fallback(1, String::new()),
            success(2, "after"),
        ];
        assert_eq!(combine(&results, Joiner::Space).unwrap(), "before  after");
    }
}
