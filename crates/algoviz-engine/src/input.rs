//! Run requests and input validation.
//!
//! Everything here runs on the caller's thread before a worker exists, so a
//! rejected request never starts a run.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::algorithms::{Algorithm, AlgorithmId, AlgorithmKind};
use crate::error::{Error, Result};

/// Upper bound (exclusive) for generated values.
pub const RANDOM_VALUE_LIMIT: i64 = 100;

/// One requested algorithm run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub algorithm: AlgorithmId,
    pub values: Vec<i64>,
    #[serde(default)]
    pub target: Option<i64>,
    #[serde(default = "default_visualize")]
    pub visualize: bool,
}

fn default_visualize() -> bool {
    true
}

impl RunRequest {
    /// A visualized run of `algorithm` over `values`.
    pub fn new(algorithm: AlgorithmId, values: Vec<i64>) -> Self {
        Self {
            algorithm,
            values,
            target: None,
            visualize: true,
        }
    }

    /// Set the search target.
    pub fn with_target(mut self, target: i64) -> Self {
        self.target = Some(target);
        self
    }

    /// Toggle visualization.
    pub fn visualize(mut self, visualize: bool) -> Self {
        self.visualize = visualize;
        self
    }
}

/// Parse the array size field.
pub fn parse_size(text: &str, max_len: usize) -> Result<usize> {
    let size: usize = text
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("size {:?} is not a whole number", text.trim())))?;
    check_len(size, max_len)?;
    Ok(size)
}

/// Parse whitespace-separated elements and check them against the size field.
pub fn parse_values(size_text: &str, elements_text: &str, max_len: usize) -> Result<Vec<i64>> {
    let size = parse_size(size_text, max_len)?;
    let values = elements_text
        .split_whitespace()
        .map(|token| {
            token
                .parse::<i64>()
                .map_err(|_| Error::InvalidInput(format!("element {token:?} is not an integer")))
        })
        .collect::<Result<Vec<_>>>()?;
    if values.len() != size {
        return Err(Error::InvalidInput(format!(
            "expected {size} elements, got {}",
            values.len()
        )));
    }
    Ok(values)
}

/// Parse the search target field.
pub fn parse_target(text: &str) -> Result<i64> {
    text.trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("target {:?} is not an integer", text.trim())))
}

/// `size` values drawn uniformly from `0..RANDOM_VALUE_LIMIT`.
pub fn random_values<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Vec<i64> {
    (0..size).map(|_| rng.gen_range(0..RANDOM_VALUE_LIMIT)).collect()
}

/// Check a request against length limits, target presence and the
/// algorithm's own precondition.
pub fn validate(
    algorithm: &dyn Algorithm,
    values: &[i64],
    target: Option<i64>,
    max_len: usize,
) -> Result<()> {
    check_len(values.len(), max_len)?;
    if algorithm.kind() == AlgorithmKind::Search && target.is_none() {
        return Err(Error::MissingTarget(algorithm.name().to_string()));
    }
    algorithm
        .validate(values)
        .map_err(|reason| Error::Precondition {
            algorithm: algorithm.name().to_string(),
            reason,
        })
}

fn check_len(len: usize, max_len: usize) -> Result<()> {
    if len == 0 {
        return Err(Error::InvalidInput("array must hold at least one element".into()));
    }
    if len > max_len {
        return Err(Error::InvalidInput(format!(
            "array size {len} exceeds the limit of {max_len}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn parses_matching_elements() {
        let values = parse_values("4", "5 3  8 -1", 100).unwrap();
        assert_eq!(values, vec![5, 3, 8, -1]);
    }

    #[test]
    fn rejects_bad_sizes() {
        assert!(matches!(parse_size("0", 10), Err(Error::InvalidInput(_))));
        assert!(matches!(parse_size("11", 10), Err(Error::InvalidInput(_))));
        assert!(matches!(parse_size("-3", 10), Err(Error::InvalidInput(_))));
        assert!(matches!(parse_size("three", 10), Err(Error::InvalidInput(_))));
        assert_eq!(parse_size(" 10 ", 10), Ok(10));
    }

    #[test]
    fn rejects_count_mismatch_and_garbage() {
        assert!(parse_values("3", "1 2", 10).is_err());
        assert!(parse_values("2", "1 2 3", 10).is_err());
        assert!(parse_values("2", "1 x", 10).is_err());
        assert!(parse_values("1", "1.5", 10).is_err());
    }

    #[test]
    fn parses_target() {
        assert_eq!(parse_target(" -7 "), Ok(-7));
        assert!(parse_target("").is_err());
    }

    #[test]
    fn random_values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let values = random_values(200, &mut rng);
        assert_eq!(values.len(), 200);
        assert!(values.iter().all(|v| (0..RANDOM_VALUE_LIMIT).contains(v)));
    }

    #[test]
    fn search_requires_target() {
        let strategy = AlgorithmId::LinearSearch.strategy();
        assert_eq!(
            validate(strategy.as_ref(), &[1, 2], None, 10),
            Err(Error::MissingTarget("Linear Search".into()))
        );
        assert!(validate(strategy.as_ref(), &[1, 2], Some(2), 10).is_ok());
    }

    #[test]
    fn binary_search_precondition_is_a_validation_error() {
        let strategy = AlgorithmId::BinarySearch.strategy();
        let err = validate(strategy.as_ref(), &[3, 1, 2], Some(1), 10).unwrap_err();
        assert!(matches!(err, Error::Precondition { .. }));
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let request: RunRequest =
            serde_json::from_str(r#"{"algorithm":"merge-sort","values":[3,1]}"#).unwrap();
        assert_eq!(request, RunRequest::new(AlgorithmId::MergeSort, vec![3, 1]));
    }
}
