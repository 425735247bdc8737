//! Sorting and searching strategies driven by a [`RunContext`].
//!
//! Every strategy mutates its data only through complete operations
//! (swaps, or an atomic copy-back from a scratch buffer) between step
//! boundaries, so a cancelled run always leaves a permutation of its input.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::RunContext;
use crate::error::{Error, Interrupt};

mod binary_search;
mod bubble;
mod counting;
mod heap;
mod insertion;
mod linear_search;
mod merge;
mod quick;
mod radix;
mod selection;

pub use binary_search::BinarySearch;
pub use bubble::BubbleSort;
pub use counting::{CountingSort, MAX_COUNTING_RANGE};
pub use heap::HeapSort;
pub use insertion::InsertionSort;
pub use linear_search::LinearSearch;
pub use merge::MergeSort;
pub use quick::QuickSort;
pub use radix::RadixSort;
pub use selection::SelectionSort;

/// What a finished algorithm produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlgoResult {
    /// The data is sorted in place
    Sorted,
    /// The target sits at `index`
    Found { index: usize },
    /// The target is absent
    NotFound,
}

impl AlgoResult {
    /// Index found by a search, if any.
    pub fn index(&self) -> Option<usize> {
        match self {
            AlgoResult::Found { index } => Some(*index),
            _ => None,
        }
    }
}

/// Sorting or searching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    Sort,
    Search,
}

/// A pluggable strategy run on the worker thread.
pub trait Algorithm: Send + Sync {
    /// Display name.
    fn name(&self) -> &str;

    /// Sorting or searching; searches require a target.
    fn kind(&self) -> AlgorithmKind;

    /// Pseudocode lines referenced by [`RunContext::pseudocode`].
    fn pseudocode(&self) -> &'static [&'static str] {
        &[]
    }

    /// Plain-language note for each pseudocode line, index for index.
    fn explanations(&self) -> &'static [&'static str] {
        &[]
    }

    /// Reject input the algorithm cannot handle. Runs before any thread starts.
    fn validate(&self, _values: &[i64]) -> Result<(), String> {
        Ok(())
    }

    /// Run to completion or until interrupted.
    fn run(
        &self,
        data: &mut [i64],
        target: Option<i64>,
        ctx: &mut RunContext,
    ) -> Result<AlgoResult, Interrupt>;
}

/// Built-in algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmId {
    SelectionSort,
    InsertionSort,
    BubbleSort,
    QuickSort,
    MergeSort,
    HeapSort,
    RadixSort,
    CountingSort,
    LinearSearch,
    BinarySearch,
}

impl AlgorithmId {
    /// Every built-in algorithm, in menu order.
    pub const ALL: [AlgorithmId; 10] = [
        AlgorithmId::SelectionSort,
        AlgorithmId::InsertionSort,
        AlgorithmId::BubbleSort,
        AlgorithmId::QuickSort,
        AlgorithmId::MergeSort,
        AlgorithmId::HeapSort,
        AlgorithmId::RadixSort,
        AlgorithmId::CountingSort,
        AlgorithmId::LinearSearch,
        AlgorithmId::BinarySearch,
    ];

    /// Display name, e.g. "Insertion Sort".
    pub fn name(&self) -> &'static str {
        match self {
            AlgorithmId::SelectionSort => "Selection Sort",
            AlgorithmId::InsertionSort => "Insertion Sort",
            AlgorithmId::BubbleSort => "Bubble Sort",
            AlgorithmId::QuickSort => "Quick Sort",
            AlgorithmId::MergeSort => "Merge Sort",
            AlgorithmId::HeapSort => "Heap Sort",
            AlgorithmId::RadixSort => "Radix Sort",
            AlgorithmId::CountingSort => "Counting Sort",
            AlgorithmId::LinearSearch => "Linear Search",
            AlgorithmId::BinarySearch => "Binary Search",
        }
    }

    /// Kebab-case identifier, e.g. "insertion-sort".
    pub fn slug(&self) -> &'static str {
        match self {
            AlgorithmId::SelectionSort => "selection-sort",
            AlgorithmId::InsertionSort => "insertion-sort",
            AlgorithmId::BubbleSort => "bubble-sort",
            AlgorithmId::QuickSort => "quick-sort",
            AlgorithmId::MergeSort => "merge-sort",
            AlgorithmId::HeapSort => "heap-sort",
            AlgorithmId::RadixSort => "radix-sort",
            AlgorithmId::CountingSort => "counting-sort",
            AlgorithmId::LinearSearch => "linear-search",
            AlgorithmId::BinarySearch => "binary-search",
        }
    }

    /// Sorting or searching.
    pub fn kind(&self) -> AlgorithmKind {
        match self {
            AlgorithmId::LinearSearch | AlgorithmId::BinarySearch => AlgorithmKind::Search,
            _ => AlgorithmKind::Sort,
        }
    }

    /// The strategy implementing this algorithm.
    pub fn strategy(&self) -> Arc<dyn Algorithm> {
        match self {
            AlgorithmId::SelectionSort => Arc::new(SelectionSort),
            AlgorithmId::InsertionSort => Arc::new(InsertionSort),
            AlgorithmId::BubbleSort => Arc::new(BubbleSort),
            AlgorithmId::QuickSort => Arc::new(QuickSort),
            AlgorithmId::MergeSort => Arc::new(MergeSort),
            AlgorithmId::HeapSort => Arc::new(HeapSort),
            AlgorithmId::RadixSort => Arc::new(RadixSort),
            AlgorithmId::CountingSort => Arc::new(CountingSort),
            AlgorithmId::LinearSearch => Arc::new(LinearSearch),
            AlgorithmId::BinarySearch => Arc::new(BinarySearch),
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmId {
    type Err = Error;

    /// Accepts "insertion-sort", "insertion_sort" or "Insertion Sort".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '_' => '-',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        AlgorithmId::ALL
            .into_iter()
            .find(|id| id.slug() == wanted)
            .ok_or_else(|| Error::UnknownAlgorithm(s.to_string()))
    }
}

/// Whether `values` is in non-decreasing order.
pub fn is_sorted(values: &[i64]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::render::{ColorTag, VisEvent};

    const SAMPLES: &[&[i64]] = &[
        &[5, 3, 8, 1],
        &[1],
        &[2, 2, 2],
        &[9, 8, 7, 6, 5, 4, 3, 2, 1, 0],
        &[0, 1, 2, 3, 4, 5],
        &[42, 7, 99, 7, 13, 0, 56, 21, 88, 3, 64],
    ];

    #[test]
    fn every_pseudocode_line_is_explained() {
        for id in AlgorithmId::ALL {
            let strategy = id.strategy();
            assert!(!strategy.pseudocode().is_empty(), "{id}");
            assert_eq!(
                strategy.explanations().len(),
                strategy.pseudocode().len(),
                "{id}"
            );
        }
    }

    #[test]
    fn every_sort_sorts() {
        for id in AlgorithmId::ALL
            .into_iter()
            .filter(|id| id.kind() == AlgorithmKind::Sort)
        {
            let strategy = id.strategy();
            for sample in SAMPLES {
                let (data, result) = run_headless(strategy.as_ref(), sample, None);
                let mut expected = sample.to_vec();
                expected.sort_unstable();
                assert_eq!(data, expected, "{id} on {sample:?}");
                assert_eq!(result, AlgoResult::Sorted);
            }
        }
    }

    #[test]
    fn every_sort_marks_each_slot_sorted_once() {
        for id in AlgorithmId::ALL
            .into_iter()
            .filter(|id| id.kind() == AlgorithmKind::Sort)
        {
            let strategy = id.strategy();
            let sample = [42, 7, 99, 7, 13, 0, 56];
            let (_, _, events) = run_visual(strategy.as_ref(), &sample, None);
            let mut marked: Vec<usize> = events
                .iter()
                .filter_map(|e| match e {
                    VisEvent::Highlight {
                        index,
                        tag: ColorTag::Sorted,
                    } => Some(*index),
                    _ => None,
                })
                .collect();
            marked.sort_unstable();
            assert_eq!(marked, (0..sample.len()).collect::<Vec<_>>(), "{id}");
        }
    }

    #[test]
    fn ids_parse_from_names_and_slugs() {
        for id in AlgorithmId::ALL {
            assert_eq!(id.name().parse::<AlgorithmId>(), Ok(id));
            assert_eq!(id.slug().parse::<AlgorithmId>(), Ok(id));
        }
        assert_eq!("binary_search".parse::<AlgorithmId>(), Ok(AlgorithmId::BinarySearch));
        assert!(matches!(
            "bogo sort".parse::<AlgorithmId>(),
            Err(Error::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn ids_serialize_as_slugs() {
        let json = serde_json::to_string(&AlgorithmId::QuickSort).unwrap();
        assert_eq!(json, "\"quick-sort\"");
    }

    #[test]
    fn strategies_report_their_id() {
        for id in AlgorithmId::ALL {
            let strategy = id.strategy();
            assert_eq!(strategy.name(), id.name());
            assert_eq!(strategy.kind(), id.kind());
            assert!(!strategy.pseudocode().is_empty());
        }
    }

    #[test]
    fn result_serialization() {
        let json = serde_json::to_string(&AlgoResult::Found { index: 2 }).unwrap();
        assert_eq!(json, r#"{"kind":"found","index":2}"#);
        assert_eq!(AlgoResult::Found { index: 2 }.index(), Some(2));
        assert_eq!(AlgoResult::NotFound.index(), None);
    }

    #[test]
    fn sortedness_check() {
        assert!(is_sorted(&[]));
        assert!(is_sorted(&[1, 1, 2]));
        assert!(!is_sorted(&[2, 1]));
    }
}
