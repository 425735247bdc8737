use std::cmp::Ordering;

use super::{is_sorted, AlgoResult, Algorithm, AlgorithmKind};
use crate::context::RunContext;
use crate::error::Interrupt;
use crate::render::ColorTag;

const PSEUDOCODE: &[&str] = &[
    "binarySearch(arr, target):",
    "  low = 0, high = n-1",
    "  while low <= high:",
    "    mid = low + (high - low) / 2",
    "    if arr[mid] == target:",
    "      return mid",
    "    else if arr[mid] < target:",
    "      low = mid + 1",
    "    else:",
    "      high = mid - 1",
    "  return not found",
];

const EXPLANATIONS: &[&str] = &[
    "Find the target in a sorted array by halving the search range.",
    "The whole array is the first range.",
    "Continue while the range is not empty.",
    "Look at the middle of the range.",
    "Does the middle value match the target?",
    "Report where it was found.",
    "Is the middle value too small?",
    "Discard the left half.",
    "Otherwise the middle value is too large.",
    "Discard the right half.",
    "The range is empty, so the target is absent.",
];

/// Halves a sorted search interval each iteration.
///
/// Unsorted input is rejected by [`Algorithm::validate`]; it is never
/// sorted on the caller's behalf.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinarySearch;

impl Algorithm for BinarySearch {
    fn name(&self) -> &str {
        "Binary Search"
    }

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Search
    }

    fn pseudocode(&self) -> &'static [&'static str] {
        PSEUDOCODE
    }

    fn explanations(&self) -> &'static [&'static str] {
        EXPLANATIONS
    }

    fn validate(&self, values: &[i64]) -> Result<(), String> {
        if is_sorted(values) {
            Ok(())
        } else {
            Err("input must be sorted in ascending order".to_string())
        }
    }

    fn run(
        &self,
        data: &mut [i64],
        target: Option<i64>,
        ctx: &mut RunContext,
    ) -> Result<AlgoResult, Interrupt> {
        let Some(target) = target else {
            return Ok(AlgoResult::NotFound);
        };
        let n = data.len();
        ctx.show(data);
        ctx.narrate(|| format!("Searching for {target} by halving the interval"));
        ctx.pseudocode(0);
        ctx.pause(1000)?;

        // Interval is [low, high).
        let (mut low, mut high) = (0, n);
        let mut iterations = 0usize;
        let budget = usize::BITS as usize - n.leading_zeros() as usize;
        ctx.pseudocode(1);
        show_interval(ctx, low, high);
        ctx.pause(800)?;

        while low < high {
            ctx.checkpoint()?;
            iterations += 1;
            ctx.pseudocode(2);
            let mid = low + (high - low) / 2;
            ctx.pseudocode(3);
            ctx.highlight(mid, ColorTag::Selected);
            ctx.narrate(|| {
                format!(
                    "Iteration {iterations}: middle of [{low}..{}] is index {mid} ({})",
                    high - 1,
                    data[mid]
                )
            });
            ctx.pause(800)?;

            ctx.pseudocode(4);
            match ctx.compare(data[mid], target) {
                Ordering::Equal => {
                    ctx.pseudocode(5);
                    ctx.highlight(mid, ColorTag::Found);
                    ctx.narrate(|| {
                        format!("Found {target} at index {mid} in {iterations} iteration(s)")
                    });
                    ctx.progress(1, 1);
                    ctx.pause(1000)?;
                    return Ok(AlgoResult::Found { index: mid });
                }
                Ordering::Less => {
                    ctx.pseudocode(6);
                    ctx.narrate(|| format!("{} < {target}, discard the left half", data[mid]));
                    ctx.highlight_range(low..=mid, ColorTag::Eliminated);
                    ctx.pause(600)?;
                    ctx.pseudocode(7);
                    low = mid + 1;
                }
                Ordering::Greater => {
                    ctx.pseudocode(8);
                    ctx.narrate(|| format!("{} > {target}, discard the right half", data[mid]));
                    ctx.highlight_range(mid..=high - 1, ColorTag::Eliminated);
                    ctx.pause(600)?;
                    ctx.pseudocode(9);
                    high = mid;
                }
            }
            show_interval(ctx, low, high);
            ctx.progress(iterations, budget.max(1));
            ctx.pause(500)?;
        }

        ctx.pseudocode(10);
        ctx.highlight_range(0..=n.saturating_sub(1), ColorTag::NotFound);
        ctx.narrate(|| format!("{target} is not present ({iterations} iteration(s))"));
        ctx.progress(1, 1);
        ctx.pause(1000)?;
        Ok(AlgoResult::NotFound)
    }
}

fn show_interval(ctx: &mut RunContext, low: usize, high: usize) {
    if low >= high {
        return;
    }
    ctx.highlight_range(low..=high - 1, ColorTag::Region);
    ctx.highlight(low, ColorTag::Bound);
    ctx.highlight(high - 1, ColorTag::Bound);
}
