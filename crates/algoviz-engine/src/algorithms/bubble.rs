use super::{AlgoResult, Algorithm, AlgorithmKind};
use crate::context::RunContext;
use crate::error::Interrupt;
use crate::render::ColorTag;

const PSEUDOCODE: &[&str] = &[
    "bubbleSort(arr):",
    "  for i = 0 to n-2:",
    "    swapped = false",
    "    for j = 0 to n-i-2:",
    "      if arr[j] > arr[j+1]:",
    "        swap(arr[j], arr[j+1])",
    "        swapped = true",
    "    if not swapped: stop",
];

const EXPLANATIONS: &[&str] = &[
    "Sort by swapping adjacent values that are out of order.",
    "Each pass carries the largest remaining value to the end.",
    "Track whether this pass changed anything.",
    "Walk the unsorted part pair by pair.",
    "Is the pair in the wrong order?",
    "Swap the pair.",
    "Record that the array changed.",
    "A pass without swaps means the array is sorted.",
];

/// Bubble sort with early exit once a pass makes no swaps.
#[derive(Debug, Clone, Copy, Default)]
pub struct BubbleSort;

impl Algorithm for BubbleSort {
    fn name(&self) -> &str {
        "Bubble Sort"
    }

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Sort
    }

    fn pseudocode(&self) -> &'static [&'static str] {
        PSEUDOCODE
    }

    fn explanations(&self) -> &'static [&'static str] {
        EXPLANATIONS
    }

    fn run(
        &self,
        data: &mut [i64],
        _target: Option<i64>,
        ctx: &mut RunContext,
    ) -> Result<AlgoResult, Interrupt> {
        let n = data.len();
        ctx.show(data);
        ctx.status("Starting bubble sort");
        ctx.pseudocode(0);
        ctx.pause(800)?;

        // Slots at or above `settled` carry the Sorted tag.
        let mut settled = n;
        for i in 0..n.saturating_sub(1) {
            ctx.checkpoint()?;
            ctx.pseudocode(1);
            ctx.narrate(|| format!("Pass {}", i + 1));
            ctx.pause(400)?;
            ctx.pseudocode(2);
            let mut swapped = false;

            for j in 0..n - i - 1 {
                ctx.checkpoint()?;
                ctx.pseudocode(3);
                ctx.highlight(j, ColorTag::Comparing);
                ctx.highlight(j + 1, ColorTag::Comparing);
                ctx.narrate(|| format!("Compare {} and {}", data[j], data[j + 1]));
                ctx.pause(400)?;

                ctx.pseudocode(4);
                if ctx.compare(data[j], data[j + 1]).is_gt() {
                    ctx.pseudocode(5);
                    ctx.swap(data, j, j + 1);
                    ctx.show(data);
                    ctx.highlight(j, ColorTag::Shifting);
                    ctx.highlight(j + 1, ColorTag::Shifting);
                    ctx.narrate(|| format!("Swapped: {} moves right", data[j + 1]));
                    ctx.pause(500)?;
                    ctx.pseudocode(6);
                    swapped = true;
                }
                ctx.highlight(j, ColorTag::Default);
                ctx.highlight(j + 1, ColorTag::Default);
            }

            settled = n - i - 1;
            ctx.highlight(settled, ColorTag::Sorted);
            ctx.narrate(|| format!("{} has bubbled into place", data[settled]));
            ctx.pause(300)?;
            ctx.progress(i + 1, n - 1);

            if !swapped {
                ctx.pseudocode(7);
                ctx.status("No swaps in this pass, the rest is already sorted");
                ctx.pause(600)?;
                break;
            }
        }

        for i in (0..settled).rev() {
            ctx.highlight(i, ColorTag::Sorted);
            ctx.pause(50)?;
        }
        ctx.progress(1, 1);
        ctx.status("Bubble sort complete");
        Ok(AlgoResult::Sorted)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::render::VisEvent;

    #[test]
    fn sorts_with_duplicates() {
        let (data, _) = run_headless(&BubbleSort, &[3, 1, 3, 0], None);
        assert_eq!(data, vec![0, 1, 3, 3]);
    }

    #[test]
    fn sorted_input_exits_after_one_pass() {
        let (_, _, events) = run_visual(&BubbleSort, &[1, 2, 3, 4], None);
        let passes = events
            .iter()
            .filter(|e| matches!(e, VisEvent::Status { message } if message.starts_with("Pass")))
            .count();
        assert_eq!(passes, 1);
    }
}
