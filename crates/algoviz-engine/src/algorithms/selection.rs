use super::{AlgoResult, Algorithm, AlgorithmKind};
use crate::context::RunContext;
use crate::error::Interrupt;
use crate::render::ColorTag;

const PSEUDOCODE: &[&str] = &[
    "selectionSort(arr):",
    "  for i = 0 to n-2:",
    "    min = i",
    "    for j = i+1 to n-1:",
    "      if arr[j] < arr[min]:",
    "        min = j",
    "    swap(arr[i], arr[min])",
];

const EXPLANATIONS: &[&str] = &[
    "Sort by repeatedly selecting the smallest remaining value.",
    "Each pass fixes one position, from the left.",
    "Assume the first unsorted value is the minimum.",
    "Scan the rest of the unsorted part.",
    "Is this value smaller than the current minimum?",
    "Remember the new minimum.",
    "Move the minimum into its final position.",
];

/// Repeatedly selects the minimum of the unsorted suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionSort;

impl Algorithm for SelectionSort {
    fn name(&self) -> &str {
        "Selection Sort"
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
        ctx.status("Starting selection sort");
        ctx.pseudocode(0);
        ctx.pause(800)?;

        for i in 0..n.saturating_sub(1) {
            ctx.checkpoint()?;
            ctx.pseudocode(1);
            ctx.highlight(i, ColorTag::Selected);
            ctx.narrate(|| format!("Pass {i}: find the smallest element from index {i} on"));
            ctx.pause(500)?;

            let mut min = i;
            ctx.pseudocode(2);
            ctx.highlight(min, ColorTag::Minimum);
            ctx.pause(500)?;

            for j in i + 1..n {
                ctx.checkpoint()?;
                ctx.pseudocode(3);
                ctx.highlight(j, ColorTag::Comparing);
                ctx.narrate(|| {
                    format!(
                        "Compare arr[{j}] = {} with current minimum arr[{min}] = {}",
                        data[j], data[min]
                    )
                });
                ctx.pause(300)?;

                if ctx.compare(data[j], data[min]).is_lt() {
                    ctx.pseudocode(4);
                    ctx.highlight(min, ColorTag::Default);
                    ctx.narrate(|| format!("New minimum {} at index {j}", data[j]));
                    ctx.pause(100)?;
                    min = j;
                    ctx.pseudocode(5);
                    ctx.highlight(min, ColorTag::Minimum);
                    ctx.pause(300)?;
                } else {
                    ctx.highlight(j, ColorTag::Default);
                    ctx.pause(100)?;
                }
            }

            ctx.pseudocode(6);
            ctx.narrate(|| format!("Swap index {i} with the minimum at index {min}"));
            ctx.pause(400)?;
            if min != i {
                ctx.swap(data, i, min);
                ctx.show(data);
                ctx.highlight(min, ColorTag::Default);
            }
            ctx.highlight(i, ColorTag::Sorted);
            ctx.narrate(|| format!("Index {i} holds its final value"));
            ctx.pause(600)?;
            ctx.progress(i + 1, n - 1);
        }

        // The last slot is in place once everything before it is.
        if n > 0 {
            ctx.highlight(n - 1, ColorTag::Sorted);
        }
        ctx.status("Selection sort complete");
        ctx.pause(500)?;
        Ok(AlgoResult::Sorted)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::render::VisEvent;

    #[test]
    fn sorts_reverse_input() {
        let (data, result) = run_headless(&SelectionSort, &[4, 3, 2, 1], None);
        assert_eq!(data, vec![1, 2, 3, 4]);
        assert_eq!(result, AlgoResult::Sorted);
    }

    #[test]
    fn narrates_swaps() {
        let (_, _, events) = run_visual(&SelectionSort, &[2, 1], None);
        assert!(events.iter().any(|e| matches!(
            e,
            VisEvent::Status { message } if message.contains("Swap index 0")
        )));
        assert!(events.contains(&VisEvent::ValuesChanged { values: vec![1, 2] }));
    }
}
