use super::{AlgoResult, Algorithm, AlgorithmKind};
use crate::context::RunContext;
use crate::error::Interrupt;
use crate::render::ColorTag;

const PSEUDOCODE: &[&str] = &[
    "insertionSort(arr):",
    "  for i = 1 to n-1:",
    "    key = arr[i]",
    "    j = i - 1",
    "    while j >= 0 and arr[j] > key:",
    "      arr[j+1] = arr[j]",
    "      j = j - 1",
    "    arr[j+1] = key",
];

const EXPLANATIONS: &[&str] = &[
    "Grow a sorted prefix one value at a time.",
    "The prefix starts with the first value.",
    "Take the next value as the key.",
    "Start comparing with the last value of the prefix.",
    "Larger values in the prefix must move right.",
    "Shift the larger value one slot right.",
    "Step left to the next comparison.",
    "Drop the key into the gap it belongs in.",
];

/// Grows a sorted prefix by sinking each new key into place.
///
/// The key moves by adjacent swaps, so the data is a permutation of the
/// input at every step boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertionSort;

impl Algorithm for InsertionSort {
    fn name(&self) -> &str {
        "Insertion Sort"
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
        ctx.status("Starting insertion sort");
        ctx.pseudocode(0);
        ctx.pause(800)?;

        if n > 0 {
            ctx.highlight(0, ColorTag::Region);
            ctx.narrate(|| format!("{} on its own is already in order", data[0]));
            ctx.pause(500)?;
        }

        for i in 1..n {
            ctx.checkpoint()?;
            let key = data[i];
            ctx.pseudocode(1);
            ctx.highlight(i, ColorTag::Selected);
            ctx.pause(400)?;
            ctx.pseudocode(2);
            ctx.narrate(|| format!("Key = {key} taken from index {i}"));
            ctx.pause(600)?;
            ctx.pseudocode(3);
            ctx.pause(300)?;

            let mut j = i;
            while j > 0 {
                ctx.checkpoint()?;
                ctx.pseudocode(4);
                ctx.highlight(j - 1, ColorTag::Comparing);
                ctx.narrate(|| format!("Compare {} with key {key}", data[j - 1]));
                ctx.pause(500)?;
                if !ctx.compare(data[j - 1], key).is_gt() {
                    ctx.highlight(j - 1, ColorTag::Region);
                    break;
                }

                ctx.pseudocode(5);
                ctx.swap(data, j - 1, j);
                ctx.show(data);
                ctx.highlight(j, ColorTag::Shifting);
                ctx.highlight(j - 1, ColorTag::Selected);
                ctx.narrate(|| format!("{} shifts right to index {j}", data[j]));
                ctx.pause(400)?;
                ctx.highlight(j, ColorTag::Region);
                ctx.pseudocode(6);
                j -= 1;
            }

            ctx.pseudocode(7);
            ctx.highlight(j, ColorTag::Inserted);
            ctx.narrate(|| format!("Key {key} inserted at index {j}"));
            ctx.pause(700)?;
            ctx.highlight_range(0..=i, ColorTag::Region);
            ctx.progress(i, n - 1);
        }

        ctx.status("Insertion sort complete");
        for i in 0..n {
            ctx.highlight(i, ColorTag::Sorted);
            ctx.pause(50)?;
        }
        Ok(AlgoResult::Sorted)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::render::VisEvent;

    #[test]
    fn sorts_small_input() {
        let (data, result) = run_headless(&InsertionSort, &[5, 3, 8, 1], None);
        assert_eq!(data, vec![1, 3, 5, 8]);
        assert_eq!(result, AlgoResult::Sorted);
    }

    #[test]
    fn every_boundary_holds_a_permutation() {
        let input = [5, 3, 8, 1];
        let (_, _, events) = run_visual(&InsertionSort, &input, None);
        let mut expected = input.to_vec();
        expected.sort_unstable();
        for event in &events {
            if let VisEvent::ValuesChanged { values } = event {
                let mut seen = values.clone();
                seen.sort_unstable();
                assert_eq!(seen, expected);
            }
        }
    }

    #[test]
    fn already_sorted_input_needs_no_shifts() {
        let (_, _, events) = run_visual(&InsertionSort, &[1, 2, 3], None);
        let updates = events
            .iter()
            .filter(|e| matches!(e, VisEvent::ValuesChanged { .. }))
            .count();
        assert_eq!(updates, 1);
    }
}
