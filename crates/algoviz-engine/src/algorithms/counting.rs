use super::{AlgoResult, Algorithm, AlgorithmKind};
use crate::context::RunContext;
use crate::error::Interrupt;
use crate::render::ColorTag;

/// Widest `max - min + 1` counting sort accepts.
pub const MAX_COUNTING_RANGE: u64 = 100_000;

const PSEUDOCODE: &[&str] = &[
    "countingSort(arr):",
    "  min, max = range of arr",
    "  count[0..max-min] = 0",
    "  for each x in arr: count[x - min]++",
    "  prefix-sum count",
    "  for i = n-1 down to 0:",
    "    output[--count[arr[i] - min]] = arr[i]",
    "  copy output back to arr",
];

const EXPLANATIONS: &[&str] = &[
    "Sort by counting how often each value occurs.",
    "Find the smallest and largest values.",
    "One counter per value in that range.",
    "Count every value.",
    "Turn counts into end positions.",
    "Walk backwards so equal values keep their order.",
    "Place each value at its next free slot.",
    "Replace the array with the sorted output.",
];

/// Stable counting sort offset by the minimum, so negatives are allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountingSort;

impl Algorithm for CountingSort {
    fn name(&self) -> &str {
        "Counting Sort"
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

    fn validate(&self, values: &[i64]) -> Result<(), String> {
        let width = span(values);
        if width > MAX_COUNTING_RANGE as i128 {
            return Err(format!(
                "value range {width} exceeds the counting limit of {MAX_COUNTING_RANGE}"
            ));
        }
        Ok(())
    }

    fn run(
        &self,
        data: &mut [i64],
        _target: Option<i64>,
        ctx: &mut RunContext,
    ) -> Result<AlgoResult, Interrupt> {
        let n = data.len();
        ctx.show(data);
        ctx.status("Starting counting sort");
        ctx.pseudocode(0);
        ctx.pause(800)?;
        if n == 0 {
            return Ok(AlgoResult::Sorted);
        }

        ctx.pseudocode(1);
        let min = data.iter().copied().min().unwrap_or(0);
        let max = data.iter().copied().max().unwrap_or(0);
        ctx.narrate(|| format!("Values range from {min} to {max}"));
        ctx.pause(600)?;

        ctx.pseudocode(2);
        let slot = |x: i64| (x as i128 - min as i128) as usize;
        let mut count = vec![0usize; slot(max) + 1];
        ctx.narrate(|| format!("{} counters, one per possible value", count.len()));
        ctx.pause(500)?;

        for i in 0..n {
            ctx.checkpoint()?;
            ctx.pseudocode(3);
            count[slot(data[i])] += 1;
            ctx.highlight(i, ColorTag::Bucket);
            ctx.narrate(|| format!("Count one more {}", data[i]));
            ctx.pause(300)?;
            ctx.progress(i + 1, 2 * n);
        }

        ctx.pseudocode(4);
        for k in 1..count.len() {
            count[k] += count[k - 1];
        }
        ctx.status("Running totals give each value's last output position");
        ctx.pause(600)?;

        let mut output = vec![0; n];
        for i in (0..n).rev() {
            ctx.checkpoint()?;
            ctx.pseudocode(5);
            let k = slot(data[i]);
            count[k] -= 1;
            output[count[k]] = data[i];
            ctx.pseudocode(6);
            ctx.highlight(i, ColorTag::Selected);
            ctx.narrate(|| format!("{} goes to output index {}", data[i], count[k]));
            ctx.pause(250)?;
            ctx.progress(2 * n - i, 2 * n);
        }

        ctx.pseudocode(7);
        data.copy_from_slice(&output);
        ctx.record_writes(n as u64);
        ctx.reset_highlights();
        ctx.show(data);
        ctx.status("Counting sort complete");
        for i in 0..n {
            ctx.highlight(i, ColorTag::Sorted);
            ctx.pause(50)?;
        }
        Ok(AlgoResult::Sorted)
    }
}

fn span(values: &[i64]) -> i128 {
    match (values.iter().min(), values.iter().max()) {
        (Some(&min), Some(&max)) => max as i128 - min as i128 + 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;

    #[test]
    fn sorts_negative_values() {
        let (data, _) = run_headless(&CountingSort, &[3, -2, 0, -2, 7], None);
        assert_eq!(data, vec![-2, -2, 0, 3, 7]);
    }

    #[test]
    fn rejects_wide_ranges() {
        assert!(CountingSort.validate(&[0, MAX_COUNTING_RANGE as i64]).is_err());
        assert!(CountingSort.validate(&[0, MAX_COUNTING_RANGE as i64 - 1]).is_ok());
        assert!(CountingSort.validate(&[i64::MIN, i64::MAX]).is_err());
    }
}
