use std::ops::Range;

use super::{AlgoResult, Algorithm, AlgorithmKind};
use crate::context::RunContext;
use crate::error::Interrupt;
use crate::render::ColorTag;

const PSEUDOCODE: &[&str] = &[
    "mergeSort(arr, l, r):",
    "  if l < r:",
    "    m = (l + r) / 2",
    "    mergeSort(arr, l, m)",
    "    mergeSort(arr, m+1, r)",
    "    merge(arr, l, m, r)",
    "merge(arr, l, m, r):",
    "  i = l, j = m+1",
    "  while i <= m and j <= r:",
    "    if arr[i] <= arr[j]: take arr[i++]",
    "    else: take arr[j++]",
    "  take whatever remains",
    "  write the merged run back to arr[l..r]",
];

const EXPLANATIONS: &[&str] = &[
    "Sort a range by sorting its halves and merging them.",
    "Ranges of one element are already sorted.",
    "Find the middle of the range.",
    "Sort the left half.",
    "Sort the right half.",
    "Combine the two sorted halves.",
    "Merge two adjacent sorted runs.",
    "Start at the front of both runs.",
    "Continue while both runs have values left.",
    "Take the smaller front value; ties favour the left run.",
    "Otherwise take the front of the right run.",
    "Append whatever is left of either run.",
    "Copy the merged values back in one step.",
];

/// Top-down merge sort.
///
/// Each merge is built in a scratch buffer while comparisons are shown, then
/// written back in one step.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeSort;

struct Progress {
    merges: usize,
    total: usize,
}

impl Algorithm for MergeSort {
    fn name(&self) -> &str {
        "Merge Sort"
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
        ctx.status("Starting merge sort");
        ctx.pseudocode(0);
        ctx.pause(800)?;

        let mut progress = Progress {
            merges: 0,
            total: n.saturating_sub(1),
        };
        sort_range(data, 0..n, &mut progress, ctx)?;

        ctx.reset_highlights();
        ctx.status("Merge sort complete");
        for i in 0..n {
            ctx.highlight(i, ColorTag::Sorted);
            ctx.pause(50)?;
        }
        Ok(AlgoResult::Sorted)
    }
}

fn sort_range(
    data: &mut [i64],
    range: Range<usize>,
    progress: &mut Progress,
    ctx: &mut RunContext,
) -> Result<(), Interrupt> {
    ctx.checkpoint()?;
    ctx.pseudocode(1);
    if range.len() < 2 {
        return Ok(());
    }

    let mid = range.start + range.len() / 2;
    ctx.pseudocode(2);
    ctx.narrate(|| {
        format!(
            "Split [{}..{}] into [{}..{}] and [{mid}..{}]",
            range.start,
            range.end - 1,
            range.start,
            mid - 1,
            range.end - 1
        )
    });
    ctx.pause(500)?;

    ctx.pseudocode(3);
    sort_range(data, range.start..mid, progress, ctx)?;
    ctx.pseudocode(4);
    sort_range(data, mid..range.end, progress, ctx)?;
    ctx.pseudocode(5);
    merge(data, range, mid, ctx)?;

    progress.merges += 1;
    ctx.progress(progress.merges, progress.total);
    Ok(())
}

fn merge(
    data: &mut [i64],
    range: Range<usize>,
    mid: usize,
    ctx: &mut RunContext,
) -> Result<(), Interrupt> {
    let last = range.end - 1;
    ctx.pseudocode(6);
    ctx.highlight_range(range.start..=mid - 1, ColorTag::Region);
    ctx.highlight_range(mid..=last, ColorTag::Bucket);
    ctx.narrate(|| format!("Merge indices {} to {last}", range.start));
    ctx.pause(600)?;

    let mut merged = Vec::with_capacity(range.len());
    let (mut i, mut j) = (range.start, mid);
    ctx.pseudocode(7);
    while i < mid && j < range.end {
        ctx.checkpoint()?;
        ctx.pseudocode(8);
        ctx.highlight(i, ColorTag::Comparing);
        ctx.highlight(j, ColorTag::Comparing);
        ctx.narrate(|| format!("Compare {} and {}", data[i], data[j]));
        ctx.pause(400)?;

        if ctx.compare(data[i], data[j]).is_le() {
            ctx.pseudocode(9);
            merged.push(data[i]);
            ctx.highlight(i, ColorTag::Selected);
            i += 1;
        } else {
            ctx.pseudocode(10);
            merged.push(data[j]);
            ctx.highlight(j, ColorTag::Selected);
            j += 1;
        }
        ctx.pause(200)?;
    }
    ctx.pseudocode(11);
    merged.extend_from_slice(&data[i..mid]);
    merged.extend_from_slice(&data[j..range.end]);

    ctx.pseudocode(12);
    data[range.clone()].copy_from_slice(&merged);
    ctx.record_writes(merged.len() as u64);
    ctx.show(data);
    ctx.highlight_range(range.start..=last, ColorTag::Inserted);
    ctx.narrate(|| format!("Indices {} to {last} are merged", range.start));
    ctx.pause(500)?;
    ctx.highlight_range(range.start..=last, ColorTag::Default);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::render::VisEvent;

    #[test]
    fn sorts_odd_length() {
        let (data, _) = run_headless(&MergeSort, &[9, -3, 5, 0, 2], None);
        assert_eq!(data, vec![-3, 0, 2, 5, 9]);
    }

    #[test]
    fn merges_write_back_whole_runs() {
        let input = [4, 3, 2, 1];
        let (_, _, events) = run_visual(&MergeSort, &input, None);
        let snapshots: Vec<&Vec<i64>> = events
            .iter()
            .filter_map(|e| match e {
                VisEvent::ValuesChanged { values } => Some(values),
                _ => None,
            })
            .collect();
        // Initial display plus one per merge.
        assert_eq!(snapshots.len(), 1 + input.len() - 1);
        assert_eq!(snapshots.last().map(|v| v.as_slice()), Some(&[1, 2, 3, 4][..]));
    }
}
