use std::ops::Range;

use super::{AlgoResult, Algorithm, AlgorithmKind};
use crate::context::RunContext;
use crate::error::Interrupt;
use crate::render::ColorTag;

const PSEUDOCODE: &[&str] = &[
    "quickSort(arr, low, high):",
    "  if low < high:",
    "    p = partition(arr, low, high)",
    "    quickSort(arr, low, p - 1)",
    "    quickSort(arr, p + 1, high)",
    "partition(arr, low, high):",
    "  pivot = arr[high]",
    "  i = low",
    "  for j = low to high - 1:",
    "    if arr[j] < pivot:",
    "      swap(arr[i], arr[j]); i = i + 1",
    "  swap(arr[i], arr[high])",
    "  return i",
];

const EXPLANATIONS: &[&str] = &[
    "Sort a range by partitioning around a pivot.",
    "Ranges of one element are already sorted.",
    "Place the pivot and split the range around it.",
    "Sort the values smaller than the pivot.",
    "Sort the values at least as large as the pivot.",
    "Rearrange a range around its last value.",
    "The last value of the range is the pivot.",
    "Values left of i are smaller than the pivot.",
    "Examine every value except the pivot.",
    "Does this value belong left of the pivot?",
    "Move it into the smaller region and grow the region.",
    "Put the pivot between the two regions.",
    "The pivot is now in its final position.",
];

/// Quick sort with Lomuto partitioning around the last element.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuickSort;

impl Algorithm for QuickSort {
    fn name(&self) -> &str {
        "Quick Sort"
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
        ctx.show(data);
        ctx.status("Starting quick sort");
        ctx.pseudocode(0);
        ctx.pause(800)?;

        let mut placed = 0;
        sort_range(data, 0..data.len(), &mut placed, ctx)?;

        ctx.status("Quick sort complete");
        ctx.pause(500)?;
        Ok(AlgoResult::Sorted)
    }
}

fn sort_range(
    data: &mut [i64],
    range: Range<usize>,
    placed: &mut usize,
    ctx: &mut RunContext,
) -> Result<(), Interrupt> {
    ctx.checkpoint()?;
    ctx.pseudocode(1);
    match range.len() {
        0 => return Ok(()),
        1 => {
            mark_placed(range.start, data.len(), placed, ctx);
            return Ok(());
        }
        _ => {}
    }

    let last = range.end - 1;
    ctx.highlight_range(range.start..=last, ColorTag::Region);
    ctx.narrate(|| format!("Sort indices {} to {last}", range.start));
    ctx.pause(500)?;

    ctx.pseudocode(2);
    let p = partition(data, range.clone(), ctx)?;
    ctx.highlight_range(range.start..=last, ColorTag::Default);
    mark_placed(p, data.len(), placed, ctx);
    ctx.narrate(|| format!("Pivot {} is now in its final position {p}", data[p]));
    ctx.pause(600)?;

    ctx.pseudocode(3);
    sort_range(data, range.start..p, placed, ctx)?;
    ctx.pseudocode(4);
    sort_range(data, p + 1..range.end, placed, ctx)
}

fn partition(
    data: &mut [i64],
    range: Range<usize>,
    ctx: &mut RunContext,
) -> Result<usize, Interrupt> {
    let high = range.end - 1;
    let pivot = data[high];
    ctx.pseudocode(6);
    ctx.highlight(high, ColorTag::Pivot);
    ctx.narrate(|| format!("Pivot = {pivot}, the last element of the range"));
    ctx.pause(700)?;

    let mut i = range.start;
    ctx.pseudocode(7);
    for j in range.start..high {
        ctx.checkpoint()?;
        ctx.pseudocode(8);
        ctx.highlight(j, ColorTag::Comparing);
        ctx.narrate(|| format!("Is {} < {pivot}?", data[j]));
        ctx.pause(400)?;

        ctx.pseudocode(9);
        if ctx.compare(data[j], pivot).is_lt() {
            ctx.pseudocode(10);
            if i != j {
                ctx.swap(data, i, j);
                ctx.show(data);
            }
            ctx.highlight(i, ColorTag::Minimum);
            ctx.narrate(|| format!("{} goes to the smaller side at index {i}", data[i]));
            ctx.pause(400)?;
            i += 1;
        }
        if j >= i {
            ctx.highlight(j, ColorTag::Region);
        }
    }

    ctx.pseudocode(11);
    if i != high {
        ctx.swap(data, i, high);
        ctx.show(data);
    }
    ctx.narrate(|| format!("Move the pivot to index {i}"));
    ctx.pause(500)?;
    ctx.pseudocode(12);
    Ok(i)
}

fn mark_placed(index: usize, len: usize, placed: &mut usize, ctx: &mut RunContext) {
    ctx.highlight(index, ColorTag::Sorted);
    *placed += 1;
    ctx.progress(*placed, len);
}
