use super::{AlgoResult, Algorithm, AlgorithmKind};
use crate::context::RunContext;
use crate::error::Interrupt;
use crate::render::ColorTag;

const PSEUDOCODE: &[&str] = &[
    "radixSort(arr):",
    "  m = max(arr)",
    "  for exp = 1; m / exp > 0; exp *= 10:",
    "    countByDigit(arr, exp)",
    "countByDigit(arr, exp):",
    "  count[0..9] = 0",
    "  for each x in arr: count[(x / exp) % 10]++",
    "  prefix-sum count",
    "  for i = n-1 down to 0:",
    "    output[--count[digit(arr[i])]] = arr[i]",
    "  copy output back to arr",
];

const EXPLANATIONS: &[&str] = &[
    "Sort non-negative values digit by digit, least significant first.",
    "The largest value decides how many digits to process.",
    "Process one decimal place per pass.",
    "Stable-sort by the current digit.",
    "Counting sort keyed on one digit.",
    "One counter per digit 0 to 9.",
    "Count how many values have each digit.",
    "Turn counts into end positions.",
    "Walk backwards so equal digits keep their order.",
    "Place each value at its digit's next free slot.",
    "Replace the array with this pass's order.",
];

/// Least-significant-digit radix sort, base 10. Non-negative input only.
#[derive(Debug, Clone, Copy, Default)]
pub struct RadixSort;

impl Algorithm for RadixSort {
    fn name(&self) -> &str {
        "Radix Sort"
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
        match values.iter().find(|&&v| v < 0) {
            Some(v) => Err(format!("negative value {v} (radix sort needs values >= 0)")),
            None => Ok(()),
        }
    }

    fn run(
        &self,
        data: &mut [i64],
        _target: Option<i64>,
        ctx: &mut RunContext,
    ) -> Result<AlgoResult, Interrupt> {
        let n = data.len();
        ctx.show(data);
        ctx.status("Starting radix sort");
        ctx.pseudocode(0);
        ctx.pause(800)?;

        ctx.pseudocode(1);
        let max = data.iter().copied().max().unwrap_or(0);
        let passes = digit_count(max);
        ctx.narrate(|| format!("Largest value {max} has {passes} digit(s), so {passes} pass(es)"));
        ctx.pause(700)?;

        for pass in 0..passes {
            ctx.checkpoint()?;
            ctx.pseudocode(2);
            let exp = 10_i64.pow(pass);
            ctx.narrate(|| format!("Sorting by the {} digit", place_name(pass)));
            ctx.pause(600)?;
            ctx.pseudocode(3);
            count_by_digit(data, exp, ctx)?;
            ctx.progress(pass as usize + 1, passes as usize);
        }

        ctx.reset_highlights();
        ctx.status("Radix sort complete");
        for i in 0..n {
            ctx.highlight(i, ColorTag::Sorted);
            ctx.pause(50)?;
        }
        Ok(AlgoResult::Sorted)
    }
}

fn count_by_digit(data: &mut [i64], exp: i64, ctx: &mut RunContext) -> Result<(), Interrupt> {
    let digit = |x: i64| ((x / exp) % 10) as usize;

    ctx.pseudocode(4);
    ctx.pseudocode(5);
    let mut count = [0usize; 10];
    for i in 0..data.len() {
        ctx.checkpoint()?;
        ctx.pseudocode(6);
        let d = digit(data[i]);
        count[d] += 1;
        ctx.highlight(i, ColorTag::Bucket);
        ctx.narrate(|| format!("{} goes to bucket {d}", data[i]));
        ctx.pause(300)?;
    }

    ctx.pseudocode(7);
    for d in 1..10 {
        count[d] += count[d - 1];
    }
    ctx.narrate(|| format!("Bucket end positions: {count:?}"));
    ctx.pause(500)?;

    let mut output = vec![0; data.len()];
    for i in (0..data.len()).rev() {
        ctx.checkpoint()?;
        ctx.pseudocode(8);
        let d = digit(data[i]);
        count[d] -= 1;
        output[count[d]] = data[i];
        ctx.pseudocode(9);
        ctx.highlight(i, ColorTag::Selected);
        ctx.narrate(|| format!("{} lands at output index {}", data[i], count[d]));
        ctx.pause(250)?;
    }

    ctx.pseudocode(10);
    data.copy_from_slice(&output);
    ctx.record_writes(output.len() as u64);
    ctx.reset_highlights();
    ctx.show(data);
    ctx.pause(600)?;
    Ok(())
}

fn digit_count(mut value: i64) -> u32 {
    let mut digits = 1;
    while value >= 10 {
        value /= 10;
        digits += 1;
    }
    digits
}

fn place_name(pass: u32) -> String {
    match pass {
        0 => "ones".to_string(),
        1 => "tens".to_string(),
        2 => "hundreds".to_string(),
        p => format!("10^{p}"),
    }
}
