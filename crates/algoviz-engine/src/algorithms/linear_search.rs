use super::{AlgoResult, Algorithm, AlgorithmKind};
use crate::context::RunContext;
use crate::error::Interrupt;
use crate::render::ColorTag;

const PSEUDOCODE: &[&str] = &[
    "linearSearch(arr, target):",
    "  for i = 0 to n-1:",
    "    if arr[i] == target:",
    "      return i",
    "  return not found",
];

const EXPLANATIONS: &[&str] = &[
    "Look for the target by checking every value in turn.",
    "Start at the first value.",
    "Does this value match the target?",
    "Report where it was found.",
    "Every value was checked without a match.",
];

/// Scans left to right for the first match.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearSearch;

impl Algorithm for LinearSearch {
    fn name(&self) -> &str {
        "Linear Search"
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
        ctx.narrate(|| format!("Searching for {target} one element at a time"));
        ctx.pseudocode(0);
        ctx.pause(800)?;

        for i in 0..n {
            ctx.checkpoint()?;
            ctx.pseudocode(1);
            ctx.highlight(i, ColorTag::Comparing);
            ctx.narrate(|| format!("Check index {i}: {}", data[i]));
            ctx.pause(500)?;

            ctx.pseudocode(2);
            if ctx.compare(data[i], target).is_eq() {
                ctx.pseudocode(3);
                ctx.highlight(i, ColorTag::Found);
                ctx.narrate(|| format!("Found {target} at index {i} after {} checks", i + 1));
                ctx.progress(1, 1);
                ctx.pause(1000)?;
                return Ok(AlgoResult::Found { index: i });
            }
            ctx.highlight(i, ColorTag::Eliminated);
            ctx.pause(200)?;
            ctx.progress(i + 1, n);
        }

        ctx.pseudocode(4);
        ctx.highlight_range(0..=n.saturating_sub(1), ColorTag::NotFound);
        ctx.narrate(|| format!("{target} is not in the array ({n} checks)"));
        ctx.pause(1000)?;
        Ok(AlgoResult::NotFound)
    }
}
