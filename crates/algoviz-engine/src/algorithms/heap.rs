use super::{AlgoResult, Algorithm, AlgorithmKind};
use crate::context::RunContext;
use crate::error::Interrupt;
use crate::render::ColorTag;

const PSEUDOCODE: &[&str] = &[
    "heapSort(arr):",
    "  buildMaxHeap(arr)",
    "  for end = n-1 down to 1:",
    "    swap(arr[0], arr[end])",
    "    siftDown(arr, 0, end)",
    "siftDown(arr, i, size):",
    "  largest = i; l = 2i+1; r = 2i+2",
    "  if l < size and arr[l] > arr[largest]: largest = l",
    "  if r < size and arr[r] > arr[largest]: largest = r",
    "  if largest != i:",
    "    swap(arr[i], arr[largest]); siftDown(arr, largest, size)",
];

const EXPLANATIONS: &[&str] = &[
    "Sort using a max-heap built in place.",
    "Rearrange the array so every parent is at least its children.",
    "Shrink the heap one slot at a time.",
    "Move the largest value to the end of the heap.",
    "Restore the heap property from the root.",
    "Push a value down until the heap property holds.",
    "Locate the node and its two children.",
    "Is the left child larger?",
    "Is the right child larger?",
    "If a child is larger, the node is out of place.",
    "Swap with the larger child and keep sifting down.",
];

/// In-place heap sort on a binary max-heap.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapSort;

impl Algorithm for HeapSort {
    fn name(&self) -> &str {
        "Heap Sort"
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
        ctx.status("Starting heap sort");
        ctx.pseudocode(0);
        ctx.pause(800)?;

        ctx.pseudocode(1);
        ctx.status("Building a max heap: every parent at least as large as its children");
        ctx.pause(600)?;
        for root in (0..n / 2).rev() {
            ctx.checkpoint()?;
            sift_down(data, root, n, ctx)?;
        }
        if let Some(max) = data.first() {
            ctx.narrate(|| format!("Max heap built, largest value {max} at the root"));
            ctx.pause(700)?;
        }

        for end in (1..n).rev() {
            ctx.checkpoint()?;
            ctx.pseudocode(2);
            ctx.pseudocode(3);
            ctx.highlight(0, ColorTag::Pivot);
            ctx.highlight(end, ColorTag::Comparing);
            ctx.narrate(|| format!("Move the maximum {} to index {end}", data[0]));
            ctx.pause(500)?;
            ctx.swap(data, 0, end);
            ctx.show(data);
            ctx.highlight(0, ColorTag::Default);
            ctx.highlight(end, ColorTag::Sorted);
            ctx.pause(400)?;

            ctx.pseudocode(4);
            sift_down(data, 0, end, ctx)?;
            ctx.progress(n - end, n - 1);
        }

        if n > 0 {
            ctx.highlight(0, ColorTag::Sorted);
        }
        ctx.status("Heap sort complete");
        ctx.pause(500)?;
        Ok(AlgoResult::Sorted)
    }
}

fn sift_down(
    data: &mut [i64],
    mut i: usize,
    size: usize,
    ctx: &mut RunContext,
) -> Result<(), Interrupt> {
    loop {
        ctx.checkpoint()?;
        ctx.pseudocode(5);
        let mut largest = i;
        let left = 2 * i + 1;
        let right = left + 1;
        ctx.pseudocode(6);
        ctx.highlight(i, ColorTag::Selected);
        ctx.pause(300)?;

        if left < size {
            ctx.pseudocode(7);
            ctx.highlight(left, ColorTag::Comparing);
            ctx.pause(300)?;
            if ctx.compare(data[left], data[largest]).is_gt() {
                largest = left;
            }
        }
        if right < size {
            ctx.pseudocode(8);
            ctx.highlight(right, ColorTag::Comparing);
            ctx.pause(300)?;
            if ctx.compare(data[right], data[largest]).is_gt() {
                largest = right;
            }
        }

        ctx.pseudocode(9);
        for slot in [i, left, right] {
            if slot < size {
                ctx.highlight(slot, ColorTag::Default);
            }
        }
        if largest == i {
            return Ok(());
        }

        ctx.pseudocode(10);
        ctx.narrate(|| format!("{} sinks below its child {}", data[i], data[largest]));
        ctx.swap(data, i, largest);
        ctx.show(data);
        ctx.highlight(largest, ColorTag::Shifting);
        ctx.pause(400)?;
        ctx.highlight(largest, ColorTag::Default);
        i = largest;
    }
}
