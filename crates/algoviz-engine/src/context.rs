//! Per-run context threaded through every algorithm call.

use std::cmp::Ordering;
use std::ops::RangeInclusive;

use crate::cancel::CancellationToken;
use crate::clock::AnimationClock;
use crate::error::Interrupt;
use crate::render::{ColorTag, EventSink, RenderSync, VisEvent};

/// Render handle and clock, present only for visualized runs.
#[derive(Debug)]
struct Visuals {
    render: RenderSync,
    clock: AnimationClock,
}

/// Everything an algorithm may touch besides its data.
///
/// Visual calls are no-ops on a non-visualized run, and [`RunContext::pause`]
/// degrades to a cancellation check, so both paths execute the same logic.
#[derive(Debug)]
pub struct RunContext {
    visuals: Option<Visuals>,
    sink: EventSink,
    token: CancellationToken,
    comparisons: u64,
    writes: u64,
    last_percent: Option<u32>,
}

impl RunContext {
    pub(crate) fn visualized(sink: EventSink, token: CancellationToken, clock: AnimationClock) -> Self {
        let render = RenderSync::new(sink.clone());
        Self::build(Some(Visuals { render, clock }), sink, token)
    }

    pub(crate) fn headless(sink: EventSink, token: CancellationToken) -> Self {
        Self::build(None, sink, token)
    }

    fn build(visuals: Option<Visuals>, sink: EventSink, token: CancellationToken) -> Self {
        Self {
            visuals,
            sink,
            token,
            comparisons: 0,
            writes: 0,
            last_percent: None,
        }
    }

    /// Whether visual calls reach the render context.
    pub fn visualize(&self) -> bool {
        self.visuals.is_some()
    }

    /// Display `values` as the current sequence.
    pub fn show(&mut self, values: &[i64]) {
        if let Some(v) = &mut self.visuals {
            v.render.set_values(values);
        }
    }

    /// Tag one slot.
    pub fn highlight(&mut self, index: usize, tag: ColorTag) {
        if let Some(v) = &mut self.visuals {
            v.render.highlight(index, tag);
        }
    }

    /// Tag every slot in `range`.
    pub fn highlight_range(&mut self, range: RangeInclusive<usize>, tag: ColorTag) {
        if let Some(v) = &mut self.visuals {
            for index in range {
                v.render.highlight(index, tag);
            }
        }
    }

    /// Put every slot back to the default tag.
    pub fn reset_highlights(&mut self) {
        if let Some(v) = &mut self.visuals {
            v.render.reset_all();
        }
    }

    /// Publish a fixed narration line.
    pub fn status(&mut self, message: impl Into<String>) {
        if let Some(v) = &mut self.visuals {
            v.render.status(message);
        }
    }

    /// Publish a narration line, formatting it only when visualizing.
    pub fn narrate(&mut self, message: impl FnOnce() -> String) {
        if let Some(v) = &mut self.visuals {
            v.render.status(message());
        }
    }

    /// Mark the pseudocode line being executed.
    pub fn pseudocode(&mut self, line: usize) {
        if let Some(v) = &mut self.visuals {
            v.render.pseudocode(line);
        }
    }

    /// Step boundary: wait for playback permission, then the paced delay.
    pub fn pause(&mut self, base_ms: u64) -> Result<(), Interrupt> {
        match &mut self.visuals {
            Some(v) => {
                if v.render.is_disconnected() {
                    return Err(render_closed());
                }
                v.clock.wait(base_ms)
            }
            None => self.checkpoint(),
        }
    }

    /// Cancellation check for loop tops and recursion boundaries.
    pub fn checkpoint(&self) -> Result<(), Interrupt> {
        if self.token.is_cancelled() {
            return Err(Interrupt::Cancelled);
        }
        if self.sink.is_disconnected() {
            return Err(render_closed());
        }
        Ok(())
    }

    /// Compare two values, counting the comparison.
    pub fn compare(&mut self, a: i64, b: i64) -> Ordering {
        self.comparisons += 1;
        a.cmp(&b)
    }

    /// Count `n` writes into the data.
    pub fn record_writes(&mut self, n: u64) {
        self.writes += n;
    }

    /// Swap two slots, counting both writes.
    pub fn swap(&mut self, data: &mut [i64], i: usize, j: usize) {
        data.swap(i, j);
        self.writes += 2;
    }

    /// Report `done` of `total` units of work.
    ///
    /// Only whole-percent changes are forwarded.
    pub fn progress(&mut self, done: usize, total: usize) {
        if total == 0 {
            return;
        }
        let fraction = (done.min(total) as f64) / (total as f64);
        let percent = (fraction * 100.0).floor() as u32;
        if self.last_percent == Some(percent) {
            return;
        }
        self.last_percent = Some(percent);
        self.sink.emit(VisEvent::Progress { fraction });
    }

    /// Comparisons counted so far.
    pub fn comparisons(&self) -> u64 {
        self.comparisons
    }

    /// Writes counted so far.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Step boundaries passed so far (zero on a non-visualized run).
    pub fn boundaries(&self) -> u64 {
        self.visuals.as_ref().map_or(0, |v| v.clock.boundaries())
    }
}

fn render_closed() -> Interrupt {
    Interrupt::SyncFailure("render context closed".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::{PlaybackController, SpeedControl};
    use crate::render::{self, EventStream};

    fn visual_context() -> (RunContext, EventStream, CancellationToken) {
        visual_context_with_capacity(64)
    }

    // The stream is drained only after the context is dropped, so the
    // capacity must hold every event a test emits.
    fn visual_context_with_capacity(
        capacity: usize,
    ) -> (RunContext, EventStream, CancellationToken) {
        let token = CancellationToken::new();
        let (sink, stream) = render::channel(capacity, token.clone());
        let clock = AnimationClock::new(
            PlaybackController::new(),
            SpeedControl::default(),
            token.clone(),
            0.0,
        );
        (RunContext::visualized(sink, token.clone(), clock), stream, token)
    }

    #[test]
    fn headless_context_emits_only_progress() {
        let token = CancellationToken::new();
        let (sink, stream) = render::channel(64, token.clone());
        let mut ctx = RunContext::headless(sink, token);

        ctx.show(&[1, 2, 3]);
        ctx.highlight(0, ColorTag::Pivot);
        ctx.narrate(|| unreachable!("narration is skipped when headless"));
        ctx.pause(1_000).unwrap();
        ctx.progress(1, 2);
        drop(ctx);

        let events = stream.collect_blocking();
        assert_eq!(events, vec![VisEvent::Progress { fraction: 0.5 }]);
    }

    #[test]
    fn visual_context_forwards_calls() {
        let (mut ctx, stream, _token) = visual_context();

        ctx.show(&[3, 4]);
        ctx.highlight_range(0..=1, ColorTag::Region);
        ctx.pseudocode(1);
        ctx.pause(10).unwrap();
        assert_eq!(ctx.boundaries(), 1);
        drop(ctx);

        assert_eq!(stream.collect_blocking().len(), 4);
    }

    #[test]
    fn progress_reports_whole_percent_changes() {
        let (mut ctx, stream, _token) = visual_context_with_capacity(128);
        for done in 0..=1000 {
            ctx.progress(done, 1000);
        }
        drop(ctx);

        let progress = stream
            .collect_blocking()
            .into_iter()
            .filter(|e| matches!(e, VisEvent::Progress { .. }))
            .count();
        assert_eq!(progress, 101);
    }

    #[test]
    fn counters_track_work() {
        let (mut ctx, _stream, _token) = visual_context();
        let mut data = [2, 1];
        assert!(ctx.compare(data[0], data[1]).is_gt());
        ctx.swap(&mut data, 0, 1);
        assert_eq!(data, [1, 2]);
        assert_eq!(ctx.comparisons(), 1);
        assert_eq!(ctx.writes(), 2);
    }

    #[test]
    fn pause_reports_cancellation() {
        let (mut ctx, _stream, token) = visual_context();
        token.cancel();
        assert_eq!(ctx.pause(10), Err(Interrupt::Cancelled));
        assert_eq!(ctx.checkpoint(), Err(Interrupt::Cancelled));
    }

    #[test]
    fn pause_reports_closed_render_context() {
        let (mut ctx, stream, _token) = visual_context();
        drop(stream);
        ctx.status("lost");
        assert!(matches!(ctx.pause(10), Err(Interrupt::SyncFailure(_))));
    }
}
