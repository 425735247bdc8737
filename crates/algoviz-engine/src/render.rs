//! Render-side events and the worker's handle for issuing them.
//!
//! Every visual mutation travels through one bounded FIFO channel from the
//! worker thread to the single render context. The worker never reads
//! visual state back; it only pushes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::algorithms::AlgoResult;
use crate::cancel::CancellationToken;
use crate::runner::{FailureKind, RunState, RunStats};

/// Semantic highlight for one slot, mapped to a concrete color by the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTag {
    #[default]
    Default,
    Comparing,
    /// Current key or minimum candidate
    Selected,
    Pivot,
    Shifting,
    Inserted,
    /// Working range: sorted prefix, active search interval, merge span
    Region,
    /// Boundary of a search interval
    Bound,
    Minimum,
    Bucket,
    /// Element is in its final position
    Sorted,
    Found,
    NotFound,
    Eliminated,
}

/// Events flowing from a run to the render context, in issue order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VisEvent {
    /// The displayed values changed; tags persist unless the length changed
    ValuesChanged { values: Vec<i64> },
    /// One slot was re-tagged
    Highlight { index: usize, tag: ColorTag },
    /// Every slot went back to the default tag
    ResetHighlights,
    /// Narration for the learner
    Status { message: String },
    /// Pseudocode line now executing
    PseudocodeLine { line: usize },
    /// Fraction of the run completed (0.0 - 1.0)
    Progress { fraction: f64 },
    /// The algorithm finished, leaving `values` as its final data
    Completed {
        result: AlgoResult,
        values: Vec<i64>,
        stats: RunStats,
    },
    /// The run was cancelled
    Cancelled,
    /// The algorithm failed
    Failed { kind: FailureKind, message: String },
}

impl VisEvent {
    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            VisEvent::Completed { .. } | VisEvent::Cancelled | VisEvent::Failed { .. }
        )
    }
}

/// Channel endpoint shared by everything a run emits.
#[derive(Debug, Clone)]
pub(crate) struct EventSink {
    tx: mpsc::Sender<VisEvent>,
    token: CancellationToken,
    disconnected: Arc<AtomicBool>,
}

impl EventSink {
    pub(crate) fn new(tx: mpsc::Sender<VisEvent>, token: CancellationToken) -> Self {
        Self {
            tx,
            token,
            disconnected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Send unless the run is cancelled or the render context is gone.
    pub(crate) fn emit(&self, event: VisEvent) {
        if self.token.is_cancelled() || self.is_disconnected() {
            return;
        }
        self.push(event);
    }

    /// Send regardless of cancellation. Used for the terminal event.
    pub(crate) fn emit_terminal(&self, event: VisEvent) {
        if !self.is_disconnected() {
            self.push(event);
        }
    }

    pub(crate) fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }

    // Blocks only while the render context is a full queue behind.
    fn push(&self, event: VisEvent) {
        if self.tx.blocking_send(event).is_err()
            && !self.disconnected.swap(true, Ordering::SeqCst)
        {
            tracing::warn!("render context closed; dropping further visual updates");
        }
    }
}

/// Worker-side handle for visual mutations.
///
/// All calls enqueue and return; none wait for the render context to apply
/// them. Nothing is enqueued once the run is cancelled.
#[derive(Debug)]
pub struct RenderSync {
    sink: EventSink,
    len: usize,
}

impl RenderSync {
    pub(crate) fn new(sink: EventSink) -> Self {
        Self { sink, len: 0 }
    }

    /// Replace the displayed values.
    pub fn set_values(&mut self, values: &[i64]) {
        self.len = values.len();
        self.sink.emit(VisEvent::ValuesChanged {
            values: values.to_vec(),
        });
    }

    /// Tag one slot. Indices outside the displayed sequence are ignored.
    pub fn highlight(&mut self, index: usize, tag: ColorTag) {
        if index < self.len {
            self.sink.emit(VisEvent::Highlight { index, tag });
        }
    }

    /// Publish a narration line.
    pub fn status(&mut self, message: impl Into<String>) {
        self.sink.emit(VisEvent::Status {
            message: message.into(),
        });
    }

    /// Set every slot back to [`ColorTag::Default`].
    pub fn reset_all(&mut self) {
        self.sink.emit(VisEvent::ResetHighlights);
    }

    /// Mark the pseudocode line being executed.
    pub fn pseudocode(&mut self, line: usize) {
        self.sink.emit(VisEvent::PseudocodeLine { line });
    }

    /// Whether the render context has gone away.
    pub fn is_disconnected(&self) -> bool {
        self.sink.is_disconnected()
    }
}

/// Receiving end of a run's events.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<VisEvent>,
}

impl EventStream {
    pub(crate) fn new(rx: mpsc::Receiver<VisEvent>) -> Self {
        Self { rx }
    }

    /// Next event, or `None` once the run has finished and the stream drained.
    pub async fn recv(&mut self) -> Option<VisEvent> {
        self.rx.recv().await
    }

    /// Blocking variant of [`EventStream::recv`] for non-async callers.
    pub fn blocking_recv(&mut self) -> Option<VisEvent> {
        self.rx.blocking_recv()
    }

    /// Drain every event until the run closes the stream.
    pub fn collect_blocking(mut self) -> Vec<VisEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.rx.blocking_recv() {
            events.push(event);
        }
        events
    }
}

/// One displayed slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualElement {
    pub value: i64,
    pub tag: ColorTag,
}

/// Render-context state rebuilt by applying events in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualModel {
    pub elements: Vec<VisualElement>,
    pub status: Option<String>,
    pub pseudocode_line: Option<usize>,
    pub progress: f64,
    pub state: RunState,
    pub result: Option<AlgoResult>,
}

impl Default for VisualModel {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            status: None,
            pseudocode_line: None,
            progress: 0.0,
            state: RunState::NotStarted,
            result: None,
        }
    }
}

impl VisualModel {
    /// A model displaying `values` with default tags.
    pub fn with_values(values: &[i64]) -> Self {
        let mut model = Self::default();
        model.show(values);
        model
    }

    /// Rebuild the model from a sequence of events.
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a VisEvent>) -> Self {
        let mut model = Self::default();
        for event in events {
            model.apply(event);
        }
        model
    }

    /// Apply one event.
    pub fn apply(&mut self, event: &VisEvent) {
        if self.state == RunState::NotStarted && !event.is_terminal() {
            self.state = RunState::Running;
        }
        match event {
            VisEvent::ValuesChanged { values } => self.show(values),
            VisEvent::Highlight { index, tag } => {
                if let Some(element) = self.elements.get_mut(*index) {
                    element.tag = *tag;
                }
            }
            VisEvent::ResetHighlights => {
                for element in &mut self.elements {
                    element.tag = ColorTag::Default;
                }
            }
            VisEvent::Status { message } => self.status = Some(message.clone()),
            VisEvent::PseudocodeLine { line } => self.pseudocode_line = Some(*line),
            VisEvent::Progress { fraction } => self.progress = fraction.clamp(0.0, 1.0),
            VisEvent::Completed { result, values, .. } => {
                self.show(values);
                self.state = RunState::Completed;
                self.result = Some(*result);
                self.progress = 1.0;
            }
            VisEvent::Cancelled => self.state = RunState::Cancelled,
            VisEvent::Failed { message, .. } => {
                self.state = RunState::Failed;
                self.status = Some(message.clone());
            }
        }
    }

    /// Current values in display order.
    pub fn values(&self) -> Vec<i64> {
        self.elements.iter().map(|e| e.value).collect()
    }

    // Tags survive a same-length update so swaps keep their markings.
    fn show(&mut self, values: &[i64]) {
        if values.len() == self.elements.len() {
            for (element, &value) in self.elements.iter_mut().zip(values) {
                element.value = value;
            }
            return;
        }
        self.elements = values
            .iter()
            .map(|&value| VisualElement {
                value,
                tag: ColorTag::Default,
            })
            .collect();
    }
}

/// Create a bounded event channel for one run.
pub(crate) fn channel(
    capacity: usize,
    token: CancellationToken,
) -> (EventSink, EventStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSink::new(tx, token), EventStream::new(rx))
}
