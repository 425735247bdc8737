//! Axum web server driving one algorithm run at a time.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use algoviz_engine::input;
use algoviz_engine::{
    AlgorithmId, AlgorithmKind, AnimationSpeed, EngineConfig, Error, EventStream, PlaybackStatus,
    RunRequest, RunState, Session, VisEvent, VisualModel,
};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex, RwLock};
use tower_http::cors::CorsLayer;

use crate::error::{ApiError, ApiResult};
use crate::ws::ws_handler;

/// Events buffered per WebSocket subscriber before it starts lagging.
const BROADCAST_CAPACITY: usize = 1024;

/// Shared application state.
pub struct AppState {
    pub(crate) session: Mutex<Session>,
    pub(crate) model: RwLock<VisualModel>,
    pub(crate) events: broadcast::Sender<VisEvent>,
    /// Bumped on every start and reset; render loops of older runs go quiet.
    generation: AtomicU64,
}

impl AppState {
    fn new(config: EngineConfig) -> Self {
        let (events, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            session: Mutex::new(Session::new(config)),
            model: RwLock::new(VisualModel::default()),
            events,
            generation: AtomicU64::new(0),
        }
    }

    /// Cancel the active run and put its original input back on display.
    pub(crate) async fn reset(&self) -> Option<Vec<i64>> {
        let mut session = self.session.lock().await;
        let input = session.reset();

        let mut model = self.model.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        *model = input
            .as_deref()
            .map(VisualModel::with_values)
            .unwrap_or_default();
        drop(model);
        drop(session);

        if let Some(values) = &input {
            let _ = self.events.send(VisEvent::ValuesChanged {
                values: values.clone(),
            });
            let _ = self.events.send(VisEvent::ResetHighlights);
        }
        input
    }

    pub(crate) async fn playback(&self) -> ApiResult<PlaybackStatus> {
        self.session
            .lock()
            .await
            .playback_status()
            .ok_or(ApiError::Engine(Error::NoActiveRun))
    }

    async fn start(self: &Arc<Self>, request: RunRequest) -> ApiResult<RunStarted> {
        let started = RunStarted {
            algorithm: request.algorithm,
            values: request.values.clone(),
            target: request.target,
            visualize: request.visualize,
        };

        let mut session = self.session.lock().await;
        let stream = session.start_run(request)?;
        let mut model = self.model.write().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *model = VisualModel::with_values(&started.values);
        drop(model);
        drop(session);

        tracing::info!(
            algorithm = %started.algorithm,
            len = started.values.len(),
            visualize = started.visualize,
            "run requested"
        );
        tokio::spawn(render_loop(Arc::clone(self), stream, generation));
        Ok(started)
    }
}

/// The render context: applies a run's events to the shared model in
/// arrival order and fans them out to WebSocket subscribers.
async fn render_loop(state: Arc<AppState>, mut stream: EventStream, generation: u64) {
    let mut applied = 0usize;
    while let Some(event) = stream.recv().await {
        let mut model = state.model.write().await;
        // Checked under the model lock so a reset cannot interleave.
        if state.generation.load(Ordering::SeqCst) != generation {
            continue;
        }
        model.apply(&event);
        // No subscribers is fine.
        let _ = state.events.send(event);
        drop(model);
        applied += 1;
    }
    tracing::debug!(generation, applied, "render loop finished");
}

/// Visualization server.
pub struct VisServer {
    state: Arc<AppState>,
}

impl VisServer {
    /// Create a server with an idle session.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            state: Arc::new(AppState::new(config)),
        }
    }

    /// Shared state, for driving the server without HTTP.
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/status", get(status_handler))
            .route("/api/algorithms", get(algorithms_handler))
            .route("/api/model", get(model_handler))
            .route("/api/run", post(run_handler))
            .route("/api/run/cancel", post(cancel_handler))
            .route("/api/playback", get(playback_status_handler))
            .route("/api/playback/play", post(play_handler))
            .route("/api/playback/pause", post(pause_handler))
            .route("/api/playback/step", post(step_handler))
            .route("/api/playback/reset", post(reset_handler))
            .route("/api/playback/speed", post(speed_handler))
            .route("/ws", get(ws_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Run the server on the given address.
    pub async fn serve(self, addr: SocketAddr) -> Result<(), std::io::Error> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Visualization server running on http://{}", listener.local_addr()?);
        axum::serve(listener, self.router()).await
    }
}

/// Server status response.
#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
    running: bool,
    run_state: Option<RunState>,
    speed: AnimationSpeed,
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let session = state.session.lock().await;
    Json(StatusResponse {
        status: "ok",
        running: session.is_running(),
        run_state: session.run_state(),
        speed: session.speed(),
    })
}

/// One entry of the algorithm menu.
#[derive(Debug, Serialize)]
struct AlgorithmInfo {
    id: AlgorithmId,
    name: &'static str,
    kind: AlgorithmKind,
    pseudocode: &'static [&'static str],
    explanations: &'static [&'static str],
}

async fn algorithms_handler() -> Json<Vec<AlgorithmInfo>> {
    let menu = AlgorithmId::ALL
        .iter()
        .map(|id| AlgorithmInfo {
            id: *id,
            name: id.name(),
            kind: id.kind(),
            pseudocode: id.strategy().pseudocode(),
            explanations: id.strategy().explanations(),
        })
        .collect();
    Json(menu)
}

async fn model_handler(State(state): State<Arc<AppState>>) -> Json<VisualModel> {
    Json(state.model.read().await.clone())
}

/// A search target typed into a text field or sent as a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TargetField {
    Number(i64),
    Text(String),
}

/// Body of `POST /api/run`.
///
/// Values come from exactly one source, checked in this order: `values`,
/// the `size` and `elements` text fields, or `random` elements drawn from
/// `0..100`.
#[derive(Debug, Deserialize)]
struct StartRequest {
    algorithm: String,
    #[serde(default)]
    values: Option<Vec<i64>>,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    elements: Option<String>,
    #[serde(default)]
    random: Option<usize>,
    #[serde(default)]
    target: Option<TargetField>,
    #[serde(default = "default_visualize")]
    visualize: bool,
}

fn default_visualize() -> bool {
    true
}

impl StartRequest {
    fn into_run_request<R: Rng + ?Sized>(self, max_len: usize, rng: &mut R) -> ApiResult<RunRequest> {
        let algorithm: AlgorithmId = self.algorithm.parse()?;

        let values = match (self.values, self.size, self.elements, self.random) {
            (Some(values), ..) => values,
            (None, Some(size), Some(elements), _) => input::parse_values(&size, &elements, max_len)?,
            (None, _, _, Some(size)) => {
                if size == 0 || size > max_len {
                    return Err(ApiError::BadRequest(format!(
                        "random size must be between 1 and {max_len}"
                    )));
                }
                let mut values = input::random_values(size, rng);
                if algorithm == AlgorithmId::BinarySearch {
                    values.sort_unstable();
                }
                values
            }
            _ => {
                return Err(ApiError::BadRequest(
                    "provide values, size and elements, or a random size".into(),
                ))
            }
        };

        let mut request = RunRequest::new(algorithm, values).visualize(self.visualize);
        match self.target {
            Some(TargetField::Number(target)) => request = request.with_target(target),
            Some(TargetField::Text(text)) if !text.trim().is_empty() => {
                request = request.with_target(input::parse_target(&text)?);
            }
            _ => {}
        }
        Ok(request)
    }
}

/// Accepted run, echoing the input actually used.
#[derive(Debug, Serialize)]
struct RunStarted {
    algorithm: AlgorithmId,
    values: Vec<i64>,
    target: Option<i64>,
    visualize: bool,
}

async fn run_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartRequest>,
) -> ApiResult<Json<RunStarted>> {
    let max_len = state.session.lock().await.config().max_len;
    let request = req.into_run_request(max_len, &mut rand::thread_rng())?;
    Ok(Json(state.start(request).await?))
}

async fn cancel_handler(State(state): State<Arc<AppState>>) -> ApiResult<Json<StatusResponse>> {
    state.session.lock().await.cancel_run()?;
    Ok(status_handler(State(state)).await)
}

async fn playback_status_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PlaybackStatus>> {
    Ok(Json(state.playback().await?))
}

async fn play_handler(State(state): State<Arc<AppState>>) -> ApiResult<Json<PlaybackStatus>> {
    state.session.lock().await.play()?;
    Ok(Json(state.playback().await?))
}

async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult<Json<PlaybackStatus>> {
    state.session.lock().await.pause()?;
    Ok(Json(state.playback().await?))
}

async fn step_handler(State(state): State<Arc<AppState>>) -> ApiResult<Json<PlaybackStatus>> {
    state.session.lock().await.step()?;
    Ok(Json(state.playback().await?))
}

#[derive(Debug, Serialize)]
struct ResetResponse {
    values: Option<Vec<i64>>,
}

async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<ResetResponse> {
    Json(ResetResponse {
        values: state.reset().await,
    })
}

#[derive(Debug, Deserialize)]
struct SpeedRequest {
    speed: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct SpeedResponse {
    pub(crate) speed: AnimationSpeed,
}

async fn speed_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpeedRequest>,
) -> Json<SpeedResponse> {
    let speed = state.session.lock().await.set_speed(req.speed);
    Json(SpeedResponse { speed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoviz_engine::input::RANDOM_VALUE_LIMIT;
    use algoviz_engine::{AlgoResult, ColorTag, PlaybackState};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn server() -> VisServer {
        VisServer::new(EngineConfig::instant())
    }

    fn start(algorithm: &str, values: Vec<i64>) -> StartRequest {
        StartRequest {
            algorithm: algorithm.into(),
            values: Some(values),
            size: None,
            elements: None,
            random: None,
            target: None,
            visualize: true,
        }
    }

    /// Wait until the render loop has applied a terminal event.
    async fn settled_model(state: &Arc<AppState>) -> VisualModel {
        for _ in 0..400 {
            let model = state.model.read().await.clone();
            if matches!(
                model.state,
                RunState::Completed | RunState::Cancelled | RunState::Failed
            ) {
                return model;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("run never reached a terminal state");
    }

    #[test]
    fn router_builds() {
        let _router = server().router();
    }

    #[test]
    fn start_request_reads_text_fields() {
        let req: StartRequest = serde_json::from_str(
            r#"{"algorithm": "binary search", "size": "4", "elements": "1 3 5 7", "target": "5"}"#,
        )
        .unwrap();
        let request = req
            .into_run_request(1000, &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(request.algorithm, AlgorithmId::BinarySearch);
        assert_eq!(request.values, vec![1, 3, 5, 7]);
        assert_eq!(request.target, Some(5));
        assert!(request.visualize);
    }

    #[test]
    fn start_request_rejects_bad_input() {
        let mut rng = StdRng::seed_from_u64(2);

        let mismatched = StartRequest {
            values: None,
            size: Some("3".into()),
            elements: Some("1 2".into()),
            ..start("bubble-sort", Vec::new())
        };
        assert!(mismatched.into_run_request(1000, &mut rng).is_err());

        let unknown = start("bogo-sort", vec![1]).into_run_request(1000, &mut rng);
        assert!(matches!(
            unknown,
            Err(ApiError::Engine(Error::UnknownAlgorithm(_)))
        ));

        let too_many = StartRequest {
            values: None,
            random: Some(5000),
            ..start("heap-sort", Vec::new())
        };
        assert!(matches!(
            too_many.into_run_request(1000, &mut rng),
            Err(ApiError::BadRequest(_))
        ));

        let empty = StartRequest {
            values: None,
            ..start("heap-sort", Vec::new())
        };
        assert!(matches!(
            empty.into_run_request(1000, &mut rng),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn random_input_for_binary_search_is_sorted() {
        let req = StartRequest {
            values: None,
            random: Some(30),
            target: Some(TargetField::Number(4)),
            ..start("binary-search", Vec::new())
        };
        let request = req
            .into_run_request(1000, &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(request.values.len(), 30);
        assert!(algoviz_engine::algorithms::is_sorted(&request.values));
        assert!(request.values.iter().all(|v| (0..RANDOM_VALUE_LIMIT).contains(v)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn run_updates_model_and_broadcasts() {
        let server = server();
        let state = server.state();
        let mut events = state.events.subscribe();

        let Json(started) = run_handler(State(state.clone()), Json(start("insertion-sort", vec![4, 2, 3, 1])))
            .await
            .unwrap();
        assert_eq!(started.values, vec![4, 2, 3, 1]);

        let model = settled_model(&state).await;
        assert_eq!(model.values(), vec![1, 2, 3, 4]);
        assert!(model.elements.iter().all(|e| e.tag == ColorTag::Sorted));
        assert_eq!(model.result, Some(AlgoResult::Sorted));

        let mut last = None;
        while let Ok(event) = events.try_recv() {
            last = Some(event);
        }
        assert!(matches!(last, Some(VisEvent::Completed { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn headless_run_shows_final_values() {
        let state = server().state();
        let request = StartRequest {
            visualize: false,
            ..start("quick-sort", vec![3, 1, 2])
        };

        run_handler(State(state.clone()), Json(request)).await.unwrap();

        let model = settled_model(&state).await;
        assert_eq!(model.state, RunState::Completed);
        assert_eq!(model.values(), vec![1, 2, 3]);
        assert_eq!(model.result, Some(AlgoResult::Sorted));
    }

    #[tokio::test]
    async fn next_run_starts_after_completion_on_one_thread() {
        let state = server().state();
        run_handler(State(state.clone()), Json(start("selection-sort", vec![2, 3, 1])))
            .await
            .unwrap();
        settled_model(&state).await;

        let mut started = None;
        for _ in 0..400 {
            match run_handler(State(state.clone()), Json(start("merge-sort", vec![5, 4]))).await {
                Err(ApiError::Engine(Error::RunInProgress)) => {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
                other => {
                    started = Some(other);
                    break;
                }
            }
        }
        assert!(matches!(started, Some(Ok(_))));
        let model = settled_model(&state).await;
        assert_eq!(model.values(), vec![4, 5]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn playback_commands_need_a_run() {
        let state = server().state();
        let err = play_handler(State(state.clone())).await.unwrap_err();
        assert!(matches!(err, ApiError::Engine(Error::NoActiveRun)));
        assert!(cancel_handler(State(state.clone())).await.is_err());
        assert!(playback_status_handler(State(state)).await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn paused_run_steps_and_resets() {
        let server = VisServer::new(EngineConfig {
            start_paused: true,
            ..EngineConfig::instant()
        });
        let state = server.state();

        run_handler(State(state.clone()), Json(start("bubble-sort", vec![5, 4, 3, 2, 1])))
            .await
            .unwrap();

        let second = run_handler(State(state.clone()), Json(start("bubble-sort", vec![2, 1]))).await;
        assert!(matches!(
            second,
            Err(ApiError::Engine(Error::RunInProgress))
        ));

        let Json(status) = step_handler(State(state.clone())).await.unwrap();
        assert_ne!(status.state, PlaybackState::Running);

        let Json(reset) = reset_handler(State(state.clone())).await;
        assert_eq!(reset.values, Some(vec![5, 4, 3, 2, 1]));
        assert_eq!(state.model.read().await.values(), vec![5, 4, 3, 2, 1]);

        // The cancelled run must not repaint the model after the reset.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let model = state.model.read().await.clone();
        assert_eq!(model.values(), vec![5, 4, 3, 2, 1]);
        assert_eq!(model.state, RunState::NotStarted);
    }

    #[tokio::test]
    async fn speed_is_clamped() {
        let state = server().state();
        let Json(resp) = speed_handler(State(state.clone()), Json(SpeedRequest { speed: 50.0 })).await;
        assert_eq!(resp.speed.multiplier(), AnimationSpeed::MAX);

        let Json(status) = status_handler(State(state)).await;
        assert_eq!(status.speed.multiplier(), AnimationSpeed::MAX);
        assert!(!status.running);
    }

    #[test]
    fn algorithm_menu_lists_everything() {
        let Json(menu) = tokio_test::block_on(algorithms_handler());
        assert_eq!(menu.len(), AlgorithmId::ALL.len());
        assert!(menu.iter().all(|entry| !entry.pseudocode.is_empty()));
        assert!(menu
            .iter()
            .all(|entry| entry.explanations.len() == entry.pseudocode.len()));
        let searches = menu
            .iter()
            .filter(|entry| entry.kind == AlgorithmKind::Search)
            .count();
        assert_eq!(searches, 2);
    }
}
