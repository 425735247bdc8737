//! WebSocket streaming of run events.
//!
//! Each client first receives the current model, then every event the
//! render loop applies, in order. Clients may send playback commands on the
//! same socket.

use std::sync::Arc;

use algoviz_engine::{AnimationSpeed, PlaybackStatus, VisEvent, VisualModel};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::server::AppState;

/// Commands accepted from clients.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum WsCommand {
    Play,
    Pause,
    Step,
    Reset,
    GetModel,
    GetPlayback,
    SetSpeed { speed: f64 },
}

/// Messages sent to clients.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum WsResponse {
    Model(VisualModel),
    Playback(PlaybackStatus),
    Speed { speed: AnimationSpeed },
    Reset { values: Option<Vec<i64>> },
    Event { event: VisEvent },
    Error { message: String },
}

pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket client connected");

    // Subscribe before the snapshot so nothing falls between the two.
    let mut events = state.events.subscribe();
    let snapshot = WsResponse::Model(state.model.read().await.clone());
    if send(&mut socket, &snapshot).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = match serde_json::from_str::<WsCommand>(&text) {
                            Ok(cmd) => handle_command(&state, cmd).await,
                            Err(e) => WsResponse::Error {
                                message: format!("unrecognized command: {e}"),
                            },
                        };
                        if send(&mut socket, &response).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = socket.send(Message::Pong(data)).await {
                            warn!("Failed to send pong: {}", e);
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
            event = events.recv() => {
                let response = match event {
                    Ok(event) => WsResponse::Event { event },
                    Err(RecvError::Lagged(skipped)) => {
                        // Resynchronize from the model rather than replaying.
                        debug!(skipped, "WebSocket client lagged");
                        WsResponse::Model(state.model.read().await.clone())
                    }
                    Err(RecvError::Closed) => break,
                };
                if send(&mut socket, &response).await.is_err() {
                    break;
                }
            }
        }
    }
}

async fn send(socket: &mut WebSocket, response: &WsResponse) -> Result<(), axum::Error> {
    match serde_json::to_string(response) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(e) => {
            warn!("Failed to encode WebSocket message: {}", e);
            Ok(())
        }
    }
}

pub(crate) async fn handle_command(state: &AppState, cmd: WsCommand) -> WsResponse {
    let applied = {
        let session = state.session.lock().await;
        match cmd {
            WsCommand::Play => session.play(),
            WsCommand::Pause => session.pause(),
            WsCommand::Step => session.step(),
            WsCommand::SetSpeed { speed } => {
                return WsResponse::Speed {
                    speed: session.set_speed(speed),
                };
            }
            WsCommand::GetPlayback => Ok(()),
            WsCommand::GetModel => {
                drop(session);
                return WsResponse::Model(state.model.read().await.clone());
            }
            WsCommand::Reset => {
                drop(session);
                return WsResponse::Reset {
                    values: state.reset().await,
                };
            }
        }
    };

    match applied {
        Ok(()) => match state.playback().await {
            Ok(status) => WsResponse::Playback(status),
            Err(e) => WsResponse::Error {
                message: e.to_string(),
            },
        },
        Err(e) => WsResponse::Error {
            message: e.to_string(),
        },
    }
}
