//! Algoviz Visualization Server
//!
//! Drive sorting and searching runs from a browser with playback controls.
//!
//! # Architecture
//!
//! - **REST API**: Start runs, control playback, read the current model
//! - **Render loop**: One tokio task per run applies events to the shared model
//! - **WebSocket**: Streams every applied event and accepts playback commands
//!
//! # Usage
//!
//! ```ignore
//! let server = VisServer::new(EngineConfig::from_env());
//! server.serve("0.0.0.0:3000".parse()?).await?;
//! ```

mod error;
mod server;
mod ws;

pub use error::{ApiError, ApiResult};
pub use server::{AppState, VisServer};
