//! Axum web server with WebSocket streaming for playback.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use stepwise_algorithms::{Request, Run, Structures};
use stepwise_playback::{
    PlaybackConfig, PlaybackEvent, PlaybackStatus, Player, RunId, Transport, VisualState,
};
use stepwise_trace::{AlgorithmFamily, Baseline, LogBuilder, OperationLog, Outcome};
use tokio::sync::{broadcast::error::RecvError, RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

use crate::config::VisConfig;
use crate::error::Result;
use crate::scenarios::{MemoryScenarios, ScenarioStore};

/// Shared application state.
pub struct AppState {
    structures: RwLock<Structures>,
    player: Player,
    scenarios: Arc<dyn ScenarioStore>,
}

/// Visualization server.
pub struct VisServer {
    state: Arc<AppState>,
}

impl VisServer {
    /// Create a server with the sample scenarios. Must be called inside a
    /// tokio runtime, since it spawns the player task.
    pub fn new(config: &VisConfig) -> Self {
        Self::with_store(&config.playback, Arc::new(MemoryScenarios::with_samples()))
    }

    /// Create a server backed by `scenarios`.
    pub fn with_store(playback: &PlaybackConfig, scenarios: Arc<dyn ScenarioStore>) -> Self {
        let idle = LogBuilder::new(AlgorithmFamily::Sort, Baseline::Empty).finish();
        let (player, _task) = Player::spawn(playback.clone(), idle);
        Self {
            state: Arc::new(AppState {
                structures: RwLock::new(Structures::default()),
                player,
                scenarios,
            }),
        }
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/status", get(status_handler))
            .route("/api/run", post(run_handler))
            .route("/api/state", get(state_handler))
            .route("/api/log", get(log_handler))
            .route("/api/playback", get(playback_status_handler))
            .route("/api/playback/play", post(play_handler))
            .route("/api/playback/pause", post(pause_handler))
            .route("/api/playback/reset", post(reset_handler))
            .route("/api/playback/step", post(step_handler))
            .route("/api/playback/skip", post(skip_handler))
            .route("/api/playback/speed", post(speed_handler))
            .route("/api/scenarios", get(list_scenarios_handler))
            .route(
                "/api/scenarios/{name}",
                get(get_scenario_handler)
                    .put(put_scenario_handler)
                    .delete(delete_scenario_handler),
            )
            .route("/api/scenarios/{name}/run", post(run_scenario_handler))
            // WebSocket for real-time updates
            .route("/ws", get(ws_handler))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server on the given port.
    pub async fn serve(self, port: u16) -> std::result::Result<(), std::io::Error> {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Playback server running on http://localhost:{}", port);
        axum::serve(listener, self.router()).await
    }
}

/// Server status response.
#[derive(Debug, Serialize, Deserialize)]
struct StatusResponse {
    status: String,
    run: RunId,
    family: AlgorithmFamily,
    total_steps: usize,
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>> {
    let log = state.player.log().await?;
    let status = state.player.status().await?;
    Ok(Json(StatusResponse {
        status: "ok".into(),
        run: status.run,
        family: log.family(),
        total_steps: log.len(),
    }))
}

/// Result of running a request.
#[derive(Debug, Serialize, Deserialize)]
struct RunResponse {
    run: RunId,
    family: AlgorithmFamily,
    total_steps: usize,
    /// Why the operation was rejected, if it was
    failure: Option<String>,
    status: PlaybackStatus,
}

/// Run `request` against the current structures and load its log.
///
/// The write guard is held until the player has the log, so concurrent runs
/// commit and install in the same order.
async fn run_request(state: &AppState, request: &Request) -> Result<RunResponse> {
    let mut structures = state.structures.write().await;
    let Run { log, output } = structures.run(request);

    let failure = match log.outcome() {
        Outcome::Failed { reason } => {
            warn!(family = ?request.family(), %reason, "operation failed");
            Some(reason.clone())
        }
        Outcome::Completed => None,
    };
    let family = log.family();
    let total_steps = log.len();

    let run = state.player.load(log).await?;
    *structures = output;
    drop(structures);

    let status = state.player.status().await?;
    debug!(run = run.0, total_steps, "run loaded");

    Ok(RunResponse {
        run,
        family,
        total_steps,
        failure,
        status,
    })
}

async fn run_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<Request>,
) -> Result<Json<RunResponse>> {
    Ok(Json(run_request(&state, &request).await?))
}

async fn state_handler(State(state): State<Arc<AppState>>) -> Result<Json<VisualState>> {
    Ok(Json(state.player.visual_state().await?))
}

async fn log_handler(State(state): State<Arc<AppState>>) -> Result<Json<OperationLog>> {
    let log = state.player.log().await?;
    Ok(Json(OperationLog::clone(&log)))
}

async fn playback_status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PlaybackStatus>> {
    Ok(Json(state.player.status().await?))
}

async fn transport(state: &AppState, transport: Transport) -> Result<Json<PlaybackStatus>> {
    Ok(Json(state.player.command(transport).await?))
}

async fn play_handler(State(state): State<Arc<AppState>>) -> Result<Json<PlaybackStatus>> {
    transport(&state, Transport::Play).await
}

async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<PlaybackStatus>> {
    transport(&state, Transport::Pause).await
}

async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<PlaybackStatus>> {
    transport(&state, Transport::Reset).await
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Direction {
    Forward,
    Backward,
}

#[derive(Deserialize)]
struct StepRequest {
    direction: Direction,
}

async fn step_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StepRequest>,
) -> Result<Json<PlaybackStatus>> {
    let command = match req.direction {
        Direction::Forward => Transport::StepForward,
        Direction::Backward => Transport::StepBackward,
    };
    transport(&state, command).await
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Edge {
    Beginning,
    End,
}

#[derive(Deserialize)]
struct SkipRequest {
    to: Edge,
}

async fn skip_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SkipRequest>,
) -> Result<Json<PlaybackStatus>> {
    let command = match req.to {
        Edge::Beginning => Transport::SkipToBeginning,
        Edge::End => Transport::SkipToEnd,
    };
    transport(&state, command).await
}

#[derive(Deserialize)]
struct SpeedRequest {
    speed: f64,
}

async fn speed_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpeedRequest>,
) -> Result<Json<PlaybackStatus>> {
    transport(&state, Transport::SetSpeed(req.speed)).await
}

async fn list_scenarios_handler(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>> {
    Ok(Json(state.scenarios.list()?))
}

async fn get_scenario_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Request>> {
    Ok(Json(state.scenarios.load(&name)?))
}

async fn put_scenario_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(request): Json<Request>,
) -> Result<StatusCode> {
    state.scenarios.save(&name, request)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_scenario_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode> {
    state.scenarios.delete(&name)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn run_scenario_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<RunResponse>> {
    let request = state.scenarios.load(&name)?;
    Ok(Json(run_request(&state, &request).await?))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsCommand {
    GetStatus,
    GetState,
    Transport(Transport),
    Run { request: Request },
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsMessage {
    Status(PlaybackStatus),
    State(VisualState),
    Event(PlaybackEvent),
    Error { message: String },
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket client connected");
    let mut frames = state.player.subscribe();

    // Initial status and state
    for command in [WsCommand::GetStatus, WsCommand::GetState] {
        let message = handle_ws_command(&state, command).await;
        if !send(&mut socket, &message).await {
            return;
        }
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match serde_json::from_str::<WsCommand>(text.as_str()) {
                            Ok(command) => handle_ws_command(&state, command).await,
                            Err(e) => WsMessage::Error { message: e.to_string() },
                        };
                        if !send(&mut socket, &reply).await {
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
            event = frames.recv() => {
                match event {
                    Ok(event) => {
                        if !send(&mut socket, &WsMessage::Event(event)).await {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "WebSocket client lagging, frames dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }
}

async fn handle_ws_command(state: &AppState, command: WsCommand) -> WsMessage {
    let result = match command {
        WsCommand::GetStatus => state.player.status().await.map(WsMessage::Status),
        WsCommand::GetState => state.player.visual_state().await.map(WsMessage::State),
        WsCommand::Transport(transport) => {
            state.player.command(transport).await.map(WsMessage::Status)
        }
        WsCommand::Run { request } => {
            return match run_request(state, &request).await {
                Ok(response) => WsMessage::Status(response.status),
                Err(e) => WsMessage::Error {
                    message: e.to_string(),
                },
            };
        }
    };
    result.unwrap_or_else(|e| WsMessage::Error {
        message: e.to_string(),
    })
}

/// Send one message; false once the socket is unusable.
async fn send(socket: &mut WebSocket, message: &WsMessage) -> bool {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize message: {}", e);
            return true;
        }
    };
    match socket.send(Message::Text(json.into())).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to send message: {}", e);
            false
        }
    }
}
