//! Endpoint handlers for the simulation boundary.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Compact HTML status page |
//! | `GET`  | `/state` | Snapshot of every agent |
//! | `POST` | `/step?count=n` | Advance `n` ticks, return the snapshot |
//! | `POST` | `/glitch` | Teleport a random fifth of the population |
//! | `POST` | `/observer` | Zero all momentum, force IDLE |
//! | `POST` | `/reset` | Rebuild the world with new dimensions |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::Html;
use serde::Deserialize;
use serde_json::{Value, json};
use socium_core::{AgentSnapshot, SimulationConfig};
use tracing::info;

use crate::AppState;
use crate::error::ApiError;

/// Upper bound on ticks per `/step` request.
pub const MAX_STEP_BURST: u32 = 1_000;

/// Query parameters for `POST /step`.
#[derive(Debug, Deserialize)]
pub struct StepQuery {
    /// Number of ticks to run; defaults to 1.
    pub count: Option<u32>,
}

/// Request body for `POST /reset`.
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
}

fn default_width() -> f32 {
    800.0
}

fn default_height() -> f32 {
    600.0
}

/// Serve a minimal status page for humans poking at the server.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let summary = {
        let sim = state.lock_simulation()?;
        sim.summary()
    };
    Ok(Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Socium</title></head>
<body style="font-family: monospace; background: #101418; color: #c8d0d8; padding: 2rem;">
  <h1>Socium</h1>
  <p>tick {tick} &middot; {agents} agents</p>
  <p>entropics {entropics} &middot; luminaries {luminaries} &middot; inert {inert}</p>
  <p>idle {idle} &middot; hunting {hunting} &middot; fleeing {fleeing}</p>
  <p>average energy {energy:.4}</p>
  <p><a href="/state" style="color:#6af;">/state</a></p>
</body>
</html>"#,
        tick = summary.tick.0,
        agents = summary.agent_count,
        entropics = summary.entropics,
        luminaries = summary.luminaries,
        inert = summary.inert,
        idle = summary.idle,
        hunting = summary.hunting,
        fleeing = summary.fleeing,
        energy = summary.average_energy,
    )))
}

/// Return the current snapshot of every agent.
pub async fn state(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AgentSnapshot>>, ApiError> {
    let sim = state.lock_simulation()?;
    Ok(Json(sim.snapshot()))
}

/// Advance the simulation and return the post-step snapshot.
pub async fn step(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StepQuery>,
) -> Result<Json<Vec<AgentSnapshot>>, ApiError> {
    let count = query.count.unwrap_or(1);
    if count == 0 || count > MAX_STEP_BURST {
        return Err(ApiError::InvalidInput(format!(
            "count must be between 1 and {MAX_STEP_BURST}"
        )));
    }
    let mut sim = state.lock_simulation()?;
    for _ in 0..count {
        sim.step();
    }
    Ok(Json(sim.snapshot()))
}

/// Trigger the glitch perturbation.
pub async fn glitch(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let mut sim = state.lock_simulation()?;
    sim.glitch();
    info!(tick = sim.tick().0, "glitch triggered");
    Ok(Json(json!({"status": "glitched"})))
}

/// Trigger the observer collapse perturbation.
pub async fn observer(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let mut sim = state.lock_simulation()?;
    sim.observer_collapse();
    info!(tick = sim.tick().0, "observer collapse triggered");
    Ok(Json(json!({"status": "observed"})))
}

/// Discard the current world and rebuild with the requested dimensions.
pub async fn reset(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResetRequest>,
) -> Result<Json<Value>, ApiError> {
    if !request.width.is_finite()
        || !request.height.is_finite()
        || request.width <= 0.0
        || request.height <= 0.0
    {
        return Err(ApiError::InvalidInput(
            "width and height must be positive".to_owned(),
        ));
    }
    let config = SimulationConfig {
        width: request.width,
        height: request.height,
        ..SimulationConfig::default()
    };
    let mut sim = state.lock_simulation()?;
    sim.reset(config, state.catalog().clone())
        .map_err(|err| ApiError::InvalidInput(err.to_string()))?;
    info!(
        width = request.width,
        height = request.height,
        "simulation reset"
    );
    Ok(Json(json!({
        "status": "reset",
        "width": request.width,
        "height": request.height,
    })))
}
