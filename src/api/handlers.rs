//! Request handlers for the API endpoints.

use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio::sync::broadcast;
use tracing::{debug, error};

use super::AppState;
use super::types::{
    CloudsRequest, ControlResponse, ErrorResponse, HealthResponse, IndustrialRequest,
    ResetResponse, StatusResponse, StreamMessage, TemperatureRequest, WindRequest,
};
use crate::sim::{GridState, PlantInfo};

/// `GET /` → 200 health check.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "online",
        message: "Renewable Grid Simulator API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /api/status` → 200 + transport status.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let total_ticks = state.session.lock().engine.clock().total_ticks();
    Json(StatusResponse {
        api: "operational",
        simulation: "running",
        stream: "sse",
        total_ticks,
        subscribers: state.updates.receiver_count(),
    })
}

/// `GET /api/state` → latest snapshot, ticking once if none exists yet.
pub async fn get_state(State(state): State<AppState>) -> Json<GridState> {
    Json(state.latest_or_advance())
}

/// `POST /api/tick` → advances one tick and returns the snapshot.
pub async fn tick(State(state): State<AppState>) -> Json<GridState> {
    Json(state.advance())
}

/// `POST /api/reset` → rebuilds the engine from the stored config.
pub async fn reset(
    State(state): State<AppState>,
) -> Result<Json<ResetResponse>, (StatusCode, Json<ErrorResponse>)> {
    state.reset().map_err(|e| {
        error!("reset failed: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;
    Ok(Json(ResetResponse {
        status: "reset",
        message: "Simulation reset to initial state",
    }))
}

/// `POST /api/control/wind` `{wind_speed}` → clamped speed.
pub async fn control_wind(
    State(state): State<AppState>,
    Json(req): Json<WindRequest>,
) -> Json<ControlResponse> {
    let mut session = state.session.lock();
    session.engine.set_wind(req.wind_speed);
    Json(ControlResponse {
        wind_speed: Some(session.engine.weather().conditions().wind_speed()),
        ..ControlResponse::ok()
    })
}

/// `POST /api/control/clouds` `{cloud_cover}` → clamped cover.
pub async fn control_clouds(
    State(state): State<AppState>,
    Json(req): Json<CloudsRequest>,
) -> Json<ControlResponse> {
    let mut session = state.session.lock();
    session.engine.set_clouds(req.cloud_cover);
    Json(ControlResponse {
        cloud_cover: Some(session.engine.weather().conditions().cloud_cover()),
        ..ControlResponse::ok()
    })
}

/// `POST /api/control/temperature` `{temperature}` → clamped temperature.
pub async fn control_temperature(
    State(state): State<AppState>,
    Json(req): Json<TemperatureRequest>,
) -> Json<ControlResponse> {
    let mut session = state.session.lock();
    session.engine.set_temperature(req.temperature);
    Json(ControlResponse {
        temperature: Some(session.engine.weather().conditions().temperature()),
        ..ControlResponse::ok()
    })
}

/// `POST /api/control/industrial` `{enabled}`.
pub async fn control_industrial(
    State(state): State<AppState>,
    Json(req): Json<IndustrialRequest>,
) -> Json<ControlResponse> {
    let mut session = state.session.lock();
    session.engine.set_industrial(req.enabled);
    Json(ControlResponse {
        industrial_enabled: Some(session.engine.demand().industrial_enabled()),
        ..ControlResponse::ok()
    })
}

/// `POST /api/scenario/storm`.
pub async fn scenario_storm(State(state): State<AppState>) -> Json<ControlResponse> {
    let mut session = state.session.lock();
    session.engine.trigger_storm();
    Json(scenario_response("storm", &session.engine))
}

/// `POST /api/scenario/calm`.
pub async fn scenario_calm(State(state): State<AppState>) -> Json<ControlResponse> {
    let mut session = state.session.lock();
    session.engine.trigger_calm();
    Json(scenario_response("calm", &session.engine))
}

fn scenario_response(scenario: &'static str, engine: &crate::sim::SimulationEngine) -> ControlResponse {
    let conditions = engine.weather().conditions();
    ControlResponse {
        scenario: Some(scenario),
        wind_speed: Some(conditions.wind_speed()),
        cloud_cover: Some(conditions.cloud_cover()),
        ..ControlResponse::ok()
    }
}

/// `GET /api/info` → static plant description.
pub async fn info(State(state): State<AppState>) -> Json<PlantInfo> {
    Json(state.session.lock().engine.info())
}

/// `GET /api/stream` → SSE of `state_update` messages.
///
/// A new subscriber first receives the latest snapshot, if any. A subscriber
/// that falls behind skips the missed snapshots and resumes with the next one.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>> {
    let (initial, mut rx) = state.subscribe();
    debug!(subscribers = state.updates.receiver_count(), "stream subscriber connected");

    let stream = async_stream::stream! {
        if let Some(event) = initial.as_ref().and_then(state_event) {
            yield Ok(event);
        }
        loop {
            match rx.recv().await {
                Ok(snapshot) => {
                    if let Some(event) = state_event(&snapshot) {
                        yield Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "stream subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        debug!("stream subscriber disconnected");
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

/// Wraps a snapshot in a `state_update` SSE event.
fn state_event(snapshot: &GridState) -> Option<Event> {
    match serde_json::to_string(&StreamMessage::state_update(snapshot)) {
        Ok(data) => Some(Event::default().data(data)),
        Err(err) => {
            error!("snapshot serialization failed: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::config::ScenarioConfig;

    fn make_test_state() -> AppState {
        AppState::new(ScenarioConfig::baseline()).expect("baseline is valid")
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_owned()))
            .expect("request should build")
    }

    #[tokio::test]
    async fn get_state_ticks_once_when_empty() {
        let state = make_test_state();
        let app = router(state.clone());
        let response = app
            .oneshot(Request::get("/api/state").body(Body::empty()).expect("request"))
            .await
            .expect("router is infallible");

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["tick"], 0);
        assert_eq!(state.session.lock().engine.clock().total_ticks(), 1);
    }

    #[tokio::test]
    async fn get_state_returns_latest_without_ticking() {
        let state = make_test_state();
        state.advance();
        state.advance();
        let response = router(state.clone())
            .oneshot(Request::get("/api/state").body(Body::empty()).expect("request"))
            .await
            .expect("router is infallible");

        let json = json_body(response).await;
        assert_eq!(json["tick"], 1);
        assert_eq!(state.session.lock().engine.clock().total_ticks(), 2);
    }

    #[tokio::test]
    async fn control_wind_clamps_speed() {
        let state = make_test_state();
        let response = router(state)
            .oneshot(post_json("/api/control/wind", r#"{"wind_speed": 45.0}"#))
            .await
            .expect("router is infallible");

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["wind_speed"], 30.0);
    }

    #[tokio::test]
    async fn malformed_control_body_is_rejected() {
        let response = router(make_test_state())
            .oneshot(post_json("/api/control/clouds", r#"{"cover": 0.5}"#))
            .await
            .expect("router is infallible");

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn reset_rebuilds_engine() {
        let state = make_test_state();
        state.advance();
        state.session.lock().engine.set_industrial(false);

        let response = router(state.clone())
            .oneshot(post_json("/api/reset", ""))
            .await
            .expect("router is infallible");

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "reset");

        let session = state.session.lock();
        assert_eq!(session.engine.clock().total_ticks(), 0);
        assert!(session.latest.is_none());
        assert!(session.engine.demand().industrial_enabled());
    }

    #[tokio::test]
    async fn stream_sends_latest_snapshot_on_connect() {
        let state = make_test_state();
        state.advance();
        let response = router(state.clone())
            .oneshot(Request::get("/api/stream").body(Body::empty()).expect("request"))
            .await
            .expect("router is infallible");
        assert_eq!(response.status(), StatusCode::OK);

        // Dropping the last sender closes the stream after the first event.
        drop(state);
        let bytes = tokio::time::timeout(
            Duration::from_secs(5),
            to_bytes(response.into_body(), usize::MAX),
        )
        .await
        .expect("stream should close")
        .expect("body should be readable");
        let body = String::from_utf8(bytes.to_vec()).expect("utf-8 body");

        let data = body
            .lines()
            .find_map(|l| l.strip_prefix("data: "))
            .expect("one data line");
        let json: serde_json::Value = serde_json::from_str(data).expect("event is JSON");
        assert_eq!(json["type"], "state_update");
        assert_eq!(json["data"]["tick"], 0);
    }

    #[tokio::test]
    async fn advance_publishes_to_subscribers() {
        let state = make_test_state();
        let mut rx = state.updates.subscribe();
        let sent = state.advance();
        let received = rx.recv().await.expect("snapshot should be delivered");
        assert_eq!(received.tick, sent.tick);
    }
}
