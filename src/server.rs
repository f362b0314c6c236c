//! HTTP surface consumed by the personal website.
//!
//! Each route answers with exactly one JSON body. Relay failures are logged with the full
//! error and collapsed into a static `{"message": ...}` payload.

// std
use std::time::Duration as StdDuration;
// crates.io
use axum::{
	Json, Router,
	extract::State,
	http::{HeaderValue, Method, StatusCode, header},
	response::{IntoResponse, Response},
	routing::get,
};
use tokio::net::TcpListener;
use tower_http::{
	cors::{AllowOrigin, CorsLayer},
	trace::TraceLayer,
};
// self
use crate::{_prelude::*, config::RelayConfig, error::TransportError, flows::ReqwestRelay};

/// Body of `/v1/description`.
pub const DESCRIPTION: &str = "Nestor Rubio's personal API :) <3";

const PROFILE_FAILURE: &str = "Unable to get Nestor's Spotify info";
const NOT_LISTENING: &str = "Nestor's currently not listening to Spotify music";
const CURRENTLY_PLAYING_FAILURE: &str = "Unable to get Nestor's currently playing Spotify Song";
const TOP_TRACKS_FAILURE: &str = "Unable to get Nestor's top Spotify tracks";
const RECENTLY_PLAYED_FAILURE: &str = "Unable to get Nestor's recently played Spotify track";
const ACTIVITY_FAILURE: &str = "Unable to get Nestor's Spotify activity";
const CORS_MAX_AGE: StdDuration = StdDuration::from_secs(12 * 60 * 60);

type SharedRelay = Arc<ReqwestRelay>;

#[derive(Debug, Serialize)]
struct Message {
	message: &'static str,
}

/// Builds the application router.
pub fn router(relay: SharedRelay, cors: CorsLayer) -> Router {
	Router::new()
		.route("/nestor/spotify", get(activity))
		.route("/nestor/spotify/profile", get(profile))
		.route("/nestor/spotify/currently-playing", get(currently_playing))
		.route("/nestor/spotify/top-tracks", get(top_tracks))
		.route("/nestor/spotify/recently-played", get(recently_played))
		.route("/v1/healthcheck", get(healthcheck))
		.route("/v1/description", get(description))
		.layer(TraceLayer::new_for_http())
		.layer(cors)
		.with_state(relay)
}

/// CORS policy for the website origins.
pub fn cors_layer(origins: Vec<HeaderValue>) -> CorsLayer {
	CorsLayer::new()
		.allow_origin(AllowOrigin::list(origins))
		.allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH])
		.allow_headers([header::ORIGIN])
		.expose_headers([header::CONTENT_LENGTH])
		.allow_credentials(true)
		.max_age(CORS_MAX_AGE)
}

/// Binds the configured address and serves until Ctrl-C or SIGTERM.
pub async fn serve(config: RelayConfig) -> Result<()> {
	let relay = Arc::new(config.build_relay()?);
	let app = router(relay, cors_layer(config.cors_origins.clone()));
	let listener = TcpListener::bind(config.listen_addr).await.map_err(TransportError::Io)?;

	tracing::info!(addr = %config.listen_addr, "Spotify relay listening.");

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await
		.map_err(TransportError::Io)?;

	tracing::info!("Spotify relay stopped.");

	Ok(())
}

async fn healthcheck() -> Json<Message> {
	Json(Message { message: "ok" })
}

async fn description() -> Json<Message> {
	Json(Message { message: DESCRIPTION })
}

async fn profile(State(relay): State<SharedRelay>) -> Response {
	match relay.profile().await {
		Ok(profile) => Json(profile).into_response(),
		Err(err) => failure("profile", &err, PROFILE_FAILURE),
	}
}

async fn currently_playing(State(relay): State<SharedRelay>) -> Response {
	match relay.currently_playing().await {
		Ok(Some(playing)) => Json(playing).into_response(),
		Ok(None) => message(StatusCode::NOT_FOUND, NOT_LISTENING),
		Err(err) => failure("currently_playing", &err, CURRENTLY_PLAYING_FAILURE),
	}
}

async fn top_tracks(State(relay): State<SharedRelay>) -> Response {
	match relay.top_tracks().await {
		Ok(tracks) => Json(tracks).into_response(),
		Err(err) => failure("top_tracks", &err, TOP_TRACKS_FAILURE),
	}
}

async fn recently_played(State(relay): State<SharedRelay>) -> Response {
	match relay.recently_played().await {
		Ok(history) => Json(history).into_response(),
		Err(err) => failure("recently_played", &err, RECENTLY_PLAYED_FAILURE),
	}
}

async fn activity(State(relay): State<SharedRelay>) -> Response {
	match relay.activity().await {
		Ok(activity) => Json(activity).into_response(),
		Err(err) => failure("activity", &err, ACTIVITY_FAILURE),
	}
}

fn failure(route: &'static str, err: &Error, text: &'static str) -> Response {
	tracing::warn!(route, error = %err, "Relay request failed.");

	message(StatusCode::INTERNAL_SERVER_ERROR, text)
}

fn message(status: StatusCode, text: &'static str) -> Response {
	(status, Json(Message { message: text })).into_response()
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(err) = tokio::signal::ctrl_c().await {
			tracing::warn!(error = %err, "Failed to install the Ctrl-C handler.");

			std::future::pending::<()>().await;
		}
	};
	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			},
			Err(err) => {
				tracing::warn!(error = %err, "Failed to install the SIGTERM handler.");

				std::future::pending::<()>().await;
			},
		}
	};
	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	tracing::info!("Shutdown signal received.");
}
