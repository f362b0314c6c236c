//! Fixtures shared by the integration tests.

#![allow(dead_code)]

// crates.io
use httpmock::{Mock, prelude::*};
use serde_json::{Value, json};
// self
use spotify_relay::{
	auth::{AccountId, UserId},
	flows::ReqwestRelay,
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	provider::ProviderDescriptor,
	reqwest::Client,
	url::Url,
};

pub const CLIENT_ID: &str = "client-relay";
pub const CLIENT_SECRET: &str = "secret-relay";
pub const PRIMARY_REFRESH: &str = "refresh-primary";
pub const RECENT_REFRESH: &str = "refresh-recent";
pub const PRIMARY_ACCESS: &str = "access-primary";
pub const RECENT_ACCESS: &str = "access-recent";
pub const PROFILE_USER: &str = "rubiones2001";
pub const TOKEN_PATH: &str = "/api/token";

/// Descriptor pointing both endpoints at the mock server.
pub fn build_descriptor(server: &MockServer) -> ProviderDescriptor {
	ProviderDescriptor::builder()
		.token_endpoint(
			Url::parse(&server.url(TOKEN_PATH)).expect("Mock token endpoint should parse."),
		)
		.api_base(Url::parse(&server.url("/v1")).expect("Mock API base should parse."))
		.build()
		.expect("Mock provider descriptor should build.")
}

/// Reqwest transport that trusts the self-signed certificate served by `httpmock`.
pub fn mock_http_client() -> ReqwestHttpClient {
	let client = Client::builder()
		.danger_accept_invalid_certs(true)
		.build()
		.expect("Insecure reqwest client should build for tests.");

	ReqwestHttpClient::with_client(client)
}

/// Relay wired to the mock server with both account slots registered.
pub fn build_relay(server: &MockServer) -> ReqwestRelay {
	ReqwestRelay::with_http_client(
		build_descriptor(server),
		CLIENT_ID,
		CLIENT_SECRET,
		UserId::new(PROFILE_USER).expect("Profile user fixture should be valid."),
		mock_http_client(),
		ReqwestTransportErrorMapper,
	)
	.with_refresh_token(AccountId::primary(), PRIMARY_REFRESH)
	.with_refresh_token(AccountId::recent(), RECENT_REFRESH)
}

/// Token endpoint answering `refresh_token` with `access_token`.
pub async fn mock_token<'a>(
	server: &'a MockServer,
	refresh_token: &str,
	access_token: &str,
	scope: &str,
) -> Mock<'a> {
	let mut body = json!({
		"access_token": access_token,
		"token_type": "Bearer",
		"expires_in": 3600,
	});

	if !scope.is_empty() {
		body["scope"] = Value::from(scope);
	}

	server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.form_urlencoded_tuple("grant_type", "refresh_token")
				.form_urlencoded_tuple("refresh_token", refresh_token);
			then.status(200).header("content-type", "application/json").json_body(body);
		})
		.await
}

/// API endpoint answering a bearer-authorized GET.
pub async fn mock_api<'a>(
	server: &'a MockServer,
	path: &str,
	access_token: &str,
	status: u16,
	body: Value,
) -> Mock<'a> {
	let path = format!("/v1{path}");
	let authorization = format!("Bearer {access_token}");

	server
		.mock_async(|when, then| {
			when.method(GET).path(path).header("authorization", authorization);
			then.status(status).header("content-type", "application/json").json_body(body);
		})
		.await
}

pub fn track_json(name: &str) -> Value {
	json!({
		"name": name,
		"artists": [{ "name": "Rosalía", "id": "7ltDVBr6mKbRvohxheJ9h1" }],
		"album": {
			"name": "MOTOMAMI",
			"images": [
				{ "url": "https://i.scdn.co/image/640", "height": 640, "width": 640 },
				{ "url": "https://i.scdn.co/image/unknown", "height": null, "width": null },
			],
		},
		"duration_ms": 187_000,
	})
}
