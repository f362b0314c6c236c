mod common;

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
// self
use common::*;
use spotify_relay::{
	auth::{AccountId, UserId},
	error::{ConfigError, Error, TransientError},
	flows::ReqwestRelay,
	oauth::ReqwestTransportErrorMapper,
	provider::{ClientAuthMethod, ProviderDescriptor},
};

#[tokio::test]
async fn refresh_posts_basic_auth_and_form_body() {
	let server = MockServer::start_async().await;
	let relay = build_relay(&server);
	let basic = format!("Basic {}", STANDARD.encode(format!("{CLIENT_ID}:{CLIENT_SECRET}")));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("authorization", basic)
				.form_urlencoded_tuple("grant_type", "refresh_token")
				.form_urlencoded_tuple("refresh_token", PRIMARY_REFRESH);
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"access-basic\",\"token_type\":\"bearer\",\"expires_in\":3600,\"scope\":\"user-top-read user-read-currently-playing\"}",
			);
		})
		.await;
	let before = OffsetDateTime::now_utc();
	let token = relay
		.refresh_access_token(&AccountId::primary())
		.await
		.expect("Refresh exchange should succeed.");

	mock.assert_async().await;

	assert_eq!(token.secret.expose(), "access-basic");
	assert_eq!(token.token_type, "Bearer");
	assert_eq!(token.account, AccountId::primary());
	assert!(token.scope.contains("user-top-read"));
	assert!(token.expires_at >= before + Duration::seconds(3600));
	assert_eq!(relay.refresh_metrics.attempts(), 1);
	assert_eq!(relay.refresh_metrics.successes(), 1);
}

#[tokio::test]
async fn client_secret_post_sends_credentials_in_the_body() {
	let server = MockServer::start_async().await;
	let descriptor = ProviderDescriptor {
		preferred_client_auth_method: ClientAuthMethod::ClientSecretPost,
		..build_descriptor(&server)
	};
	let relay = ReqwestRelay::with_http_client(
		descriptor,
		CLIENT_ID,
		CLIENT_SECRET,
		UserId::new(PROFILE_USER).expect("Profile user fixture should be valid."),
		mock_http_client(),
		ReqwestTransportErrorMapper,
	)
	.with_refresh_token(AccountId::recent(), RECENT_REFRESH);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.form_urlencoded_tuple("client_id", CLIENT_ID)
				.form_urlencoded_tuple("client_secret", CLIENT_SECRET)
				.form_urlencoded_tuple("refresh_token", RECENT_REFRESH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"access-post\",\"token_type\":\"bearer\",\"expires_in\":60}");
		})
		.await;
	let token = relay
		.refresh_access_token(&AccountId::recent())
		.await
		.expect("Refresh exchange with body credentials should succeed.");

	mock.assert_async().await;

	assert_eq!(token.secret.expose(), "access-post");
	assert!(token.scope.is_empty());
}

#[tokio::test]
async fn empty_access_tokens_are_rejected() {
	let server = MockServer::start_async().await;
	let relay = build_relay(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"\",\"token_type\":\"bearer\",\"expires_in\":3600}");
		})
		.await;
	let err = relay
		.refresh_access_token(&AccountId::primary())
		.await
		.expect_err("Empty access tokens must be rejected.");

	mock.assert_async().await;

	assert!(matches!(err, Error::Config(ConfigError::TokenBuild(_))));
	assert_eq!(relay.refresh_metrics.failures(), 1);
}

#[tokio::test]
async fn missing_expiry_is_rejected() {
	let server = MockServer::start_async().await;
	let relay = build_relay(&server);
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"access\",\"token_type\":\"bearer\"}");
		})
		.await;
	let err = relay
		.refresh_access_token(&AccountId::primary())
		.await
		.expect_err("Tokens without expires_in must be rejected.");

	assert!(matches!(err, Error::Config(ConfigError::InvalidExpiry { expires_in: None })));
}

#[tokio::test]
async fn invalid_grant_surfaces_to_the_caller() {
	let server = MockServer::start_async().await;
	let relay = build_relay(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"Invalid refresh token\"}");
		})
		.await;
	let err = relay
		.refresh_access_token(&AccountId::primary())
		.await
		.expect_err("Invalid grant errors should surface to the caller.");

	mock.assert_async().await;

	match err {
		Error::InvalidGrant { reason } => assert!(reason.contains("Invalid refresh token")),
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn invalid_client_is_classified() {
	let server = MockServer::start_async().await;
	let relay = build_relay(&server);
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\"}");
		})
		.await;
	let err = relay
		.refresh_access_token(&AccountId::primary())
		.await
		.expect_err("Invalid client errors should surface to the caller.");

	assert!(matches!(err, Error::InvalidClient { .. }));
}

#[tokio::test]
async fn malformed_token_json_is_a_parse_error() {
	let server = MockServer::start_async().await;
	let relay = build_relay(&server);
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body("{\"access_token\":");
		})
		.await;
	let err = relay
		.refresh_access_token(&AccountId::primary())
		.await
		.expect_err("Malformed token JSON must be rejected.");

	assert!(matches!(
		err,
		Error::Transient(TransientError::TokenResponseParse { status: Some(200), .. })
	));
}

#[tokio::test]
async fn unknown_accounts_fail_without_calling_spotify() {
	let server = MockServer::start_async().await;
	let relay = build_relay(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(500);
		})
		.await;
	let account = AccountId::new("archive").expect("Account fixture should be valid.");
	let err = relay
		.refresh_access_token(&account)
		.await
		.expect_err("Unregistered accounts must be rejected.");

	mock.assert_calls_async(0).await;

	assert!(matches!(
		err,
		Error::Config(ConfigError::UnknownAccount { account }) if account == "archive"
	));
}
