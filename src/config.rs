//! Environment-driven configuration for the relay service.
//!
//! [`RelayConfig::from_env`] loads a `.env` file when one exists and then reads the process
//! environment. [`RelayConfig::from_lookup`] accepts any lookup closure so callers (and
//! tests) can supply variables without touching the process environment. Empty values
//! are treated as missing.

// std
use std::net::{IpAddr, SocketAddr};
// crates.io
use axum::http::HeaderValue;
// self
use crate::{
	_prelude::*,
	auth::{AccountId, TokenSecret, UserId},
	error::ConfigError,
	flows::{DEFAULT_PROFILE_USER, ReqwestRelay},
	provider::{
		ProviderDescriptor, ProviderDescriptorError, SPOTIFY_API_BASE, SPOTIFY_TOKEN_ENDPOINT,
	},
};

/// Spotify application client identifier.
pub const CLIENT_ID_VAR: &str = "CLIENTID";
/// Spotify application client secret.
pub const CLIENT_SECRET_VAR: &str = "CLIENTSECRET";
/// Refresh token of the primary account.
pub const REFRESH_VAR: &str = "REFRESH";
/// Refresh token of the recent account; falls back to [`REFRESH_VAR`].
pub const REFRESH_RECENT_VAR: &str = "REFRESH_RECENT";
/// Spotify user whose public profile is relayed.
pub const PROFILE_USER_VAR: &str = "SPOTIFY_PROFILE_USER";
/// Token endpoint override.
pub const ACCOUNTS_URL_VAR: &str = "SPOTIFY_ACCOUNTS_URL";
/// Web API base override.
pub const API_URL_VAR: &str = "SPOTIFY_API_URL";
/// Listen address.
pub const HOST_VAR: &str = "HOST";
/// Listen port.
pub const PORT_VAR: &str = "PORT";
/// Comma-separated list of allowed CORS origins.
pub const CORS_ORIGINS_VAR: &str = "CORS_ALLOWED_ORIGINS";

const DEFAULT_HOST: IpAddr = IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED);
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,https://rubionestor611.github.io";

/// Fully validated service configuration.
#[derive(Clone, Debug)]
pub struct RelayConfig {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: TokenSecret,
	/// Refresh token of the primary account.
	pub primary_refresh_token: TokenSecret,
	/// Refresh token of the recent account.
	pub recent_refresh_token: TokenSecret,
	/// User whose public profile is relayed.
	pub profile_user: UserId,
	/// Token endpoint and Web API base.
	pub descriptor: ProviderDescriptor,
	/// Socket address the HTTP server binds.
	pub listen_addr: SocketAddr,
	/// Origins allowed by the CORS layer.
	pub cors_origins: Vec<HeaderValue>,
}
impl RelayConfig {
	/// Loads `.env` (when present) and reads the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		if let Err(err) = dotenvy::dotenv() {
			if !err.not_found() {
				tracing::warn!(error = %err, "Ignoring unreadable .env file.");
			}
		}

		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads every variable through `lookup`.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |name: &'static str| lookup(name).filter(|value| !value.trim().is_empty());
		let required = |name: &'static str| var(name).ok_or(ConfigError::MissingVar { name });
		let client_id = required(CLIENT_ID_VAR)?;
		let client_secret = TokenSecret::new(required(CLIENT_SECRET_VAR)?);
		let primary_refresh_token = TokenSecret::new(required(REFRESH_VAR)?);
		let recent_refresh_token = var(REFRESH_RECENT_VAR)
			.map(TokenSecret::new)
			.unwrap_or_else(|| primary_refresh_token.clone());
		let profile_user = var(PROFILE_USER_VAR).unwrap_or_else(|| DEFAULT_PROFILE_USER.into());
		let profile_user = UserId::new(profile_user.trim())
			.map_err(|err| ConfigError::invalid_var(PROFILE_USER_VAR, err))?;
		let token_url = var(ACCOUNTS_URL_VAR).unwrap_or_else(|| SPOTIFY_TOKEN_ENDPOINT.into());
		let api_url = var(API_URL_VAR).unwrap_or_else(|| SPOTIFY_API_BASE.into());
		let descriptor = build_descriptor(
			parse_url(ACCOUNTS_URL_VAR, &token_url)?,
			parse_url(API_URL_VAR, &api_url)?,
		)?;
		let host = match var(HOST_VAR) {
			Some(raw) => raw
				.trim()
				.parse::<IpAddr>()
				.map_err(|err| ConfigError::invalid_var(HOST_VAR, err))?,
			None => DEFAULT_HOST,
		};
		let port = match var(PORT_VAR) {
			Some(raw) =>
				raw.trim().parse::<u16>().map_err(|err| ConfigError::invalid_var(PORT_VAR, err))?,
			None => DEFAULT_PORT,
		};
		let cors_origins =
			parse_origins(var(CORS_ORIGINS_VAR).as_deref().unwrap_or(DEFAULT_CORS_ORIGINS))?;

		Ok(Self {
			client_id,
			client_secret,
			primary_refresh_token,
			recent_refresh_token,
			profile_user,
			descriptor,
			listen_addr: SocketAddr::new(host, port),
			cors_origins,
		})
	}

	/// Builds the reqwest-backed relay with both account slots registered.
	pub fn build_relay(&self) -> Result<ReqwestRelay> {
		let relay = ReqwestRelay::new(
			self.descriptor.clone(),
			self.client_id.clone(),
			self.client_secret.expose(),
			self.profile_user.clone(),
		)?
		.with_refresh_token(AccountId::primary(), self.primary_refresh_token.expose())
		.with_refresh_token(AccountId::recent(), self.recent_refresh_token.expose());

		Ok(relay)
	}
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw.trim()).map_err(|err| ConfigError::invalid_var(name, err))
}

fn build_descriptor(token: Url, api: Url) -> Result<ProviderDescriptor, ConfigError> {
	ProviderDescriptor::builder().token_endpoint(token).api_base(api).build().map_err(
		|err| match err {
			ProviderDescriptorError::InsecureEndpoint { endpoint: "token", .. } =>
				ConfigError::invalid_var(ACCOUNTS_URL_VAR, err),
			ProviderDescriptorError::InsecureEndpoint { .. } =>
				ConfigError::invalid_var(API_URL_VAR, err),
			_ => ConfigError::from(err),
		},
	)
}

fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
	raw.split(',')
		.map(str::trim)
		.filter(|origin| !origin.is_empty())
		.map(|origin| {
			let invalid = |reason: &dyn Display| {
				ConfigError::invalid_var(CORS_ORIGINS_VAR, format!("{origin}: {reason}"))
			};
			let url = Url::parse(origin).map_err(|err| invalid(&err))?;

			if !matches!(url.scheme(), "http" | "https") {
				return Err(invalid(&"origins must use http or https"));
			}

			HeaderValue::from_str(origin.trim_end_matches('/')).map_err(|err| invalid(&err))
		})
		.collect()
}
