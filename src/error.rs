//! Error types for token exchanges, resource fetches, and configuration.

// self
use crate::{
	_prelude::*,
	auth::{AccessTokenBuilderError, ScopeValidationError},
	provider::ProviderDescriptorError,
	spotify::Resource,
};

/// Result alias defaulting to the relay [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything a relay operation can fail with.
///
/// The HTTP surface collapses every variant into a static message; the variants exist so
/// logs and tests can tell the failure modes apart.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local setup problem, or a token response the relay cannot use.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token endpoint failure that may clear up on its own.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// No HTTP exchange completed.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The refresh token was revoked or never valid.
	#[error("Spotify rejected the refresh token: {reason}.")]
	InvalidGrant {
		/// What the accounts service reported.
		reason: String,
	},
	/// The application credentials were rejected.
	#[error("Spotify rejected the client credentials: {reason}.")]
	InvalidClient {
		/// What the accounts service reported.
		reason: String,
	},
	/// The access token does not cover a resource.
	#[error("The access token is missing a required scope: {reason}.")]
	InsufficientScope {
		/// Which scope was missing, or what the accounts service reported.
		reason: String,
	},
	/// The Web API answered with a non-success status.
	#[error("Spotify answered the {resource} request with HTTP {status}.")]
	Upstream {
		/// Resource that was requested.
		resource: Resource,
		/// HTTP status code returned by the API.
		status: u16,
	},
	/// The Web API body does not match the expected shape.
	#[error("Spotify returned malformed JSON for the {resource} request.")]
	Decode {
		/// Resource that was requested.
		resource: Resource,
		/// Parsing failure, including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Setup problems and unusable token responses.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Required environment variable is absent or blank.
	#[error("Environment variable `{name}` is required.")]
	MissingVar {
		/// Variable name.
		name: &'static str,
	},
	/// Environment variable holds a value that cannot be used.
	#[error("Environment variable `{name}` is invalid: {reason}.")]
	InvalidVar {
		/// Variable name.
		name: &'static str,
		/// Human-readable reason.
		reason: String,
	},
	/// Endpoint set failed validation.
	#[error(transparent)]
	Descriptor(#[from] ProviderDescriptorError),
	/// No refresh token is registered under the requested slot.
	#[error("No refresh token is configured for account `{account}`.")]
	UnknownAccount {
		/// Account slot name.
		account: String,
	},
	/// The reqwest client could not be built, or rejected a request before sending it.
	#[error("The HTTP client rejected its configuration.")]
	HttpClient(#[from] ReqwestError),
	/// An outgoing request could not be assembled.
	#[error("The outgoing request could not be assembled.")]
	HttpRequest(#[from] oauth2::http::Error),
	/// The token endpoint granted a scope list that cannot be parsed.
	#[error("Spotify granted an unusable scope list.")]
	InvalidScope(#[from] ScopeValidationError),
	/// The token endpoint returned an unusable access token.
	#[error("Spotify returned an unusable access token.")]
	TokenBuild(#[from] AccessTokenBuilderError),
	/// The token endpoint omitted `expires_in`, or sent zero or an unrepresentable value.
	#[error("Spotify returned an unusable expires_in ({expires_in:?}).")]
	InvalidExpiry {
		/// Raw value in seconds, when one was sent.
		expires_in: Option<u64>,
	},
}
impl ConfigError {
	pub(crate) fn invalid_var(name: &'static str, reason: impl Display) -> Self {
		Self::InvalidVar { name, reason: reason.to_string() }
	}
}

/// Token endpoint failures that may clear up on their own.
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// The token endpoint failed without a classifiable OAuth error.
	#[error("Token endpoint failed: {message}.")]
	TokenEndpoint {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when a response arrived.
		status: Option<u16>,
		/// `Retry-After` hint, when one was sent.
		retry_after: Option<Duration>,
	},
	/// The token endpoint answered with JSON the relay could not read.
	#[error("Token endpoint returned malformed JSON (status {status:?}).")]
	TokenResponseParse {
		/// Parsing failure, including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when a response arrived.
		status: Option<u16>,
	},
}

/// Failures below HTTP.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// reqwest could not complete the exchange (DNS, TCP, TLS, body).
	#[error("Network error while calling Spotify.")]
	Network(#[from] ReqwestError),
	/// Socket or listener I/O failed.
	#[error("I/O error.")]
	Io(#[from] std::io::Error),
}
