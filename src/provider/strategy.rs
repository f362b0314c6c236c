//! Classification of refused refresh exchanges.
//!
//! The accounts service answers a refused refresh with an OAuth error document such as
//! `{"error":"invalid_grant","error_description":"Invalid refresh token"}`. Gateways in front
//! of it may answer with plain text or HTML instead, so classification falls back to
//! scanning the body and finally to the status code.

// self
use crate::_prelude::*;

const OAUTH_CODES: [(&str, TokenFailureKind); 8] = [
	("invalid_grant", TokenFailureKind::InvalidGrant),
	("access_denied", TokenFailureKind::InvalidGrant),
	("invalid_client", TokenFailureKind::InvalidClient),
	("unauthorized_client", TokenFailureKind::InvalidClient),
	("invalid_scope", TokenFailureKind::InsufficientScope),
	("insufficient_scope", TokenFailureKind::InsufficientScope),
	("server_error", TokenFailureKind::Transient),
	("temporarily_unavailable", TokenFailureKind::Transient),
];

/// Decides how a refused refresh exchange surfaces to callers.
pub trait ProviderStrategy: Send + Sync {
	/// Classifies a refused refresh exchange.
	fn classify(&self, failure: &TokenFailure) -> TokenFailureKind;
}

/// How a refused refresh exchange surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenFailureKind {
	/// The refresh token was revoked or never valid.
	InvalidGrant,
	/// The application credentials were rejected.
	InvalidClient,
	/// The grant does not cover the requested scopes.
	InsufficientScope,
	/// Anything else.
	Transient,
}

/// What the token endpoint sent back when it refused a refresh.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenFailure {
	/// HTTP status, when a response arrived.
	pub status: Option<u16>,
	/// OAuth `error` code.
	pub code: Option<String>,
	/// OAuth `error_description`.
	pub description: Option<String>,
	/// Leading characters of a body that was not an OAuth error document.
	pub body: Option<String>,
}
impl TokenFailure {
	const BODY_LIMIT: usize = 256;

	/// Failure reported through an OAuth error document.
	pub fn oauth(code: impl Into<String>, description: Option<String>) -> Self {
		Self { code: Some(code.into()), description, ..Default::default() }
	}

	/// Failure whose body is not an OAuth error document.
	pub fn unparsed(body: &[u8]) -> Self {
		let body = String::from_utf8_lossy(body);
		let mut preview = body.chars().take(Self::BODY_LIMIT).collect::<String>();

		if body.chars().nth(Self::BODY_LIMIT).is_some() {
			preview.push('…');
		}

		Self { body: Some(preview), ..Default::default() }
	}

	/// Attaches the HTTP status of the response.
	pub fn with_status(mut self, status: Option<u16>) -> Self {
		self.status = status;

		self
	}

	/// One-line description used as the error reason.
	pub fn summary(&self) -> String {
		match (&self.description, &self.code, &self.body) {
			(Some(description), ..) => format!("Token endpoint returned an OAuth error: {description}"),
			(None, Some(code), _) => format!("Token endpoint returned an OAuth error: {code}"),
			(None, None, Some(body)) => format!("Token endpoint returned a non-JSON error: {body}"),
			(None, None, None) => match self.status {
				Some(status) => format!("Token endpoint answered with HTTP {status}"),
				None => "Token endpoint failed without a response".into(),
			},
		}
	}
}

/// Classifier for the Spotify accounts service.
///
/// Known OAuth codes win, then a code mentioned in the description or body, then the
/// status code.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpotifyStrategy;
impl ProviderStrategy for SpotifyStrategy {
	fn classify(&self, failure: &TokenFailure) -> TokenFailureKind {
		failure
			.code
			.as_deref()
			.and_then(known_code)
			.or_else(|| failure.description.as_deref().and_then(mentioned_code))
			.or_else(|| failure.body.as_deref().and_then(mentioned_code))
			.unwrap_or_else(|| by_status(failure.status))
	}
}

fn known_code(code: &str) -> Option<TokenFailureKind> {
	OAUTH_CODES.iter().find(|(known, _)| code.eq_ignore_ascii_case(known)).map(|(_, kind)| *kind)
}

fn mentioned_code(text: &str) -> Option<TokenFailureKind> {
	let text = text.to_ascii_lowercase();

	OAUTH_CODES.iter().find(|(known, _)| text.contains(known)).map(|(_, kind)| *kind)
}

fn by_status(status: Option<u16>) -> TokenFailureKind {
	match status {
		Some(400 | 404 | 410) => TokenFailureKind::InvalidGrant,
		Some(401) => TokenFailureKind::InvalidClient,
		Some(403) => TokenFailureKind::InsufficientScope,
		_ => TokenFailureKind::Transient,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn oauth_codes_beat_the_status() {
		let failure = TokenFailure::oauth("invalid_grant", Some("Refresh token revoked".into()))
			.with_status(Some(500));

		assert_eq!(SpotifyStrategy.classify(&failure), TokenFailureKind::InvalidGrant);
		assert_eq!(
			SpotifyStrategy.classify(&TokenFailure::oauth("INVALID_CLIENT", None)),
			TokenFailureKind::InvalidClient
		);
	}

	#[test]
	fn unknown_codes_fall_back_to_the_status() {
		let failure = TokenFailure::oauth("unsupported_grant_type", Some("Invalid refresh token".into()))
			.with_status(Some(400));

		assert_eq!(SpotifyStrategy.classify(&failure), TokenFailureKind::InvalidGrant);
		assert_eq!(
			SpotifyStrategy.classify(&TokenFailure::default().with_status(Some(401))),
			TokenFailureKind::InvalidClient
		);
		assert_eq!(
			SpotifyStrategy.classify(&TokenFailure::default().with_status(Some(429))),
			TokenFailureKind::Transient
		);
		assert_eq!(SpotifyStrategy.classify(&TokenFailure::default()), TokenFailureKind::Transient);
	}

	#[test]
	fn gateway_pages_are_scanned_for_codes() {
		let failure = TokenFailure::unparsed(b"<html>upstream said: insufficient_scope</html>")
			.with_status(Some(502));

		assert_eq!(SpotifyStrategy.classify(&failure), TokenFailureKind::InsufficientScope);
		assert_eq!(
			failure.summary(),
			"Token endpoint returned a non-JSON error: <html>upstream said: insufficient_scope</html>"
		);
	}

	#[test]
	fn long_bodies_are_cut() {
		let failure = TokenFailure::unparsed("x".repeat(1_000).as_bytes());
		let body = failure.body.expect("Body preview should be recorded.");

		assert_eq!(body.chars().count(), TokenFailure::BODY_LIMIT + 1);
		assert!(body.ends_with('…'));
	}

	#[test]
	fn summaries_prefer_descriptions() {
		let failure = TokenFailure::oauth("invalid_grant", Some("Invalid refresh token".into()));

		assert_eq!(failure.summary(), "Token endpoint returned an OAuth error: Invalid refresh token");
		assert_eq!(
			TokenFailure::default().with_status(Some(503)).summary(),
			"Token endpoint answered with HTTP 503"
		);
	}
}
