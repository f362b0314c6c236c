//! Bearer tokens minted by refresh exchanges.

// self
use crate::{
	_prelude::*,
	auth::{AccountId, ScopeSet, token::secret::TokenSecret},
};

/// Why an [`AccessTokenBuilder`] refused to build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum AccessTokenBuilderError {
	/// No access token, or an empty one.
	#[error("Access token is missing or empty.")]
	MissingAccessToken,
	/// No lifetime was supplied.
	#[error("Access token lifetime is missing.")]
	MissingExpiry,
}

/// Bearer token for Web API calls.
///
/// Tokens are never cached: each relay call mints one and drops it with the response.
#[derive(Clone)]
pub struct AccessToken {
	/// Slot whose refresh token minted this token.
	pub account: AccountId,
	/// Bearer value.
	pub secret: TokenSecret,
	/// Token type reported by Spotify, normally `Bearer`.
	pub token_type: String,
	/// Scopes reported with the token; empty when Spotify sent none.
	pub scope: ScopeSet,
	/// When the token response arrived.
	pub issued_at: OffsetDateTime,
	/// `issued_at` plus `expires_in`.
	pub expires_at: OffsetDateTime,
}
impl AccessToken {
	/// Starts a token for `account`.
	pub fn builder(account: AccountId) -> AccessTokenBuilder {
		AccessTokenBuilder {
			account,
			secret: None,
			token_type: None,
			scope: ScopeSet::default(),
			issued_at: None,
			lifetime: None,
		}
	}

	/// `Authorization` header value for Web API calls.
	pub fn bearer_header(&self) -> String {
		format!("Bearer {}", self.secret.expose())
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("account", &self.account)
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("expires_at", &self.expires_at)
			.finish_non_exhaustive()
	}
}

/// Collects the fields of a token response.
#[derive(Debug)]
pub struct AccessTokenBuilder {
	account: AccountId,
	secret: Option<TokenSecret>,
	token_type: Option<String>,
	scope: ScopeSet,
	issued_at: Option<OffsetDateTime>,
	lifetime: Option<Duration>,
}
impl AccessTokenBuilder {
	/// Bearer value.
	pub fn secret(mut self, token: impl Into<String>) -> Self {
		self.secret = Some(TokenSecret::new(token));

		self
	}

	/// Token type; `Bearer` when unset.
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Granted scopes.
	pub fn scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope;

		self
	}

	/// Arrival time of the response; now when unset.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// `expires_in` of the response.
	pub fn expires_in(mut self, lifetime: Duration) -> Self {
		self.lifetime = Some(lifetime);

		self
	}

	/// Validates the collected fields.
	pub fn build(self) -> Result<AccessToken, AccessTokenBuilderError> {
		let secret = self
			.secret
			.filter(|secret| !secret.expose().is_empty())
			.ok_or(AccessTokenBuilderError::MissingAccessToken)?;
		let lifetime = self.lifetime.ok_or(AccessTokenBuilderError::MissingExpiry)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);

		Ok(AccessToken {
			account: self.account,
			secret,
			token_type: self.token_type.unwrap_or_else(|| "Bearer".into()),
			scope: self.scope,
			issued_at,
			expires_at: issued_at + lifetime,
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn expiry_is_relative_to_arrival() {
		let token = AccessToken::builder(AccountId::primary())
			.secret("BQD-access")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_in(Duration::hours(1))
			.build()
			.expect("Token with a lifetime should build.");

		assert_eq!(token.expires_at, macros::datetime!(2025-01-01 01:00 UTC));
		assert_eq!(token.token_type, "Bearer");
	}

	#[test]
	fn empty_secrets_and_missing_lifetimes_are_rejected() {
		let err = AccessToken::builder(AccountId::primary())
			.secret("")
			.expires_in(Duration::hours(1))
			.build()
			.expect_err("Empty access tokens must be rejected.");

		assert_eq!(err, AccessTokenBuilderError::MissingAccessToken);

		let err = AccessToken::builder(AccountId::recent())
			.secret("BQD-access")
			.build()
			.expect_err("Tokens without a lifetime must be rejected.");

		assert_eq!(err, AccessTokenBuilderError::MissingExpiry);
	}

	#[test]
	fn only_the_header_carries_the_secret() {
		let token = AccessToken::builder(AccountId::primary())
			.secret("very-secret")
			.expires_in(Duration::minutes(5))
			.build()
			.expect("Access token fixture should build.");

		assert!(!format!("{token:?}").contains("very-secret"));
		assert_eq!(token.bearer_header(), "Bearer very-secret");
	}
}
