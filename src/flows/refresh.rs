//! Refresh-token exchange with tracing spans and metrics.
//!
//! [`Relay::refresh_access_token`] mints a bearer token for an account slot by posting
//! `grant_type=refresh_token` to the token endpoint. Nothing is cached: every call performs
//! a fresh exchange and the refresh token itself is never rotated.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AccountId},
	error::ConfigError,
	flows::Relay,
	http::RelayHttpClient,
	oauth::{RefreshExchange, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C, M> Relay<C, M>
where
	C: ?Sized + RelayHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges the refresh token stored for `account` for a new access token.
	pub async fn refresh_access_token(&self, account: &AccountId) -> Result<AccessToken> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh_access_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.refresh_metrics.record_attempt();

				let refresh_token = self.refresh_secret(account).ok_or_else(|| {
					self.refresh_metrics.record_failure();

					Error::from(ConfigError::UnknownAccount { account: account.to_string() })
				})?;
				let token = RefreshExchange::new(
					&self.descriptor,
					&self.client_id,
					&self.client_secret,
					self.http_client.as_ref(),
					self.transport_mapper.as_ref(),
				)
				.run(self.strategy.as_ref(), account.clone(), refresh_token)
				.await
				.inspect_err(|err| {
					self.refresh_metrics.record_failure();

					tracing::debug!(account = %account, error = %err, "Refresh exchange failed.");
				})?;

				self.refresh_metrics.record_success();

				Ok(token)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
