//! `oauth2` wiring for the refresh-token exchange and transport error mapping.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError, RefreshToken,
	RequestTokenError, TokenResponse, TokenUrl,
	basic::{
		BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse, BasicTokenType,
	},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AccountId, ScopeSet, TokenSecret},
	error::{ConfigError, TransientError, TransportError},
	http::{RelayHttpClient, ResponseMetadata, ResponseMetadataSlot},
	obs::FlowKind,
	provider::{
		ClientAuthMethod, ProviderDescriptor, ProviderStrategy, TokenFailure, TokenFailureKind,
	},
};

type RefreshClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Turns transport failures into relay [`Error`]s.
///
/// `flow` tells token exchanges apart from Web API GETs; `metadata` carries whatever the
/// transport recorded before failing.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Maps one failed request.
	fn map_transport_error(
		&self,
		flow: FlowKind,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Mapper paired with [`crate::http::ReqwestHttpClient`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		flow: FlowKind,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(flow, meta, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(detail) =>
				transient(format!("HTTP client failed during the {flow} flow: {detail}"), meta),
			other => transient(format!("HTTP client failed during the {flow} flow: {other}"), meta),
		}
	}
}

/// One refresh exchange against the accounts service.
pub(crate) struct RefreshExchange<'a, C, M>
where
	C: ?Sized,
	M: ?Sized,
{
	client: RefreshClient,
	http_client: &'a C,
	error_mapper: &'a M,
}
impl<'a, C, M> RefreshExchange<'a, C, M>
where
	C: ?Sized + RelayHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn new(
		descriptor: &ProviderDescriptor,
		client_id: &str,
		client_secret: &TokenSecret,
		http_client: &'a C,
		error_mapper: &'a M,
	) -> Self {
		let client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.expose().to_owned()))
			.set_token_uri(TokenUrl::from_url(descriptor.endpoints.token.clone()));
		let client = match descriptor.preferred_client_auth_method {
			ClientAuthMethod::ClientSecretBasic => client,
			ClientAuthMethod::ClientSecretPost => client.set_auth_type(AuthType::RequestBody),
		};

		Self { client, http_client, error_mapper }
	}

	/// Posts `grant_type=refresh_token` and turns the answer into an [`AccessToken`].
	pub(crate) async fn run(
		&self,
		strategy: &dyn ProviderStrategy,
		account: AccountId,
		refresh_token: &TokenSecret,
	) -> Result<AccessToken> {
		let slot = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(slot.clone());
		let refresh_token = RefreshToken::new(refresh_token.expose().to_owned());
		let response = self
			.client
			.exchange_refresh_token(&refresh_token)
			.request_async(&handle)
			.await
			.map_err(|err| map_request_error(strategy, slot.take(), err, self.error_mapper))?;

		access_token(account, &response)
	}
}

fn access_token(account: AccountId, response: &BasicTokenResponse) -> Result<AccessToken> {
	let expires_in = response.expires_in();
	let lifetime = expires_in
		.filter(|ttl| !ttl.is_zero())
		.and_then(|ttl| Duration::try_from(ttl).ok())
		.ok_or(ConfigError::InvalidExpiry { expires_in: expires_in.map(|ttl| ttl.as_secs()) })?;
	// `oauth2` reads `"scope": ""` as a single blank entry.
	let scope = match response.scopes() {
		Some(scopes) => ScopeSet::new(
			scopes.iter().map(|scope| scope.as_str()).filter(|scope| !scope.is_empty()),
		)
		.map_err(ConfigError::from)?,
		None => ScopeSet::default(),
	};
	let token_type = match response.token_type() {
		BasicTokenType::Bearer => "Bearer".to_owned(),
		other => other.as_ref().to_owned(),
	};

	AccessToken::builder(account)
		.secret(response.access_token().secret().as_str())
		.token_type(token_type)
		.scope(scope)
		.issued_at(OffsetDateTime::now_utc())
		.expires_in(lifetime)
		.build()
		.map_err(|err| ConfigError::from(err).into())
}

fn map_request_error<E, M>(
	strategy: &dyn ProviderStrategy,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta = meta.as_ref();
	let status = meta.and_then(|meta| meta.status);

	match err {
		RequestTokenError::ServerResponse(response) =>
			classify(strategy, oauth_failure(&response).with_status(status), meta),
		RequestTokenError::Request(err) => mapper.map_transport_error(FlowKind::Refresh, meta, err),
		// Error pages from gateways are not JSON but still carry a usable status.
		RequestTokenError::Parse(_, body) if status.is_some_and(|code| code >= 400) =>
			classify(strategy, TokenFailure::unparsed(&body).with_status(status), meta),
		RequestTokenError::Parse(source, _) =>
			TransientError::TokenResponseParse { source, status }.into(),
		RequestTokenError::Other(detail) =>
			transient(format!("Token endpoint sent an unexpected response: {detail}"), meta),
	}
}

fn oauth_failure(response: &BasicErrorResponse) -> TokenFailure {
	let code: &str = response.error().as_ref();

	TokenFailure::oauth(code, response.error_description().cloned())
}

fn classify(
	strategy: &dyn ProviderStrategy,
	failure: TokenFailure,
	meta: Option<&ResponseMetadata>,
) -> Error {
	let reason = failure.summary();

	match strategy.classify(&failure) {
		TokenFailureKind::InvalidGrant => Error::InvalidGrant { reason },
		TokenFailureKind::InvalidClient => Error::InvalidClient { reason },
		TokenFailureKind::InsufficientScope => Error::InsufficientScope { reason },
		TokenFailureKind::Transient => transient(reason, meta),
	}
}

fn map_reqwest_error(flow: FlowKind, meta: Option<&ResponseMetadata>, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() && flow == FlowKind::Refresh {
		return transient("Token endpoint timed out".into(), meta);
	}

	TransportError::from(err).into()
}

fn transient(message: String, meta: Option<&ResponseMetadata>) -> Error {
	TransientError::TokenEndpoint {
		message,
		status: meta.and_then(|meta| meta.status),
		retry_after: meta.and_then(|meta| meta.retry_after),
	}
	.into()
}
