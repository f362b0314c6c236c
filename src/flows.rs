//! Relay orchestrators: token exchanges and the resource fetches built on them.

pub mod refresh;
pub mod resource;

pub use refresh::*;

// self
use crate::{
	_prelude::*,
	auth::{AccountId, TokenSecret, UserId},
	http::{RelayHttpClient, ReqwestHttpClient},
	oauth::{ReqwestTransportErrorMapper, TransportErrorMapper},
	provider::{SpotifyStrategy, ProviderDescriptor, ProviderStrategy},
};

/// Relay specialized for the crate's default reqwest transport stack.
pub type ReqwestRelay = Relay<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Default Spotify user whose public profile is relayed.
pub const DEFAULT_PROFILE_USER: &str = "rubiones2001";

/// Mints access tokens and fetches Spotify resources with them.
///
/// The relay owns the HTTP client, the provider descriptor, the strategy, the client
/// credentials, and one refresh token per account slot. Nothing is cached between calls:
/// every resource fetch performs its own refresh exchange first.
#[derive(Clone)]
pub struct Relay<C, M>
where
	C: ?Sized + RelayHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Provider descriptor that defines the token endpoint and API base.
	pub descriptor: ProviderDescriptor,
	/// Strategy classifying token endpoint failures.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: TokenSecret,
	/// User whose public profile is relayed.
	pub profile_user: UserId,
	/// Shared counters for refresh exchanges.
	pub refresh_metrics: Arc<RefreshMetrics>,
	accounts: HashMap<AccountId, TokenSecret>,
}
impl<C, M> Relay<C, M>
where
	C: ?Sized + RelayHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a relay that reuses the caller-provided transport + mapper pair.
	///
	/// The relay starts without refresh tokens; register them with
	/// [`Relay::with_refresh_token`].
	pub fn with_http_client(
		descriptor: ProviderDescriptor,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		profile_user: UserId,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			descriptor,
			strategy: Arc::new(SpotifyStrategy),
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
			profile_user,
			refresh_metrics: Default::default(),
			accounts: HashMap::new(),
		}
	}

	/// Registers (or replaces) the refresh token of an account slot.
	pub fn with_refresh_token(
		mut self,
		account: AccountId,
		refresh_token: impl Into<String>,
	) -> Self {
		self.accounts.insert(account, TokenSecret::new(refresh_token));

		self
	}

	/// Replaces the error-classification strategy.
	pub fn with_strategy(mut self, strategy: Arc<dyn ProviderStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Returns `true` when a refresh token is registered for `account`.
	pub fn has_account(&self, account: &str) -> bool {
		self.accounts.contains_key(account)
	}

	pub(crate) fn refresh_secret(&self, account: &str) -> Option<&TokenSecret> {
		self.accounts.get(account)
	}
}
impl ReqwestRelay {
	/// Creates a relay backed by a freshly built reqwest client.
	pub fn new(
		descriptor: ProviderDescriptor,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		profile_user: UserId,
	) -> Result<Self> {
		Ok(Self::with_http_client(
			descriptor,
			client_id,
			client_secret,
			profile_user,
			ReqwestHttpClient::build()?,
			ReqwestTransportErrorMapper,
		))
	}
}
impl<C, M> Debug for Relay<C, M>
where
	C: ?Sized + RelayHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let mut accounts =
			self.accounts.keys().map(|account| account.as_ref()).collect::<Vec<&str>>();

		accounts.sort_unstable();

		f.debug_struct("Relay")
			.field("descriptor", &self.descriptor)
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.field("profile_user", &self.profile_user)
			.field("accounts", &accounts)
			.finish()
	}
}
