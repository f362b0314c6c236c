//! Provider descriptor data structures and their builder.

// self
use crate::_prelude::*;

/// Default Spotify accounts-service token endpoint.
pub const SPOTIFY_TOKEN_ENDPOINT: &str = "https://accounts.spotify.com/api/token";
/// Default Spotify Web API base.
pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

/// Preferred client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderEndpoints {
	/// Token endpoint used for refresh exchanges.
	pub token: Url,
	/// Base URL that resource paths are appended to.
	pub api: Url,
}

/// Immutable provider descriptor consumed by the relay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderDescriptor {
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Preferred client authentication mechanism.
	pub preferred_client_auth_method: ClientAuthMethod,
}
impl ProviderDescriptor {
	/// Creates a new builder.
	pub fn builder() -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::default()
	}

	/// Descriptor pointing at the public Spotify endpoints.
	pub fn spotify() -> Result<Self, ProviderDescriptorError> {
		Self::builder()
			.token_endpoint(parse_default(SPOTIFY_TOKEN_ENDPOINT)?)
			.api_base(parse_default(SPOTIFY_API_BASE)?)
			.build()
	}

	/// Joins a resource path (e.g. `/me/top/tracks`) onto the API base.
	///
	/// The base path is kept, so `https://api.spotify.com/v1` + `/me` yields
	/// `https://api.spotify.com/v1/me`.
	pub fn resource_url(&self, path: &str, query: &[(&str, &str)]) -> Url {
		let mut url = self.endpoints.api.clone();
		let joined = format!(
			"{}/{}",
			url.path().trim_end_matches('/'),
			path.trim_start_matches('/')
		);

		url.set_path(&joined);

		if !query.is_empty() {
			url.query_pairs_mut().extend_pairs(query.iter().copied());
		}

		url
	}
}

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// Token endpoint is mandatory.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// API base is mandatory.
	#[error("Missing API base URL.")]
	MissingApiBase,
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// A built-in default URL failed to parse.
	#[error("Default endpoint `{url}` is not a valid URL.")]
	InvalidDefault {
		/// The offending URL.
		url: &'static str,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug, Default)]
pub struct ProviderDescriptorBuilder {
	token_endpoint: Option<Url>,
	api_base: Option<Url>,
	preferred_client_auth_method: ClientAuthMethod,
}
impl ProviderDescriptorBuilder {
	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the API base URL.
	pub fn api_base(mut self, url: Url) -> Self {
		self.api_base = Some(url);

		self
	}

	/// Overrides the preferred client authentication method.
	pub fn preferred_client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.preferred_client_auth_method = method;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let token = self.token_endpoint.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?;
		let api = self.api_base.ok_or(ProviderDescriptorError::MissingApiBase)?;

		validate_endpoint("token", &token)?;
		validate_endpoint("api", &api)?;

		Ok(ProviderDescriptor {
			endpoints: ProviderEndpoints { token, api },
			preferred_client_auth_method: self.preferred_client_auth_method,
		})
	}
}

fn parse_default(url: &'static str) -> Result<Url, ProviderDescriptorError> {
	Url::parse(url).map_err(|_| ProviderDescriptorError::InvalidDefault { url })
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		_ => Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
		Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse descriptor fixture URL.")
	}

	#[test]
	fn spotify_defaults_are_valid() {
		let descriptor = ProviderDescriptor::spotify().expect("Default descriptor should build.");

		assert_eq!(descriptor.endpoints.token.as_str(), SPOTIFY_TOKEN_ENDPOINT);
		assert_eq!(descriptor.endpoints.api.as_str(), SPOTIFY_API_BASE);
		assert_eq!(descriptor.preferred_client_auth_method, ClientAuthMethod::ClientSecretBasic);
	}

	#[test]
	fn builder_rejects_insecure_and_missing_endpoints() {
		let err = ProviderDescriptor::builder()
			.api_base(url("https://api.example.com/v1"))
			.build()
			.expect_err("Descriptor builder should require a token endpoint.");

		assert_eq!(err, ProviderDescriptorError::MissingTokenEndpoint);

		let err = ProviderDescriptor::builder()
			.token_endpoint(url("http://accounts.example.com/api/token"))
			.api_base(url("https://api.example.com/v1"))
			.build()
			.expect_err("Plain HTTP must be rejected for remote hosts.");

		assert!(matches!(err, ProviderDescriptorError::InsecureEndpoint { endpoint: "token", .. }));
	}

	#[test]
	fn builder_allows_plain_http_on_loopback() {
		ProviderDescriptor::builder()
			.token_endpoint(url("http://127.0.0.1:5000/api/token"))
			.api_base(url("http://localhost:5000/v1"))
			.build()
			.expect("Loopback endpoints should be accepted for local mocks.");
	}

	#[test]
	fn resource_url_keeps_base_path_and_query() {
		let descriptor = ProviderDescriptor::spotify().expect("Default descriptor should build.");

		assert_eq!(
			descriptor.resource_url("/me/top/tracks", &[("time_range", "short_term")]).as_str(),
			"https://api.spotify.com/v1/me/top/tracks?time_range=short_term"
		);
		assert_eq!(
			descriptor.resource_url("users/rubiones2001", &[]).as_str(),
			"https://api.spotify.com/v1/users/rubiones2001"
		);
	}
}
