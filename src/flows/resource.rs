//! Authenticated Web API GETs for the relayed resources.
//!
//! Every fetch mints its own access token (see [`Relay::refresh_access_token`]), checks the
//! granted scopes when the token endpoint reported any, and then issues a single GET through
//! the same [`RelayHttpClient`] used for token exchanges.

// crates.io
use oauth2::{
	AsyncHttpClient, HttpRequest, HttpResponse,
	http::{
		Method, StatusCode,
		header::{ACCEPT, AUTHORIZATION},
	},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	error::ConfigError,
	flows::Relay,
	http::{RelayHttpClient, ResponseMetadataSlot},
	oauth::TransportErrorMapper,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	spotify::{Activity, CurrentlyPlaying, Profile, RecentlyPlayed, Resource, TopTracks},
};

impl<C, M> Relay<C, M>
where
	C: ?Sized + RelayHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches the public profile of the configured user.
	pub async fn profile(&self) -> Result<Profile> {
		self.observe(Resource::Profile, async {
			let response = self.get(Resource::Profile).await?;

			decode_success(Resource::Profile, &response)
		})
		.await
	}

	/// Fetches the track playing on the primary account.
	///
	/// Any non-200 status (Spotify answers 204 when idle), a `null` item, or an item without
	/// a name all yield `Ok(None)`.
	pub async fn currently_playing(&self) -> Result<Option<CurrentlyPlaying>> {
		const RESOURCE: Resource = Resource::CurrentlyPlaying;

		self.observe(RESOURCE, async {
			let response = self.get(RESOURCE).await?;

			if response.status() != StatusCode::OK {
				tracing::debug!(status = response.status().as_u16(), "Nothing is playing.");

				return Ok(None);
			}

			let playing = decode::<CurrentlyPlaying>(RESOURCE, response.body())?;

			Ok(playing.track().is_some().then_some(playing))
		})
		.await
	}

	/// Fetches the short-term top tracks of the primary account.
	pub async fn top_tracks(&self) -> Result<TopTracks> {
		self.observe(Resource::TopTracks, async {
			let response = self.get(Resource::TopTracks).await?;

			decode_success(Resource::TopTracks, &response)
		})
		.await
	}

	/// Fetches the most recently played track of the recent account.
	pub async fn recently_played(&self) -> Result<RecentlyPlayed> {
		self.observe(Resource::RecentlyPlayed, async {
			let response = self.get(Resource::RecentlyPlayed).await?;

			decode_success(Resource::RecentlyPlayed, &response)
		})
		.await
	}

	/// Fetches top tracks, then the current playback, for the activity view.
	///
	/// Only a top-tracks failure fails the view. A failed playback lookup is logged and
	/// reported as nothing playing.
	pub async fn activity(&self) -> Result<Activity> {
		let top_tracks = self.top_tracks().await?;
		let current = self.currently_playing().await.unwrap_or_else(|err| {
			tracing::warn!(error = %err, "Currently playing lookup failed; reporting idle playback.");

			None
		});

		Ok(Activity { top_tracks: top_tracks.items, current })
	}

	async fn observe<T, Fut>(&self, resource: Resource, fut: Fut) -> Result<T>
	where
		Fut: Future<Output = Result<T>>,
	{
		const KIND: FlowKind = FlowKind::Resource;

		let span = FlowSpan::new(KIND, resource.as_str());

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(fut).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn get(&self, resource: Resource) -> Result<HttpResponse> {
		let token = self.refresh_access_token(&resource.account()).await?;

		ensure_scope(resource, &token)?;

		let url = self
			.descriptor
			.resource_url(&resource.path(&self.profile_user), resource.query());
		let request: HttpRequest = oauth2::http::Request::builder()
			.method(Method::GET)
			.uri(url.as_str())
			.header(AUTHORIZATION, token.bearer_header())
			.header(ACCEPT, "application/json")
			.body(Vec::new())
			.map_err(ConfigError::from)?;
		let slot = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(slot.clone());
		let response = handle.call(request).await.map_err(|err| {
			self.transport_mapper.map_transport_error(FlowKind::Resource, slot.take().as_ref(), err)
		})?;

		tracing::debug!(%resource, status = response.status().as_u16(), "Spotify responded.");

		Ok(response)
	}
}

fn ensure_scope(resource: Resource, token: &AccessToken) -> Result<()> {
	let accepted = resource.accepted_scopes();

	if accepted.is_empty() || token.scope.is_empty() || token.scope.contains_any(accepted) {
		return Ok(());
	}

	Err(Error::InsufficientScope {
		reason: format!(
			"the {resource} request needs `{}` but the token grants `{}`",
			accepted.join("` or `"),
			token.scope
		),
	})
}

fn decode_success<T>(resource: Resource, response: &HttpResponse) -> Result<T>
where
	T: DeserializeOwned,
{
	if !response.status().is_success() {
		return Err(Error::Upstream { resource, status: response.status().as_u16() });
	}

	decode(resource, response.body())
}

fn decode<T>(resource: Resource, body: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::Decode { resource, source })
}
