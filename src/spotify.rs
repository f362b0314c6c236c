//! Spotify Web API resources relayed by the service.

pub mod model;

pub use model::*;

// self
use crate::{_prelude::*, auth::AccountId};

/// Upstream resources the relay knows how to fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
	/// Public profile of the configured user.
	Profile,
	/// Track currently playing on the primary account.
	CurrentlyPlaying,
	/// Short-term top tracks of the primary account.
	TopTracks,
	/// Most recently played track of the recent account.
	RecentlyPlayed,
}
impl Resource {
	/// Stable label used in logs, spans, and error messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			Resource::Profile => "profile",
			Resource::CurrentlyPlaying => "currently-playing",
			Resource::TopTracks => "top-tracks",
			Resource::RecentlyPlayed => "recently-played",
		}
	}

	/// API path relative to the Web API base.
	pub fn path(self, profile_user: &str) -> String {
		match self {
			Resource::Profile => format!("/users/{profile_user}"),
			Resource::CurrentlyPlaying => "/me/player/currently-playing".into(),
			Resource::TopTracks => "/me/top/tracks".into(),
			Resource::RecentlyPlayed => "/me/player/recently-played".into(),
		}
	}

	/// Fixed query parameters sent with the request.
	pub const fn query(self) -> &'static [(&'static str, &'static str)] {
		match self {
			Resource::TopTracks => &[("time_range", "short_term")],
			Resource::RecentlyPlayed => &[("limit", "1")],
			Resource::Profile | Resource::CurrentlyPlaying => &[],
		}
	}

	/// Account slot whose refresh token authorizes the request.
	pub fn account(self) -> AccountId {
		match self {
			Resource::RecentlyPlayed => AccountId::recent(),
			_ => AccountId::primary(),
		}
	}

	/// Scopes that authorize the request; any one of them is enough.
	///
	/// Spotify serves the currently playing track to either playback read scope. An empty
	/// list means the resource is public.
	pub const fn accepted_scopes(self) -> &'static [&'static str] {
		match self {
			Resource::Profile => &[],
			Resource::CurrentlyPlaying => &["user-read-currently-playing", "user-read-playback-state"],
			Resource::TopTracks => &["user-top-read"],
			Resource::RecentlyPlayed => &["user-read-recently-played"],
		}
	}
}
impl Display for Resource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recently_played_uses_the_recent_slot() {
		assert_eq!(Resource::RecentlyPlayed.account(), AccountId::recent());

		for resource in [Resource::Profile, Resource::CurrentlyPlaying, Resource::TopTracks] {
			assert_eq!(resource.account(), AccountId::primary(), "{resource} should use primary.");
		}
	}

	#[test]
	fn paths_and_queries_match_the_web_api() {
		assert_eq!(Resource::Profile.path("rubiones2001"), "/users/rubiones2001");
		assert_eq!(Resource::TopTracks.query(), &[("time_range", "short_term")]);
		assert_eq!(Resource::RecentlyPlayed.query(), &[("limit", "1")]);
		assert!(Resource::CurrentlyPlaying.query().is_empty());
		assert!(Resource::Profile.accepted_scopes().is_empty());
	}
}
