//! Passive records mirroring the Spotify Web API JSON.
//!
//! Only the fields the website renders are kept; unknown fields are ignored on input and
//! the surviving ones are written back under their upstream names.

// self
use crate::_prelude::*;

/// Cover art or avatar image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
	/// Image source URL.
	pub url: String,
	/// Height in pixels; Spotify sends `null` when unknown.
	pub height: Option<u32>,
	/// Width in pixels; Spotify sends `null` when unknown.
	pub width: Option<u32>,
}

/// Artist credited on a track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
	/// Artist name.
	pub name: String,
}

/// Album a track belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
	/// Cover art, largest first.
	pub images: Vec<Image>,
}

/// A single track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
	/// Track title.
	pub name: String,
	/// Credited artists.
	pub artists: Vec<Artist>,
	/// Album metadata.
	pub album: Album,
}

/// Playback state of the primary account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentlyPlaying {
	/// Track being played; `None` when playback is paused on an ad or podcast.
	pub item: Option<Track>,
}
impl CurrentlyPlaying {
	/// Returns the playing track when it carries a title.
	pub fn track(&self) -> Option<&Track> {
		self.item.as_ref().filter(|track| !track.name.is_empty())
	}
}

/// Short-term top tracks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopTracks {
	/// Tracks ranked by affinity.
	pub items: Vec<Track>,
}

/// Follower statistics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Followers {
	/// Total follower count.
	pub total: u64,
}

/// External links attached to a profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalUrls {
	/// Open-in-Spotify link.
	pub spotify: String,
}

/// Public user profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
	/// Display name; absent for users that never set one.
	pub display_name: Option<String>,
	/// Follower statistics.
	pub followers: Followers,
	/// Spotify URI of the user.
	pub uri: String,
	/// Web API link to the user.
	pub href: String,
	/// Avatar images.
	pub images: Vec<Image>,
	/// External links.
	pub external_urls: ExternalUrls,
}

/// Entry of the recently played history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayHistory {
	/// Track that was played.
	pub track: Track,
}

/// Recently played history of the recent account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentlyPlayed {
	/// History entries, newest first.
	pub items: Vec<PlayHistory>,
}

/// Combined view served by the activity endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Activity {
	/// Short-term top tracks.
	#[serde(rename = "topTracks")]
	pub top_tracks: Vec<Track>,
	/// Current playback, or `null` when nothing is playing.
	pub current: Option<CurrentlyPlaying>,
}
