//! Strongly typed identifiers for refresh-token slots and Spotify users.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal, $check:path) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_len($kind, view)?;
				$check($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (account, user).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (account, user).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
	/// The identifier contains a character it may not carry.
	#[error("{kind} identifier contains {ch:?}.")]
	InvalidChar {
		/// Kind of identifier (account, user).
		kind: &'static str,
		/// First rejected character.
		ch: char,
	},
	/// The identifier is `.` or `..`.
	#[error("{kind} identifier cannot be a dot segment.")]
	DotSegment {
		/// Kind of identifier (account, user).
		kind: &'static str,
	},
}

def_id! { AccountId, "Names the refresh-token slot used to mint access tokens.", "Account", validate_account }
def_id! { UserId, "Spotify user identifier whose public profile is relayed.", "User", validate_user }

impl AccountId {
	/// Slot serving profile, currently playing, and top tracks.
	pub const PRIMARY: &'static str = "primary";
	/// Slot serving recently played.
	pub const RECENT: &'static str = "recent";

	/// Returns the [`AccountId::PRIMARY`] slot.
	pub fn primary() -> Self {
		Self(Self::PRIMARY.to_owned())
	}

	/// Returns the [`AccountId::RECENT`] slot.
	pub fn recent() -> Self {
		Self(Self::RECENT.to_owned())
	}
}

fn validate_len(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

fn validate_account(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	match view.chars().find(|ch| ch.is_whitespace()) {
		Some(ch) => Err(IdentifierError::InvalidChar { kind, ch }),
		None => Ok(()),
	}
}

// User ids are spliced into `/users/{id}`, so only unreserved URL characters pass.
fn validate_user(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if let Some(ch) =
		view.chars().find(|ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-')))
	{
		return Err(IdentifierError::InvalidChar { kind, ch });
	}
	if matches!(view, "." | "..") {
		return Err(IdentifierError::DotSegment { kind });
	}

	Ok(())
}
