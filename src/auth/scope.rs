//! Scopes granted to an access token.

// std
use std::collections::BTreeSet;
// self
use crate::_prelude::*;

/// Why a scope list was rejected.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ScopeValidationError {
	/// A scope entry was empty.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// A scope entry contained whitespace.
	#[error("Scope `{scope}` contains whitespace.")]
	ContainsWhitespace {
		/// The offending entry.
		scope: String,
	},
}

/// Scopes reported by the token endpoint, deduplicated and ordered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeSet(BTreeSet<String>);
impl ScopeSet {
	/// Collects scope entries, rejecting empty or padded ones.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		scopes.into_iter().map(|scope| checked(scope.into())).collect::<Result<_, _>>().map(Self)
	}

	/// `true` when the token endpoint reported no scopes.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// `true` when `scope` was granted.
	pub fn contains(&self, scope: &str) -> bool {
		self.0.contains(scope)
	}

	/// `true` when at least one of `scopes` was granted.
	pub fn contains_any(&self, scopes: &[&str]) -> bool {
		scopes.iter().any(|scope| self.contains(scope))
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		for (idx, scope) in self.0.iter().enumerate() {
			if idx > 0 {
				f.write_str(" ")?;
			}

			f.write_str(scope)?;
		}

		Ok(())
	}
}
impl FromStr for ScopeSet {
	type Err = ScopeValidationError;

	/// Parses the space-delimited `scope` field of a token response.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s.split_whitespace())
	}
}

fn checked(scope: String) -> Result<String, ScopeValidationError> {
	if scope.is_empty() {
		Err(ScopeValidationError::Empty)
	} else if scope.contains(char::is_whitespace) {
		Err(ScopeValidationError::ContainsWhitespace { scope })
	} else {
		Ok(scope)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn order_and_duplicates_do_not_matter() {
		let listed = ScopeSet::new(["user-top-read", "user-read-currently-playing", "user-top-read"])
			.expect("Listed scopes should be valid.");
		let parsed = ScopeSet::from_str("user-read-currently-playing  user-top-read")
			.expect("Scope string should parse.");

		assert_eq!(listed, parsed);
		assert_eq!(listed.to_string(), "user-read-currently-playing user-top-read");
	}

	#[test]
	fn blank_and_padded_entries_are_rejected() {
		assert_eq!(
			ScopeSet::new([" user-top-read "]),
			Err(ScopeValidationError::ContainsWhitespace { scope: " user-top-read ".into() })
		);
		assert_eq!(ScopeSet::new([""]), Err(ScopeValidationError::Empty));
		assert!(ScopeSet::from_str("   ").is_ok_and(|set| set.is_empty()));
	}

	#[test]
	fn lookups_cover_single_and_alternative_scopes() {
		let scopes = ScopeSet::from_str("user-read-playback-state user-read-private")
			.expect("Scope string should parse.");

		assert!(scopes.contains("user-read-private"));
		assert!(!scopes.contains("user-top-read"));
		assert!(scopes.contains_any(&["user-read-currently-playing", "user-read-playback-state"]));
		assert!(!scopes.contains_any(&["user-top-read"]));
	}
}
