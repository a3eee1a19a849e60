//! Strongly typed identifiers enforced across the client domain.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

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
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
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
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (vendor, customer).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (vendor, customer).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (vendor, customer).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { VendorId, "Identifier assigned to this application by the identity provider.", "Vendor" }
def_id! { CustomerId, "Stable external identifier for an authenticated principal.", "Customer" }

impl CustomerId {
	/// Splits the identifier into its master and sub components.
	///
	/// Identifiers carry an optional `|`-separated sub id; a missing sub component
	/// defaults to `"0"`.
	pub fn label_parts(&self) -> (&str, &str) {
		match self.0.split_once('|') {
			Some((master, sub)) => (master, sub),
			None => (&self.0, "0"),
		}
	}
}

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_validate_on_construction() {
		assert!(VendorId::new("").is_err());
		assert!(VendorId::new("vendor 1").is_err(), "Embedded whitespace must be rejected.");

		let vendor = VendorId::new("V1").expect("Vendor fixture should be considered valid.");

		assert_eq!(vendor.as_ref(), "V1");

		let too_long = "a".repeat(IDENTIFIER_MAX_LEN + 1);

		assert!(CustomerId::new(&too_long).is_err());
	}

	#[test]
	fn customer_id_splits_into_label_parts() {
		let compound =
			CustomerId::new("12345|2").expect("Compound customer id should be considered valid.");

		assert_eq!(compound.label_parts(), ("12345", "2"));

		let bare = CustomerId::new("12345").expect("Bare customer id should be considered valid.");

		assert_eq!(bare.label_parts(), ("12345", "0"));
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let customer: CustomerId = serde_json::from_str("\"98765|1\"")
			.expect("Customer id should deserialize successfully.");

		assert_eq!(customer.as_ref(), "98765|1");
		assert!(serde_json::from_str::<CustomerId>("\"with space\"").is_err());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<VendorId, u8> = HashMap::from_iter([(
			VendorId::new("V1").expect("Vendor used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("V1"), Some(&7));
	}
}
