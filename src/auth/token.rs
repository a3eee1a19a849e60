//! Opaque token and credential wrappers exchanged with the remote identity service.

// self
use crate::_prelude::*;

/// Opaque, rotating credential representing an authenticated session with the
/// remote identity provider.
///
/// The value is server-minted and never inspected locally; formatters redact it to
/// keep session material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerToken(String);
impl CustomerToken {
	/// Wraps a token string received from the remote service or the session store.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Whether the wrapped value is the empty string.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl AsRef<str> for CustomerToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for CustomerToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("CustomerToken").field(&"<redacted>").finish()
	}
}
impl Display for CustomerToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// One-shot encrypted token carried on the URL (`ct` parameter) during the hop
/// from the identity server back to this application.
///
/// Consumed at most once per request; it always takes precedence over any
/// session-held [`CustomerToken`] and is exchanged for a fresh one via the
/// decrypt operation.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedToken(String);
impl EncryptedToken {
	/// Wraps the raw `ct` parameter value.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner encrypted value for the decrypt exchange.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for EncryptedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("EncryptedToken").field(&"<redacted>").finish()
	}
}

/// Short-lived signed artifact proving this application's identity and carrying a
/// return URL; minted on demand, never stored.
///
/// Vendor tokens end up in browser-facing URLs, so the wrapper does not redact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VendorToken(String);
impl VendorToken {
	/// Wraps a freshly minted vendor token.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the token value as composed into login/register URLs.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for VendorToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Redacted wrapper for vendor credential material (password, vendor block).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential(String);
impl Credential {
	/// Wraps a new credential string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Whether the wrapped value is the empty string.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Credential").field(&"<redacted>").finish()
	}
}
impl Display for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let token = CustomerToken::new("opaque-session-token");

		assert_eq!(format!("{token:?}"), "CustomerToken(\"<redacted>\")");
		assert_eq!(format!("{token}"), "<redacted>");

		let credential = Credential::new("vendor-block");

		assert_eq!(format!("{credential:?}"), "Credential(\"<redacted>\")");
	}

	#[test]
	fn vendor_token_is_not_redacted() {
		let token = VendorToken::new("ABC");

		assert_eq!(token.as_str(), "ABC");
		assert_eq!(format!("{token}"), "ABC");
	}
}
