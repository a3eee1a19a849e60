//! Immutable configuration value objects for the SSO and profile services.

// self
use crate::{
	_prelude::*,
	auth::{Credential, VendorId},
};

/// Endpoint set exposed by the remote identity provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SsoEndpoints {
	/// Browser-facing login page.
	pub login: Url,
	/// Browser-facing registration page.
	pub register: Url,
	/// Web-service base URL that operation names are appended to.
	pub service: Url,
}
impl SsoEndpoints {
	/// Bundles the three provider endpoints.
	pub fn new(login: Url, register: Url, service: Url) -> Self {
		Self { login, register, service }
	}
}

/// Immutable vendor configuration presented to the remote identity service.
///
/// Credentials default to empty strings; an empty credential surfaces as a remote
/// lookup failure, not a construction failure. Construction itself only fails
/// upstream, where the caller parses the endpoint URLs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VendorConfig {
	/// Vendor identifier composed into login/register URLs.
	pub vendor_id: VendorId,
	/// Vendor account name sent with every operation.
	pub vendor_username: String,
	/// Vendor account password sent with every operation.
	pub vendor_password: Credential,
	/// Shared secret used when minting and decrypting tokens.
	pub vendor_block: Credential,
	/// Remote endpoint set.
	pub endpoints: SsoEndpoints,
}
impl VendorConfig {
	/// Creates a configuration with empty credentials for the given endpoints.
	pub fn new(vendor_id: VendorId, endpoints: SsoEndpoints) -> Self {
		Self {
			vendor_id,
			vendor_username: String::new(),
			vendor_password: Credential::default(),
			vendor_block: Credential::default(),
			endpoints,
		}
	}

	/// Sets or replaces the vendor account credentials.
	pub fn with_credentials(
		mut self,
		username: impl Into<String>,
		password: impl Into<String>,
	) -> Self {
		self.vendor_username = username.into();
		self.vendor_password = Credential::new(password);

		self
	}

	/// Sets or replaces the shared vendor block secret.
	pub fn with_vendor_block(mut self, block: impl Into<String>) -> Self {
		self.vendor_block = Credential::new(block);

		self
	}
}

/// Configuration for the customer-profile ("label") service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileConfig {
	/// Service base URL that operation names are appended to.
	pub service: Url,
}
impl ProfileConfig {
	/// Creates a configuration for the given service base URL.
	pub fn new(service: Url) -> Self {
		Self { service }
	}
}

/// Fixed authentication policy answers exposed to host applications.
///
/// The remote identity provider is the only credential authority, so these are
/// configuration values rather than overridable behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthCapabilities {
	/// Whether the host may offer password changes.
	pub allows_password_change: bool,
	/// Whether accounts can be created in the remote authority from the host.
	pub creates_remote_accounts: bool,
	/// Whether a missing local account is created automatically on first login.
	pub auto_creates_local_accounts: bool,
	/// Whether local-password fallback authentication is disabled.
	pub strict_external_auth: bool,
}
impl Default for AuthCapabilities {
	fn default() -> Self {
		Self {
			allows_password_change: false,
			creates_remote_accounts: false,
			auto_creates_local_accounts: true,
			strict_external_auth: true,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn endpoints() -> SsoEndpoints {
		SsoEndpoints::new(
			Url::parse("https://idp.example/login").expect("Login fixture URL should parse."),
			Url::parse("https://idp.example/register").expect("Register fixture URL should parse."),
			Url::parse("https://idp.example/service").expect("Service fixture URL should parse."),
		)
	}

	#[test]
	fn credentials_default_to_empty() {
		let config = VendorConfig::new(
			VendorId::new("V1").expect("Vendor fixture should be valid."),
			endpoints(),
		);

		assert!(config.vendor_username.is_empty());
		assert!(config.vendor_password.is_empty());
		assert!(config.vendor_block.is_empty());
	}

	#[test]
	fn builder_style_setters_replace_credentials() {
		let config = VendorConfig::new(
			VendorId::new("V1").expect("Vendor fixture should be valid."),
			endpoints(),
		)
		.with_credentials("vendor-user", "vendor-pass")
		.with_vendor_block("vendor-block");

		assert_eq!(config.vendor_username, "vendor-user");
		assert_eq!(config.vendor_password.expose(), "vendor-pass");
		assert_eq!(config.vendor_block.expose(), "vendor-block");
	}

	#[test]
	fn debug_output_redacts_credentials() {
		let config = VendorConfig::new(
			VendorId::new("V1").expect("Vendor fixture should be valid."),
			endpoints(),
		)
		.with_credentials("vendor-user", "vendor-pass");
		let rendered = format!("{config:?}");

		assert!(!rendered.contains("vendor-pass"));
		assert!(rendered.contains("<redacted>"));
	}

	#[test]
	fn capability_defaults_require_strict_external_auth() {
		let capabilities = AuthCapabilities::default();

		assert!(!capabilities.allows_password_change);
		assert!(!capabilities.creates_remote_accounts);
		assert!(capabilities.auto_creates_local_accounts);
		assert!(capabilities.strict_external_auth);
	}
}
