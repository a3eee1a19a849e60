//! The vendor-token protocol client orchestrating the customer token lifecycle.
//!
//! [`SsoClient`] owns the transport handle and vendor configuration so callers
//! construct it once and pass it by reference into the reconciler and any
//! collaborator needing lookups. Every remote call targets a fixed operation
//! name appended to the configured service URL; operation names are an
//! enumerated set, never user input.

// self
use crate::{
	_prelude::*,
	auth::{CustomerId, CustomerToken, EncryptedToken, VendorToken},
	codec,
	config::{AuthCapabilities, VendorConfig},
	error::ConfigError,
	http::SsoTransport,
	obs::{self, OpKind, OpOutcome, OpSpan},
	request::RequestContext,
	session::SessionStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// Query parameter carrying the vendor id on login/register URLs.
pub const VENDOR_ID_PARAM: &str = "vi";
/// Query parameter carrying the minted vendor token on login/register URLs.
pub const VENDOR_TOKEN_PARAM: &str = "vt";

/// Fixed remote operation names; every call target is `service_url + "/" + name`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Encrypts a return URL into a short-lived vendor token.
	VendorTokenEncrypt,
	/// Exchanges a URL-carried encrypted token for a customer token.
	CustomerTokenDecrypt,
	/// Validates a customer token, possibly rotating it.
	CustomerTokenIsValid,
	/// Terminates the remote customer session.
	CustomerLogout,
	/// Fetches the customer record for an identifier.
	CustomerGet,
	/// Derives the stable customer identifier from a customer token.
	CustomerIdentifierGet,
}
impl Operation {
	/// Returns the remote operation name as it appears on the wire.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::VendorTokenEncrypt => "VendorTokenEncrypt",
			Operation::CustomerTokenDecrypt => "CustomerTokenDecrypt",
			Operation::CustomerTokenIsValid => "SSOCustomerTokenIsValid",
			Operation::CustomerLogout => "SSOCustomerLogout",
			Operation::CustomerGet => "SSOCustomerGet",
			Operation::CustomerIdentifierGet => "TIMSSCustomerIdentifierGet",
		}
	}

	const fn kind(self) -> OpKind {
		match self {
			Operation::VendorTokenEncrypt => OpKind::MintVendorToken,
			Operation::CustomerTokenDecrypt => OpKind::DecryptToken,
			Operation::CustomerTokenIsValid => OpKind::ValidateToken,
			Operation::CustomerLogout => OpKind::Logout,
			Operation::CustomerGet => OpKind::CustomerGet,
			Operation::CustomerIdentifierGet => OpKind::IdentifierGet,
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Customer record returned by the remote service for an existing customer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomerRecord {
	/// Account name on the remote side.
	pub user_name: String,
	/// Email address on file.
	pub email: String,
}

/// Outcome of a customer lookup; absence is an expected result, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CustomerLookup {
	/// The remote service knows the customer.
	Found(CustomerRecord),
	/// The remote service reports that no such customer exists.
	NotFound,
}
impl CustomerLookup {
	/// Returns the record for a found customer.
	pub fn found(self) -> Option<CustomerRecord> {
		match self {
			CustomerLookup::Found(record) => Some(record),
			CustomerLookup::NotFound => None,
		}
	}
}

struct TokenValidation {
	valid: bool,
	replacement: Option<CustomerToken>,
}

/// Protocol client for the vendor-token SSO service.
#[derive(Clone)]
pub struct SsoClient {
	/// Transport used for every outbound service request.
	pub transport: Arc<dyn SsoTransport>,
	/// Vendor credentials and endpoint set presented to the remote service.
	pub config: VendorConfig,
}
impl SsoClient {
	/// Creates a client backed by a caller-provided transport.
	pub fn with_transport(config: VendorConfig, transport: Arc<dyn SsoTransport>) -> Self {
		Self { transport, config }
	}

	/// Fixed authentication policy answers for host applications.
	///
	/// The remote identity provider is the only credential authority, so the
	/// answers never vary per deployment.
	pub fn capabilities(&self) -> AuthCapabilities {
		AuthCapabilities::default()
	}

	/// Resolves and validates the caller's customer token.
	///
	/// The token is resolved from the request's `ct` parameter (decrypted into a
	/// fresh customer token) or, failing that, from the session slot; when
	/// neither yields a token the method returns `false` without any network
	/// call. A resolved token is validated remotely: on success a rotated
	/// replacement, when returned, overwrites the session slot; on failure the
	/// session slot is evicted. A stale or invalid token never survives one
	/// validation cycle.
	pub async fn is_authenticated(
		&self,
		request: &RequestContext,
		session: &dyn SessionStore,
	) -> Result<bool> {
		let resolved = match request.encrypted_token() {
			Some(encrypted) => Some(self.decrypt_customer_token(&encrypted).await?),
			None => session.customer_token(),
		};
		let Some(token) = resolved else {
			return Ok(false);
		};
		let validation = self.validate_customer_token(&token).await?;

		if validation.valid {
			if let Some(replacement) = validation.replacement {
				session.set_customer_token(&replacement);
			}
		} else {
			session.evict_customer_token();
		}

		Ok(validation.valid)
	}

	/// Builds the complete SSO login URL for the remote identity provider.
	///
	/// `return_url` defaults to the request's current URL. A fresh vendor token
	/// is minted on every call; mint results are never cached, trading an extra
	/// round trip for immunity to stale signatures.
	pub async fn login_url(
		&self,
		request: &RequestContext,
		return_url: Option<Url>,
	) -> Result<Url> {
		self.entry_url(self.config.endpoints.login.clone(), request, return_url).await
	}

	/// Builds the complete SSO registration URL for the remote identity provider.
	///
	/// Same contract as [`SsoClient::login_url`].
	pub async fn register_url(
		&self,
		request: &RequestContext,
		return_url: Option<Url>,
	) -> Result<Url> {
		self.entry_url(self.config.endpoints.register.clone(), request, return_url).await
	}

	/// Derives the stable customer identifier for the current session.
	///
	/// Callers must ensure a customer token is present; a missing token is a
	/// contract violation surfaced as [`Error::MissingCustomerToken`].
	pub async fn customer_identifier(&self, session: &dyn SessionStore) -> Result<CustomerId> {
		let token = session.customer_token().ok_or(Error::MissingCustomerToken)?;
		let mut payload = self.base_payload();

		payload.push(("customerToken".into(), token.expose().to_owned()));

		let body = self.call(Operation::CustomerIdentifierGet, payload).await?;
		let identifier = codec::xml_field(&body, "CustomerIdentifier")?;

		Ok(CustomerId::new(identifier)?)
	}

	/// Looks up the customer record, resolving the identifier from the session
	/// when `id` is omitted.
	///
	/// A remote `UserExists` field that is anything but a case-insensitive
	/// `"true"` yields [`CustomerLookup::NotFound`].
	pub async fn customer(
		&self,
		session: &dyn SessionStore,
		id: Option<CustomerId>,
	) -> Result<CustomerLookup> {
		let id = match id {
			Some(id) => id,
			None => self.customer_identifier(session).await?,
		};
		let mut payload = self.base_payload();

		payload.push(("TIMSSCustomerId".into(), id.to_string()));

		let body = self.call(Operation::CustomerGet, payload).await?;
		let mut fields = codec::xml_fields(&body, &["UserExists", "UserName", "Email"])?;

		if !fields.get("UserExists").is_some_and(|value| value.eq_ignore_ascii_case("true")) {
			return Ok(CustomerLookup::NotFound);
		}

		Ok(CustomerLookup::Found(CustomerRecord {
			user_name: fields.remove("UserName").unwrap_or_default(),
			email: fields.remove("Email").unwrap_or_default(),
		}))
	}

	/// Logs the current session out of the remote identity provider.
	///
	/// Without a session token this is a no-op. With one, the remote logout
	/// operation is invoked (its response fields are ignored) and the session
	/// slot is evicted on every path, so local logout never depends on remote
	/// liveness; a transport failure is still reported after eviction.
	pub async fn logout(&self, session: &dyn SessionStore) -> Result<()> {
		let Some(token) = session.customer_token() else {
			return Ok(());
		};
		let mut payload = self.base_payload();

		payload.push(("customerToken".into(), token.expose().to_owned()));

		let result = self.call(Operation::CustomerLogout, payload).await;

		session.evict_customer_token();
		result.map(|_| ())
	}

	async fn entry_url(
		&self,
		base: Url,
		request: &RequestContext,
		return_url: Option<Url>,
	) -> Result<Url> {
		let return_url = match return_url {
			Some(url) => url,
			None => request.current_url()?,
		};
		let vendor_token = self.encrypt_vendor_token(&return_url).await?;
		let mut url = base;

		url.query_pairs_mut()
			.append_pair(VENDOR_ID_PARAM, self.config.vendor_id.as_ref())
			.append_pair(VENDOR_TOKEN_PARAM, vendor_token.as_str());

		Ok(url)
	}

	async fn encrypt_vendor_token(&self, return_url: &Url) -> Result<VendorToken> {
		let mut payload = self.base_payload();

		payload.push(("vendorBlock".into(), self.config.vendor_block.expose().to_owned()));
		payload.push(("url".into(), return_url.as_str().to_owned()));

		let body = self.call(Operation::VendorTokenEncrypt, payload).await?;

		Ok(VendorToken::new(codec::xml_field(&body, "VendorToken")?))
	}

	async fn decrypt_customer_token(&self, encrypted: &EncryptedToken) -> Result<CustomerToken> {
		let mut payload = self.base_payload();

		payload.push(("vendorBlock".into(), self.config.vendor_block.expose().to_owned()));
		payload.push(("customerToken".into(), encrypted.expose().to_owned()));

		let body = self.call(Operation::CustomerTokenDecrypt, payload).await?;

		Ok(CustomerToken::new(codec::xml_field(&body, "CustomerToken")?))
	}

	async fn validate_customer_token(&self, token: &CustomerToken) -> Result<TokenValidation> {
		let mut payload = self.base_payload();

		payload.push(("customerToken".into(), token.expose().to_owned()));

		let body = self.call(Operation::CustomerTokenIsValid, payload).await?;
		let mut fields = codec::xml_fields(&body, &["Valid", "NewCustomerToken"])?;
		let valid = fields.get("Valid").is_some_and(|value| value.eq_ignore_ascii_case("true"));
		let replacement = if valid {
			fields
				.remove("NewCustomerToken")
				.filter(|value| !value.is_empty())
				.map(CustomerToken::new)
		} else {
			None
		};

		Ok(TokenValidation { valid, replacement })
	}

	/// Dispatches one remote operation and returns the raw response body.
	async fn call(&self, op: Operation, payload: Vec<(String, String)>) -> Result<String> {
		let kind = op.kind();
		let span = OpSpan::new(kind, "call");

		obs::record_op_outcome(kind, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let url = self.operation_url(op)?;
				let body = self.transport.post_form(&url, &payload).await?;

				Ok(body)
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(kind, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(kind, OpOutcome::Failure),
		}

		result
	}

	fn base_payload(&self) -> Vec<(String, String)> {
		vec![
			("vendorUsername".into(), self.config.vendor_username.clone()),
			("vendorPassword".into(), self.config.vendor_password.expose().to_owned()),
		]
	}

	fn operation_url(&self, op: Operation) -> Result<Url> {
		let service = self.config.endpoints.service.as_str().trim_end_matches('/');

		Url::parse(&format!("{service}/{op}"))
			.map_err(|source| ConfigError::InvalidEndpoint { source }.into())
	}
}
#[cfg(feature = "reqwest")]
impl SsoClient {
	/// Creates a client backed by the bundled reqwest transport.
	///
	/// The transport disables redirect following and applies the default bounded
	/// timeout; use [`SsoClient::with_transport`] to supply a custom stack.
	pub fn new(config: VendorConfig) -> Result<Self> {
		Ok(Self::with_transport(config, Arc::new(ReqwestTransport::new()?)))
	}
}
impl Debug for SsoClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SsoClient")
			.field("vendor_id", &self.config.vendor_id)
			.field("service", &self.config.endpoints.service.as_str())
			.finish()
	}
}
