//! Transport primitives for the remote SSO and profile services.
//!
//! The module exposes the object-safe [`SsoTransport`] contract plus the bundled
//! reqwest-backed implementation. Transports never follow redirects: browser-facing
//! URLs delegate following to the browser, and the auto-login probe needs to
//! inspect the 3xx response itself. A connection-level failure or an HTTP status
//! of 400 or above surfaces as a single [`TransportError`] carrying the effective
//! URL; 2xx and 3xx responses succeed. No transport ever retries.

// std
use std::time::Duration;
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::{
	RequestBuilder,
	header::{ACCEPT, CONTENT_TYPE, COOKIE},
	redirect::Policy,
};
// self
use crate::{_prelude::*, codec, error::TransportError};

/// Boxed future returned by [`SsoTransport`] methods.
pub type TransportFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// Bounded per-request timeout applied by the bundled transport; expiry surfaces
/// as a [`TransportError`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Status and headers captured from a HEAD probe.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeadResponse {
	/// HTTP status code of the response.
	pub status: u16,
	/// Response headers; lookups via [`HeadResponse::header`] are case-insensitive.
	pub headers: HashMap<String, String>,
}
impl HeadResponse {
	/// Builds a response from a status code and a raw header block.
	pub fn from_raw_block(status: u16, block: &str) -> Self {
		Self { status, headers: codec::parse_header_block(block) }
	}

	/// Returns the named header value, matching the name case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Abstraction over HTTP transports used for every outbound service call.
///
/// Implementations must be `Send + Sync` so one transport can be shared across
/// clients behind an `Arc`, and must not follow redirects (see the module
/// documentation for the failure policy).
pub trait SsoTransport
where
	Self: Send + Sync,
{
	/// POSTs a form-encoded body to `url` and returns the raw response body.
	fn post_form<'a>(
		&'a self,
		url: &'a Url,
		fields: &'a [(String, String)],
	) -> TransportFuture<'a, String>;

	/// POSTs an empty body with a JSON `Accept` header and returns the raw
	/// response body.
	fn post_accept_json<'a>(&'a self, url: &'a Url) -> TransportFuture<'a, String>;

	/// GETs `url` and returns the raw response body.
	fn get<'a>(&'a self, url: &'a Url) -> TransportFuture<'a, String>;

	/// Issues a HEAD request carrying the given cookies and returns the status
	/// plus headers of the immediate response, redirects not followed.
	fn head<'a>(
		&'a self,
		url: &'a Url,
		cookies: &'a [(String, String)],
	) -> TransportFuture<'a, HeadResponse>;
}

/// Serializes form fields into an `application/x-www-form-urlencoded` body.
///
/// Values are percent-escaped individually. The legacy wire contract joined raw
/// values with `&`/`=` and pre-urlencoded the only value that needed it; escaping
/// once here is the hardened, wire-compatible replacement for that scheme.
pub fn encode_form(fields: &[(String, String)]) -> String {
	let mut serializer = url::form_urlencoded::Serializer::new(String::new());

	for (key, value) in fields {
		serializer.append_pair(key, value);
	}

	serializer.finish()
}

/// Joins cookie pairs into a `Cookie` header value.
pub fn encode_cookies(cookies: &[(String, String)]) -> String {
	cookies
		.iter()
		.map(|(name, value)| format!("{name}={value}"))
		.collect::<Vec<_>>()
		.join("; ")
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The bundled constructor disables redirect following and applies
/// [`DEFAULT_TIMEOUT`]. Configure any custom [`ReqwestClient`] the same way
/// before handing it to [`ReqwestTransport::with_client`].
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestTransport(ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport with redirects disabled and the default bounded timeout.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(DEFAULT_TIMEOUT)
			.redirect(Policy::none())
			.build()
			.map_err(crate::error::ConfigError::http_client_build)?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	async fn body_checked(
		&self,
		request: RequestBuilder,
		url: &Url,
	) -> Result<String, TransportError> {
		let response = request.send().await.map_err(|e| TransportError::network(url, e))?;
		let status = response.status().as_u16();
		let body = response.text().await.map_err(|e| TransportError::network(url, e))?;

		if status >= 400 {
			return Err(TransportError::status(url, status, &body));
		}

		Ok(body)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl SsoTransport for ReqwestTransport {
	fn post_form<'a>(
		&'a self,
		url: &'a Url,
		fields: &'a [(String, String)],
	) -> TransportFuture<'a, String> {
		Box::pin(async move {
			let request = self
				.0
				.post(url.clone())
				.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
				.body(encode_form(fields));

			self.body_checked(request, url).await
		})
	}

	fn post_accept_json<'a>(&'a self, url: &'a Url) -> TransportFuture<'a, String> {
		Box::pin(async move {
			let request =
				self.0.post(url.clone()).header(ACCEPT, "application/json; charset=utf-8");

			self.body_checked(request, url).await
		})
	}

	fn get<'a>(&'a self, url: &'a Url) -> TransportFuture<'a, String> {
		Box::pin(async move { self.body_checked(self.0.get(url.clone()), url).await })
	}

	fn head<'a>(
		&'a self,
		url: &'a Url,
		cookies: &'a [(String, String)],
	) -> TransportFuture<'a, HeadResponse> {
		Box::pin(async move {
			let mut request = self.0.head(url.clone());

			if !cookies.is_empty() {
				request = request.header(COOKIE, encode_cookies(cookies));
			}

			let response = request.send().await.map_err(|e| TransportError::network(url, e))?;
			let status = response.status().as_u16();

			if status >= 400 {
				return Err(TransportError::status(url, status, ""));
			}

			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
				})
				.collect();

			Ok(HeadResponse { status, headers })
		})
	}
}
