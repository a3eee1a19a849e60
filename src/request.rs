//! Inbound request snapshot consumed by the protocol client and the reconciler.

// self
use crate::{_prelude::*, auth::EncryptedToken, error::ConfigError};

/// Query parameter carrying the one-time encrypted token.
pub const ENCRYPTED_TOKEN_PARAM: &str = "ct";

/// Immutable snapshot of the inbound HTTP request.
///
/// The host adapter builds one per request from whatever framework types it has;
/// the crate only ever reads from it.
#[derive(Clone, Debug)]
pub struct RequestContext {
	scheme: String,
	host: String,
	port: Option<u16>,
	path: String,
	query: Vec<(String, String)>,
	cookies: HashMap<String, String>,
	posted: bool,
}
impl RequestContext {
	/// Creates a snapshot for a GET request to `path` on the given host.
	///
	/// A `path` that already carries its query string is split so the
	/// reconstructed URL never duplicates the query.
	pub fn new(
		scheme: impl Into<String>,
		host: impl Into<String>,
		path: impl Into<String>,
	) -> Self {
		let mut path = path.into();
		let mut query = Vec::new();

		if let Some((bare, raw_query)) = path.split_once('?').map(|(p, q)| (p.to_owned(), q.to_owned()))
		{
			query.extend(
				url::form_urlencoded::parse(raw_query.as_bytes())
					.map(|(key, value)| (key.into_owned(), value.into_owned())),
			);

			path = bare;
		}
		if path.is_empty() {
			path = "/".into();
		}
		if !path.starts_with('/') {
			path.insert(0, '/');
		}

		Self {
			scheme: scheme.into(),
			host: host.into(),
			port: None,
			path,
			query,
			cookies: HashMap::new(),
			posted: false,
		}
	}

	/// Sets an explicit port; default ports are elided from reconstructed URLs.
	pub fn with_port(mut self, port: u16) -> Self {
		self.port = Some(port);

		self
	}

	/// Appends a query parameter.
	pub fn with_query_pair(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((name.into(), value.into()));

		self
	}

	/// Attaches a cookie.
	pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.cookies.insert(name.into(), value.into());

		self
	}

	/// Marks the request as a POST submission.
	pub fn posted(mut self) -> Self {
		self.posted = true;

		self
	}

	/// Request path, always `/`-prefixed.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Whether the request was a POST submission.
	pub fn is_posted(&self) -> bool {
		self.posted
	}

	/// Query pairs in arrival order.
	pub fn query(&self) -> &[(String, String)] {
		&self.query
	}

	/// First value of the named query parameter.
	pub fn query_value(&self, name: &str) -> Option<&str> {
		self.query.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
	}

	/// Value of the named cookie.
	pub fn cookie(&self, name: &str) -> Option<&str> {
		self.cookies.get(name).map(String::as_str)
	}

	/// One-time encrypted token from the `ct` parameter, if present and non-empty.
	pub fn encrypted_token(&self) -> Option<EncryptedToken> {
		self.query_value(ENCRYPTED_TOKEN_PARAM)
			.filter(|value| !value.is_empty())
			.map(EncryptedToken::new)
	}

	/// Scheme + authority of the request as a URL ending in `/`.
	pub fn base_url(&self) -> Result<Url, ConfigError> {
		Url::parse(&format!("{}://{}/", self.scheme, self.authority()))
			.map_err(|source| ConfigError::InvalidEndpoint { source })
	}

	/// Complete current URL: scheme, host, non-default port, path, and query.
	pub fn current_url(&self) -> Result<Url, ConfigError> {
		let mut url = self.base_url()?;

		url.set_path(&self.path);

		if !self.query.is_empty() {
			url.set_query(Some(&self.query_string()));
		}

		Ok(url)
	}

	/// Query pairs re-encoded as a query string, without the leading `?`.
	pub fn query_string(&self) -> String {
		url::form_urlencoded::Serializer::new(String::new())
			.extend_pairs(self.query.iter().map(|(key, value)| (key.as_str(), value.as_str())))
			.finish()
	}

	fn authority(&self) -> String {
		match self.port {
			Some(port) if !matches!((self.scheme.as_str(), port), ("http", 80) | ("https", 443)) =>
				format!("{}:{port}", self.host),
			_ => self.host.clone(),
		}
	}
}
