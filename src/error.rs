//! Client-level error types shared across the protocol, transport, and codec layers.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Maximum number of body characters preserved in a status-failure snippet.
const SNIPPET_MAX: usize = 256;

/// Canonical client error exposed by public APIs.
///
/// "Customer not found" is deliberately absent here; lookups report it through
/// [`CustomerLookup::NotFound`](crate::client::CustomerLookup) because absence is an
/// expected outcome, not a failure.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Response payload could not be decoded.
	#[error(transparent)]
	Codec(#[from] crate::codec::CodecError),
	/// Transport failure (connection, timeout, HTTP >= 400).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Remote service returned a value that fails identifier validation.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// An identifier lookup was attempted without a customer token in the session.
	///
	/// This is a caller contract violation, not a recoverable state.
	#[error("No customer token is present in the session.")]
	MissingCustomerToken,
}

/// Configuration and URL-assembly failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A service, operation, or request URL could not be assembled.
	#[error("URL could not be assembled.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A redirect location could not be parsed.
	#[error("Redirect location is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, timeout, HTTP error status).
///
/// Always fatal to the current remote call and never retried; the caller decides
/// what a transport failure means.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a connection-level failure.
	#[error("Network error occurred while requesting `{url}`.")]
	Network {
		/// Effective URL of the failed request.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Remote service answered with an HTTP error status (>= 400).
	#[error("Status {status} received while requesting `{url}`: {body}.")]
	Status {
		/// Effective URL of the failed request.
		url: String,
		/// HTTP status code of the response.
		status: u16,
		/// Leading snippet of the response body.
		body: String,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error together with the effective URL.
	pub fn network(url: &Url, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { url: url.to_string(), source: Box::new(src) }
	}

	/// Builds a status failure carrying a bounded snippet of the response body.
	pub fn status(url: &Url, status: u16, body: &str) -> Self {
		let trimmed = body.trim_end();
		let snippet = match trimmed.char_indices().nth(SNIPPET_MAX) {
			Some((idx, _)) => &trimmed[..idx],
			None => trimmed,
		};

		Self::Status { url: url.to_string(), status, body: snippet.to_owned() }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::Network {
			url: e.url().map(ToString::to_string).unwrap_or_default(),
			source: Box::new(e),
		}
	}
}
