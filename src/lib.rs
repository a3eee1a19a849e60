//! Rust's turnkey vendor-token SSO client - exchange opaque customer tokens, mint signed
//! login URLs, and reconcile remote identity sessions in one crate built for production.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod profile;
pub mod reconcile;
pub mod request;
pub mod session;
#[cfg(feature = "reqwest")]
pub mod _preludet {
	//! Convenience re-exports and fixture helpers for this crate's test suites. Not part of the
	//! stable API surface.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::VendorId,
		client::SsoClient,
		config::{SsoEndpoints, VendorConfig},
		http::ReqwestTransport,
		session::MemorySession,
	};

	/// Vendor id used by every test fixture.
	pub const TEST_VENDOR_ID: &str = "V1";

	/// Parses a URL fixture, panicking with context on failure.
	pub fn test_url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse test fixture URL.")
	}

	/// Builds a vendor configuration whose endpoints all live under `base`.
	pub fn test_vendor_config(base: &str) -> VendorConfig {
		let endpoints = SsoEndpoints::new(
			test_url(&format!("{base}/login")),
			test_url(&format!("{base}/register")),
			test_url(&format!("{base}/service")),
		);
		let vendor_id =
			VendorId::new(TEST_VENDOR_ID).expect("Failed to build vendor identifier for tests.");

		VendorConfig::new(vendor_id, endpoints)
			.with_credentials("vendor-user", "vendor-pass")
			.with_vendor_block("vendor-block")
	}

	/// Constructs an [`SsoClient`] plus a fresh session, wired to the bundled
	/// reqwest transport, suitable for httpmock servers.
	pub fn build_reqwest_test_client(base: &str) -> (SsoClient, MemorySession) {
		let transport =
			ReqwestTransport::new().expect("Failed to build reqwest transport for tests.");
		let client = SsoClient::with_transport(test_vendor_config(base), Arc::new(transport));

		(client, MemorySession::default())
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {httpmock as _, tokio as _};
