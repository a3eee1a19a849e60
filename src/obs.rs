//! Optional observability helpers for protocol operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `sso_exchange.op` with the `op` (operation)
//!   and `stage` (call site) fields.
//! - Enable `metrics` to increment the `sso_exchange_op_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Remote operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Customer token validation (with possible rotation).
	ValidateToken,
	/// Exchange of a URL-carried encrypted token.
	DecryptToken,
	/// Vendor token minting for login/register URLs.
	MintVendorToken,
	/// Remote customer logout.
	Logout,
	/// Customer record lookup.
	CustomerGet,
	/// Customer identifier derivation.
	IdentifierGet,
	/// Customer profile ("label") fetch.
	ProfileGet,
	/// Auto-login HEAD probe issued by the reconciler.
	LoginProbe,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::ValidateToken => "validate_token",
			OpKind::DecryptToken => "decrypt_token",
			OpKind::MintVendorToken => "mint_vendor_token",
			OpKind::Logout => "logout",
			OpKind::CustomerGet => "customer_get",
			OpKind::IdentifierGet => "identifier_get",
			OpKind::ProfileGet => "profile_get",
			OpKind::LoginProbe => "login_probe",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a client helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
