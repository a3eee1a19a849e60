//! Customer-profile ("label") lookup client for the membership service.
//!
//! A single RPC-style capability: fetch the display label, primary email, and
//! membership type for a customer identifier. The identifier's `master|sub`
//! shape is split into the two query parameters the service expects.

// self
use crate::{
	_prelude::*,
	auth::CustomerId,
	codec,
	config::ProfileConfig,
	error::ConfigError,
	http::SsoTransport,
	obs::{self, OpKind, OpOutcome, OpSpan},
};

const OP_CUSTOMER_LABEL: &str = "GetCustomerLabel";

/// Basic profile information returned by the label service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerLabel {
	/// Display label for the customer.
	#[serde(rename = "LabelName", default)]
	pub label_name: String,
	/// Primary email address on file.
	#[serde(rename = "PrimaryEmail", default)]
	pub primary_email: String,
	/// Membership type; empty or absent for non-members.
	#[serde(rename = "MembershipType", default)]
	pub membership_type: Option<String>,
}
impl CustomerLabel {
	/// Whether the customer holds an active membership.
	pub fn is_member(&self) -> bool {
		self.membership_type.as_deref().is_some_and(|membership| !membership.is_empty())
	}
}

/// Client for the customer-profile service.
#[derive(Clone)]
pub struct ProfileClient {
	/// Transport used for every outbound service request.
	pub transport: Arc<dyn SsoTransport>,
	/// Profile service configuration.
	pub config: ProfileConfig,
}
impl ProfileClient {
	/// Creates a client backed by a caller-provided transport.
	pub fn with_transport(config: ProfileConfig, transport: Arc<dyn SsoTransport>) -> Self {
		Self { transport, config }
	}

	/// Fetches the customer's basic profile information.
	pub async fn customer_label(&self, id: &CustomerId) -> Result<CustomerLabel> {
		const KIND: OpKind = OpKind::ProfileGet;

		let span = OpSpan::new(KIND, "customer_label");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let (master, sub) = id.label_parts();
				let mut url = self.operation_url(OP_CUSTOMER_LABEL)?;

				url.query_pairs_mut()
					.append_pair("masterCustID", master)
					.append_pair("subCustID", sub);

				let body = self.transport.post_accept_json(&url).await?;

				Ok(codec::json_decode(&body)?)
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	fn operation_url(&self, name: &str) -> Result<Url> {
		let service = self.config.service.as_str().trim_end_matches('/');

		Url::parse(&format!("{service}/{name}"))
			.map_err(|source| ConfigError::InvalidEndpoint { source }.into())
	}
}
impl Debug for ProfileClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProfileClient")
			.field("service", &self.config.service.as_str())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn label_decodes_from_service_field_names() {
		let label: CustomerLabel = codec::json_decode(
			"{\"LabelName\":\"Jane Doe\",\"PrimaryEmail\":\"jane@example.com\",\"MembershipType\":\"Full\"}",
		)
		.expect("Label payload should decode successfully.");

		assert_eq!(label.label_name, "Jane Doe");
		assert_eq!(label.primary_email, "jane@example.com");
		assert!(label.is_member());
	}

	#[test]
	fn missing_or_empty_membership_means_non_member() {
		let absent: CustomerLabel = codec::json_decode("{\"LabelName\":\"Jane Doe\"}")
			.expect("Label payload should decode successfully.");

		assert!(!absent.is_member());

		let empty: CustomerLabel = codec::json_decode("{\"MembershipType\":\"\"}")
			.expect("Label payload should decode successfully.");

		assert!(!empty.is_member());

		let null: CustomerLabel = codec::json_decode("{\"MembershipType\":null}")
			.expect("Label payload should decode successfully.");

		assert!(!null.is_member());
	}
}
