#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use sso_exchange::{
	_preludet::*,
	auth::CustomerId,
	config::ProfileConfig,
	http::ReqwestTransport,
	profile::ProfileClient,
};

fn profile_client(base: &str) -> ProfileClient {
	let transport =
		ReqwestTransport::new().expect("Failed to build reqwest transport for tests.");

	ProfileClient::with_transport(
		ProfileConfig::new(test_url(&format!("{base}/profile"))),
		Arc::new(transport),
	)
}

#[tokio::test]
async fn label_fetch_splits_the_identifier_into_master_and_sub() {
	let server = MockServer::start_async().await;
	let client = profile_client(&server.base_url());
	let label_call = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/profile/GetCustomerLabel")
				.query_param("masterCustID", "12345")
				.query_param("subCustID", "2")
				.header("accept", "application/json; charset=utf-8");
			then.status(200).header("content-type", "application/json").body(
				"{\"LabelName\":\"Jane Doe\",\"PrimaryEmail\":\"jane@example.com\",\
				\"MembershipType\":\"Full\"}",
			);
		})
		.await;
	let id = CustomerId::new("12345|2").expect("Customer id fixture should be valid.");
	let label = client.customer_label(&id).await.expect("Label fetch should succeed.");

	assert_eq!(label.label_name, "Jane Doe");
	assert_eq!(label.primary_email, "jane@example.com");
	assert!(label.is_member());

	label_call.assert_async().await;
}

#[tokio::test]
async fn missing_sub_component_defaults_to_zero() {
	let server = MockServer::start_async().await;
	let client = profile_client(&server.base_url());
	let label_call = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/profile/GetCustomerLabel")
				.query_param("masterCustID", "777")
				.query_param("subCustID", "0");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"LabelName\":\"Org Account\",\"PrimaryEmail\":\"org@example.com\"}");
		})
		.await;
	let id = CustomerId::new("777").expect("Customer id fixture should be valid.");
	let label = client.customer_label(&id).await.expect("Label fetch should succeed.");

	assert_eq!(label.label_name, "Org Account");
	assert!(!label.is_member(), "A missing membership type means non-member.");

	label_call.assert_async().await;
}

#[tokio::test]
async fn malformed_payloads_surface_as_codec_errors() {
	let server = MockServer::start_async().await;
	let client = profile_client(&server.base_url());

	server
		.mock_async(|when, then| {
			when.method(POST).path("/profile/GetCustomerLabel");
			then.status(200).body("<html>not json</html>");
		})
		.await;

	let id = CustomerId::new("777").expect("Customer id fixture should be valid.");
	let err = client
		.customer_label(&id)
		.await
		.expect_err("A non-JSON payload must surface as a codec failure.");

	assert!(matches!(err, Error::Codec(_)));
}
