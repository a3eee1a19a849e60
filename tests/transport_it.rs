#![cfg(feature = "reqwest")]

// crates.io
use httpmock::{Method, prelude::*};
// self
use sso_exchange::{
	_preludet::*,
	error::TransportError,
	http::{ReqwestTransport, SsoTransport},
};

fn transport() -> ReqwestTransport {
	ReqwestTransport::new().expect("Failed to build reqwest transport for tests.")
}

#[tokio::test]
async fn error_statuses_surface_the_url_and_a_body_snippet() {
	let server = MockServer::start_async().await;
	let missing = server
		.mock_async(|when, then| {
			when.method(GET).path("/missing");
			then.status(404).body("no such operation\n");
		})
		.await;
	let url = test_url(&server.url("/missing"));
	let err = transport()
		.get(&url)
		.await
		.expect_err("An HTTP 404 must surface as a transport failure.");

	match err {
		TransportError::Status { url: effective, status, body } => {
			assert!(effective.contains("/missing"));
			assert_eq!(status, 404);
			assert_eq!(body, "no such operation");
		},
		other => panic!("Expected a status failure, got {other:?}."),
	}

	missing.assert_async().await;
}

#[tokio::test]
async fn redirect_statuses_are_returned_not_followed() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/hop");
			then.status(302).header("Location", server.url("/target")).body("moved");
		})
		.await;

	let target = server
		.mock_async(|when, then| {
			when.method(GET).path("/target");
			then.status(200).body("followed");
		})
		.await;
	let url = test_url(&server.url("/hop"));
	let body = transport().get(&url).await.expect("A 3xx answer is a transport success.");

	assert_eq!(body, "moved");

	target.assert_calls_async(0).await;
}

#[tokio::test]
async fn head_probe_reports_status_and_headers_without_following() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(Method::HEAD).path("/probe").header("cookie", "SSO=abc");
			then.status(302).header("Location", "https://idp.example/landing");
		})
		.await;

	let target = server
		.mock_async(|when, then| {
			when.method(GET).path("/landing");
			then.status(200);
		})
		.await;
	let url = test_url(&server.url("/probe"));
	let cookies = [("SSO".to_owned(), "abc".to_owned())];
	let probe = transport().head(&url, &cookies).await.expect("HEAD probe should succeed.");

	assert_eq!(probe.status, 302);
	assert_eq!(probe.header("location"), Some("https://idp.example/landing"));

	target.assert_calls_async(0).await;
}

#[tokio::test]
async fn form_values_reach_the_server_escaped_exactly_once() {
	let server = MockServer::start_async().await;
	let post = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/form")
				.header("content-type", "application/x-www-form-urlencoded")
				.form_urlencoded_tuple("url", "https://app.example/return?a=1&b=2")
				.form_urlencoded_tuple("vendorUsername", "vendor user");
			then.status(200).body("ok");
		})
		.await;
	let url = test_url(&server.url("/form"));
	let fields = [
		("url".to_owned(), "https://app.example/return?a=1&b=2".to_owned()),
		("vendorUsername".to_owned(), "vendor user".to_owned()),
	];
	let body = transport().post_form(&url, &fields).await.expect("Form POST should succeed.");

	assert_eq!(body, "ok");

	post.assert_async().await;
}

#[tokio::test]
async fn connection_failures_surface_as_network_errors() {
	// Nothing listens on this port; the connect attempt itself must fail.
	let url = test_url("http://127.0.0.1:9/down");
	let err = transport()
		.get(&url)
		.await
		.expect_err("A refused connection must surface as a transport failure.");

	assert!(matches!(err, TransportError::Network { .. }));
	assert!(err.to_string().contains("127.0.0.1:9"));
}
