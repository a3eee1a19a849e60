//! Per-request reconciliation between the host's login state and the remote SSO session.
//!
//! The reconciler is evaluated once per inbound request and never mutates the
//! session store itself; it only hands a redirect decision back to the
//! request-handling layer. Requests targeting the configured login/logout pages
//! are skipped outright to avoid redirect loops. Every failure on these paths is
//! caught and logged, and the answer fails open toward interactive login: no
//! redirect, never a visible error.

// self
use crate::{
	_prelude::*,
	client::SsoClient,
	codec,
	error::ConfigError,
	obs::{self, OpKind, OpOutcome, OpSpan},
	request::RequestContext,
	session::SessionStore,
};

/// Query parameter naming the page to return to after login/logout.
pub const RETURN_TO_PARAM: &str = "returnto";
/// Query parameter carrying the url-encoded query of the page to return to.
pub const RETURN_TO_QUERY_PARAM: &str = "returntoquery";
/// base64url-encoded variant of [`RETURN_TO_QUERY_PARAM`], used inside redirect
/// chains to avoid double-decoding ambiguity.
pub const B64_RETURN_TO_QUERY_PARAM: &str = "b64returntoquery";

/// Redirect status the auto-login probe looks for.
const PROBE_REDIRECT_STATUS: u16 = 302;

/// Host-side page paths and cookie names consulted during reconciliation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcilePolicy {
	/// Local login endpoint; requests targeting it are never reconciled.
	pub login_path: String,
	/// Local logout endpoint; requests targeting it are never reconciled.
	pub logout_path: String,
	/// Cookie whose presence signals a live session at the identity provider.
	pub sso_cookie: String,
	/// Cookie guarding against auto-login redirect loops.
	pub username_cookie: String,
}
impl Default for ReconcilePolicy {
	fn default() -> Self {
		Self {
			login_path: "/login".into(),
			logout_path: "/logout".into(),
			sso_cookie: "SSO".into(),
			username_cookie: "username".into(),
		}
	}
}

/// Redirect decision handed back to the request-handling layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileAction {
	/// Nothing to do.
	None,
	/// Send the browser to the local logout endpoint; the remote session ended
	/// elsewhere.
	Logout(Url),
	/// Send the browser to the given location to propagate a same-session login
	/// from the identity provider.
	Redirect(Url),
}

/// Per-request reconciler driving auto-login and auto-logout decisions.
#[derive(Clone, Debug)]
pub struct Reconciler {
	client: SsoClient,
	policy: ReconcilePolicy,
}
impl Reconciler {
	/// Creates a reconciler around the given client with the default policy.
	pub fn new(client: SsoClient) -> Self {
		Self { client, policy: ReconcilePolicy::default() }
	}

	/// Replaces the reconciliation policy.
	pub fn with_policy(mut self, policy: ReconcilePolicy) -> Self {
		self.policy = policy;

		self
	}

	/// Evaluates one inbound request against the host's login state.
	///
	/// `logged_in` is the host application's view of the caller. Requests for
	/// the login/logout pages short-circuit to [`ReconcileAction::None`] for any
	/// session state.
	pub async fn reconcile(
		&self,
		request: &RequestContext,
		session: &dyn SessionStore,
		logged_in: bool,
	) -> ReconcileAction {
		if self.targets_auth_page(request) {
			return ReconcileAction::None;
		}
		if logged_in {
			self.logout_if_necessary(request, session).await
		} else {
			self.login_if_necessary(request).await
		}
	}

	fn targets_auth_page(&self, request: &RequestContext) -> bool {
		request.path().eq_ignore_ascii_case(&self.policy.login_path)
			|| request.path().eq_ignore_ascii_case(&self.policy.logout_path)
	}

	async fn logout_if_necessary(
		&self,
		request: &RequestContext,
		session: &dyn SessionStore,
	) -> ReconcileAction {
		match self.client.is_authenticated(request, session).await {
			Ok(true) => ReconcileAction::None,
			Ok(false) => match self.local_return_url(request, &self.policy.logout_path, false) {
				Ok(url) => ReconcileAction::Logout(url),
				Err(err) => {
					fail_open("auto_logout", &err);

					ReconcileAction::None
				},
			},
			Err(err) => {
				fail_open("auto_logout", &err);

				ReconcileAction::None
			},
		}
	}

	async fn login_if_necessary(&self, request: &RequestContext) -> ReconcileAction {
		// Absent cookie is the common path; it costs no network calls.
		let Some(sso_value) = request.cookie(&self.policy.sso_cookie) else {
			return ReconcileAction::None;
		};

		match self.probe_login(request, sso_value).await {
			Ok(Some(location)) => ReconcileAction::Redirect(location),
			Ok(None) => ReconcileAction::None,
			Err(err) => {
				fail_open("auto_login", &err);

				ReconcileAction::None
			},
		}
	}

	/// Probes the SSO login URL with the caller's SSO cookie.
	///
	/// The probe is a HEAD request with redirect following disabled, so the 302
	/// issued for an already-authenticated identity-provider session is
	/// observable. Its `Location` header is only propagated when the inbound
	/// request carries no username cookie.
	async fn probe_login(
		&self,
		request: &RequestContext,
		sso_value: &str,
	) -> Result<Option<Url>> {
		const KIND: OpKind = OpKind::LoginProbe;

		let span = OpSpan::new(KIND, "probe_login");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let local_login =
					self.local_return_url(request, &self.policy.login_path, true)?;
				let sso_login = self.client.login_url(request, Some(local_login)).await?;
				let cookies = [(self.policy.sso_cookie.clone(), sso_value.to_owned())];
				let probe = self.client.transport.head(&sso_login, &cookies).await?;

				if probe.status != PROBE_REDIRECT_STATUS
					|| request.cookie(&self.policy.username_cookie).is_some()
				{
					return Ok(None);
				}

				let Some(location) = probe.header("Location") else {
					return Ok(None);
				};
				let location = Url::parse(location)
					.map_err(|source| ConfigError::InvalidRedirect { source })?;

				Ok(Some(location))
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	/// Builds an absolute URL to a local endpoint carrying the return target.
	///
	/// The propagated query is the inbound query minus the return parameters
	/// themselves; POST requests contribute no query. An inbound `returnto` or
	/// `returntoquery` parameter wins over the computed values. With
	/// `base64_query` the query travels as `b64returntoquery`.
	fn local_return_url(
		&self,
		request: &RequestContext,
		endpoint_path: &str,
		base64_query: bool,
	) -> Result<Url> {
		let mut url = request.base_url()?;

		url.set_path(endpoint_path);

		let page = request.query_value(RETURN_TO_PARAM).unwrap_or_else(|| request.path());
		let propagated = match request.query_value(RETURN_TO_QUERY_PARAM) {
			Some(existing) => existing.to_owned(),
			None if request.is_posted() => String::new(),
			None => filtered_query(request),
		};

		{
			let mut pairs = url.query_pairs_mut();

			pairs.append_pair(RETURN_TO_PARAM, page);

			if !propagated.is_empty() {
				if base64_query {
					pairs.append_pair(
						B64_RETURN_TO_QUERY_PARAM,
						&codec::base64_url_encode(&propagated),
					);
				} else {
					pairs.append_pair(RETURN_TO_QUERY_PARAM, &propagated);
				}
			}
		}

		Ok(url)
	}
}

/// Re-encodes the inbound query without the return parameters.
fn filtered_query(request: &RequestContext) -> String {
	let mut serializer = url::form_urlencoded::Serializer::new(String::new());

	for (key, value) in request.query() {
		if matches!(key.as_str(), RETURN_TO_PARAM | RETURN_TO_QUERY_PARAM | B64_RETURN_TO_QUERY_PARAM)
		{
			continue;
		}

		serializer.append_pair(key, value);
	}

	serializer.finish()
}

fn fail_open(stage: &'static str, err: &dyn Display) {
	#[cfg(feature = "tracing")]
	tracing::warn!(stage, error = %err, "SSO reconciliation failed; continuing without a redirect.");
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, err);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::VendorId,
		config::{SsoEndpoints, VendorConfig},
		http::{HeadResponse, SsoTransport, TransportFuture},
	};

	struct NoTransport;
	impl SsoTransport for NoTransport {
		fn post_form<'a>(
			&'a self,
			_: &'a Url,
			_: &'a [(String, String)],
		) -> TransportFuture<'a, String> {
			unreachable!("URL shaping tests never dispatch requests.")
		}

		fn post_accept_json<'a>(&'a self, _: &'a Url) -> TransportFuture<'a, String> {
			unreachable!("URL shaping tests never dispatch requests.")
		}

		fn get<'a>(&'a self, _: &'a Url) -> TransportFuture<'a, String> {
			unreachable!("URL shaping tests never dispatch requests.")
		}

		fn head<'a>(
			&'a self,
			_: &'a Url,
			_: &'a [(String, String)],
		) -> TransportFuture<'a, HeadResponse> {
			unreachable!("URL shaping tests never dispatch requests.")
		}
	}

	fn reconciler() -> Reconciler {
		let endpoints = SsoEndpoints::new(
			Url::parse("https://idp.example/login").expect("Login fixture URL should parse."),
			Url::parse("https://idp.example/register").expect("Register fixture URL should parse."),
			Url::parse("https://idp.example/service").expect("Service fixture URL should parse."),
		);
		let config = VendorConfig::new(
			VendorId::new("V1").expect("Vendor fixture should be valid."),
			endpoints,
		);

		Reconciler::new(SsoClient::with_transport(config, Arc::new(NoTransport)))
	}

	#[test]
	fn auth_pages_are_matched_case_insensitively() {
		let reconciler = reconciler();

		assert!(reconciler.targets_auth_page(&RequestContext::new("https", "app.example", "/Login")));
		assert!(reconciler.targets_auth_page(&RequestContext::new("https", "app.example", "/LOGOUT")));
		assert!(!reconciler.targets_auth_page(&RequestContext::new("https", "app.example", "/wiki")));
	}

	#[test]
	fn return_url_propagates_the_filtered_query() {
		let reconciler = reconciler();
		let request = RequestContext::new("https", "app.example", "/wiki")
			.with_query_pair("page", "Main")
			.with_query_pair("returnto", "/somewhere")
			.with_query_pair("returntoquery", "a=1");
		let url = reconciler
			.local_return_url(&request, "/logout", false)
			.expect("Return URL should assemble.");

		// The inbound returnto/returntoquery parameters win over computed values.
		assert_eq!(url.as_str(), "https://app.example/logout?returnto=%2Fsomewhere&returntoquery=a%3D1");
	}

	#[test]
	fn return_url_computes_page_and_query_when_absent() {
		let reconciler = reconciler();
		let request = RequestContext::new("https", "app.example", "/wiki")
			.with_query_pair("page", "Main")
			.with_query_pair("b64returntoquery", "stale");
		let url = reconciler
			.local_return_url(&request, "/logout", false)
			.expect("Return URL should assemble.");

		// Return parameters are stripped from the propagated query.
		assert_eq!(
			url.as_str(),
			"https://app.example/logout?returnto=%2Fwiki&returntoquery=page%3DMain",
		);
	}

	#[test]
	fn return_url_uses_base64url_inside_redirect_chains() {
		let reconciler = reconciler();
		let request =
			RequestContext::new("https", "app.example", "/wiki").with_query_pair("page", "Main");
		let url = reconciler
			.local_return_url(&request, "/login", true)
			.expect("Return URL should assemble.");
		let encoded = codec::base64_url_encode("page=Main");

		assert_eq!(
			url.as_str(),
			format!("https://app.example/login?returnto=%2Fwiki&b64returntoquery={encoded}"),
		);
		assert_eq!(
			codec::base64_url_decode(&encoded).expect("Encoded query should round-trip."),
			"page=Main",
		);
	}

	#[test]
	fn posted_requests_contribute_no_query() {
		let reconciler = reconciler();
		let request = RequestContext::new("https", "app.example", "/wiki")
			.with_query_pair("page", "Main")
			.posted();
		let url = reconciler
			.local_return_url(&request, "/logout", false)
			.expect("Return URL should assemble.");

		assert_eq!(url.as_str(), "https://app.example/logout?returnto=%2Fwiki");
	}
}
