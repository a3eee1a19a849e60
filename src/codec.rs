//! Decoding helpers for the remote service's XML, JSON, and raw header payloads.
//!
//! XML extraction scans first-level children only and preserves the legacy
//! arity contract: selecting one field name yields a bare scalar, selecting two
//! or more yields a name-to-value mapping. Callers rely on this shape.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use quick_xml::{Reader, events::Event};
// self
use crate::_prelude::*;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type produced by the response codec.
#[derive(Debug, ThisError)]
pub enum CodecError {
	/// Response body is not well-formed XML.
	#[error("Response body is not well-formed XML.")]
	Xml {
		/// Underlying parsing failure.
		#[source]
		source: quick_xml::Error,
	},
	/// Response body is not valid JSON.
	#[error("Response body is not valid JSON.")]
	Json {
		/// Structured parsing failure including the failing path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// base64url payload could not be decoded.
	#[error("Value is not valid base64url data.")]
	Base64 {
		/// Underlying decoding failure.
		#[source]
		source: BoxError,
	},
}
impl CodecError {
	fn base64(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Base64 { source: Box::new(src) }
	}
}

/// Result of an XML field selection, shaped by the number of requested names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldSelection {
	/// Bare value of the single requested field.
	Scalar(String),
	/// Requested-name-to-text mapping; missing fields map to empty strings.
	Fields(BTreeMap<String, String>),
}
impl FieldSelection {
	/// Returns the scalar value when exactly one field was requested.
	pub fn as_scalar(&self) -> Option<&str> {
		match self {
			FieldSelection::Scalar(value) => Some(value),
			FieldSelection::Fields(_) => None,
		}
	}

	/// Returns the field mapping when two or more fields were requested.
	pub fn as_fields(&self) -> Option<&BTreeMap<String, String>> {
		match self {
			FieldSelection::Scalar(_) => None,
			FieldSelection::Fields(fields) => Some(fields),
		}
	}
}

/// Selects the named fields from an XML body under the legacy arity contract.
///
/// One name returns [`FieldSelection::Scalar`]; two or more return
/// [`FieldSelection::Fields`] keyed by the requested names, with missing fields
/// mapped to empty strings. An empty name slice performs no extraction at all
/// and returns an empty mapping without touching the body.
pub fn select_xml_fields(body: &str, names: &[&str]) -> Result<FieldSelection, CodecError> {
	if names.is_empty() {
		return Ok(FieldSelection::Fields(BTreeMap::new()));
	}

	let mut values = first_level_values(body, names)?;

	if let [name] = names {
		return Ok(FieldSelection::Scalar(values.remove(*name).unwrap_or_default()));
	}

	Ok(FieldSelection::Fields(values))
}

/// Extracts a single named field from an XML body, empty string when missing.
pub fn xml_field(body: &str, name: &str) -> Result<String, CodecError> {
	first_level_values(body, &[name]).map(|mut values| values.remove(name).unwrap_or_default())
}

/// Extracts several named fields from an XML body, empty strings when missing.
pub fn xml_fields(body: &str, names: &[&str]) -> Result<BTreeMap<String, String>, CodecError> {
	first_level_values(body, names)
}

/// Decodes a JSON body into a typed value; no schema validation beyond the type.
pub fn json_decode<T>(body: &str) -> Result<T, CodecError>
where
	T: serde::de::DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_str(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| CodecError::Json { source })
}

/// Decodes a JSON body into a generic value tree.
pub fn json_value(body: &str) -> Result<serde_json::Value, CodecError> {
	json_decode(body)
}

/// Parses a raw HTTP header block into a name-to-value mapping.
///
/// Lines are split on the first colon; status lines (`HTTP` prefix) and
/// colon-less lines are discarded, keys and values are trimmed.
pub fn parse_header_block(block: &str) -> HashMap<String, String> {
	let mut headers = HashMap::new();

	for line in block.lines() {
		let Some((key, value)) = line.trim().split_once(':') else {
			continue;
		};
		let key = key.trim();

		if key.starts_with("HTTP") {
			continue;
		}

		headers.insert(key.to_owned(), value.trim().to_owned());
	}

	headers
}

/// Encodes data as URL-safe base64 without padding.
pub fn base64_url_encode(data: &str) -> String {
	URL_SAFE_NO_PAD.encode(data)
}

/// Decodes a URL-safe, unpadded base64 string back into text.
pub fn base64_url_decode(encoded: &str) -> Result<String, CodecError> {
	let bytes = URL_SAFE_NO_PAD.decode(encoded).map_err(CodecError::base64)?;

	String::from_utf8(bytes).map_err(CodecError::base64)
}

/// Scans first-level children of the document root for the requested names.
///
/// A repeated first-level element overwrites any earlier value, so the last
/// occurrence wins. Text inside nested elements is never captured.
fn first_level_values(body: &str, names: &[&str]) -> Result<BTreeMap<String, String>, CodecError> {
	let mut reader = Reader::from_str(body);

	reader.config_mut().trim_text(true);

	let mut values: BTreeMap<String, String> =
		names.iter().map(|name| ((*name).to_owned(), String::new())).collect();
	let mut depth = 0_usize;
	let mut current: Option<String> = None;

	loop {
		match reader.read_event() {
			Ok(Event::Start(ref e)) => {
				depth += 1;

				if depth == 2 {
					let local = String::from_utf8_lossy(e.local_name().into_inner()).to_string();

					current = if values.contains_key(local.as_str()) {
						values.insert(local.clone(), String::new());

						Some(local)
					} else {
						None
					};
				} else if depth < 2 {
					current = None;
				}
			},
			Ok(Event::Text(ref e)) => {
				if depth == 2
					&& let Some(name) = &current
				{
					let text = e
						.unescape()
						.map_err(quick_xml::Error::from)
						.map_err(|source| CodecError::Xml { source })?
						.to_string();

					if let Some(slot) = values.get_mut(name.as_str()) {
						slot.push_str(&text);
					}
				}
			},
			Ok(Event::CData(ref e)) => {
				if depth == 2
					&& let Some(name) = &current
					&& let Some(slot) = values.get_mut(name.as_str())
				{
					slot.push_str(&String::from_utf8_lossy(e));
				}
			},
			Ok(Event::End(_)) => {
				depth = depth.saturating_sub(1);

				if depth < 2 {
					current = None;
				}
			},
			Ok(Event::Eof) => break,
			Ok(_) => {},
			Err(source) => return Err(CodecError::Xml { source }),
		}
	}

	Ok(values)
}
