//! `processIdFromRequest` strategies shared by the CU and MU route binders
//! (spec §4.7): path parameters, query parameters, or a JSON body field.

use crate::model::ProcessId;

pub fn from_path(value: &str) -> Option<ProcessId> {
	ProcessId::new(value.to_string())
}

pub fn from_query(query: Option<&str>, key: &str) -> Option<ProcessId> {
	let query = query?;
	url::form_urlencoded::parse(query.as_bytes())
		.find(|(k, _)| k == key)
		.and_then(|(_, v)| ProcessId::new(v.into_owned()))
}

/// Looks for `key` as a top-level string field in a JSON body. Used only
/// by routes whose `restreamBody` strategy has already buffered the body
/// for inspection (e.g. dry-run), so this never consumes a stream itself.
pub fn from_body_json(body: &[u8], keys: &[&str]) -> Option<ProcessId> {
	let value: serde_json::Value = serde_json::from_slice(body).ok()?;
	for key in keys {
		if let Some(s) = value.get(*key).and_then(|v| v.as_str()) {
			if let Some(pid) = ProcessId::new(s.to_string()) {
				return Some(pid);
			}
		}
	}
	None
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn query_extraction() {
		let pid = from_query(Some("process-id=abc&other=1"), "process-id").unwrap();
		assert_eq!(pid.as_str(), "abc");
	}

	#[test]
	fn query_missing_key_returns_none() {
		assert!(from_query(Some("other=1"), "process-id").is_none());
	}

	#[test]
	fn body_json_checks_multiple_keys() {
		let body = br#"{"processId":"abc"}"#;
		let pid = from_body_json(body, &["process-id", "processId"]).unwrap();
		assert_eq!(pid.as_str(), "abc");
	}

	#[test]
	fn body_json_missing_field_returns_none() {
		let body = br#"{"other":"abc"}"#;
		assert!(from_body_json(body, &["process-id", "processId"]).is_none());
	}

	#[test]
	fn empty_value_is_treated_as_missing() {
		assert!(from_query(Some("process-id="), "process-id").is_none());
	}
}
