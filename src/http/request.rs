//! Request normalization.
//!
//! # Responsibilities
//! - Decode the body as JSON (empty body is not an error)
//! - Flatten multi-valued query parameters into comma-joined scalars
//! - Carry matched path parameters
//!
//! # Design Decisions
//! - The normalized request is detached from the wire request and owned
//!   by a single dispatch
//! - Path parameters are exposed as both `params` and `pathParams`

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::http::Uri;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;

use crate::routing::PathParams;

/// Query parameters after flattening.
pub type QueryParams = BTreeMap<String, String>;

/// The body could not be decoded.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Dispatcher-internal view of a request handed to the runner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRequest {
    pub path_params: PathParams,
    pub query_params: QueryParams,
    pub content: Option<Value>,
}

impl NormalizedRequest {
    pub fn new(path_params: PathParams, query_params: QueryParams, content: Option<Value>) -> Self {
        Self {
            path_params,
            query_params,
            content,
        }
    }

    /// Alias of `path_params`, kept for actions that read `params`.
    pub fn params(&self) -> &PathParams {
        &self.path_params
    }
}

/// JSON form handed to actions: `{params, pathParams, queryParams, content}`.
impl Serialize for NormalizedRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("NormalizedRequest", 4)?;
        state.serialize_field("params", &self.path_params)?;
        state.serialize_field("pathParams", &self.path_params)?;
        state.serialize_field("queryParams", &self.query_params)?;
        state.serialize_field("content", &self.content)?;
        state.end()
    }
}

/// Decode a request body. Empty or whitespace-only bodies yield `None`.
pub fn decode_body(body: &[u8]) -> Result<Option<Value>, DecodeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(body)?))
}

/// Flatten a raw query string; repeated keys are joined with `,`.
pub fn flatten_query(query: Option<&str>) -> QueryParams {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    if let Some(query) = query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            grouped
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
    }
    grouped
        .into_iter()
        .map(|(key, values)| (key, values.join(",")))
        .collect()
}

/// Build the normalized request for a matched route.
pub fn normalize(
    uri: &Uri,
    body: &Bytes,
    path_params: PathParams,
) -> Result<NormalizedRequest, DecodeError> {
    let content = decode_body(body)?;
    let query_params = flatten_query(uri.query());
    Ok(NormalizedRequest::new(path_params, query_params, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_body_is_none() {
        assert_eq!(decode_body(b"").unwrap(), None);
        assert_eq!(decode_body(b"  \r\n\t").unwrap(), None);
    }

    #[test]
    fn test_body_decoded() {
        assert_eq!(decode_body(br#"{"qty":3}"#).unwrap(), Some(json!({"qty": 3})));
        assert_eq!(decode_body(b"[1,2]").unwrap(), Some(json!([1, 2])));
    }

    #[test]
    fn test_malformed_body_is_error() {
        let err = decode_body(b"{\"qty\":").unwrap_err();
        assert!(!err.to_string().is_empty());
        assert!(decode_body(b"qty=3").is_err());
    }

    #[test]
    fn test_repeated_query_keys_joined() {
        let params = flatten_query(Some("tag=x&tag=y&page=2"));
        assert_eq!(params.get("tag").map(String::as_str), Some("x,y"));
        assert_eq!(params.get("page").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_query_values_decoded() {
        let params = flatten_query(Some("q=hello+world&city=S%C3%A3o%20Paulo&flag"));
        assert_eq!(params["q"], "hello world");
        assert_eq!(params["city"], "São Paulo");
        assert_eq!(params["flag"], "");
        assert!(flatten_query(None).is_empty());
    }

    #[test]
    fn test_params_aliasing() {
        let mut path_params = PathParams::new();
        path_params.insert("id".into(), "42".into());

        let request = normalize(
            &uri("/orders/42?tag=x&tag=y"),
            &Bytes::from_static(br#"{"qty":3}"#),
            path_params,
        )
        .unwrap();

        assert_eq!(request.params(), &request.path_params);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["params"], value["pathParams"]);
        assert_eq!(value["pathParams"], json!({"id": "42"}));
        assert_eq!(value["queryParams"], json!({"tag": "x,y"}));
        assert_eq!(value["content"], json!({"qty": 3}));
    }

    #[test]
    fn test_no_body_content_is_null() {
        let request = normalize(&uri("/ping"), &Bytes::new(), PathParams::new()).unwrap();
        assert_eq!(request.content, None);
        assert_eq!(serde_json::to_value(&request).unwrap()["content"], Value::Null);
    }
}
