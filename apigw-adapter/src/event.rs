use crate::error::AdapterError;
use crate::multimap::HeaderMultimap;

use backtrace::Backtrace;
use base64::Engine as _;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// API Gateway integration that produced an event.
///
/// Resolved once per event by [`GatewayEvent::from_value`]; the rest of the pipeline branches on
/// this value rather than on the presence of individual event fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntegrationStyle {
  /// REST API proxy integration (top-level `httpMethod` and `path`).
  Rest,
  /// HTTP API proxy integration, payload format version 2.0 (`requestContext.http`).
  HttpApiV2,
}

/// Parsed API Gateway proxy event.
#[derive(Clone, Debug)]
pub struct GatewayEvent {
  /// Integration style the event was recognized as.
  pub style: IntegrationStyle,
  /// HTTP request method (e.g., `GET`).
  pub method: String,
  /// Request path.
  pub path: String,
  /// Decoded query string parameters, in the order they appear in the event.
  pub query_params: IndexMap<String, String>,
  /// Request headers.
  pub headers: HeaderMultimap,
  /// Request body, base64-decoded if necessary.
  pub body: Vec<u8>,
  /// Source IP address of the caller, if reported by API Gateway.
  pub source_ip: Option<String>,
  /// Principal identifier reported by a Lambda authorizer, if any.
  pub principal_id: Option<String>,
  /// Claims returned by a Lambda authorizer (`requestContext.authorizer.lambda`), if any.
  pub authorizer: Option<Value>,
}

// Superset of both event shapes. Every field is optional here; which shape applies is decided in
// `GatewayEvent::from_value`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawEvent {
  http_method: Option<String>,
  path: Option<String>,
  raw_path: Option<String>,
  query_string_parameters: Option<IndexMap<String, String>>,
  headers: Option<IndexMap<String, String>>,
  body: Option<String>,
  is_base64_encoded: bool,
  principal_id: Option<String>,
  request_context: Option<RawRequestContext>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawRequestContext {
  http: Option<RawHttpContext>,
  identity: Option<RawIdentity>,
  authorizer: Option<RawAuthorizer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawHttpContext {
  method: Option<String>,
  path: Option<String>,
  source_ip: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawIdentity {
  source_ip: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawAuthorizer {
  principal_id: Option<String>,
  lambda: Option<Value>,
}

impl GatewayEvent {
  /// Parse a raw API Gateway proxy event.
  ///
  /// The REST API shape (top-level `httpMethod` and `path`) takes precedence. Otherwise, the
  /// HTTP API v2.0 shape (`requestContext.http.method` plus `requestContext.http.path` or
  /// `rawPath`) is used.
  pub fn from_value(value: &Value) -> Result<Self, AdapterError> {
    let raw: RawEvent = serde_path_to_error::deserialize(value)
      .map_err(|err| AdapterError::InvalidEvent(Box::new(err), Backtrace::new()))?;

    let request_context = raw.request_context.unwrap_or_default();
    let http_context = request_context.http.unwrap_or_default();
    let authorizer = request_context.authorizer.unwrap_or_default();

    let (style, method, path) = match (raw.http_method, raw.path) {
      (Some(method), Some(path)) => (IntegrationStyle::Rest, method, path),
      _ => match (http_context.method, http_context.path.or(raw.raw_path)) {
        (Some(method), Some(path)) => (IntegrationStyle::HttpApiV2, method, path),
        _ => return Err(AdapterError::MalformedEvent(Backtrace::new())),
      },
    };
    log::debug!("Recognized {style:?} event: {method} {path}");

    let source_ip = match style {
      IntegrationStyle::Rest => request_context.identity.and_then(|identity| identity.source_ip),
      IntegrationStyle::HttpApiV2 => http_context.source_ip,
    };

    let body = match raw.body {
      Some(body) if raw.is_base64_encoded => base64::engine::general_purpose::STANDARD
        .decode(body.as_bytes())
        .map_err(|err| AdapterError::InvalidBodyBase64(Box::new(err), Backtrace::new()))?,
      Some(body) => body.into_bytes(),
      None => Vec::new(),
    };

    Ok(Self {
      style,
      method,
      path,
      query_params: raw.query_string_parameters.unwrap_or_default(),
      headers: raw.headers.unwrap_or_default().into_iter().collect(),
      body,
      source_ip,
      principal_id: raw.principal_id.or(authorizer.principal_id),
      authorizer: authorizer.lambda,
    })
  }
}
