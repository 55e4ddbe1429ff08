use crate::body::EncodedBody;
use crate::config::{AdapterConfig, StatusCodeStyle};
use crate::event::IntegrationStyle;

use http::StatusCode;
use indexmap::IndexMap;
use serde::Serialize;

/// Value of the `statusCode` field of a [`GatewayResponse`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StatusCodeValue {
  /// JSON number.
  Numeric(u16),
  /// JSON string containing the decimal status code.
  String(String),
}

/// Lambda proxy integration response returned to API Gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
  /// HTTP status code.
  pub status_code: StatusCodeValue,
  /// Response headers. When a header name is repeated, the last value wins.
  pub headers: IndexMap<String, String>,
  /// Every value of every response header, if enabled via
  /// [`AdapterConfig::with_multi_value_headers`].
  #[serde(skip_serializing_if = "Option::is_none")]
  pub multi_value_headers: Option<IndexMap<String, Vec<String>>>,
  /// Response body (base64-encoded if `is_base64_encoded` is `true`).
  pub body: String,
  /// Whether `body` is base64-encoded.
  pub is_base64_encoded: bool,
}

impl GatewayResponse {
  /// Assemble the response for an event of the given integration style.
  pub fn new(
    style: IntegrationStyle,
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: EncodedBody,
    config: &AdapterConfig,
  ) -> Self {
    let status_code = match (style, config.http_api_status_code()) {
      (IntegrationStyle::HttpApiV2, StatusCodeStyle::String) => {
        StatusCodeValue::String(status.as_u16().to_string())
      }
      _ => StatusCodeValue::Numeric(status.as_u16()),
    };

    let multi_value_headers = config.multi_value_headers().then(|| {
      headers
        .iter()
        .fold(IndexMap::<_, Vec<_>>::new(), |mut multi, (name, value)| {
          multi.entry(name.clone()).or_default().push(value.clone());
          multi
        })
    });

    Self {
      status_code,
      headers: headers.into_iter().collect(),
      multi_value_headers,
      body: body.body,
      is_base64_encoded: body.is_base64_encoded,
    }
  }
}
