use crate::event::{GatewayEvent, IntegrationStyle};
use crate::LambdaContext;

use headers::{ContentLength, ContentType, Header, Host};
use indexmap::IndexMap;
use itertools::Itertools;
use serde_json::Value;

use std::io::{Cursor, Write};

/// `CONTENT_LENGTH` environment variable.
pub const CONTENT_LENGTH: &str = "CONTENT_LENGTH";
/// `CONTENT_TYPE` environment variable.
pub const CONTENT_TYPE: &str = "CONTENT_TYPE";
/// `PATH_INFO` environment variable.
pub const PATH_INFO: &str = "PATH_INFO";
/// `QUERY_STRING` environment variable.
pub const QUERY_STRING: &str = "QUERY_STRING";
/// `REMOTE_ADDR` environment variable.
pub const REMOTE_ADDR: &str = "REMOTE_ADDR";
/// `REMOTE_USER` environment variable.
pub const REMOTE_USER: &str = "REMOTE_USER";
/// `REQUEST_METHOD` environment variable.
pub const REQUEST_METHOD: &str = "REQUEST_METHOD";
/// `SCRIPT_NAME` environment variable.
pub const SCRIPT_NAME: &str = "SCRIPT_NAME";
/// `SERVER_NAME` environment variable.
pub const SERVER_NAME: &str = "SERVER_NAME";
/// `SERVER_PORT` environment variable.
pub const SERVER_PORT: &str = "SERVER_PORT";
/// `SERVER_PROTOCOL` environment variable.
pub const SERVER_PROTOCOL: &str = "SERVER_PROTOCOL";
/// URL scheme (`http` or `https`) of the original request.
pub const URL_SCHEME: &str = "URL_SCHEME";

const X_FORWARDED_PORT: &str = "x-forwarded-port";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

const HTTP_PREFIX: &str = "HTTP_";

/// Request environment passed to a [`Handler`](crate::Handler).
///
/// Holds CGI-style string variables (`REQUEST_METHOD`, `PATH_INFO`, `HTTP_ACCEPT`, etc.), the
/// request body as a readable stream, an error stream, and the raw API Gateway event and Lambda
/// context the environment was built from.
///
/// A new environment is built for every invocation.
#[derive(Debug)]
pub struct Environment {
  vars: IndexMap<String, String>,
  input: Cursor<Vec<u8>>,
  errors: ErrorStream,
  style: IntegrationStyle,
  event: Value,
  context: LambdaContext,
  authorizer: Option<Value>,
}

impl Environment {
  /// Build the environment for a parsed event.
  ///
  /// # Arguments
  ///
  /// * `event` - Parsed event.
  /// * `raw_event` - Raw event JSON `event` was parsed from. Exposed unmodified via
  ///   [`event`](Self::event).
  /// * `context` - Lambda execution context. Exposed unmodified via [`context`](Self::context).
  pub fn new(event: GatewayEvent, raw_event: Value, context: LambdaContext) -> Self {
    let GatewayEvent {
      style,
      method,
      path,
      query_params,
      headers,
      body,
      source_ip,
      principal_id,
      authorizer,
    } = event;

    let mut vars = IndexMap::new();
    vars.insert(CONTENT_LENGTH.to_string(), body.len().to_string());
    vars.insert(
      CONTENT_TYPE.to_string(),
      headers.get_or(ContentType::name().as_str(), "").to_string(),
    );
    vars.insert(PATH_INFO.to_string(), path);
    vars.insert(QUERY_STRING.to_string(), encode_query_string(&query_params));
    vars.insert(REMOTE_ADDR.to_string(), source_ip.unwrap_or_default());
    vars.insert(REMOTE_USER.to_string(), principal_id.unwrap_or_default());
    vars.insert(REQUEST_METHOD.to_string(), method);
    vars.insert(SCRIPT_NAME.to_string(), String::new());
    vars.insert(
      SERVER_NAME.to_string(),
      headers.get_or(Host::name().as_str(), "lambda").to_string(),
    );
    vars.insert(
      SERVER_PORT.to_string(),
      headers.get_or(X_FORWARDED_PORT, "80").to_string(),
    );
    vars.insert(SERVER_PROTOCOL.to_string(), "HTTP/1.1".to_string());
    vars.insert(
      URL_SCHEME.to_string(),
      headers.get_or(X_FORWARDED_PROTO, "http").to_string(),
    );

    for (name, value) in headers.iter() {
      if name.eq_ignore_ascii_case(ContentType::name().as_str())
        || name.eq_ignore_ascii_case(ContentLength::name().as_str())
      {
        continue;
      }
      vars.insert(header_var_name(name), value.to_string());
    }

    Self {
      vars,
      input: Cursor::new(body),
      errors: ErrorStream::default(),
      style,
      event: raw_event,
      context,
      authorizer,
    }
  }

  /// Return the value of an environment variable (e.g., `REQUEST_METHOD` or `HTTP_ACCEPT`).
  pub fn var(&self, name: &str) -> Option<&str> {
    self.vars.get(name).map(String::as_str)
  }

  /// Set an environment variable, returning its previous value.
  pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
    self.vars.insert(name.into(), value.into())
  }

  /// Iterate over all environment variables in the order they were set.
  pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
    self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  /// Return the value of a request header (other than `Content-Type` and `Content-Length`, which
  /// are available via [`content_type`](Self::content_type) and
  /// [`content_length`](Self::content_length)).
  pub fn header(&self, name: &str) -> Option<&str> {
    self.var(&header_var_name(name))
  }

  /// Request method (e.g., `GET`).
  pub fn request_method(&self) -> &str {
    self.var(REQUEST_METHOD).unwrap_or_default()
  }

  /// Request path.
  pub fn path_info(&self) -> &str {
    self.var(PATH_INFO).unwrap_or_default()
  }

  /// URL-encoded query string (without the leading `?`).
  pub fn query_string(&self) -> &str {
    self.var(QUERY_STRING).unwrap_or_default()
  }

  /// Request `Content-Type`, or an empty string if the request didn't specify one.
  pub fn content_type(&self) -> &str {
    self.var(CONTENT_TYPE).unwrap_or_default()
  }

  /// Length of the request body in bytes.
  pub fn content_length(&self) -> usize {
    self.input.get_ref().len()
  }

  /// Request body stream.
  pub fn input(&mut self) -> &mut Cursor<Vec<u8>> {
    &mut self.input
  }

  /// Stream for reporting handler errors. Each line written is logged at the `error` level.
  pub fn errors(&mut self) -> &mut ErrorStream {
    &mut self.errors
  }

  /// Integration style of the event this environment was built from.
  pub fn integration_style(&self) -> IntegrationStyle {
    self.style
  }

  /// Raw API Gateway event.
  pub fn event(&self) -> &Value {
    &self.event
  }

  /// Lambda execution context.
  pub fn context(&self) -> &LambdaContext {
    &self.context
  }

  /// Claims returned by a Lambda authorizer (`requestContext.authorizer.lambda`), if present.
  pub fn authorizer(&self) -> Option<&Value> {
    self.authorizer.as_ref()
  }
}

/// URL-encode query string parameters as `key=value` pairs separated by `&`.
///
/// Keys and values are percent-encoded (a space becomes `%20`).
pub fn encode_query_string(params: &IndexMap<String, String>) -> String {
  params
    .iter()
    .map(|(k, v)| {
      format!(
        "{}={}",
        urlencoding::encode(k),
        urlencoding::encode(v)
      )
    })
    .join("&")
}

fn header_var_name(name: &str) -> String {
  format!("{HTTP_PREFIX}{}", name.to_ascii_uppercase().replace('-', "_"))
}

/// Error stream exposed to handlers via [`Environment::errors`].
///
/// Writes are buffered until a newline, and each complete line is logged at the `error` level
/// under the `apigw_adapter::errors` target. Any incomplete trailing line is logged on
/// [`flush`](Write::flush) or drop.
#[derive(Debug, Default)]
pub struct ErrorStream {
  pending: Vec<u8>,
}

impl ErrorStream {
  fn log_line(line: &[u8]) {
    log::error!(
      target: "apigw_adapter::errors",
      "{}",
      String::from_utf8_lossy(line).trim_end_matches('\r')
    );
  }
}

impl Write for ErrorStream {
  fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
    self.pending.extend_from_slice(buf);
    while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
      let line = self.pending.drain(..=newline).collect::<Vec<_>>();
      Self::log_line(&line[..newline]);
    }
    Ok(buf.len())
  }

  fn flush(&mut self) -> std::io::Result<()> {
    if !self.pending.is_empty() {
      Self::log_line(&self.pending);
      self.pending.clear();
    }
    Ok(())
  }
}

impl Drop for ErrorStream {
  fn drop(&mut self) {
    let _ = self.flush();
  }
}
