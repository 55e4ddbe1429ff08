// Until std::error::Backtrace is fully stabilized, we can't embed a type named `Backtrace` within
// a thiserror::Error (see https://github.com/dtolnay/thiserror/issues/204).
use backtrace::Backtrace as _Backtrace;
use itertools::Itertools;
use thiserror::Error;

use std::string::FromUtf8Error;

/// Error that occurred while translating an API Gateway event or the handler's response.
///
/// Every variant is fatal: the adapter never turns one of these into a client-facing response.
/// They propagate to the caller of [`handle`](crate::handle) (and from there to the Lambda
/// runtime, which reports the invocation as failed).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AdapterError {
  /// Handler returned an error instead of a response body.
  #[error("request handler failed")]
  Handler(
    #[source] Box<dyn std::error::Error + Send + Sync + 'static>,
    _Backtrace,
  ),
  /// Invalid base64 encoding for request body.
  // The base64 encoding comes from AWS, so this is actually an internal error.
  #[error("invalid base64 encoding for request body")]
  InvalidBodyBase64(#[source] Box<base64::DecodeError>, _Backtrace),
  /// Event JSON does not match the API Gateway proxy event model.
  #[error("failed to deserialize API Gateway event")]
  InvalidEvent(
    #[source] Box<serde_path_to_error::Error<serde_json::Error>>,
    _Backtrace,
  ),
  /// Event carries neither the REST API (`httpMethod`/`path`) nor the HTTP API v2.0
  /// (`requestContext.http`) request line.
  #[error("event has no REST API or HTTP API v2.0 method and path")]
  MalformedEvent(_Backtrace),
  /// Handler supplied a status line that doesn't start with a three-digit HTTP status code in the
  /// range 100-999.
  #[error("malformed response status line `{0}`")]
  MalformedStatus(String, _Backtrace),
  /// Non-binary response body is not valid UTF-8.
  #[error("response body with Content-Type `{0}` is not valid UTF-8")]
  BodyEncoding(String, #[source] Box<FromUtf8Error>, _Backtrace),
}

impl AdapterError {
  /// Return the backtrace associated with the error, if known.
  pub fn backtrace(&self) -> Option<&_Backtrace> {
    match self {
      AdapterError::Handler(_, backtrace)
      | AdapterError::InvalidBodyBase64(_, backtrace)
      | AdapterError::InvalidEvent(_, backtrace)
      | AdapterError::MalformedEvent(backtrace)
      | AdapterError::MalformedStatus(_, backtrace)
      | AdapterError::BodyEncoding(_, _, backtrace) => Some(backtrace),
    }
  }

  /// Return the name of the error variant (e.g., `MalformedEvent`).
  pub fn name(&self) -> &str {
    match self {
      AdapterError::Handler(_, _) => "Handler",
      AdapterError::InvalidBodyBase64(_, _) => "InvalidBodyBase64",
      AdapterError::InvalidEvent(_, _) => "InvalidEvent",
      AdapterError::MalformedEvent(_) => "MalformedEvent",
      AdapterError::MalformedStatus(_, _) => "MalformedStatus",
      AdapterError::BodyEncoding(_, _, _) => "BodyEncoding",
    }
  }

  /// Wrap an error returned by the request handler.
  ///
  /// An [`AdapterError`] that the handler propagated (e.g., from
  /// [`StartResponse::start`](crate::StartResponse::start)) is returned unchanged rather than
  /// being nested inside [`AdapterError::Handler`].
  pub(crate) fn from_handler(err: anyhow::Error) -> Self {
    match err.downcast::<AdapterError>() {
      Ok(adapter_err) => adapter_err,
      Err(err) => AdapterError::Handler(err.into(), _Backtrace::new()),
    }
  }
}

/// Helper function for formatting an error as a string containing a human-readable chain of causes.
///
/// This function will walk over the chain of causes returned by
/// [`Error::source`](std::error::Error::source) and append each underlying error (using the
/// [`Display`](std::fmt::Display) trait).
///
/// # Arguments
///
/// * `err` - Error to format.
/// * `name` - Optional name of the error type/variant (e.g., `AdapterError::MalformedEvent`).
/// * `backtrace` - Optional [`Backtrace`](backtrace::Backtrace) indicating where the top-level
///   error occurred.
pub fn format_error(
  err: &(dyn std::error::Error),
  name: Option<&str>,
  backtrace: Option<&_Backtrace>,
) -> String {
  let err_line = name
    .map(|n| format!("{}: {}", n, err))
    .unwrap_or_else(|| err.to_string());

  let top_error = if let Some(bt) = backtrace {
    format!("{err_line}\n  stack trace:\n{}", format_backtrace(bt, 4))
  } else {
    err_line
  };

  let cause_str = ErrorCauseIterator(err.source())
    .map(|cause| format!("  caused by: {cause}"))
    .join("\n");

  if !cause_str.is_empty() {
    format!("{top_error}\n{cause_str}")
  } else {
    top_error
  }
}

struct ErrorCauseIterator<'a>(Option<&'a (dyn std::error::Error + 'static)>);

impl<'a> Iterator for ErrorCauseIterator<'a> {
  type Item = &'a (dyn std::error::Error + 'static);

  fn next(&mut self) -> Option<Self::Item> {
    let current = self.0;
    self.0 = current.and_then(|err| err.source());
    current
  }
}

fn format_backtrace(backtrace: &_Backtrace, indent: usize) -> String {
  let indent_str = " ".repeat(indent);
  format!("{backtrace:?}")
    .lines()
    .map(|line| format!("{indent_str}{line}"))
    .join("\n")
}
