use crate::error::AdapterError;

use backtrace::Backtrace;
use http::StatusCode;

use std::collections::VecDeque;

/// Collects the status, headers and body chunks produced by a [`Handler`](crate::Handler).
///
/// A handler registers the response status and headers by calling [`start`](Self::start), then
/// emits body chunks through the returned [`ResponseWriter`] and/or the body sequence it returns.
///
/// Until `start` is called, the collector holds an empty `500 Internal Server Error` response, so
/// a handler that never responds still yields a well-formed response.
#[derive(Debug)]
pub struct StartResponse {
  status: StatusCode,
  status_line: String,
  headers: Vec<(String, String)>,
  chunks: VecDeque<Vec<u8>>,
  started: bool,
  malformed_status: Option<String>,
}

impl Default for StartResponse {
  fn default() -> Self {
    Self {
      status: StatusCode::INTERNAL_SERVER_ERROR,
      status_line: "500 Internal Server Error".to_string(),
      headers: Vec::new(),
      chunks: VecDeque::new(),
      started: false,
      malformed_status: None,
    }
  }
}

impl StartResponse {
  /// Create a collector in its initial (`500`) state.
  pub fn new() -> Self {
    Self::default()
  }

  /// Register the response status line and headers.
  ///
  /// The status line must begin with a three-digit HTTP status code in the range 100-999 (e.g.,
  /// `200 OK`). Calling this method again replaces the previously registered status and headers.
  ///
  /// # Errors
  ///
  /// Returns [`AdapterError::MalformedStatus`] if the status line does not begin with a valid
  /// status code. The adapter also reports this error after the handler returns unless a
  /// subsequent call succeeds.
  pub fn start<I, K, V>(
    &mut self,
    status_line: &str,
    headers: I,
  ) -> Result<ResponseWriter<'_>, AdapterError>
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    let status = match status_line
      .split_whitespace()
      .next()
      .map(|code| StatusCode::from_bytes(code.as_bytes()))
    {
      Some(Ok(status)) => status,
      _ => {
        self.malformed_status = Some(status_line.to_string());
        return Err(AdapterError::MalformedStatus(
          status_line.to_string(),
          Backtrace::new(),
        ));
      }
    };

    if self.started {
      log::debug!(
        "Replacing response status `{}` with `{status_line}`",
        self.status_line
      );
    }

    self.status = status;
    self.status_line = status_line.to_string();
    self.headers = headers
      .into_iter()
      .map(|(k, v)| (k.into(), v.into()))
      .collect();
    self.started = true;
    self.malformed_status = None;

    Ok(ResponseWriter {
      chunks: &mut self.chunks,
    })
  }

  /// Return a writer for appending body chunks without registering a new status.
  pub fn writer(&mut self) -> ResponseWriter<'_> {
    ResponseWriter {
      chunks: &mut self.chunks,
    }
  }

  /// Whether [`start`](Self::start) has succeeded at least once.
  pub fn is_started(&self) -> bool {
    self.started
  }

  /// Response status code.
  pub fn status(&self) -> StatusCode {
    self.status
  }

  /// Response status line (e.g., `200 OK`).
  pub fn status_line(&self) -> &str {
    &self.status_line
  }

  /// Response headers, in the order registered.
  pub fn headers(&self) -> &[(String, String)] {
    &self.headers
  }

  /// Consume the collector, returning the parts of the response recorded so far.
  ///
  /// # Errors
  ///
  /// Returns [`AdapterError::MalformedStatus`] if the last call to [`start`](Self::start) failed.
  pub(crate) fn finish(self) -> Result<CollectedResponse, AdapterError> {
    if let Some(status_line) = self.malformed_status {
      return Err(AdapterError::MalformedStatus(status_line, Backtrace::new()));
    }

    Ok(CollectedResponse {
      status: self.status,
      headers: self.headers,
      chunks: self.chunks,
    })
  }
}

/// Response parts collected from a handler.
#[derive(Debug)]
pub(crate) struct CollectedResponse {
  pub status: StatusCode,
  pub headers: Vec<(String, String)>,
  pub chunks: VecDeque<Vec<u8>>,
}

/// Appends response body chunks, in order, to a [`StartResponse`].
#[derive(Debug)]
pub struct ResponseWriter<'a> {
  chunks: &'a mut VecDeque<Vec<u8>>,
}

impl ResponseWriter<'_> {
  /// Append a body chunk.
  pub fn write(&mut self, chunk: impl Into<Vec<u8>>) {
    let chunk = chunk.into();
    if !chunk.is_empty() {
      self.chunks.push_back(chunk);
    }
  }
}

impl std::io::Write for ResponseWriter<'_> {
  fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
    ResponseWriter::write(self, buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> std::io::Result<()> {
    Ok(())
  }
}
