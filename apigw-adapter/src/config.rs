use indexmap::IndexSet;
use mime::Mime;

/// Representation of the `statusCode` field in HTTP API v2.0 responses.
///
/// REST API responses always use a numeric status code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusCodeStyle {
  /// JSON number (e.g., `200`).
  #[default]
  Numeric,
  /// JSON string containing the decimal status code (e.g., `"200"`).
  String,
}

/// Adapter configuration.
///
/// # Example
///
/// ```rust
/// use apigw_adapter::{AdapterConfig, StatusCodeStyle};
///
/// let config = AdapterConfig::new()
///   .with_binary_content_type("image/png")
///   .with_binary_content_type("application/pdf")
///   .with_http_api_status_code(StatusCodeStyle::String);
///
/// assert!(config.binary_content_types().contains("image/png"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct AdapterConfig {
  binary_content_types: IndexSet<String>,
  http_api_status_code: StatusCodeStyle,
  multi_value_headers: bool,
}

impl AdapterConfig {
  /// Create a configuration with no binary content types, numeric status codes, and no
  /// `multiValueHeaders` in responses.
  pub fn new() -> Self {
    Self::default()
  }

  /// Build a configuration whose binary content types are read from a comma-separated environment
  /// variable (e.g., `BINARY_CONTENT_TYPES=image/png,application/pdf`).
  ///
  /// An unset variable yields no binary content types. Whitespace around each entry and empty
  /// entries are ignored.
  pub fn from_env_var(name: &str) -> Self {
    match std::env::var(name) {
      Ok(value) => {
        let config = value
          .split(',')
          .map(str::trim)
          .filter(|content_type| !content_type.is_empty())
          .fold(Self::new(), Self::with_binary_content_type);
        log::debug!(
          "Binary content types from `{name}`: {:?}",
          config.binary_content_types
        );
        config
      }
      Err(_) => Self::new(),
    }
  }

  /// Treat responses with the given media type (e.g., `image/png`) as binary.
  ///
  /// Media types are matched exactly against the response `Content-Type`, excluding any
  /// parameters such as `charset`.
  pub fn with_binary_content_type(mut self, content_type: impl Into<String>) -> Self {
    self.binary_content_types.insert(content_type.into());
    self
  }

  /// Treat responses with the given MIME type's essence (e.g., `image/png`) as binary.
  pub fn with_binary_mime(self, mime: &Mime) -> Self {
    self.with_binary_content_type(mime.essence_str())
  }

  /// Set the representation of `statusCode` in HTTP API v2.0 responses.
  pub fn with_http_api_status_code(mut self, style: StatusCodeStyle) -> Self {
    self.http_api_status_code = style;
    self
  }

  /// Include every response header value in a `multiValueHeaders` response field.
  pub fn with_multi_value_headers(mut self, enabled: bool) -> Self {
    self.multi_value_headers = enabled;
    self
  }

  /// Media types returned as base64-encoded binary bodies.
  pub fn binary_content_types(&self) -> &IndexSet<String> {
    &self.binary_content_types
  }

  /// Representation of `statusCode` in HTTP API v2.0 responses.
  pub fn http_api_status_code(&self) -> StatusCodeStyle {
    self.http_api_status_code
  }

  /// Whether responses include a `multiValueHeaders` field.
  pub fn multi_value_headers(&self) -> bool {
    self.multi_value_headers
  }
}
