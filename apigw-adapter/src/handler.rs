use crate::environ::Environment;
use crate::start_response::StartResponse;

/// Synchronous request handler driven by the adapter.
///
/// A handler reads the request from the [`Environment`], registers the response status and headers
/// via [`StartResponse::start`], and returns the response body as a sequence of byte chunks. Body
/// chunks may also be written through the [`ResponseWriter`](crate::ResponseWriter) returned by
/// `start`; those are emitted before the returned sequence.
///
/// Handlers are responsible for their own error handling. An error returned from
/// [`call`](Handler::call) is not converted into an HTTP response; it fails the invocation (see
/// [`AdapterError::Handler`](crate::AdapterError::Handler)). Handlers that should always respond
/// must catch their own errors and respond with an appropriate status (e.g., `500`).
///
/// This trait is implemented for closures with a matching signature:
///
/// ```rust
/// use apigw_adapter::{Environment, Handler, StartResponse};
///
/// fn assert_handler<H: Handler>(_handler: H) {}
///
/// assert_handler(
///   |env: &mut Environment, start_response: &mut StartResponse| -> anyhow::Result<_> {
///     start_response.start("200 OK", [("Content-Type", "text/plain")])?;
///     Ok(vec![format!("{} {}", env.request_method(), env.path_info()).into_bytes()])
///   },
/// );
/// ```
pub trait Handler {
  /// Lazily-produced response body chunks.
  type Body: IntoIterator<Item = Vec<u8>>;

  /// Handle a single request.
  ///
  /// # Arguments
  ///
  /// * `environ` - Request environment.
  /// * `start_response` - Response status, header and body collector for this request.
  fn call(
    &self,
    environ: &mut Environment,
    start_response: &mut StartResponse,
  ) -> anyhow::Result<Self::Body>;
}

impl<F, B> Handler for F
where
  F: Fn(&mut Environment, &mut StartResponse) -> anyhow::Result<B>,
  B: IntoIterator<Item = Vec<u8>>,
{
  type Body = B;

  fn call(
    &self,
    environ: &mut Environment,
    start_response: &mut StartResponse,
  ) -> anyhow::Result<Self::Body> {
    self(environ, start_response)
  }
}
