#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

use serde_json::Value;

pub use http::StatusCode;
pub use lambda_runtime::{Context as LambdaContext, LambdaEvent};

/// Response body encoding.
pub mod body;

mod config;

pub use config::{AdapterConfig, StatusCodeStyle};

/// Request environment passed to handlers.
pub mod environ;

pub use environ::{Environment, ErrorStream};

/// Error handling.
pub mod error;

pub use error::AdapterError;

/// API Gateway proxy event parsing.
pub mod event;

pub use event::{GatewayEvent, IntegrationStyle};

mod handler;

pub use handler::Handler;

mod multimap;

pub use multimap::HeaderMultimap;

mod response;

pub use response::{GatewayResponse, StatusCodeValue};

mod runtime;

pub use runtime::run_lambda;

mod start_response;

pub use start_response::{ResponseWriter, StartResponse};

/// Translate a single API Gateway proxy event into a call to `handler` and translate the
/// handler's response back into an API Gateway proxy response.
///
/// # Arguments
///
/// * `handler` - Request handler.
/// * `event` - Raw API Gateway proxy event (REST API or HTTP API v2.0 payload format).
/// * `context` - Lambda execution context, passed through to the handler via
///   [`Environment::context`].
/// * `config` - Adapter configuration.
///
/// # Errors
///
/// Returns an [`AdapterError`] if the event is malformed, the handler fails or supplies a
/// malformed status line, or a text response body is not valid UTF-8. Errors returned by the
/// handler are propagated as [`AdapterError::Handler`] rather than converted into a response.
pub fn handle<H>(
  handler: &H,
  event: Value,
  context: LambdaContext,
  config: &AdapterConfig,
) -> Result<GatewayResponse, AdapterError>
where
  H: Handler + ?Sized,
{
  log::trace!("Event: {event:#?}");
  log::trace!("Lambda context: {context:#?}");

  let gateway_event = GatewayEvent::from_value(&event)?;
  let style = gateway_event.style;
  let mut environ = Environment::new(gateway_event, event, context);
  let mut start_response = StartResponse::new();

  let output = handler
    .call(&mut environ, &mut start_response)
    .map_err(AdapterError::from_handler)?;

  if !start_response.is_started() {
    log::warn!("Handler did not start a response; responding with status 500");
  }
  let collected = start_response.finish()?;
  let body = body::build_body(
    &collected.headers,
    collected.chunks,
    output,
    config.binary_content_types(),
  )?;

  let response = GatewayResponse::new(style, collected.status, collected.headers, body, config);
  log::trace!("Response: {response:#?}");

  Ok(response)
}

/// Request handler bundled with its adapter configuration.
///
/// An `Adapter` holds no per-request state; every call to [`handle`](Adapter::handle) builds a
/// fresh [`Environment`] and [`StartResponse`].
#[derive(Clone, Debug)]
pub struct Adapter<H> {
  handler: H,
  config: AdapterConfig,
}

impl<H> Adapter<H>
where
  H: Handler,
{
  /// Create an adapter for `handler` with the given configuration.
  pub fn new(handler: H, config: AdapterConfig) -> Self {
    Self { handler, config }
  }

  /// Adapter configuration.
  pub fn config(&self) -> &AdapterConfig {
    &self.config
  }

  /// Handle a single API Gateway proxy event. See [`handle`].
  pub fn handle(
    &self,
    event: Value,
    context: LambdaContext,
  ) -> Result<GatewayResponse, AdapterError> {
    handle(&self.handler, event, context, &self.config)
  }
}
