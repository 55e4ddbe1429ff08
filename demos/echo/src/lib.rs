use apigw_adapter::{Environment, Handler, StartResponse};
use serde_json::{json, Value};
use thiserror::Error;

use std::io::{Read, Write};

/// Headers added to every response.
pub const RESPONSE_HEADERS: &[(&str, &str)] = &[
  ("Content-Type", "application/json"),
  ("Access-Control-Allow-Origin", "*"),
  ("Access-Control-Allow-Methods", "GET, POST, DELETE"),
  ("Access-Control-Allow-Headers", "Accept, Content-Type, Origin"),
];

/// Example handler error type.
#[derive(Debug, Error)]
pub enum HandlerError {
  #[error("invalid JSON request body")]
  InvalidBody(#[source] serde_json::Error),
  #[error("failed to read request body")]
  ReadBody(#[source] std::io::Error),
  #[error("method `{0}` is not allowed")]
  MethodNotAllowed(String),
}

impl HandlerError {
  fn status_line(&self) -> &'static str {
    match self {
      HandlerError::InvalidBody(_) => "400 Bad Request",
      HandlerError::MethodNotAllowed(_) => "405 Method Not Allowed",
      HandlerError::ReadBody(_) => "500 Internal Server Error",
    }
  }
}

/// Handler that describes each request it receives as JSON.
///
/// Every error is caught and turned into a JSON error response, so the adapter always receives a
/// started response.
#[derive(Clone, Debug, Default)]
pub struct EchoHandler;

impl EchoHandler {
  fn respond(&self, env: &mut Environment) -> Result<Value, HandlerError> {
    let method = env.request_method().to_string();
    if !matches!(method.as_str(), "GET" | "POST" | "DELETE") {
      return Err(HandlerError::MethodNotAllowed(method));
    }

    let mut body = Vec::with_capacity(env.content_length());
    env
      .input()
      .read_to_end(&mut body)
      .map_err(HandlerError::ReadBody)?;

    let body = if body.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice::<Value>(&body).map_err(HandlerError::InvalidBody)?
    };

    Ok(json!({
      "method": method,
      "path": env.path_info(),
      "query": env.query_string(),
      "requestId": env.context().request_id,
      "authorizer": env.authorizer(),
      "body": body,
    }))
  }
}

impl Handler for EchoHandler {
  type Body = Vec<Vec<u8>>;

  fn call(
    &self,
    env: &mut Environment,
    start_response: &mut StartResponse,
  ) -> anyhow::Result<Self::Body> {
    let (status_line, body) = match self.respond(env) {
      Ok(body) => ("200 OK", body),
      Err(err) => {
        let request_line = format!("{} {}", env.request_method(), env.path_info());
        writeln!(
          env.errors(),
          "{request_line}: {}",
          apigw_adapter::error::format_error(&err, None, None)
        )?;
        (
          err.status_line(),
          json!({ "message": format!("An error occurred on the server: {err}") }),
        )
      }
    };

    start_response.start(status_line, RESPONSE_HEADERS.iter().copied())?;
    Ok(vec![serde_json::to_vec(&body)?])
  }
}
