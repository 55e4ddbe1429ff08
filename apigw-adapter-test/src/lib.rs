use apigw_adapter::{
  AdapterConfig, AdapterError, Environment, GatewayResponse, Handler, LambdaContext,
  StartResponse,
};
use serde_json::{json, Value};

use std::io::Read;
use std::path::Path;

/// First bytes of a PNG file.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Load an event fixture from the `events/` directory.
pub fn load_event(name: &str) -> Value {
  let path = Path::new(env!("CARGO_MANIFEST_DIR"))
    .join("events")
    .join(format!("{name}.json"));
  let contents = std::fs::read_to_string(&path)
    .unwrap_or_else(|err| panic!("failed to read {}: {err}", path.display()));
  serde_json::from_str(&contents)
    .unwrap_or_else(|err| panic!("failed to parse {}: {err}", path.display()))
}

/// Run `handler` against `event` with a default Lambda context.
pub fn invoke<H>(
  handler: &H,
  event: Value,
  config: &AdapterConfig,
) -> Result<GatewayResponse, AdapterError>
where
  H: Handler,
{
  let _ = env_logger::builder().is_test(true).try_init();
  apigw_adapter::handle(handler, event, LambdaContext::default(), config)
}

/// Respond with a JSON description of the request.
pub fn echo(
  env: &mut Environment,
  start_response: &mut StartResponse,
) -> anyhow::Result<Vec<Vec<u8>>> {
  let mut body = String::new();
  env.input().read_to_string(&mut body)?;

  let description = json!({
    "method": env.request_method(),
    "path": env.path_info(),
    "query": env.query_string(),
    "contentType": env.content_type(),
    "contentLength": env.content_length(),
    "remoteAddr": env.var("REMOTE_ADDR"),
    "remoteUser": env.var("REMOTE_USER"),
    "server": format!(
      "{}://{}:{}",
      env.var("URL_SCHEME").unwrap_or_default(),
      env.var("SERVER_NAME").unwrap_or_default(),
      env.var("SERVER_PORT").unwrap_or_default(),
    ),
    "accept": env.header("Accept"),
    "authorizer": env.authorizer(),
    "body": body,
  });

  start_response.start("200 OK", [("Content-Type", "application/json")])?;
  Ok(vec![serde_json::to_vec(&description)?])
}

/// Respond with a PNG image, writing the first half of the body through the response writer and
/// returning the rest.
pub fn avatar(
  _env: &mut Environment,
  start_response: &mut StartResponse,
) -> anyhow::Result<Vec<Vec<u8>>> {
  let (head, tail) = PNG_BYTES.split_at(PNG_BYTES.len() / 2);
  start_response
    .start(
      "200 OK",
      [
        ("Content-Type", "image/png"),
        ("Cache-Control", "max-age=3600"),
      ],
    )?
    .write(head);
  Ok(vec![tail.to_vec()])
}

/// Handler whose body is produced lazily, one line per chunk.
pub struct Lines(pub Vec<&'static str>);

impl Handler for Lines {
  type Body = Box<dyn Iterator<Item = Vec<u8>>>;

  fn call(
    &self,
    _env: &mut Environment,
    start_response: &mut StartResponse,
  ) -> anyhow::Result<Self::Body> {
    start_response
      .start("200 OK", [("Content-Type", "text/plain; charset=utf-8")])?
      .write("# header\n");
    let mut lines = self.0.clone().into_iter();
    Ok(Box::new(std::iter::from_fn(move || {
      lines.next().map(|line| format!("{line}\n").into_bytes())
    })))
  }
}

#[cfg(test)]
mod tests {
  use crate::{avatar, echo, invoke, load_event, Lines, PNG_BYTES};

  use apigw_adapter::{
    AdapterConfig, AdapterError, Environment, StartResponse, StatusCodeStyle, StatusCodeValue,
  };
  use base64::Engine as _;
  use insta::assert_json_snapshot;
  use pretty_assertions::assert_eq;
  use serde_json::{json, Value};

  fn body_json(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|err| panic!("invalid JSON body {body}: {err}"))
  }

  #[test]
  fn test_rest_get() {
    let response = invoke(&echo, load_event("rest-get-users"), &AdapterConfig::new()).unwrap();

    assert_eq!(response.status_code, StatusCodeValue::Numeric(200));
    assert!(!response.is_base64_encoded);
    assert_eq!(
      body_json(&response.body),
      json!({
        "method": "GET",
        "path": "/users",
        "query": "limit=5&start_key=user%2042",
        "contentType": "",
        "contentLength": 0,
        "remoteAddr": "203.0.113.7",
        "remoteUser": "user-42",
        "server": "https://abcdef1234.execute-api.us-east-1.amazonaws.com:443",
        "accept": "application/json",
        "authorizer": null,
        "body": "",
      })
    );
  }

  #[test]
  fn test_rest_post_base64_body() {
    let response = invoke(&echo, load_event("rest-post-base64"), &AdapterConfig::new()).unwrap();

    let body = body_json(&response.body);
    assert_eq!(body["method"], json!("POST"));
    assert_eq!(body["contentType"], json!("application/json"));
    assert_eq!(body["contentLength"], json!(23));
    assert_eq!(body["query"], json!(""));
    assert_eq!(body["remoteUser"], json!(""));
    assert_eq!(body["server"], json!("http://abcdef1234.execute-api.us-east-1.amazonaws.com:80"));
    assert_eq!(body["body"], json!(r#"{"name":"Ada Lovelace"}"#));
  }

  #[test]
  fn test_http_api_v2() {
    let response = invoke(&echo, load_event("http-api-v2"), &AdapterConfig::new()).unwrap();

    assert_eq!(response.status_code, StatusCodeValue::Numeric(200));
    let body = body_json(&response.body);
    assert_eq!(body["path"], json!("/users/42/avatar"));
    assert_eq!(body["query"], json!("size=large"));
    assert_eq!(body["remoteAddr"], json!("192.0.2.10"));
    assert_eq!(
      body["authorizer"],
      json!({"userId": "42", "scopes": ["avatar:read"]})
    );
  }

  #[test]
  fn test_json_response_shape() {
    let handler = |_env: &mut Environment,
                   start_response: &mut StartResponse|
     -> anyhow::Result<Vec<Vec<u8>>> {
      start_response.start("200 OK", [("Content-Type", "application/json")])?;
      Ok(vec![br#"{"ok":true}"#.to_vec()])
    };

    let response = invoke(
      &handler,
      json!({
        "httpMethod": "GET",
        "path": "/users",
        "headers": {},
        "queryStringParameters": {"limit": "5"},
        "body": null,
        "isBase64Encoded": false,
      }),
      &AdapterConfig::new(),
    )
    .unwrap();

    assert_json_snapshot!(response, @r###"
    {
      "statusCode": 200,
      "headers": {
        "Content-Type": "application/json"
      },
      "body": "{\"ok\":true}",
      "isBase64Encoded": false
    }
    "###);
  }

  #[test]
  fn test_binary_response() {
    let config = AdapterConfig::new()
      .with_binary_content_type("image/png")
      .with_http_api_status_code(StatusCodeStyle::String);
    let response = invoke(&avatar, load_event("http-api-v2"), &config).unwrap();

    assert_json_snapshot!(response, @r###"
    {
      "statusCode": "200",
      "headers": {
        "Content-Type": "image/png",
        "Cache-Control": "max-age=3600"
      },
      "body": "iVBORw0KGgo=",
      "isBase64Encoded": true
    }
    "###);
    assert_eq!(
      base64::engine::general_purpose::STANDARD
        .decode(&response.body)
        .unwrap(),
      PNG_BYTES
    );

    // REST API responses always use numeric status codes.
    let response = invoke(&avatar, load_event("rest-get-users"), &config).unwrap();
    assert_eq!(response.status_code, StatusCodeValue::Numeric(200));
    assert!(response.is_base64_encoded);
  }

  #[test]
  fn test_binary_type_not_configured() {
    let err = invoke(&avatar, load_event("http-api-v2"), &AdapterConfig::new()).unwrap_err();
    assert!(matches!(err, AdapterError::BodyEncoding(_, _, _)), "{err:?}");
  }

  #[test]
  fn test_png_signature_prefix() {
    let handler = |_env: &mut Environment,
                   start_response: &mut StartResponse|
     -> anyhow::Result<Vec<Vec<u8>>> {
      start_response.start("200 OK", [("Content-Type", "image/png")])?;
      Ok(vec![b"\x89PNG".to_vec()])
    };
    let response = invoke(
      &handler,
      load_event("rest-get-users"),
      &AdapterConfig::new().with_binary_content_type("image/png"),
    )
    .unwrap();

    assert!(response.is_base64_encoded);
    assert_eq!(response.body, "iVBORw==");
  }

  #[test]
  fn test_lazy_body() {
    let response = invoke(
      &Lines(vec!["alpha", "beta"]),
      load_event("rest-get-users"),
      &AdapterConfig::new().with_multi_value_headers(true),
    )
    .unwrap();

    assert_json_snapshot!(response, @r###"
    {
      "statusCode": 200,
      "headers": {
        "Content-Type": "text/plain; charset=utf-8"
      },
      "multiValueHeaders": {
        "Content-Type": [
          "text/plain; charset=utf-8"
        ]
      },
      "body": "# header\nalpha\nbeta\n",
      "isBase64Encoded": false
    }
    "###);
  }

  #[test]
  fn test_header_case_does_not_matter() {
    let event = |content_type_header: &str| {
      json!({
        "httpMethod": "POST",
        "path": "/users",
        "headers": {content_type_header: "application/json"},
        "body": "{}",
      })
    };

    let lower = invoke(&echo, event("content-type"), &AdapterConfig::new()).unwrap();
    let upper = invoke(&echo, event("Content-Type"), &AdapterConfig::new()).unwrap();

    assert_eq!(body_json(&lower.body)["contentType"], json!("application/json"));
    assert_eq!(lower, upper);
  }

  #[test]
  fn test_handler_never_starts() {
    let handler = |_env: &mut Environment,
                   _start_response: &mut StartResponse|
     -> anyhow::Result<Vec<Vec<u8>>> { Ok(Vec::new()) };

    let response = invoke(&handler, load_event("http-api-v2"), &AdapterConfig::new()).unwrap();
    assert_json_snapshot!(response, @r###"
    {
      "statusCode": 500,
      "headers": {},
      "body": "",
      "isBase64Encoded": false
    }
    "###);
  }

  #[test]
  fn test_malformed_event() {
    let err = invoke(
      &echo,
      json!({"version": "2.0", "rawPath": "/users", "requestContext": {}}),
      &AdapterConfig::new(),
    )
    .unwrap_err();
    assert!(matches!(err, AdapterError::MalformedEvent(_)), "{err:?}");
  }
}
