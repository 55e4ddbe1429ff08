use pretty_assertions::assert_eq;
use reqwest::{Client, StatusCode, Url};
use serde_json::json;

#[tokio::test]
// Since this test depends on the function running separately (e.g., via `cargo lambda watch`), we
// only run the test when specifically requested (see
// https://doc.rust-lang.org/book/ch11-02-running-tests.html#ignoring-some-tests-unless-specifically-requested).
#[ignore]
async fn test_integration() {
  env_logger::init();

  let base_url = Url::parse(
    &std::env::var("ECHO_BASE_URL")
      .unwrap_or_else(|_| "http://localhost:9000/lambda-url/bootstrap/".to_string()),
  )
  .unwrap();

  let client = Client::new();

  // Success.
  {
    let response = client
      .post(base_url.join("users?dry_run=true").unwrap())
      .header("Content-Type", "application/json")
      .body(r#"{"name": "Ada"}"#)
      .send()
      .await
      .unwrap_or_else(|err| panic!("request failed: {}", err));

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
      response
        .headers()
        .get("Access-Control-Allow-Origin")
        .and_then(|value| value.to_str().ok()),
      Some("*")
    );
    let body = response.json::<serde_json::Value>().await.unwrap();
    assert_eq!(body["query"], json!("dry_run=true"));
    assert_eq!(body["body"], json!({"name": "Ada"}));
  }

  // Invalid request body.
  {
    let response = client
      .post(base_url.join("users").unwrap())
      .header("Content-Type", "application/json")
      .body("{")
      .send()
      .await
      .unwrap_or_else(|err| panic!("request failed: {}", err));

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
  }

  // Unsupported method.
  {
    let response = client
      .patch(base_url.join("users").unwrap())
      .send()
      .await
      .unwrap_or_else(|err| panic!("request failed: {}", err));

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
  }
}
