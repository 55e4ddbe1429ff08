use crate::error::AdapterError;

use backtrace::Backtrace;
use base64::Engine as _;
use headers::{ContentType, Header};
use indexmap::IndexSet;

/// Response body in the form expected by API Gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedBody {
  /// Response body text (base64-encoded if `is_base64_encoded` is `true`).
  pub body: String,
  /// Whether `body` is base64-encoded.
  pub is_base64_encoded: bool,
}

/// Return the media type of a `Content-Type` header value, without any parameters.
///
/// For example, `text/html; charset=utf-8` becomes `text/html`. No other normalization (e.g.,
/// trimming or case folding) is performed.
pub fn media_type(content_type: &str) -> &str {
  content_type
    .split_once(';')
    .map_or(content_type, |(media_type, _)| media_type)
}

/// Whether a response with the given headers must be returned as a base64-encoded body.
///
/// When `Content-Type` is repeated, the last value decides.
pub fn is_binary_response(
  headers: &[(String, String)],
  binary_content_types: &IndexSet<String>,
) -> bool {
  content_type(headers)
    .map(media_type)
    .is_some_and(|media_type| binary_content_types.contains(media_type))
}

/// Concatenate the response body chunks and encode them for API Gateway.
///
/// Chunks written through the [`ResponseWriter`](crate::ResponseWriter) come first, followed by
/// the chunks of the body sequence returned by the handler.
///
/// # Errors
///
/// Returns [`AdapterError::BodyEncoding`] if the response is not binary (see
/// [`is_binary_response`]) and the body is not valid UTF-8.
pub fn build_body<W, O>(
  headers: &[(String, String)],
  written: W,
  output: O,
  binary_content_types: &IndexSet<String>,
) -> Result<EncodedBody, AdapterError>
where
  W: IntoIterator<Item = Vec<u8>>,
  O: IntoIterator<Item = Vec<u8>>,
{
  let body = written.into_iter().chain(output).flatten().collect::<Vec<u8>>();

  if is_binary_response(headers, binary_content_types) {
    log::debug!("Base64-encoding {}-byte binary response body", body.len());
    Ok(EncodedBody {
      body: base64::engine::general_purpose::STANDARD.encode(body),
      is_base64_encoded: true,
    })
  } else {
    String::from_utf8(body)
      .map(|body| EncodedBody {
        body,
        is_base64_encoded: false,
      })
      .map_err(|err| {
        AdapterError::BodyEncoding(
          content_type(headers).unwrap_or_default().to_string(),
          Box::new(err),
          Backtrace::new(),
        )
      })
  }
}

// Repeated names collapse to their last value in the emitted `headers` map, so the last match is
// the `Content-Type` API Gateway sees.
fn content_type(headers: &[(String, String)]) -> Option<&str> {
  headers
    .iter()
    .rev()
    .find(|(name, _)| name.eq_ignore_ascii_case(ContentType::name().as_str()))
    .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
  use super::{build_body, is_binary_response, media_type, EncodedBody};
  use crate::error::AdapterError;

  use base64::Engine as _;
  use indexmap::IndexSet;
  use pretty_assertions::assert_eq;

  fn headers(content_type: &str) -> Vec<(String, String)> {
    vec![("Content-Type".to_string(), content_type.to_string())]
  }

  fn binary_types() -> IndexSet<String> {
    ["image/png", "application/octet-stream"]
      .into_iter()
      .map(str::to_string)
      .collect()
  }

  #[test]
  fn test_media_type() {
    assert_eq!(media_type("text/html; charset=utf-8"), "text/html");
    assert_eq!(media_type("image/png"), "image/png");
    assert_eq!(media_type(""), "");
  }

  #[test]
  fn test_is_binary_response() {
    assert!(is_binary_response(&headers("image/png"), &binary_types()));
    assert!(is_binary_response(
      &headers("application/octet-stream;name=a.bin"),
      &binary_types()
    ));
    assert!(is_binary_response(
      &[("content-type".to_string(), "image/png".to_string())],
      &binary_types()
    ));
    assert!(!is_binary_response(&headers("application/json"), &binary_types()));
    assert!(!is_binary_response(&[], &binary_types()));
    assert!(!is_binary_response(&headers("image/png"), &IndexSet::new()));
  }

  #[test]
  fn test_repeated_content_type_last_wins() {
    let repeated = |first: &str, last: &str| {
      vec![
        ("Content-Type".to_string(), first.to_string()),
        ("content-type".to_string(), last.to_string()),
      ]
    };
    assert!(is_binary_response(
      &repeated("text/plain", "image/png"),
      &binary_types()
    ));
    assert!(!is_binary_response(
      &repeated("image/png", "text/plain"),
      &binary_types()
    ));

    let err = build_body(
      &repeated("image/png", "text/plain"),
      vec![vec![0x89, b'P']],
      Vec::new(),
      &binary_types(),
    )
    .unwrap_err();
    assert!(
      matches!(err, AdapterError::BodyEncoding(ref content_type, _, _) if content_type == "text/plain"),
      "{err:?}"
    );
  }

  #[test]
  fn test_text_body() {
    let body = build_body(
      &headers("text/plain; charset=utf-8"),
      vec![b"hello, ".to_vec()],
      vec![b"wor".to_vec(), b"ld".to_vec()],
      &binary_types(),
    )
    .unwrap();

    assert_eq!(
      body,
      EncodedBody {
        body: "hello, world".to_string(),
        is_base64_encoded: false,
      }
    );
  }

  #[test]
  fn test_binary_body() {
    let png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0xff];
    let body = build_body(
      &headers("image/png"),
      Vec::new(),
      vec![png[..4].to_vec(), png[4..].to_vec()],
      &binary_types(),
    )
    .unwrap();

    assert!(body.is_base64_encoded);
    assert_eq!(
      base64::engine::general_purpose::STANDARD
        .decode(body.body)
        .unwrap(),
      png
    );
  }

  #[test]
  fn test_invalid_utf8_text_body() {
    let err = build_body(
      &headers("text/plain"),
      vec![vec![0x89, b'P']],
      Vec::new(),
      &binary_types(),
    )
    .unwrap_err();

    assert!(
      matches!(err, AdapterError::BodyEncoding(ref content_type, _, _) if content_type == "text/plain"),
      "{err:?}"
    );
  }
}
