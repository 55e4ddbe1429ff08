/// Ordered collection of header name/value pairs with case-insensitive lookup.
///
/// Header names keep the case in which they were received, but lookups via [`get`](Self::get)
/// ignore ASCII case. Repeated names are allowed; lookups return the first match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderMultimap {
  entries: Vec<(String, String)>,
}

impl HeaderMultimap {
  /// Return the first value stored under `name` (ignoring ASCII case), if any.
  pub fn get(&self, name: &str) -> Option<&str> {
    self
      .entries
      .iter()
      .find(|(k, _)| k.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }

  /// Return the first value stored under `name` (ignoring ASCII case), or `default`.
  pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
    self.get(name).unwrap_or(default)
  }

  /// Iterate over every stored `(name, value)` pair in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  /// Number of stored pairs (including repeated names).
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Whether no headers are stored.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl<K, V> FromIterator<(K, V)> for HeaderMultimap
where
  K: Into<String>,
  V: Into<String>,
{
  fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
    Self {
      entries: iter
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect(),
    }
  }
}
