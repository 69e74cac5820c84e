//! URL splitting and query string helpers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// A URL split into its path, search and hash parts.
///
/// `search` keeps its leading `?` and `hash` its leading `#`; both are empty
/// when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathParts {
	/// Path component, always starting with `/`.
	pub pathname: String,
	/// Query component including `?`, or empty.
	pub search: String,
	/// Fragment component including `#`, or empty.
	pub hash: String,
}

impl PathParts {
	/// Creates parts from already-split components.
	pub fn new(
		pathname: impl Into<String>,
		search: impl Into<String>,
		hash: impl Into<String>,
	) -> Self {
		Self {
			pathname: normalize_pathname(pathname.into()),
			search: normalize_prefixed(search.into(), '?'),
			hash: normalize_prefixed(hash.into(), '#'),
		}
	}

	/// Joins the parts back into a relative URL.
	pub fn href(&self) -> String {
		format!("{}{}{}", self.pathname, self.search, self.hash)
	}

	/// Returns the query string without the leading `?`.
	pub fn query_string(&self) -> &str {
		self.search.strip_prefix('?').unwrap_or(&self.search)
	}
}

fn normalize_pathname(pathname: String) -> String {
	if pathname.starts_with('/') {
		pathname
	} else {
		format!("/{}", pathname)
	}
}

fn normalize_prefixed(part: String, prefix: char) -> String {
	if part.len() == prefix.len_utf8() && part.starts_with(prefix) {
		String::new()
	} else if part.is_empty() || part.starts_with(prefix) {
		part
	} else {
		format!("{}{}", prefix, part)
	}
}

/// Splits a URL into pathname, search and hash.
///
/// Absolute URLs (`scheme://host/...`) are parsed with [`url::Url`] and only
/// their path, query and fragment are kept. Anything else is treated as a
/// relative reference: the hash starts at the first `#` and the search at
/// the first `?` before it. The path is left percent-encoded.
pub fn split_url(input: &str) -> PathParts {
	if input.contains("://") {
		if let Ok(parsed) = url::Url::parse(input) {
			return PathParts::new(
				parsed.path(),
				parsed.query().unwrap_or_default(),
				parsed.fragment().unwrap_or_default(),
			);
		}
	}

	let (rest, hash) = match input.find('#') {
		Some(i) => input.split_at(i),
		None => (input, ""),
	};
	let (pathname, search) = match rest.find('?') {
		Some(i) => rest.split_at(i),
		None => (rest, ""),
	};

	PathParts::new(pathname, search, hash)
}

/// A query value: a key seen once, or a key repeated several times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
	/// The key appeared once.
	Single(String),
	/// The key appeared more than once, or is declared multi-valued.
	Multiple(Vec<String>),
}

impl QueryValue {
	/// Returns the first value.
	pub fn first(&self) -> Option<&str> {
		match self {
			QueryValue::Single(v) => Some(v),
			QueryValue::Multiple(vs) => vs.first().map(String::as_str),
		}
	}

	/// Returns every value in order.
	pub fn values(&self) -> Vec<&str> {
		match self {
			QueryValue::Single(v) => vec![v.as_str()],
			QueryValue::Multiple(vs) => vs.iter().map(String::as_str).collect(),
		}
	}

	fn push(&mut self, value: String) {
		match self {
			QueryValue::Single(first) => {
				*self = QueryValue::Multiple(vec![std::mem::take(first), value]);
			}
			QueryValue::Multiple(vs) => vs.push(value),
		}
	}
}

impl From<&str> for QueryValue {
	fn from(value: &str) -> Self {
		QueryValue::Single(value.to_string())
	}
}

impl From<String> for QueryValue {
	fn from(value: String) -> Self {
		QueryValue::Single(value)
	}
}

impl<S: Into<String>> From<Vec<S>> for QueryValue {
	fn from(values: Vec<S>) -> Self {
		QueryValue::Multiple(values.into_iter().map(Into::into).collect())
	}
}

/// A parsed query string.
pub type ParsedQuery = BTreeMap<String, QueryValue>;

/// Parses a query string (with or without the leading `?`).
///
/// Repeated keys collect into [`QueryValue::Multiple`].
pub fn parse_query(query: &str) -> ParsedQuery {
	let query = query.strip_prefix('?').unwrap_or(query);
	let mut parsed = ParsedQuery::new();

	for (key, value) in form_urlencoded::parse(query.as_bytes()) {
		match parsed.get_mut(key.as_ref()) {
			Some(existing) => existing.push(value.into_owned()),
			None => {
				parsed.insert(key.into_owned(), QueryValue::Single(value.into_owned()));
			}
		}
	}

	parsed
}

/// Serializes a query map; multi-valued entries become repeated keys.
pub fn stringify_query(query: &ParsedQuery) -> String {
	let mut serializer = form_urlencoded::Serializer::new(String::new());
	for (key, value) in query {
		for v in value.values() {
			serializer.append_pair(key, v);
		}
	}
	serializer.finish()
}
