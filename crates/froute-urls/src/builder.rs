//! Building concrete paths from route definitions.

use std::collections::HashMap;

use crate::error::RouteResult;
use crate::href::{ParsedQuery, stringify_query};
use crate::route::RouteDefinition;

/// Query part passed to [`build_path`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Query {
	/// No query suffix.
	#[default]
	Empty,
	/// A raw query string without the leading `?`, appended verbatim.
	Raw(String),
	/// A query map; multi-valued entries become repeated keys.
	Map(ParsedQuery),
}

impl Query {
	/// Renders the suffix including `?`, or an empty string.
	pub fn to_suffix(&self) -> String {
		match self {
			Query::Empty => String::new(),
			Query::Raw(raw) if raw.is_empty() => String::new(),
			Query::Raw(raw) => format!("?{}", raw),
			Query::Map(map) if map.is_empty() => String::new(),
			Query::Map(map) => format!("?{}", stringify_query(map)),
		}
	}
}

impl From<&str> for Query {
	fn from(raw: &str) -> Self {
		Query::Raw(raw.to_string())
	}
}

impl From<String> for Query {
	fn from(raw: String) -> Self {
		Query::Raw(raw)
	}
}

impl From<ParsedQuery> for Query {
	fn from(map: ParsedQuery) -> Self {
		Query::Map(map)
	}
}

impl<T: Into<Query>> From<Option<T>> for Query {
	fn from(query: Option<T>) -> Self {
		query.map(Into::into).unwrap_or_default()
	}
}

/// Builds a path for `route`, filling its parameters and appending `query`.
///
/// Parameter values are percent-encoded. Optional parameters may be left
/// out.
///
/// # Errors
///
/// Returns [`RouteError::MissingParameter`](crate::RouteError::MissingParameter)
/// when a required parameter is not supplied.
///
/// # Examples
///
/// ```
/// use froute_urls::{Query, build_path, route_of};
///
/// let user = route_of("/users/:id").build();
/// assert_eq!(build_path(&user, [("id", "1")], Query::Empty).unwrap(), "/users/1");
/// assert_eq!(build_path(&user, [("id", "1")], "tab=a").unwrap(), "/users/1?tab=a");
/// ```
pub fn build_path<I, K, V>(
	route: &RouteDefinition,
	params: I,
	query: impl Into<Query>,
) -> RouteResult<String>
where
	I: IntoIterator<Item = (K, V)>,
	K: AsRef<str>,
	V: AsRef<str>,
{
	let params: HashMap<String, String> = params
		.into_iter()
		.map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
		.collect();

	let pathname = route.pattern().reverse(&params)?;
	Ok(format!("{}{}", pathname, query.into().to_suffix()))
}
