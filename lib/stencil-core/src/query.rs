//! Query string composition.

use std::collections::BTreeMap;

use crate::param::is_truthy;
use crate::{ParamLocation, ParameterValue, Parameters, Result};

/// Query parameter name to already-encoded value, as appended to the URL.
pub type QueryMap = BTreeMap<String, String>;

/// Append `params` to the query string of `url`.
///
/// A `?` is added when the URL has none yet. Falsy values (`null`, `false`,
/// `0`, `""`) are skipped; every other value is normalized through
/// [`ParameterValue::from_json`] and appended as `name=value` in insertion
/// order. Names are appended as given.
///
/// Returns the appended pairs keyed by name, with the same encoding as in
/// the URL.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidParameterType`] or
/// [`crate::Error::MissingParameterValue`] for values that cannot be
/// normalized. `url` is left untouched on error.
///
/// # Example
///
/// ```
/// use stencil_core::{Parameters, append_query};
///
/// let mut url = "https://api.example.com/search".to_string();
/// let query = append_query(&mut url, &Parameters::new().with("q", "a&b")).expect("query");
/// assert_eq!(url, "https://api.example.com/search?q=a%26b");
/// assert_eq!(query.get("q").map(String::as_str), Some("a%26b"));
/// ```
pub fn append_query(url: &mut String, params: &Parameters) -> Result<QueryMap> {
    let mut pairs = Vec::with_capacity(params.len());
    let mut query = QueryMap::new();

    for (name, value) in params.iter() {
        if !is_truthy(value) {
            continue;
        }
        let encoded = ParameterValue::from_json(name, ParamLocation::Query, value)?.encoded();
        pairs.push(format!("{name}={encoded}"));
        query.insert(name.to_string(), encoded);
    }

    if !url.contains('?') {
        url.push('?');
    } else if !pairs.is_empty() && !url.ends_with('?') && !url.ends_with('&') {
        url.push('&');
    }
    url.push_str(&pairs.join("&"));

    Ok(query)
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use serde_json::json;

    use super::*;
    use crate::Error;

    fn compose(url: &str, params: &Parameters) -> Result<(String, QueryMap)> {
        let mut url = url.to_string();
        let query = append_query(&mut url, params)?;
        Ok((url, query))
    }

    #[test]
    fn appends_encoded_pairs_in_order() {
        let params = Parameters::new().with("q", "a&b").with("api-version", "2024-01-01");
        let (url, query) = compose("https://h/items", &params).expect("query");

        check!(url == "https://h/items?q=a%26b&api-version=2024-01-01");
        check!(query.get("q").map(String::as_str) == Some("a%26b"));
        check!(query.get("api-version").map(String::as_str) == Some("2024-01-01"));
        check!(query.len() == 2);
    }

    #[test]
    fn skip_url_encoding_applies_to_url_and_map() {
        let params = Parameters::new()
            .with("filter", json!({"value": "name eq 'x'", "skipUrlEncoding": true}))
            .with("expand", json!({"value": "a,b"}));
        let (url, query) = compose("https://h", &params).expect("query");

        check!(url == "https://h?filter=name eq 'x'&expand=a%2Cb");
        check!(query.get("filter").map(String::as_str) == Some("name eq 'x'"));
        check!(query.get("expand").map(String::as_str) == Some("a%2Cb"));
    }

    #[test]
    fn falsy_values_are_skipped() {
        let params = Parameters::new()
            .with("empty", "")
            .with("none", json!(null))
            .with("zero", json!(0))
            .with("off", json!(false))
            .with("kept", "1");
        let (url, query) = compose("https://h", &params).expect("query");

        check!(url == "https://h?kept=1");
        check!(query.keys().collect::<Vec<_>>() == ["kept"]);
    }

    #[test]
    fn question_mark_added_even_without_pairs() {
        let (url, query) = compose("https://h", &Parameters::new()).expect("query");
        check!(url == "https://h?");
        check!(query.is_empty());
    }

    #[test]
    fn existing_query_is_extended() {
        let params = Parameters::new().with("b", "2");
        let (url, _) = compose("https://h?a=1", &params).expect("query");
        check!(url == "https://h?a=1&b=2");

        let (url, _) = compose("https://h?", &params).expect("query");
        check!(url == "https://h?b=2");

        let (url, _) = compose("https://h?a=1&", &params).expect("query");
        check!(url == "https://h?a=1&b=2");
    }

    #[test]
    fn object_without_value_fails() {
        let params = Parameters::new().with("q", json!({"skipUrlEncoding": true}));
        let_assert!(Err(Error::MissingParameterValue { name, location }) = compose("https://h", &params));
        check!(name == "q");
        check!(location == ParamLocation::Query);
    }

    #[test]
    fn unsupported_value_type_fails() {
        let params = Parameters::new().with("top", json!(10));
        let_assert!(Err(Error::InvalidParameterType { name, .. }) = compose("https://h", &params));
        check!(name == "top");
    }

    #[test]
    fn url_untouched_on_error() {
        let mut url = "https://h".to_string();
        let params = Parameters::new().with("a", "1").with("b", json!([1]));
        check!(append_query(&mut url, &params).is_err());
        check!(url == "https://h");
    }
}
