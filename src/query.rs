//! Search query classification.
//!
//! A query is routed purely on its syntax:
//!
//! | Input | Kind | Request |
//! |-------|------|---------|
//! | `orders` | exact name | `GET {catalogue}/asset/name/orders` |
//! | `#pii, #finance` | tag list | `POST {catalogue}/assets/tags` |
//! | `daily orders` | free text | `POST {catalogue}/assets/search` |
//!
//! Anything that is neither a single bare token nor led by a `#` falls
//! through to free-text search.

use serde_json::json;

use crate::fetch::Request;
use crate::paging::PageWindow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKind {
    Name(String),
    Tags(Vec<String>),
    Text(String),
}

/// Classify the raw input. A bare token must carry no spaces at all, so
/// `" foo"` is free text rather than a name lookup.
pub fn classify(query: &str) -> QueryKind {
    let elements: Vec<&str> = query.split(',').collect();

    if elements.len() == 1 && !elements[0].contains('#') && !elements[0].contains(' ') {
        return QueryKind::Name(elements[0].to_string());
    }

    if elements[0].contains('#') {
        let tags = elements
            .iter()
            .map(|e| e.replace('#', "").trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        return QueryKind::Tags(tags);
    }

    QueryKind::Text(query.to_string())
}

impl QueryKind {
    /// Build the catalogue request for this query at `window`.
    ///
    /// Exact-name lookups ignore the window; the backend answers with a
    /// single asset.
    pub fn to_request(&self, catalogue: &str, window: PageWindow) -> Request {
        match self {
            QueryKind::Name(name) => Request::get(format!(
                "{}/asset/name/{}",
                catalogue,
                urlencoding::encode(name)
            )),
            QueryKind::Tags(tags) => Request::post(
                format!("{}/assets/tags", catalogue),
                Some(json!({
                    "tags": tags,
                    "limit": window.limit,
                    "page": window.page,
                })),
            ),
            QueryKind::Text(text) => Request::post(
                format!("{}/assets/search", catalogue),
                Some(json!({
                    "query": text,
                    "limit": window.limit,
                    "page": window.page,
                })),
            ),
        }
    }
}
