//! `{count, next, previous, results}` list envelope.

use axum::http::Uri;
use serde::{Deserialize, Serialize};
use url::Url;

use larder_domain::pagination::{Page, PageRequest};

/// `?page=&limit=` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        let default = PageRequest::default();
        PageRequest {
            limit: self.limit.unwrap_or(default.limit),
            page: self.page.unwrap_or(default.page),
        }
        .clamped()
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Build the envelope, linking neighbouring pages on `public_url` + the
    /// request path with every other query parameter preserved.
    pub fn new(page: Page<T>, request: PageRequest, uri: &Uri, public_url: &str) -> Self {
        let link = |n: u32| page_link(public_url, uri, n);
        Self {
            next: request
                .has_next(page.count)
                .then(|| link(request.page + 1))
                .flatten(),
            previous: request
                .has_previous()
                .then(|| link(request.page - 1))
                .flatten(),
            count: page.count,
            results: page.items,
        }
    }
}

fn page_link(public_url: &str, uri: &Uri, page: u32) -> Option<String> {
    let mut url = Url::parse(&format!("{public_url}{}", uri.path())).ok()?;
    let pairs: Vec<(String, String)> = uri
        .query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .filter(|(k, _)| k != "page")
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        })
        .unwrap_or_default();
    {
        let mut query = url.query_pairs_mut();
        query.extend_pairs(pairs);
        query.append_pair("page", &page.to_string());
    }
    Some(url.into())
}
