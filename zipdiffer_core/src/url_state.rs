//! Encoding archive sources in the query string of a page URL, so a
//! comparison can be shared as a link.
//!
//! A source stored under prefix `left` uses the parameters `left` (the
//! archive URL, relative when it lives under the page), `left.redirect`
//! (`no` when redirects are refused), `left.credentials` (omitted for the
//! default) and `left.ext` (file extension hint).

use url::Url;
use zipdiffer_common::{Credentials, DownloadOptions, Redirect};

const REDIRECT_SUFFIX: &str = "redirect";
const CREDENTIALS_SUFFIX: &str = "credentials";
const EXTENSION_SUFFIX: &str = "ext";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub url: Url,
    pub options: DownloadOptions,
}

impl SourceRef {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            options: DownloadOptions::default(),
        }
    }
}

/// Origin plus path of the page, the prefix under which URLs are stored
/// relative
fn page_base(page: &Url) -> String {
    let mut base = page.clone();
    base.set_query(None);
    base.set_fragment(None);
    base.to_string()
}

fn key(prefix: &str, suffix: &str) -> String {
    format!("{}.{}", prefix, suffix)
}

/// Store `source` (or clear it with `None`) under `prefix` in the query of
/// `page`. Parameters that do not belong to `prefix` are preserved in their
/// original order; empty values remove their key.
pub fn write_source(page: &Url, prefix: &str, source: Option<&SourceRef>) -> Url {
    let base = page_base(page);

    let mut updates: Vec<(String, String)> = vec![
        (
            prefix.to_string(),
            source
                .map(|s| {
                    let href = s.url.as_str();
                    href.strip_prefix(base.as_str()).unwrap_or(href).to_string()
                })
                .unwrap_or_default(),
        ),
        (
            key(prefix, REDIRECT_SUFFIX),
            match source.map(|s| s.options.redirect) {
                Some(Redirect::Error) => "no".to_string(),
                _ => String::new(),
            },
        ),
        (
            key(prefix, CREDENTIALS_SUFFIX),
            match source.map(|s| s.options.credentials) {
                Some(credentials) if credentials != Credentials::default() => {
                    credentials.as_str().to_string()
                }
                _ => String::new(),
            },
        ),
        (
            key(prefix, EXTENSION_SUFFIX),
            source
                .and_then(|s| s.options.file_extension.clone())
                .unwrap_or_default(),
        ),
    ];

    let mut pairs: Vec<(String, String)> = Vec::new();
    for (name, value) in page.query_pairs() {
        match updates.iter().position(|(key, _)| *key == name) {
            Some(index) => {
                let (key, value) = updates.remove(index);
                if !value.is_empty() {
                    pairs.push((key, value));
                }
            }
            None => pairs.push((name.into_owned(), value.into_owned())),
        }
    }
    pairs.extend(updates.into_iter().filter(|(_, value)| !value.is_empty()));

    let mut result = page.clone();
    if pairs.is_empty() {
        result.set_query(None);
    } else {
        result.query_pairs_mut().clear().extend_pairs(pairs);
    }
    result
}

/// Read the source stored under `prefix`. Relative URLs resolve against
/// `page`; unknown option values fall back to their defaults.
pub fn read_source(page: &Url, prefix: &str) -> Option<SourceRef> {
    let param = |name: &str| {
        page.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    let raw_url = param(prefix).filter(|value| !value.is_empty())?;
    let url = page.join(&raw_url).ok()?;

    let redirect = match param(&key(prefix, REDIRECT_SUFFIX)).as_deref() {
        Some("no") => Redirect::Error,
        _ => Redirect::Follow,
    };
    let credentials = param(&key(prefix, CREDENTIALS_SUFFIX))
        .and_then(|value| Credentials::parse(&value))
        .unwrap_or_default();
    let file_extension = param(&key(prefix, EXTENSION_SUFFIX)).filter(|value| !value.is_empty());

    Some(SourceRef {
        url,
        options: DownloadOptions {
            file_extension,
            redirect,
            credentials,
        },
    })
}
