/// Reading and rewriting the "posted within" query parameter
///
/// The parameter is always written as `r<seconds>` (e.g. `f_TPR=r3600`).
/// Reading accepts both that form and a bare `<seconds>` value, which older
/// builds of the extension wrote.
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::config::{JOBS_HOST, JOBS_PATH_PREFIX, URL_PARAM_NAME, URL_PARAM_PREFIX};
use crate::settings::FilterSeconds;

static PARAM_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^r?(\d+)$").expect("parameter value pattern is valid")
});

/// True for job search pages on the target site (any subdomain)
pub fn is_jobs_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    let host_matches = parsed
        .host_str()
        .map(|host| {
            let host = host.to_ascii_lowercase();
            host == JOBS_HOST || host.ends_with(&format!(".{JOBS_HOST}"))
        })
        .unwrap_or(false);

    host_matches && parsed.path().starts_with(JOBS_PATH_PREFIX)
}

/// Canonical wire form of a filter value
pub fn encode(value: FilterSeconds) -> String {
    format!("{URL_PARAM_PREFIX}{value}")
}

/// Parse a parameter value in either the prefixed or the bare form
pub fn decode(raw: &str) -> Option<FilterSeconds> {
    let captures = PARAM_VALUE.captures(raw.trim())?;
    captures.get(1)?.as_str().parse().ok()
}

/// The filter value currently carried by `url`, if any
pub fn read_filter(url: &str) -> Option<FilterSeconds> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(name, _)| name == URL_PARAM_NAME)
        .and_then(|(_, value)| decode(&value))
}

/// Whether `url` already carries `value` (in either form)
pub fn carries(url: &str, value: FilterSeconds) -> bool {
    read_filter(url) == Some(value)
}

/// Return `url` with the filter parameter set to `value`, or removed when
/// `value` is `None`. Other parameters keep their order; an existing filter
/// parameter is replaced in place.
pub fn with_filter(url: &str, value: Option<FilterSeconds>) -> Result<String, url::ParseError> {
    let mut parsed = Url::parse(url)?;

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;
    for (name, current) in parsed.query_pairs() {
        if name == URL_PARAM_NAME {
            if let (Some(value), false) = (value, replaced) {
                pairs.push((name.into_owned(), encode(value)));
                replaced = true;
            }
        } else {
            pairs.push((name.into_owned(), current.into_owned()));
        }
    }

    if let (Some(value), false) = (value, replaced) {
        pairs.push((URL_PARAM_NAME.to_string(), encode(value)));
    }

    if pairs.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(pairs.iter());
    }

    Ok(parsed.to_string())
}
