//! Page URL parsing for the fetch client.

use hueguide_core::Error;
use url::Url;

/// Parse a search-result URL into something safe to GET.
///
/// - Leading/trailing whitespace is ignored
/// - A missing scheme defaults to `https://`
/// - Only `http` and `https` are accepted
/// - The fragment is dropped (it never reaches the server anyway)
///
/// Host lowercasing and percent-encoding are left to the `url` crate.
pub fn parse_page_url(input: &str) -> Result<Url, Error> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidUrl("empty URL".into()));
    }

    let with_scheme = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };
    let mut url = Url::parse(&with_scheme).map_err(|e| Error::InvalidUrl(format!("{trimmed}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl(format!("unsupported scheme: {}", url.scheme())));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidUrl(format!("{trimmed}: missing host")));
    }

    url.set_fragment(None);
    Ok(url)
}
