//! URL identity: canonical form and stable page keys.
//!
//! Every page the explorer sees is keyed by [`url_hash`] of its
//! [`normalize_url`] form. The key doubles as a directory name for
//! persisted screenshots, so it only contains `[a-z0-9_-]`.

use crate::core::error::DomainError;
use sha2::{Digest, Sha256};
use url::Url;

/// Maximum length of the path slug embedded in a page key.
const PATH_SLUG_MAX: usize = 40;

/// Number of hex characters of the SHA-256 digest kept in a page key.
const DIGEST_HEX_LEN: usize = 12;

/// Canonicalize a URL.
///
/// - scheme and host are lowercased, default ports dropped (via [`Url`])
/// - a trailing slash is stripped from non-root paths
/// - query string and fragment are preserved (SPAs route on the fragment)
///
/// Input that does not parse as an absolute URL is only trimmed and has its
/// trailing slash removed, so callers always get a usable key.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(mut url) => {
            let path = url.path().to_string();
            if path.len() > 1 && path.ends_with('/') {
                url.set_path(path.trim_end_matches('/'));
            }
            url.to_string()
        }
        Err(_) => {
            if trimmed.len() > 1 && trimmed.ends_with('/') {
                trimmed.trim_end_matches('/').to_string()
            } else {
                trimmed.to_string()
            }
        }
    }
}

/// Derive the stable page key for a URL.
///
/// Format: `<domain>_<path-slug>_<digest>` where the digest is the first
/// 12 hex characters of SHA-256 over the normalized URL.
///
/// ```text
/// https://example.com/pricing  ->  example-com_pricing_<12 hex>
/// https://example.com/         ->  example-com_root_<12 hex>
/// ```
pub fn url_hash(raw: &str) -> String {
    let normalized = normalize_url(raw);

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    let (domain, path) = match Url::parse(&normalized) {
        Ok(url) => (
            url.host_str().unwrap_or("local").to_string(),
            url.path().to_string(),
        ),
        Err(_) => ("unknown".to_string(), normalized.clone()),
    };

    let mut path_slug = slugify(&path);
    if path_slug.is_empty() {
        path_slug = "root".to_string();
    }
    path_slug.truncate(PATH_SLUG_MAX);

    format!(
        "{}_{}_{}",
        slugify(&domain),
        path_slug,
        &digest[..DIGEST_HEX_LEN]
    )
}

/// Whether two URLs refer to the same page after normalization.
pub fn same_page(a: &str, b: &str) -> bool {
    normalize_url(a) == normalize_url(b)
}

/// Resolve a possibly relative reference against a base page URL.
///
/// Returns `None` when neither the reference nor the join yields an
/// absolute http(s) URL.
pub fn resolve_against(base: &str, reference: &str) -> Option<String> {
    if let Ok(url) = Url::parse(reference) {
        return matches!(url.scheme(), "http" | "https").then(|| normalize_url(url.as_str()));
    }
    let base = Url::parse(base).ok()?;
    let joined = base.join(reference).ok()?;
    Some(normalize_url(joined.as_str()))
}

/// Validate an absolute http(s) URL and return its normalized form.
pub fn parse_http_url(raw: &str) -> Result<String, DomainError> {
    let url = Url::parse(raw.trim()).map_err(|e| DomainError::InvalidUrl(format!("{}: {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(DomainError::InvalidUrl(format!(
            "{}: unsupported scheme `{}`",
            raw,
            url.scheme()
        )));
    }
    Ok(normalize_url(url.as_str()))
}

fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_dash = true;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
