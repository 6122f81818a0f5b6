//! Identifier derivation
//!
//! A document identifier is the unpadded URL-safe base64 encoding of the
//! canonical URL bytes. Only `[A-Za-z0-9_-]` can appear, which the search engine
//! accepts as a primary key. The mapping is deterministic and reversible, so two
//! different URLs can never share an identifier and re-scraping a URL overwrites
//! its old record.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Derives the stable identifier for a canonical URL
///
/// Callers are expected to have parsed the URL already; the function itself is
/// total and never fails.
///
/// # Example
///
/// ```
/// use zeno::derive_id;
///
/// assert_eq!(derive_id("https://example.com/"), derive_id("https://example.com/"));
/// assert_ne!(derive_id("https://example.com/a"), derive_id("https://example.com/b"));
/// ```
pub fn derive_id(url: &str) -> String {
    URL_SAFE_NO_PAD.encode(url.as_bytes())
}

/// Recovers the URL an identifier was derived from
///
/// Returns `None` for strings that were not produced by [`derive_id`].
pub fn url_from_id(id: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(id.as_bytes()).ok()?;
    String::from_utf8(bytes).ok()
}
