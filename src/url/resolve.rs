use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves a possibly-relative URL against a base URL
///
/// # Resolution Rules
///
/// 1. Surrounding whitespace is trimmed; an empty input is rejected
/// 2. An input that already carries a scheme is returned unchanged
/// 3. Anything else is joined onto `base` with standard URL-join
///    semantics (dot segments, root-relative paths, query and fragment
///    handling all follow the URL standard)
///
/// # Arguments
///
/// * `maybe_relative` - The URL or path found in the document
/// * `base` - The absolute URL to resolve against
///
/// # Returns
///
/// * `Ok(String)` - Absolute URL
/// * `Err(UrlError)` - The base is not absolute or the join failed
///
/// # Examples
///
/// ```
/// use shelf_crawler::url::resolve_url;
///
/// let base = "https://books.toscrape.com/catalogue/";
/// let link = resolve_url("a-light-in-the-attic_1000/index.html", base).unwrap();
/// assert_eq!(link, "https://books.toscrape.com/catalogue/a-light-in-the-attic_1000/index.html");
///
/// // Already absolute: returned as-is
/// let same = resolve_url("https://other.example/x", base).unwrap();
/// assert_eq!(same, "https://other.example/x");
/// ```
pub fn resolve_url(maybe_relative: &str, base: &str) -> UrlResult<String> {
    let input = maybe_relative.trim();

    if input.is_empty() {
        return Err(UrlError::Empty);
    }

    if has_scheme(input) {
        return Ok(input.to_string());
    }

    let base_url = Url::parse(base).map_err(|e| UrlError::Parse(format!("{}: {}", base, e)))?;

    base_url
        .join(input)
        .map(|joined| joined.to_string())
        .map_err(|e| UrlError::Join {
            input: input.to_string(),
            base: base.to_string(),
            reason: e.to_string(),
        })
}

/// Resolves a detail-page thumbnail path against the site root
///
/// Detail pages reference images with parent-directory prefixes
/// (`../../media/cache/...`). Those segments are stripped first, then the
/// remainder is joined onto the site root.
pub fn resolve_thumbnail(path: &str, site_root: &str) -> UrlResult<String> {
    resolve_url(strip_parent_segments(path.trim()), site_root)
}

/// Removes every leading `../` (and `./`) segment from a relative path
pub fn strip_parent_segments(path: &str) -> &str {
    let mut rest = path;
    loop {
        if let Some(stripped) = rest.strip_prefix("../") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else {
            return rest;
        }
    }
}

/// Returns true if the input parses as an absolute URL with a scheme
fn has_scheme(input: &str) -> bool {
    Url::parse(input).is_ok()
}
