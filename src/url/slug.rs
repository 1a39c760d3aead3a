/// Derives a filesystem-safe file stem from free text
///
/// The text is lowercased first, and a single character may lowercase to
/// several. Every resulting character outside `[a-z0-9]` then becomes an
/// underscore. Distinct titles can share a slug (`"A.B"` and `"a b"`), in
/// which case the later per-item artifact overwrites the earlier one.
///
/// # Examples
///
/// ```
/// use shelf_crawler::url::slugify;
///
/// assert_eq!(slugify("A Light in the Attic"), "a_light_in_the_attic");
/// assert_eq!(slugify("Sapiens: A Brief History"), "sapiens__a_brief_history");
/// ```
pub fn slugify(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Formats a timestamp for use in a file name (colons are not portable)
pub fn timestamp_slug(timestamp: &str) -> String {
    timestamp.replace(':', "-")
}
