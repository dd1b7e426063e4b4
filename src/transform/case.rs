//! Column-name normalization.

/// Convert a PascalCase identifier to snake_case.
///
/// An underscore is inserted before every uppercase letter that is not the
/// first character and is immediately followed by a lowercase letter. Every
/// letter is then lowercased; other characters pass through unchanged.
///
/// The lookahead is bounded: a trailing uppercase letter has no successor,
/// which counts as "not followed by lowercase", so it never gets an
/// underscore.
///
/// # Examples
///
/// ```
/// use quickstart_ingest::transform::convert_name;
///
/// assert_eq!(convert_name("AtcoCode"), "atco_code");
/// assert_eq!(convert_name("ATCOCode"), "atco_code");
/// assert_eq!(convert_name("Id"), "id");
/// ```
pub fn convert_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut chars = s.chars().peekable();
    let mut first = true;

    while let Some(c) = chars.next() {
        let next_is_lower = chars.peek().is_some_and(|n| n.is_lowercase());
        if !first && c.is_uppercase() && next_is_lower {
            out.push('_');
        }
        out.extend(c.to_lowercase());
        first = false;
    }

    out
}
