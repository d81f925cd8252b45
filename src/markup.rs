use once_cell::sync::Lazy;
use regex::Regex;

static OPENING_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<(\w+)").unwrap());

/// Returns the name of the first opening tag in `fragment`, or `default`
/// when the fragment has no `<name` token.
pub fn extract_tag<'a>(fragment: &'a str, default: &'a str) -> &'a str {
    OPENING_TAG_RE
        .captures(fragment)
        .and_then(|caps| caps.get(1))
        .map_or(default, |m| m.as_str())
}

/// Wraps `content` in an opening and closing `tag`.
pub fn wrap(tag: &str, content: &str) -> String {
    format!("<{tag}>{content}</{tag}>")
}
