//! Candidate generation per strategy.
//!
//! Each function derives selector candidates from the requested target
//! string alone; ordering within each function is part of the resolver
//! contract.

use once_cell::sync::Lazy;
use regex::Regex;

static ATTR_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\[([^=\]]+)=?"?([^"\]]+)"?\]"#).unwrap());
static LEADING_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([a-z]+)").unwrap());

/// Whether the target reads as a selector rather than a human
/// description. Descriptions go through the text strategies instead.
pub fn looks_like_selector(target: &str) -> bool {
    target.contains('#')
        || target.contains('.')
        || target.contains('[')
        || target.contains(':')
        || (!target.contains(' ') && LEADING_TAG.is_match(target))
}

/// Visible-text selector for a descriptive target.
pub fn text_content(target: &str) -> String {
    format!(r#"text="{}""#, target)
}

/// Translate a CSS-ish selector into a structural XPath query.
///
/// Survives attribute renames that keep page shape: ids become
/// `[@id=...]`, a single class becomes a contains() test, a bare tag
/// becomes a tag axis.
pub fn css_to_xpath(selector: &str) -> Option<String> {
    if let Some((tag, id)) = selector.split_once('#') {
        let id = id.split(['.', '[']).next().unwrap_or(id);
        let tag = if tag.is_empty() { "*" } else { tag };
        return Some(format!(r#"//{}[@id="{}"]"#, tag, id));
    }
    if selector.matches('.').count() == 1 && !selector.contains('[') {
        if let Some((tag, class)) = selector.split_once('.') {
            let tag = if tag.is_empty() { "*" } else { tag };
            return Some(format!(r#"//{}[contains(@class, "{}")]"#, tag, class));
        }
    }
    if !selector.contains(['#', '.', '[', ':']) && LEADING_TAG.is_match(selector) {
        return Some(format!("//{}", selector));
    }
    None
}

/// Loosened variants derived from the target's fragments, most
/// specific first.
pub fn fragment_alternatives(selector: &str) -> Vec<String> {
    let mut alternatives = Vec::new();

    if let Some((_, rest)) = selector.split_once('#') {
        let id = rest.split(['.', '[']).next().unwrap_or(rest);
        alternatives.push(format!(r#"[id="{}"]"#, id));
        alternatives.push(format!(r#"[id*="{}"]"#, id));
    }

    if let Some((_, rest)) = selector.split_once('.') {
        let class = rest.split(['[', ':']).next().unwrap_or(rest);
        if !class.is_empty() {
            alternatives.push(format!(r#"[class*="{}"]"#, class));
            alternatives.push(format!(".{}", class));
        }
    }

    if let Some(caps) = ATTR_PAIR.captures(selector) {
        let (name, value) = (caps[1].trim(), caps[2].trim());
        alternatives.push(format!(r#"[{}*="{}"]"#, name, value));
        alternatives.push(format!(r#"*[{}="{}"]"#, name, value));
    }

    if let Some(caps) = LEADING_TAG.captures(selector) {
        alternatives.push(caps[1].to_string());
    }

    alternatives
}

/// Fallback selector tables for well-known semantic roles, matched by
/// keyword containment against the requested target.
pub fn keyword_fallbacks(target: &str) -> Vec<String> {
    let lower = target.to_lowercase();
    let mut fallbacks = Vec::new();

    if lower.contains("search") {
        fallbacks.extend([
            r#"input[type="search"]"#,
            r#"input[name*="search"]"#,
            r#"input[placeholder*="search"]"#,
            r#"[aria-label*="search"]"#,
            r#"input[id*="search"]"#,
        ]);
    }
    if lower.contains("login") || lower.contains("sign in") {
        fallbacks.extend([
            r#"button[type="submit"]"#,
            r#"input[type="submit"]"#,
            r#"button:has-text("login")"#,
            r#"button:has-text("sign in")"#,
            r#"[aria-label*="login"]"#,
        ]);
    }
    if lower.contains("email") {
        fallbacks.extend([
            r#"input[type="email"]"#,
            r#"input[name*="email"]"#,
            r#"input[placeholder*="email"]"#,
            r#"[aria-label*="email"]"#,
        ]);
    }
    if lower.contains("password") {
        fallbacks.extend([
            r#"input[type="password"]"#,
            r#"input[name*="password"]"#,
            r#"[aria-label*="password"]"#,
        ]);
    }

    fallbacks.into_iter().map(String::from).collect()
}
