//! Rule-based fallback planning.
//!
//! Used when the planning oracle fails. Covers the two command shapes
//! worth special-casing (Google search, direct navigation) and falls
//! back to a short wait otherwise, so every command yields a plan.

use webpilot_core_types::{Action, Plan, Step};

const URL_TLDS: &[&str] = &[".com", ".org", ".net", ".io", ".ai"];
const SEARCH_STOPWORDS: &[&str] = &["search", "google", "for", "on"];

/// Build a plan from the command text alone.
pub fn fallback_plan(command: &str) -> Plan {
    let lower = command.to_lowercase();

    if lower.contains("search") && lower.contains("google") {
        let query = extract_query(&lower);
        return Plan::new(
            format!("Search Google for: {}", query),
            vec![
                Step::new(Action::Navigate)
                    .with_value("https://google.com")
                    .with_description("Navigate to Google")
                    .with_verification("Google search page loaded"),
                Step::new(Action::Type)
                    .with_target("textarea[name='q']")
                    .with_value(&query)
                    .with_description(format!("Type search query: {}", query))
                    .with_verification("Query entered in search box"),
                Step::new(Action::Click)
                    .with_target("input[name='btnK']")
                    .with_description("Click search button")
                    .with_verification("Search results displayed"),
            ],
        );
    }

    if lower.contains("go to") || lower.contains("open") || lower.contains("visit") {
        let url = extract_url(command);
        return Plan::new(
            format!("Navigate to {}", url),
            vec![Step::new(Action::Navigate)
                .with_value(&url)
                .with_description(format!("Navigate to {}", url))
                .with_verification("Page loaded successfully")],
        );
    }

    Plan::new(
        "Execute command",
        vec![Step::new(Action::Wait)
            .with_value("1")
            .with_description("Processing command")
            .with_verification("Command received")],
    )
}

/// Search query left after dropping the command scaffolding words.
fn extract_query(lower_command: &str) -> String {
    lower_command
        .split_whitespace()
        .filter(|word| !SEARCH_STOPWORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// First token that looks like a hostname, defaulting to Google.
fn extract_url(command: &str) -> String {
    for word in command.split_whitespace() {
        if word.contains('.') && URL_TLDS.iter().any(|tld| word.contains(tld)) {
            if word.starts_with("http") {
                return word.to_string();
            }
            return format!("https://{}", word);
        }
    }
    "https://google.com".to_string()
}
