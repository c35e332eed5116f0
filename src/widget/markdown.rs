//! Markdown-lite rendering for chat bubbles.
//!
//! Rendering is an ordered chain of regex substitutions. The order is part of the
//! contract:
//!
//! 1. `\r\n` and lone `\r` line endings become `\n`,
//! 2. escape `&`, `<`, `>` so source text can never inject markup,
//! 3. `###` headings,
//! 4. inline `**strong**`, `*em*` and `` `code` ``,
//! 5. `--` list items, then wrapping and merging of `<ul>` runs,
//! 6. remaining newlines become `<br>`.
//!
//! The transform is one-way; there is no way back to the source text.
//!
//! # Example
//!
//! ```rust
//! use mind_soothe::widget::markdown;
//!
//! let html = markdown::render("**hi** there\n-- a\n-- b");
//! assert_eq!(html, "<strong>hi</strong> there<br><ul><li>a</li><li>b</li></ul>");
//! ```

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// A single named substitution step.
#[derive(Debug)]
pub struct Rule {
    name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self {
            name,
            // Patterns are compile-time literals covered by the tests below.
            pattern: Regex::new(pattern).unwrap_or_else(|e| panic!("rule {name}: {e}")),
            replacement,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Apply this rule alone to `input`.
    pub fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        self.pattern.replace_all(input, self.replacement)
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new("normalize-newlines", r"\r\n?", "\n"),
        Rule::new("escape-amp", "&", "&amp;"),
        Rule::new("escape-lt", "<", "&lt;"),
        Rule::new("escape-gt", ">", "&gt;"),
        Rule::new("heading", r"(?m)^\s*###\s*(.*)", "<h3>${1}</h3>"),
        Rule::new("strong", r"\*\*(.*?)\*\*", "<strong>${1}</strong>"),
        Rule::new("em", r"\*(.*?)\*", "<em>${1}</em>"),
        Rule::new("code", r"`([^`]+)`", "<code>${1}</code>"),
        Rule::new("list-item", r"(?m)^\s*--\s*(.*)", "<li>${1}</li>"),
        Rule::new("list-wrap", r"(<li>(?s:.)*?</li>)", "<ul>${1}</ul>"),
        Rule::new("list-merge", r"</ul>\n?<ul>", ""),
        Rule::new("line-break", r"\n", "<br>"),
    ]
});

/// The full rule chain, in application order.
pub fn rules() -> &'static [Rule] {
    &RULES
}

/// Look up a rule by name.
pub fn rule(name: &str) -> Option<&'static Rule> {
    RULES.iter().find(|r| r.name == name)
}

/// Render raw chat text into safe HTML.
pub fn render(text: &str) -> String {
    let mut html = text.to_owned();
    for rule in RULES.iter() {
        let replaced = match rule.apply(&html) {
            Cow::Borrowed(_) => None,
            Cow::Owned(next) => Some(next),
        };
        if let Some(next) = replaced {
            html = next;
        }
    }
    html
}
