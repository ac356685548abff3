//! Markup stripping for feed titles and summaries.

use regex::Regex;
use std::sync::LazyLock;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex"));

/// Remove every `<...>` tag. Entities and whitespace are left untouched.
pub fn strip_tags(input: &str) -> String {
    TAG_PATTERN.replace_all(input, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_inline_tags() {
        assert_eq!(strip_tags("<b>Hi</b> there"), "Hi there");
    }

    #[test]
    fn test_keeps_entities_and_whitespace() {
        assert_eq!(
            strip_tags("Acme&nbsp;<i>buys</i>   Beta &amp; Co"),
            "Acme&nbsp;buys   Beta &amp; Co"
        );
    }

    #[test]
    fn test_tags_with_attributes_and_newlines() {
        assert_eq!(
            strip_tags("<a href=\"https://x.test\"\n  class=\"l\">link</a>"),
            "link"
        );
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "",
            "plain text",
            "<b>Hi</b> there",
            "a <<b>> c",
            "x < y and y > z",
            "unclosed <tag",
            "<p>one</p><p>two</p>",
        ];
        for input in inputs {
            let once = strip_tags(input);
            assert_eq!(strip_tags(&once), once, "input: {:?}", input);
        }
    }
}
