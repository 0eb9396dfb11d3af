//! Formatting aggregated feeds into a summarization prompt.

use std::fmt::Write;

use crate::feeds::FeedDigest;

/// Instruction sentence prepended to every digest prompt.
pub const SUMMARY_INSTRUCTION: &str = "Please write a concise summary of the \
following RSS news items: extract the key information, group related stories \
by theme, and highlight major events and industry trends.\n\n";

/// Delimiter emitted after each feed block.
const FEED_DELIMITER: &str = "---\n\n";

/// Render an ordered sequence of feed digests into a single prompt string.
///
/// Pure function: feed order is preserved, items are numbered from 1, and
/// optional fields are emitted only when present.
#[must_use]
pub fn format_digest_prompt(feeds: &[FeedDigest]) -> String {
    let mut out = String::from(SUMMARY_INSTRUCTION);

    for feed in feeds {
        let _ = writeln!(out, "Source: {}", feed.title);
        for (index, item) in feed.items.iter().enumerate() {
            let _ = writeln!(out, "{}. Title: {}", index + 1, item.title);
            if let Some(snippet) = &item.content_snippet {
                let _ = writeln!(out, "   Content: {snippet}");
            }
            if let Some(date) = &item.pub_date {
                let _ = writeln!(out, "   Published: {date}");
            }
            out.push('\n');
        }
        out.push_str(FEED_DELIMITER);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::DigestItem;

    fn digest(title: &str, items: Vec<DigestItem>) -> FeedDigest {
        FeedDigest {
            title: title.to_string(),
            description: String::new(),
            link: String::new(),
            items,
        }
    }

    fn item(title: &str, snippet: Option<&str>, date: Option<&str>) -> DigestItem {
        DigestItem {
            title: title.to_string(),
            link: String::new(),
            pub_date: date.map(ToString::to_string),
            author: None,
            content_snippet: snippet.map(ToString::to_string),
        }
    }

    #[test]
    fn two_feeds_are_titled_delimited_and_prefixed() {
        let feeds = vec![
            digest("Feed A", vec![item("A1", Some("alpha"), None)]),
            digest("Feed B", vec![item("B1", None, Some("Mon, 24 Feb 2025 08:00:00 GMT"))]),
        ];
        let prompt = format_digest_prompt(&feeds);

        assert!(prompt.starts_with(SUMMARY_INSTRUCTION));
        assert!(prompt.contains("Source: Feed A"));
        assert!(prompt.contains("Source: Feed B"));
        assert!(prompt.contains("---"));
        assert!(prompt.find("Feed A").unwrap() < prompt.find("Feed B").unwrap());
    }

    #[test]
    fn optional_fields_are_omitted_when_absent() {
        let feeds = vec![digest("Feed A", vec![item("A1", None, None)])];
        let prompt = format_digest_prompt(&feeds);

        assert!(prompt.contains("1. Title: A1"));
        assert!(!prompt.contains("Content:"));
        assert!(!prompt.contains("Published:"));
    }

    #[test]
    fn items_are_numbered_from_one() {
        let feeds = vec![digest(
            "Feed A",
            vec![item("first", None, None), item("second", None, None)],
        )];
        let prompt = format_digest_prompt(&feeds);

        assert!(prompt.contains("1. Title: first"));
        assert!(prompt.contains("2. Title: second"));
    }

    #[test]
    fn empty_input_yields_just_the_instruction() {
        assert_eq!(format_digest_prompt(&[]), SUMMARY_INSTRUCTION);
    }
}
