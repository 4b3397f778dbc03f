//! Short plain-text descriptions for list rows.

use regex::Regex;
use std::sync::LazyLock;

use crate::kicks::Product;

pub const MAX_BLURB: usize = 160;

/// Cut at a word boundary only when the boundary keeps at least this many chars.
const MIN_WORD_CUT: usize = 60;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Remove tags, decode entities and collapse whitespace.
pub fn strip_html(html: &str) -> String {
    let without_tags = TAG.replace_all(html, " ");
    let decoded = htmlize::unescape(without_tags.as_ref());
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Shorten `s` to at most `max` chars plus an ellipsis.
pub fn ellipsize(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_owned();
    }
    let cut: String = s.chars().take(max).collect();
    let head = match cut.rfind(' ') {
        Some(end) if cut[..end].chars().count() > MIN_WORD_CUT => &cut[..end],
        _ => cut.as_str(),
    };
    format!("{}…", head.trim())
}

pub fn blurb_for(product: &Product) -> String {
    let source = product
        .description
        .as_deref()
        .or(product.short_description.as_deref())
        .unwrap_or_default();
    ellipsize(&strip_html(source), MAX_BLURB)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_and_entities_are_flattened() {
        assert_eq!(
            strip_html("<p>Legend&nbsp;Blue<br>returns &amp; more</p>"),
            "Legend Blue returns & more"
        );
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(ellipsize("Air Jordan 11", MAX_BLURB), "Air Jordan 11");
    }

    #[test]
    fn long_text_is_cut_at_a_word_boundary() {
        let text = "word ".repeat(50);
        let out = ellipsize(text.trim(), MAX_BLURB);
        assert!(out.ends_with("word…"), "{out}");
        assert!(out.chars().count() <= MAX_BLURB + 1);
    }

    #[test]
    fn early_boundary_falls_back_to_a_hard_cut() {
        let text = format!("short {}", "x".repeat(300));
        let out = ellipsize(&text, MAX_BLURB);
        assert_eq!(out.chars().count(), MAX_BLURB + 1);
    }

    #[test]
    fn description_wins_over_short_description() {
        let product = Product {
            description: Some("<b>Long</b> form".into()),
            short_description: Some("Short".into()),
            ..Default::default()
        };
        assert_eq!(blurb_for(&product), "Long form");
        assert_eq!(blurb_for(&Product::default()), "");
    }
}
