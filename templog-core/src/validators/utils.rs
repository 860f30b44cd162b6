//! Shared matching helpers
//!
//! ## Prefix Matching
//!
//! Field rules match from the start of the value but don't require the
//! pattern to consume all of it:
//!
//! ```text
//! pattern  "^dev-[0-9]+"   value "dev-42"      -> match
//! pattern  "^dev-[0-9]+"   value "dev-42-attic" -> match (tail ignored)
//! pattern  "dev"           value "my-dev"      -> no match (not at start)
//! ```
//!
//! A pattern that must cover the whole value has to say so with `$`.
//! `$` is the end of the value: it does not also match before a trailing
//! newline, so `"device-42\n"` fails `^device-[0-9]+$`.
//!
//! `regex::Regex::is_match` searches anywhere in the haystack, so patterns are
//! compiled wrapped in a start anchor. The wrapping group keeps alternations
//! in the pattern (`a|b`) under the anchor.

use regex::Regex;

/// Compile `pattern` so that it only matches at the start of a value
pub fn compile_prefix(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})"))
}

/// Whether a start-anchored regex matches a leading part of `value`
pub fn prefix_match(anchored: &Regex, value: &str) -> bool {
    anchored.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_characters_do_not_fail() {
        let re = compile_prefix("dev-[0-9]+").unwrap();
        assert!(prefix_match(&re, "dev-42"));
        assert!(prefix_match(&re, "dev-42-attic"));
    }

    #[test]
    fn match_must_start_at_beginning() {
        let re = compile_prefix("dev").unwrap();
        assert!(!prefix_match(&re, "my-dev"));
    }

    #[test]
    fn alternation_stays_anchored() {
        let re = compile_prefix("a|b").unwrap();
        assert!(prefix_match(&re, "b-side"));
        assert!(!prefix_match(&re, "xb"));
    }

    #[test]
    fn explicit_end_anchor_is_honoured() {
        let re = compile_prefix("^device-[0-9]+$").unwrap();
        assert!(prefix_match(&re, "device-42"));
        assert!(!prefix_match(&re, "device-42x"));
    }

    #[test]
    fn end_anchor_rejects_trailing_newline() {
        let re = compile_prefix("^device-[0-9]+$").unwrap();
        assert!(!prefix_match(&re, "device-42\n"));
        assert!(!prefix_match(&re, "device-42\r\n"));
    }

    #[test]
    fn bad_pattern_is_an_error() {
        assert!(compile_prefix("[unclosed").is_err());
    }
}
