//! Tag text to directory/file name conversion.
//!
//! `normalize("The Beatles", false)` gives `the-beatles`. The result only
//! ever contains ASCII letters, digits and `-`, `+`, `=`, so it can be used
//! as a path component without further escaping.

use crate::error::{OrganizeError, Result};
use regex::Regex;
use std::sync::LazyLock;

// Characters that are dropped but still separate words: "a/b" -> "a-b".
static RE_PAD_FOLLOWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([()\[\],.\\?#/!$:;])([^ ])").unwrap());
// Padding characters plus the quotes, which are dropped without a separator.
static RE_DROPPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[()\[\],.\\?#/!$:;'"]"#).unwrap());
static RE_BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ *_]+").unwrap());
static RE_DASH_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());
static RE_INVALID_LOWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9a-z\-+=]").unwrap());
static RE_INVALID_MIXED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9a-zA-Z\-+=]").unwrap());

/// Convert raw tag text into a canonical slug.
///
/// With `capitalize` every word starts with an uppercase letter
/// (`Let-It-Be`), otherwise the slug is all lowercase. Title casing is
/// applied to the finished slug, so words joined by dropped quotes
/// (`Pepper's` -> `Peppers`) are cased as one word and feeding a slug back
/// in returns it unchanged.
pub fn normalize(raw: &str, capitalize: bool) -> Result<String> {
    let folded = if capitalize {
        raw.replace('&', "and")
    } else {
        raw.to_lowercase().replace('&', "and")
    };

    let padded = RE_PAD_FOLLOWER.replace_all(&folded, "${1} ${2}");
    let stripped = RE_DROPPED.replace_all(&padded, "");
    let dashed = RE_BLANK_RUN.replace_all(&stripped, "-");
    let collapsed = RE_DASH_RUN.replace_all(&dashed, "-");
    let trimmed = collapsed.trim_matches('-');
    let slug = if capitalize {
        title_case(trimmed)
    } else {
        trimmed.to_string()
    };

    let invalid = if capitalize {
        &RE_INVALID_MIXED
    } else {
        &RE_INVALID_LOWER
    };
    if slug.is_empty() || invalid.is_match(&slug) {
        return Err(OrganizeError::InvalidCharacter { slug });
    }

    Ok(slug)
}

/// Uppercase letters that do not follow another letter, lowercase the rest.
///
/// Runs on the finished slug, so the `and` produced from `&` is capitalized
/// like any other word (`Rock-And-Roll`). Title-casing before the `&`
/// replacement would give `Rock-and-Roll`, which the next call would turn
/// into `Rock-And-Roll`.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut after_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if after_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(c);
            after_letter = false;
        }
    }
    out
}
