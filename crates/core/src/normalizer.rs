//! Content-model normalizer.
//!
//! The indenting writer puts newlines and spaces between every pair of child elements.
//! `name`, `addr` and `effectiveTime` hold parts only (given/family, address lines, low/high),
//! so that whitespace is illegal text there. This pass collapses it after serialization. It only
//! touches whitespace that sits directly between two tags, so elements carrying text are left
//! as they are.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

/// Element kinds whose content model forbids character data.
pub const RESTRICTED_ELEMENTS: [&str; 3] = ["name", "addr", "effectiveTime"];

static RESTRICTED: Lazy<Regex> = Lazy::new(|| {
    let alternation = RESTRICTED_ELEMENTS.join("|");
    // Open tag that is not self-closing, through the first matching close tag.
    Regex::new(&format!(
        r"(?s)<(?P<tag>{alternation})(?:\s[^>]*[^/>])?>.*?</(?P<close>{alternation})>"
    ))
    .expect("restricted element pattern is valid")
});

static BETWEEN_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r">\s+<").expect("whitespace pattern is valid"));

/// Collapse whitespace-only text between tags inside restricted elements.
///
/// Returns the input unchanged (borrowed) when nothing needed collapsing.
pub fn normalize(xml: &str) -> Cow<'_, str> {
    let mut changed = false;
    let output = RESTRICTED.replace_all(xml, |caps: &Captures<'_>| {
        let whole = &caps[0];
        if caps["tag"] != caps["close"] {
            return whole.to_string();
        }
        match BETWEEN_TAGS.replace_all(whole, "><") {
            Cow::Borrowed(unchanged) => unchanged.to_string(),
            Cow::Owned(collapsed) => {
                changed = true;
                collapsed
            }
        }
    });
    if changed {
        Cow::Owned(output.into_owned())
    } else {
        Cow::Borrowed(xml)
    }
}
