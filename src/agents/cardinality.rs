//! Exact-count shaping of stage output.
//!
//! Model replies are free text. [`split_items`] turns a multi-item reply into
//! candidate items one line at a time, and [`fix_cardinality`] truncates or
//! pads a collection to the count a stage guarantees.
//!
//! Splitting is a heuristic: nothing checks that the model produced the
//! requested number of distinct items, only that the output has the right
//! length once fillers are applied.

use std::sync::OnceLock;

use regex::Regex;

static LIST_MARKER: OnceLock<Option<Regex>> = OnceLock::new();

/// Matches leading enumeration such as `1.`, `2)`, `-`, `*`, `•`, `Tweet 3:`.
fn list_marker() -> Option<&'static Regex> {
    LIST_MARKER
        .get_or_init(|| {
            Regex::new(r"(?i)^(?:(?:tweet|post)\s*#?\d+\s*[:.)\-]\s*|\d+\s*[.):]\s+|[-*•]\s+)").ok()
        })
        .as_ref()
}

/// Truncates `items` to `required`, or pads it by calling `filler` with the
/// zero-based index of each missing slot.
///
/// Applying it to a collection that already has `required` items returns it
/// unchanged.
pub fn fix_cardinality<T, F>(mut items: Vec<T>, required: usize, mut filler: F) -> Vec<T>
where
    F: FnMut(usize) -> T,
{
    items.truncate(required);
    while items.len() < required {
        let index = items.len();
        items.push(filler(index));
    }
    items
}

/// Splits a model reply into candidate items, one per non-empty line.
///
/// Enumeration markers and wrapping quotes are stripped. Code fences and
/// introductory lines ending in `:` are skipped.
pub fn split_items(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("```"))
        .filter(|line| !line.ends_with(':'))
        .filter_map(|line| {
            let stripped = match list_marker() {
                Some(re) => re.replace(line, "").into_owned(),
                None => line.to_string(),
            };
            let item = strip_quotes(stripped.trim()).trim().to_string();
            (!item.is_empty()).then_some(item)
        })
        .collect()
}

fn strip_quotes(s: &str) -> &str {
    for (open, close) in [('"', '"'), ('“', '”')] {
        if let Some(inner) = s.strip_prefix(open).and_then(|r| r.strip_suffix(close)) {
            return inner;
        }
    }
    s
}
