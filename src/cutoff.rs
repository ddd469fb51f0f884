use crate::models::Cutoff;
use regex::Regex;
use std::sync::LazyLock;

// "<rank>" then a line break, spaces or an opening parenthesis, then "<percentile>" with an
// optional closing parenthesis.
static CUTOFF_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)(?:\s+\(?|\()\s*(\d+(?:\.\d+)?|\.\d+)\s*\)?\s*$").expect("Invalid regex")
});

/// Parse a raw cutoff cell such as `"1500\n(98.50)"` or `"15312 (86.6844102)"`.
///
/// Returns `None` for empty or malformed cells; callers treat that as "seat code not applicable".
pub fn parse_cutoff(cell: &str) -> Option<Cutoff> {
    let caps = CUTOFF_CELL.captures(cell)?;
    let rank = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let percentile = caps.get(2)?.as_str().parse::<f64>().ok()?;

    if !percentile.is_finite() {
        return None;
    }

    Some(Cutoff { rank, percentile })
}
