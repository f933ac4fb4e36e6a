//! Collation used by sort directives.

use std::cmp::Ordering;

use logsniff_core::Collation;

/// Compare two texts under a collation.
pub fn compare_text(a: &str, b: &str, collation: Collation) -> Ordering {
    match collation {
        Collation::Natural => natural_cmp(a, b),
        Collation::Numeric => numeric_prefix(a).total_cmp(&numeric_prefix(b)),
        Collation::Lexicographic => a.cmp(b),
    }
}

/// Natural order: runs of ASCII digits compare by numeric value, everything
/// else compares character by character. Case-sensitive.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a_bytes, b_bytes) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);

    while i < a_bytes.len() && j < b_bytes.len() {
        let (ca, cb) = (a_bytes[i], b_bytes[j]);

        if ca.is_ascii_digit() && cb.is_ascii_digit() {
            let a_end = digit_run_end(a_bytes, i);
            let b_end = digit_run_end(b_bytes, j);
            let ordering = compare_digit_runs(&a[i..a_end], &b[j..b_end]);
            if ordering != Ordering::Equal {
                return ordering;
            }
            i = a_end;
            j = b_end;
            continue;
        }

        match ca.cmp(&cb) {
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
            other => return other,
        }
    }

    (a_bytes.len() - i)
        .cmp(&(b_bytes.len() - j))
        .then_with(|| a.cmp(b))
}

fn digit_run_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(bytes.len(), |offset| start + offset)
}

/// Compare two digit strings by value without parsing (runs can be arbitrarily long).
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Numeric value of the leading number in `text`, or 0 when there is none.
///
/// Accepts optional leading whitespace, a sign, digits and one decimal point:
/// `"42 requests"` → 42, `"-1.5x"` → -1.5, `"n/a"` → 0.
pub fn numeric_prefix(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => end += 1,
            b'.' if !seen_dot => {
                seen_dot = true;
                end += 1;
            }
            _ => break,
        }
    }

    text[..end].parse().unwrap_or(0.0)
}
