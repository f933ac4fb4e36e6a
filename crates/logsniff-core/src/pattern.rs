//! Pattern compilation.
//!
//! Patterns may be written bare (`ERROR \d+`) or in delimited form
//! (`/error: (\w+)/i`). Delimited patterns have their delimiters stripped and
//! trailing flags converted to inline flags.

use compact_str::CompactString;
use regex::Regex;

use crate::config::OneOrMany;
use crate::error::SniffError;

/// Characters accepted as pattern delimiters.
const DELIMITERS: &[char] = &['/', '#', '~', '!', '@', '%', '|', '+', ';', ','];

/// Trailing modifiers understood in delimited form. `u` is accepted and dropped
/// since patterns are always Unicode-aware.
const MODIFIERS: &[char] = &['i', 'm', 's', 'x', 'U', 'u'];

/// Compile a single pattern.
pub fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    match split_delimited(pattern) {
        Some((body, flags)) => {
            let flags: String = flags.chars().filter(|c| *c != 'u').collect();
            if flags.is_empty() {
                Regex::new(&body)
            } else {
                Regex::new(&format!("(?{flags}){body}"))
            }
        }
        None => Regex::new(pattern),
    }
}

/// Compile every pattern of a metric option, attributing failures to the metric.
pub fn compile_all(metric: &str, patterns: &OneOrMany<String>) -> Result<Vec<Regex>, SniffError> {
    patterns
        .iter()
        .map(|pattern| {
            compile(pattern).map_err(|source| SniffError::InvalidPattern {
                metric: CompactString::from(metric),
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// Split `/body/flags` into an unescaped body and its flags.
fn split_delimited(pattern: &str) -> Option<(String, &str)> {
    let delimiter = pattern.chars().next().filter(|c| DELIMITERS.contains(c))?;
    let close = pattern.rfind(delimiter).filter(|&i| i > 0)?;
    let flags = &pattern[close + delimiter.len_utf8()..];
    if !flags.chars().all(|c| MODIFIERS.contains(&c)) {
        return None;
    }

    let inner = &pattern[delimiter.len_utf8()..close];
    let mut body = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) if next == delimiter => body.push(next),
                Some(next) => {
                    body.push(c);
                    body.push(next);
                }
                None => body.push(c),
            }
        } else {
            body.push(c);
        }
    }

    Some((body, flags))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_pattern() {
        let re = compile(r"ERROR \d+").unwrap();
        assert!(re.is_match("ERROR 42"));
    }

    #[test]
    fn test_delimited_pattern_with_flags() {
        let re = compile("/error: (\\w+)/i").unwrap();
        assert!(re.is_match("ERROR: disk"));
        assert_eq!(&re.captures("Error: disk").unwrap()[1], "disk");
    }

    #[test]
    fn test_escaped_delimiter_is_unescaped() {
        let re = compile(r"/GET \/api\/v\d+/").unwrap();
        assert!(re.is_match("GET /api/v2/users"));
    }

    #[test]
    fn test_path_like_pattern_is_not_delimited() {
        // "users" is not a valid flag set, so the pattern is taken literally.
        let re = compile("/api/users").unwrap();
        assert!(re.is_match("GET /api/users"));
        assert!(!re.is_match("GET api"));
    }

    #[test]
    fn test_unicode_flag_is_dropped() {
        let re = compile("#caf\u{e9}#u").unwrap();
        assert!(re.is_match("un caf\u{e9}"));
    }

    #[test]
    fn test_compile_all_reports_metric() {
        let patterns = OneOrMany::from(vec!["ok", "(unclosed"]);
        let err = compile_all("broken", &patterns).unwrap_err();
        assert!(matches!(err, SniffError::InvalidPattern { ref metric, .. } if metric == "broken"));
    }
}
