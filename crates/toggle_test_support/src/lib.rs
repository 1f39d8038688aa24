//! Shared helpers for fixture-driven tests: readable line diffs and TOML
//! scenario loading.

pub mod scenario;

pub use scenario::{Scenario, Step, load_scenario, load_scenarios};

/// Escape control characters so a mismatch shows exactly what differs.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch < ' ' => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\u{{{:02X}}}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Describe the first mismatching line with two lines of context either side.
/// Returns an empty string when both sides are equal.
pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    use std::fmt::Write;

    if expected == actual {
        return String::new();
    }
    fn at(lines: &[String], i: usize) -> &str {
        lines.get(i).map(String::as_str).unwrap_or("<missing>")
    }

    let max = expected.len().max(actual.len());
    let mismatch = (0..max).find(|&i| at(expected, i) != at(actual, i));

    let mut out = String::new();
    if let Some(i) = mismatch {
        let start = i.saturating_sub(2);
        let end = (i + 3).min(max);
        let _ = writeln!(
            &mut out,
            "first mismatch at line {} (showing {}..={}):",
            i + 1,
            start + 1,
            end
        );
        for line in start..end {
            let marker = if line == i { ">" } else { " " };
            let _ = writeln!(
                &mut out,
                "{marker} {:>4}  expected: {}",
                line + 1,
                escape_text(at(expected, line))
            );
            let _ = writeln!(
                &mut out,
                "{marker} {:>4}    actual: {}",
                line + 1,
                escape_text(at(actual, line))
            );
        }
    }
    let _ = writeln!(
        &mut out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    out
}

/// Panic with a line diff when the two sides differ.
#[track_caller]
pub fn assert_lines_eq(context: &str, expected: &[String], actual: &[String]) {
    let diff = diff_lines(expected, actual);
    if !diff.is_empty() {
        panic!("{context}\n{diff}");
    }
}
