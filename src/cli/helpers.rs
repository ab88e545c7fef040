//! Shared helper functions for CLI commands

use chrono::NaiveDate;

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Parse a `YYYY-MM-DD` command-line date
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}' (expected YYYY-MM-DD)", s))
}

/// Parse a `PART_ID:QTY` order line; a bare id means one unit
pub fn parse_part_line(s: &str) -> Result<(i64, i64), String> {
    let (id, qty) = match s.split_once(':') {
        Some((id, qty)) => (id, qty),
        None => (s, "1"),
    };
    let id = id
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("invalid part id in '{}'", s))?;
    let qty = qty
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    Ok((id, qty))
}

/// Today's date in local time
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("Иванов Пётр", 8), "Ивано...");
        assert_eq!(truncate_str("Иванов Пётр", 9), "Иванов...");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-06-02"),
            Ok(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap())
        );
        assert!(parse_date("02.06.2024").is_err());
    }

    #[test]
    fn test_parse_part_line() {
        assert_eq!(parse_part_line("3:2"), Ok((3, 2)));
        assert_eq!(parse_part_line("7"), Ok((7, 1)));
        assert!(parse_part_line("x:2").is_err());
        assert!(parse_part_line("3:two").is_err());
    }
}
