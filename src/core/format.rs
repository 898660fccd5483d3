use std::num::ParseFloatError;

use thiserror::Error;

const INPUT_FRACTION_DIGITS: usize = 3;

#[derive(Debug, Error, PartialEq)]
pub enum ParseAmountError {
    #[error("invalid amount {input:?}: {source}")]
    Invalid {
        input: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("amount {input:?} is not a finite number")]
    NotFinite { input: String },
}

// Accepts what a formatted amount field contains, e.g. "$100,000". Blank reads as zero.
pub fn parse_input_number(text: &str) -> Result<f64, ParseAmountError> {
    let trimmed = text.trim();
    let unsigned = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let cleaned = unsigned.replace(',', "");
    if cleaned.is_empty() {
        return Ok(0.0);
    }

    let value = cleaned
        .parse::<f64>()
        .map_err(|source| ParseAmountError::Invalid {
            input: text.to_string(),
            source,
        })?;
    if !value.is_finite() {
        return Err(ParseAmountError::NotFinite {
            input: text.to_string(),
        });
    }
    Ok(value)
}

pub fn format_input_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.*}", INPUT_FRACTION_DIGITS, value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut out = String::new();
    if value < 0.0 && (whole != "0" || !fraction.is_empty()) {
        out.push('-');
    }
    out.push_str(&group_thousands(whole));
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return format!("${value}");
    }

    let whole = value.abs().round();
    let sign = if value < 0.0 && whole > 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(&format!("{whole:.0}")))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_input_number_strips_grouping_and_dollar_sign() {
        assert_eq!(parse_input_number("100,000"), Ok(100_000.0));
        assert_eq!(parse_input_number(" $1,234.50 "), Ok(1_234.5));
        assert_eq!(parse_input_number("-2,500"), Ok(-2_500.0));
    }

    #[test]
    fn parse_input_number_treats_blank_as_zero() {
        assert_eq!(parse_input_number(""), Ok(0.0));
        assert_eq!(parse_input_number("  "), Ok(0.0));
        assert_eq!(parse_input_number(","), Ok(0.0));
    }

    #[test]
    fn parse_input_number_rejects_garbage() {
        let err = parse_input_number("12k").expect_err("must reject suffix");
        assert!(matches!(err, ParseAmountError::Invalid { .. }));
        assert!(err.to_string().contains("\"12k\""));
    }

    #[test]
    fn parse_input_number_rejects_non_finite() {
        let err = parse_input_number("inf").expect_err("must reject infinity");
        assert_eq!(
            err,
            ParseAmountError::NotFinite {
                input: "inf".to_string()
            }
        );
    }

    #[test]
    fn format_input_number_groups_thousands() {
        assert_eq!(format_input_number(0.0), "0");
        assert_eq!(format_input_number(999.0), "999");
        assert_eq!(format_input_number(1_000.0), "1,000");
        assert_eq!(format_input_number(100_000.0), "100,000");
        assert_eq!(format_input_number(12_345_678.0), "12,345,678");
        assert_eq!(format_input_number(1_234.5), "1,234.5");
        assert_eq!(format_input_number(-50_000.25), "-50,000.25");
    }

    #[test]
    fn format_currency_drops_cents() {
        assert_eq!(format_currency(5_340.0), "$5,340");
        assert_eq!(format_currency(5_340.4), "$5,340");
        assert_eq!(format_currency(999.5), "$1,000");
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(1_234_567.0), "$1,234,567");
        assert_eq!(format_currency(-13_000.0), "-$13,000");
        assert_eq!(format_currency(-0.2), "$0");
    }
}
