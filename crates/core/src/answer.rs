//! Answer normalisation and parsing for the numeric games.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AnswerError;

static HEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?)(?:0x)?0*([0-9a-f]+)$").expect("invalid hex answer regex"));

/// Canonical form of a hexadecimal answer.
///
/// Lowercases, drops an optional `0x` prefix and leading zeros, keeps a
/// leading `-`, and collapses every spelling of zero to `"0"`. Text that is
/// not a hex number is returned lowercased and otherwise untouched.
pub fn normalize_hex(answer: &str) -> String {
    let lowered = answer.trim().to_lowercase();
    let Some(caps) = HEX_RE.captures(&lowered) else {
        return lowered;
    };
    let digits = &caps[2];
    if digits == "0" {
        return "0".to_string();
    }
    format!("{}{digits}", &caps[1])
}

/// Signed lowercase hex rendering without prefix, e.g. `-1f`.
pub fn format_signed_hex(value: i64) -> String {
    if value < 0 {
        format!("-{:x}", value.unsigned_abs())
    } else {
        format!("{value:x}")
    }
}

/// Whether `answer` spells the same signed integer as `expected`.
pub fn hex_matches(answer: &str, expected: i64) -> bool {
    normalize_hex(answer) == format_signed_hex(expected)
}

/// Left-pad the binary form of `value` to whole nibbles and group by four.
pub fn grouped_binary(value: u64) -> String {
    let bits = format!("{value:b}");
    let width = bits.len().div_ceil(4) * 4;
    let padded = format!("{bits:0>width$}");
    padded
        .as_bytes()
        .chunks(4)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a decimal answer, allowing surrounding whitespace and a sign.
pub fn parse_decimal(answer: &str) -> Result<i64, AnswerError> {
    answer
        .trim()
        .parse::<i64>()
        .map_err(|_| AnswerError::Malformed {
            text: answer.to_string(),
            radix: 10,
        })
}

/// Parse a hexadecimal answer with optional sign and `0x` prefix.
pub fn parse_hex(answer: &str) -> Result<i64, AnswerError> {
    let malformed = || AnswerError::Malformed {
        text: answer.to_string(),
        radix: 16,
    };
    let trimmed = answer.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits = body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
        .unwrap_or(body);
    if digits.is_empty() || digits.starts_with(|ch: char| ch == '+' || ch == '-') {
        return Err(malformed());
    }
    let magnitude = i64::from_str_radix(digits, 16).map_err(|_| malformed())?;
    Ok(if negative { -magnitude } else { magnitude })
}
