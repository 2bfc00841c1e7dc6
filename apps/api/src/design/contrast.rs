//! Contrast Validator: WCAG 2.x relative luminance and contrast ratio.
//!
//! Every function here is pure. Malformed colours never panic or error:
//! parsing returns `None`, and the document-level check records a warning
//! and moves on.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// WCAG AA minimum for normal / large text.
pub const AA_NORMAL: f64 = 4.5;
pub const AA_LARGE: f64 = 3.0;
/// WCAG AAA minimum for normal / large text.
pub const AAA_NORMAL: f64 = 7.0;
pub const AAA_LARGE: f64 = 4.5;

const WHITE: &str = "#ffffff";

/// Any `#` token of 3..=8 hex digits that is not an HTML numeric entity (`&#169;`).
static HEX_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^&\w])#([0-9a-fA-F]{3,8})\b").expect("valid regex"));

// ────────────────────────────────────────────────────────────────────────────
// Result types
// ────────────────────────────────────────────────────────────────────────────

/// One foreground/background pairing and how it scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastCheck {
    pub foreground: String,
    pub background: String,
    pub ratio: f64,
    #[serde(rename = "meetsAA")]
    pub meets_aa: bool,
    #[serde(rename = "meetsAAA")]
    pub meets_aaa: bool,
    pub context: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastSummary {
    pub total_checks: u32,
    #[serde(rename = "passedAA")]
    pub passed_aa: u32,
    #[serde(rename = "passedAAA")]
    pub passed_aaa: u32,
    #[serde(rename = "failedAA")]
    pub failed_aa: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastReport {
    /// True when no check failed AA.
    pub passed: bool,
    pub checks: Vec<ContrastCheck>,
    pub summary: ContrastSummary,
    /// Colours that were found but could not be analysed.
    pub warnings: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Colour primitives
// ────────────────────────────────────────────────────────────────────────────

/// Parses `#RRGGBB` (the `#` is optional). Returns `None` on anything else.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some((r, g, b))
}

/// True for a `#` followed by exactly six hex digits.
pub fn is_six_digit_hex(value: &str) -> bool {
    value.starts_with('#') && hex_to_rgb(value).is_some()
}

/// Normalises `#abc` / `#AABBCC` to lowercase `#aabbcc`. `None` for other lengths.
pub fn canonical_hex(value: &str) -> Option<String> {
    let digits = value.trim().strip_prefix('#')?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match digits.len() {
        6 => Some(format!("#{}", digits.to_ascii_lowercase())),
        3 => Some(
            digits
                .chars()
                .fold(String::from("#"), |mut acc, c| {
                    let c = c.to_ascii_lowercase();
                    acc.push(c);
                    acc.push(c);
                    acc
                }),
        ),
        _ => None,
    }
}

/// WCAG relative luminance of an sRGB colour.
pub fn relative_luminance(r: u8, g: u8, b: u8) -> f64 {
    fn channel(value: u8) -> f64 {
        let s = f64::from(value) / 255.0;
        if s <= 0.03928 {
            s / 12.92
        } else {
            ((s + 0.055) / 1.055).powf(2.4)
        }
    }
    0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b)
}

/// Contrast ratio between two `#RRGGBB` colours, in `[1.0, 21.0]`.
pub fn contrast_ratio(color_a: &str, color_b: &str) -> Option<f64> {
    let (r1, g1, b1) = hex_to_rgb(color_a)?;
    let (r2, g2, b2) = hex_to_rgb(color_b)?;
    let la = relative_luminance(r1, g1, b1);
    let lb = relative_luminance(r2, g2, b2);
    Some((la.max(lb) + 0.05) / (la.min(lb) + 0.05))
}

/// WCAG AA. Malformed input never meets the threshold.
pub fn meets_aa(foreground: &str, background: &str, is_large_text: bool) -> bool {
    let threshold = if is_large_text { AA_LARGE } else { AA_NORMAL };
    contrast_ratio(foreground, background).is_some_and(|ratio| ratio >= threshold)
}

/// WCAG AAA. Malformed input never meets the threshold.
pub fn meets_aaa(foreground: &str, background: &str, is_large_text: bool) -> bool {
    let threshold = if is_large_text { AAA_LARGE } else { AAA_NORMAL };
    contrast_ratio(foreground, background).is_some_and(|ratio| ratio >= threshold)
}

/// Builds a single check; `None` when either colour cannot be parsed.
pub fn check_pair(foreground: &str, background: &str, context: &str) -> Option<ContrastCheck> {
    let ratio = contrast_ratio(foreground, background)?;
    Some(ContrastCheck {
        foreground: foreground.to_string(),
        background: background.to_string(),
        ratio: (ratio * 100.0).round() / 100.0,
        meets_aa: ratio >= AA_NORMAL,
        meets_aaa: ratio >= AAA_NORMAL,
        context: context.to_string(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Document scanning
// ────────────────────────────────────────────────────────────────────────────

/// Every distinct `#` hex token in the document, lowercased, in order of first use.
/// Includes lengths other than 3 and 6 so callers can report them.
pub(crate) fn hex_tokens(html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    HEX_TOKEN
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| format!("#{}", m.as_str().to_ascii_lowercase()))
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

/// Distinct 3- or 6-digit hex colours as written in the document (lowercased).
pub fn extract_hex_colors(html: &str) -> Vec<String> {
    hex_tokens(html)
        .into_iter()
        .filter(|t| matches!(t.len(), 4 | 7))
        .collect()
}

/// Checks every distinct colour in a résumé against the two dominant usages:
/// the colour as text on white, and white text on the colour.
pub fn validate_resume_contrast(html: &str) -> ContrastReport {
    let mut checks = Vec::new();
    let mut warnings = Vec::new();
    let mut analysed = HashSet::new();

    for token in hex_tokens(html) {
        let Some(color) = canonical_hex(&token).filter(|c| hex_to_rgb(c).is_some()) else {
            warn!(color = %token, "Skipping unanalysable colour in contrast check");
            warnings.push(format!("Could not analyse colour {token}"));
            continue;
        };
        if color == WHITE || !analysed.insert(color.clone()) {
            continue;
        }

        let as_text = check_pair(&color, WHITE, "text on white background");
        let as_background = check_pair(WHITE, &color, "white text on colored background");
        match (as_text, as_background) {
            (Some(text), Some(background)) => {
                checks.push(text);
                checks.push(background);
            }
            _ => {
                warn!(color = %color, "Contrast ratio could not be computed");
                warnings.push(format!("Could not analyse colour {token}"));
            }
        }
    }

    let summary = summarize(&checks);
    ContrastReport {
        passed: summary.failed_aa == 0,
        checks,
        summary,
        warnings,
    }
}

fn summarize(checks: &[ContrastCheck]) -> ContrastSummary {
    let passed_aa = checks.iter().filter(|c| c.meets_aa).count() as u32;
    ContrastSummary {
        total_checks: checks.len() as u32,
        passed_aa,
        passed_aaa: checks.iter().filter(|c| c.meets_aaa).count() as u32,
        failed_aa: checks.len() as u32 - passed_aa,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
