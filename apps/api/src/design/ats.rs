//! ATS Compatibility Validator: deterministic heuristic scorer.
//!
//! Starts at 100 and applies fixed deductions. Never fails: any input, however
//! malformed, produces a report with a score in `[0, 100]`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const PASSING_SCORE: u32 = 70;

const MISSING_SECTION_HEADERS: i32 = 20;
const TABLE_LAYOUT: i32 = 25;
const MULTI_COLUMN: i32 = 5;
const IMAGES: i32 = 15;
const ABSOLUTE_POSITIONING: i32 = 10;
const MISSING_LANDMARKS: i32 = 5;
const MISSING_SKILLS: i32 = 15;
const MIXED_DATE_FORMATS: i32 = 5;
const NO_BULLETS: i32 = 5;
const MISSING_CONTACT: i32 = 10;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

/// A standard section name as a word inside a heading (inline markup such as
/// icon spans allowed), or an element whose entire text is the section name.
static SECTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    re(concat!(
        r"(?i)<h[1-6]\b[^>]*>(?:[^<]|</?(?:span|i|b|strong|em|small)\b[^>]*>)*?",
        r"\b(?:experience|skills|education|summary)\b",
        r"|>\s*(?:professional\s+|work\s+|technical\s+|core\s+)?(?:experience|skills|education|summary)\s*:?\s*<",
    ))
});
static TABLE: Lazy<Regex> = Lazy::new(|| re(r"(?i)<table[\s>]"));
static MULTI_COLUMN_LAYOUT: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)display\s*:\s*grid|grid-template-columns|flex-direction\s*:\s*row\b|column-count\s*:\s*[2-9]|columns\s*:\s*[2-9]")
});
static IMAGE_TAG: Lazy<Regex> = Lazy::new(|| re(r"(?i)<(?:img|svg)[\s>/]"));
static ABSOLUTE: Lazy<Regex> = Lazy::new(|| re(r"(?i)position\s*:\s*absolute"));
static HEADER_TAG: Lazy<Regex> = Lazy::new(|| re(r"(?i)<header[\s>]"));
static SECTION_TAG: Lazy<Regex> = Lazy::new(|| re(r"(?i)<section[\s>]"));
static H1_H2_TAG: Lazy<Regex> = Lazy::new(|| re(r"(?i)<h[12][\s>]"));
static SKILL_TOKEN: Lazy<Regex> = Lazy::new(|| re(r"(?i)skill"));
static BULLET: Lazy<Regex> = Lazy::new(|| re(r"(?i)<li[\s>]|•|&bull;|&#8226;"));
static EMAIL: Lazy<Regex> = Lazy::new(|| re(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}"));
static PHONE: Lazy<Regex> =
    Lazy::new(|| re(r"(?:\+\d{1,3}[\s.-]?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}\b"));

/// Date styles that an ATS parser handles differently; mixing them is flagged.
static DATE_FORMATS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        ("MM/YYYY", re(r"\b(?:0?[1-9]|1[0-2])/(?:19|20)\d{2}\b")),
        (
            "Mon YYYY",
            re(r"(?i)\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+(?:19|20)\d{2}\b"),
        ),
        ("YYYY-MM", re(r"\b(?:19|20)\d{2}-(?:0[1-9]|1[0-2])\b")),
    ]
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtsIssue {
    #[serde(rename = "type")]
    pub issue_type: String,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtsReport {
    pub score: u32,
    pub issues: Vec<AtsIssue>,
    pub warnings: Vec<String>,
    pub passed: bool,
}

/// Accumulates deductions; the score is clamped only at the end.
struct Scorer {
    score: i32,
    issues: Vec<AtsIssue>,
    warnings: Vec<String>,
}

impl Scorer {
    fn issue(&mut self, deduction: i32, issue_type: &str, severity: Severity, message: &str) {
        self.score -= deduction;
        self.issues.push(AtsIssue {
            issue_type: issue_type.to_string(),
            message: message.to_string(),
            severity,
        });
    }

    fn warning(&mut self, deduction: i32, message: String) {
        self.score -= deduction;
        self.warnings.push(message);
    }
}

/// Scores how well a résumé document survives automated parsing.
pub fn analyze_ats_compatibility(html: &str) -> AtsReport {
    let mut s = Scorer {
        score: 100,
        issues: Vec::new(),
        warnings: Vec::new(),
    };

    if !SECTION_HEADER.is_match(html) {
        s.issue(
            MISSING_SECTION_HEADERS,
            "missing_section_headers",
            Severity::High,
            "No standard section header (Experience, Skills, Education, Summary) found",
        );
    }

    if TABLE.is_match(html) {
        s.issue(
            TABLE_LAYOUT,
            "table_layout",
            Severity::High,
            "Tables scramble reading order in most ATS parsers",
        );
    }

    if MULTI_COLUMN_LAYOUT.is_match(html) {
        s.warning(
            MULTI_COLUMN,
            "Multi-column layout detected; some ATS parsers read columns out of order".to_string(),
        );
    }

    if IMAGE_TAG.is_match(html) {
        s.issue(
            IMAGES,
            "images",
            Severity::Medium,
            "Images and SVG graphics are invisible to ATS parsers",
        );
    }

    if ABSOLUTE.is_match(html) {
        s.issue(
            ABSOLUTE_POSITIONING,
            "absolute_positioning",
            Severity::Medium,
            "Absolutely positioned content may be extracted out of order",
        );
    }

    let has_landmarks = HEADER_TAG.is_match(html)
        && SECTION_TAG.is_match(html)
        && H1_H2_TAG.is_match(html);
    if !has_landmarks {
        s.issue(
            MISSING_LANDMARKS,
            "semantic_structure",
            Severity::Low,
            "Missing semantic landmarks (<header>, <section>, <h1>/<h2>)",
        );
    }

    if !SKILL_TOKEN.is_match(html) {
        s.issue(
            MISSING_SKILLS,
            "missing_skills",
            Severity::High,
            "No skills section or skill keywords found",
        );
    }

    let formats: Vec<&str> = DATE_FORMATS
        .iter()
        .filter(|(_, pattern)| pattern.is_match(html))
        .map(|(name, _)| *name)
        .collect();
    if formats.len() >= 2 {
        s.warning(
            MIXED_DATE_FORMATS,
            format!("Inconsistent date formats: {}", formats.join(", ")),
        );
    }

    if !BULLET.is_match(html) {
        s.warning(
            NO_BULLETS,
            "No bullet points found; achievements are easier to parse as list items".to_string(),
        );
    }

    if !EMAIL.is_match(html) && !PHONE.is_match(html) {
        s.issue(
            MISSING_CONTACT,
            "missing_contact",
            Severity::Medium,
            "No email address or phone number found",
        );
    }

    let score = s.score.clamp(0, 100) as u32;
    AtsReport {
        score,
        issues: s.issues,
        warnings: s.warnings,
        passed: score >= PASSING_SCORE,
    }
}
