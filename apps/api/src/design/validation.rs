//! Per-attempt validation: the only enforcement boundary against the generator.
//!
//! Checks are pattern scans over the raw HTML. A disallowed declaration
//! anywhere in the document rejects the attempt, whether or not it sits in a
//! selector we recognise.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::design::contrast::{canonical_hex, extract_hex_colors};
use crate::design::templates::DesignTemplate;
use crate::llm_client::strip_json_fences;

/// Neutral grays, white and black always permitted alongside a template's accent.
pub const TEMPLATE_NEUTRALS: &[&str] = &[
    "#ffffff", "#000000", "#111111", "#1a1a1a", "#222222", "#333333", "#444444", "#555555",
    "#666666", "#777777", "#888888", "#999999", "#aaaaaa", "#bbbbbb", "#cccccc", "#dddddd",
    "#eeeeee", "#f5f5f5", "#fafafa", "#111827", "#1f2937", "#374151", "#4b5563", "#6b7280",
    "#9ca3af", "#d1d5db", "#e5e7eb", "#f3f4f6", "#f9fafb",
];

/// Curated palette for questionnaire designs. Every text colour here is AA on white.
pub const QUESTIONNAIRE_SAFE_PALETTE: &[&str] = &[
    "#ffffff", "#000000", "#1a1a1a", "#333333", "#1f2937", "#374151", "#4b5563", "#1e3a5f",
    "#1e40af", "#065f46", "#7c2d12", "#5b21b6", "#e5e7eb", "#f3f4f6",
];

/// `background` / `background-color` declarations, value up to the end of the declaration.
static BACKGROUND_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bbackground(?:-color)?\s*:\s*([^;}"'<>]*)"#).expect("valid regex")
});

static WHITE_RGBA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^rgba\(255,255,255,[0-9.]+\)$").expect("valid regex"));

/// Why a single attempt was rejected. Every variant is retryable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttemptError {
    #[error("generation client failed: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("forbidden background value '{0}'")]
    StructuralPolicyViolation(String),

    #[error("unauthorized colors: {}", .0.join(", "))]
    ColorPolicyViolation(Vec<String>),
}

/// Which colour/structure rules apply to a candidate.
///
/// The two profiles stay separate: template mode trusts the template's accent,
/// its gradient stops and neutrals; questionnaire mode trusts only a curated
/// safe palette plus the user's accent and additionally enforces white backgrounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationProfile {
    Template {
        accent: String,
        gradient_stops: Vec<String>,
    },
    Questionnaire {
        accent: String,
    },
}

impl ValidationProfile {
    /// The profile a template's own prompt is checked against.
    pub fn for_template(template: &DesignTemplate) -> Self {
        let gradient_stops = if template.has_gradient() {
            extract_hex_colors(&template.gradient)
        } else {
            Vec::new()
        };
        ValidationProfile::Template {
            accent: template.accent_color.clone(),
            gradient_stops,
        }
    }

    pub fn accent(&self) -> &str {
        match self {
            ValidationProfile::Template { accent, .. } | ValidationProfile::Questionnaire { accent } => {
                accent
            }
        }
    }

    pub fn enforces_backgrounds(&self) -> bool {
        matches!(self, ValidationProfile::Questionnaire { .. })
    }

    /// The closed colour list, canonical `#rrggbb`, accent first.
    pub fn allowed_colors(&self) -> Vec<String> {
        let (stops, base): (&[String], &[&str]) = match self {
            ValidationProfile::Template { gradient_stops, .. } => {
                (gradient_stops.as_slice(), TEMPLATE_NEUTRALS)
            }
            ValidationProfile::Questionnaire { .. } => (&[], QUESTIONNAIRE_SAFE_PALETTE),
        };
        let mut seen = HashSet::new();
        std::iter::once(self.accent())
            .chain(stops.iter().map(String::as_str))
            .chain(base.iter().copied())
            .filter_map(canonical_hex)
            .filter(|c| seen.insert(c.clone()))
            .collect()
    }
}

/// Pulls the `html` string out of a raw generator response.
///
/// Tolerates markdown fences and prose around a single JSON object.
pub fn parse_design_response(raw: &str) -> Result<String, AttemptError> {
    let text = strip_json_fences(raw);
    let value = serde_json::from_str::<Value>(text)
        .ok()
        .or_else(|| outer_object(text).and_then(|s| serde_json::from_str::<Value>(s).ok()))
        .ok_or_else(|| AttemptError::MalformedResponse("response is not valid JSON".to_string()))?;

    match value.get("html") {
        Some(Value::String(html)) if !html.trim().is_empty() => Ok(html.clone()),
        Some(Value::String(_)) => Err(AttemptError::MalformedResponse(
            "`html` field is empty".to_string(),
        )),
        Some(_) => Err(AttemptError::MalformedResponse(
            "`html` field is not a string".to_string(),
        )),
        None => Err(AttemptError::MalformedResponse(
            "response has no `html` field".to_string(),
        )),
    }
}

fn outer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Rejects any background that is not white, transparent, inherited, an image or a gradient.
pub fn check_backgrounds(html: &str) -> Result<(), AttemptError> {
    for caps in BACKGROUND_DECL.captures_iter(html) {
        let value = caps.get(1).map_or("", |m| m.as_str());
        if !is_allowed_background(value) {
            return Err(AttemptError::StructuralPolicyViolation(
                value.trim().to_string(),
            ));
        }
    }
    Ok(())
}

fn is_allowed_background(value: &str) -> bool {
    let value = value.to_ascii_lowercase().replace("!important", "");
    let value = value.trim();
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    matches!(
        value,
        "white" | "#fff" | "#ffffff" | "transparent" | "none" | "inherit"
    ) || value.starts_with("url(")
        || value.starts_with("linear-gradient(")
        || WHITE_RGBA.is_match(&compact)
}

/// Rejects any 3- or 6-digit hex colour outside the profile's allow-list.
/// Short forms are compared in their expanded form.
pub fn check_colors(html: &str, profile: &ValidationProfile) -> Result<(), AttemptError> {
    let allowed: HashSet<String> = profile.allowed_colors().into_iter().collect();
    let unauthorized: Vec<String> = extract_hex_colors(html)
        .into_iter()
        .filter(|c| canonical_hex(c).map_or(true, |canon| !allowed.contains(&canon)))
        .collect();
    if unauthorized.is_empty() {
        Ok(())
    } else {
        Err(AttemptError::ColorPolicyViolation(unauthorized))
    }
}
