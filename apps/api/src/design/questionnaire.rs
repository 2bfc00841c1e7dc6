//! Custom design questionnaire: the user-driven alternative to a catalog template.

use serde::{Deserialize, Serialize};

use crate::design::contrast::{canonical_hex, is_six_digit_hex};
use crate::design::templates::{DesignTemplate, TemplateStyle};
use crate::errors::AppError;

const DEFAULT_HEADING_FONT: &str = "Inter";
const DEFAULT_BODY_FONT: &str = "Inter";
const MAX_NOTES_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionnaireLayout {
    SingleColumn,
    TwoColumn,
    SidebarLeft,
    SidebarRight,
}

impl QuestionnaireLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionnaireLayout::SingleColumn => "single-column",
            QuestionnaireLayout::TwoColumn => "two-column",
            QuestionnaireLayout::SidebarLeft => "sidebar-left",
            QuestionnaireLayout::SidebarRight => "sidebar-right",
        }
    }

    fn sidebar(&self) -> &'static str {
        match self {
            QuestionnaireLayout::SidebarLeft => "left",
            QuestionnaireLayout::SidebarRight => "right",
            _ => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Compact,
    #[default]
    Balanced,
    Spacious,
}

impl Density {
    pub fn as_str(&self) -> &'static str {
        match self {
            Density::Compact => "compact",
            Density::Balanced => "balanced",
            Density::Spacious => "spacious",
        }
    }
}

/// What the user told us about the résumé they want.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignQuestionnaire {
    pub style: TemplateStyle,
    pub layout: QuestionnaireLayout,
    pub accent_color: String,
    #[serde(default)]
    pub heading_font: Option<String>,
    #[serde(default)]
    pub body_font: Option<String>,
    #[serde(default)]
    pub density: Density,
    #[serde(default)]
    pub include_icons: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl DesignQuestionnaire {
    /// Rejects input that would break the accent-colour invariant downstream.
    pub fn validate(&self) -> Result<(), AppError> {
        if !is_six_digit_hex(self.accent_color.trim()) {
            return Err(AppError::Validation(format!(
                "accentColor must be a 6-digit hex colour like #1e40af, got '{}'",
                self.accent_color
            )));
        }
        if self
            .notes
            .as_deref()
            .is_some_and(|n| n.chars().count() > MAX_NOTES_CHARS)
        {
            return Err(AppError::Validation(format!(
                "notes must be at most {MAX_NOTES_CHARS} characters"
            )));
        }
        Ok(())
    }

    /// The accent colour in canonical lowercase form.
    pub fn accent(&self) -> String {
        canonical_hex(self.accent_color.trim()).unwrap_or_else(|| self.accent_color.clone())
    }

    pub fn heading_font(&self) -> &str {
        non_blank(self.heading_font.as_deref()).unwrap_or(DEFAULT_HEADING_FONT)
    }

    pub fn body_font(&self) -> &str {
        non_blank(self.body_font.as_deref()).unwrap_or(DEFAULT_BODY_FONT)
    }

    /// Synthesises the template a questionnaire candidate is tracked under,
    /// so previews from both modes share one shape.
    pub fn as_template(&self, variation_label: &str) -> DesignTemplate {
        DesignTemplate {
            name: format!("Custom ({variation_label})"),
            style: self.style,
            layout: self.layout.as_str().to_string(),
            sidebar: self.layout.sidebar().to_string(),
            gradient: "none".to_string(),
            accent_color: self.accent(),
            fonts: [self.heading_font().to_string(), self.body_font().to_string()],
            description: format!(
                "{} {} layout, {} density",
                self.style.as_str(),
                self.layout.as_str(),
                self.density.as_str()
            ),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
