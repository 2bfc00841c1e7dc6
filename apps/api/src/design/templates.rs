//! Template Catalog: curated style bundles plus a cached remote extension.
//!
//! Remote templates are strictly additive: the curated set alone is enough for
//! every flow, and a remote outage simply means fewer templates to draw from.

use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::design::template_cache::TemplateCache;

/// Visual family of a template. Drives prompt wording only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateStyle {
    Classic,
    Minimal,
    Modern,
    Creative,
}

impl TemplateStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateStyle::Classic => "classic",
            TemplateStyle::Minimal => "minimal",
            TemplateStyle::Modern => "modern",
            TemplateStyle::Creative => "creative",
        }
    }
}

/// A named bundle of style/layout/colour/font metadata that parameterises generation.
///
/// Invariant: `accent_color` is a valid `#RRGGBB`. Curated entries are checked in
/// tests; remote entries are filtered on ingestion by the template cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignTemplate {
    pub name: String,
    pub style: TemplateStyle,
    pub layout: String,
    pub sidebar: String,
    /// CSS gradient for header accents, or `"none"`.
    pub gradient: String,
    pub accent_color: String,
    /// `[heading, body]`.
    pub fonts: [String; 2],
    pub description: String,
}

impl DesignTemplate {
    pub fn heading_font(&self) -> &str {
        &self.fonts[0]
    }

    pub fn body_font(&self) -> &str {
        &self.fonts[1]
    }

    pub fn has_gradient(&self) -> bool {
        !self.gradient.trim().eq_ignore_ascii_case("none") && !self.gradient.trim().is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Curated catalog
// ────────────────────────────────────────────────────────────────────────────

struct CuratedEntry {
    name: &'static str,
    style: TemplateStyle,
    layout: &'static str,
    sidebar: &'static str,
    gradient: &'static str,
    accent: &'static str,
    heading_font: &'static str,
    body_font: &'static str,
    description: &'static str,
}

const CURATED: &[CuratedEntry] = &[
    CuratedEntry {
        name: "Executive Navy",
        style: TemplateStyle::Classic,
        layout: "single-column",
        sidebar: "none",
        gradient: "none",
        accent: "#1e3a5f",
        heading_font: "Georgia",
        body_font: "Garamond",
        description: "Traditional serif layout with a navy rule under each section header.",
    },
    CuratedEntry {
        name: "Oxford",
        style: TemplateStyle::Classic,
        layout: "single-column",
        sidebar: "none",
        gradient: "none",
        accent: "#7c2d12",
        heading_font: "Merriweather",
        body_font: "Source Serif Pro",
        description: "Centered name block, small caps headers and a burgundy accent.",
    },
    CuratedEntry {
        name: "Ledger",
        style: TemplateStyle::Classic,
        layout: "single-column",
        sidebar: "none",
        gradient: "none",
        accent: "#374151",
        heading_font: "Libre Baskerville",
        body_font: "Lato",
        description: "Conservative charcoal palette with thin horizontal dividers.",
    },
    CuratedEntry {
        name: "Paper White",
        style: TemplateStyle::Minimal,
        layout: "single-column",
        sidebar: "none",
        gradient: "none",
        accent: "#111827",
        heading_font: "Inter",
        body_font: "Inter",
        description: "Generous whitespace, no rules, hierarchy from weight alone.",
    },
    CuratedEntry {
        name: "Slate Line",
        style: TemplateStyle::Minimal,
        layout: "single-column",
        sidebar: "none",
        gradient: "none",
        accent: "#475569",
        heading_font: "IBM Plex Sans",
        body_font: "IBM Plex Sans",
        description: "Slate section labels set in the left margin of each block.",
    },
    CuratedEntry {
        name: "Nordic",
        style: TemplateStyle::Minimal,
        layout: "single-column",
        sidebar: "none",
        gradient: "none",
        accent: "#0f766e",
        heading_font: "Work Sans",
        body_font: "Work Sans",
        description: "Muted teal accent on a quiet single column.",
    },
    CuratedEntry {
        name: "Cobalt",
        style: TemplateStyle::Modern,
        layout: "two-column",
        sidebar: "left",
        gradient: "none",
        accent: "#1d4ed8",
        heading_font: "Poppins",
        body_font: "Open Sans",
        description: "Skills and contact in a narrow left column, experience on the right.",
    },
    CuratedEntry {
        name: "Horizon",
        style: TemplateStyle::Modern,
        layout: "single-column",
        sidebar: "none",
        gradient: "linear-gradient(90deg, #1e40af, #3b82f6)",
        accent: "#1e40af",
        heading_font: "Montserrat",
        body_font: "Roboto",
        description: "Full-width gradient name band above a clean single column.",
    },
    CuratedEntry {
        name: "Graphite",
        style: TemplateStyle::Modern,
        layout: "two-column",
        sidebar: "right",
        gradient: "none",
        accent: "#334155",
        heading_font: "Raleway",
        body_font: "Nunito Sans",
        description: "Dark graphite headers with a right-hand summary column.",
    },
    CuratedEntry {
        name: "Ember",
        style: TemplateStyle::Creative,
        layout: "single-column",
        sidebar: "none",
        gradient: "linear-gradient(135deg, #9a3412, #c2410c)",
        accent: "#9a3412",
        heading_font: "Playfair Display",
        body_font: "Source Sans Pro",
        description: "Warm rust accents and a display serif for the name.",
    },
    CuratedEntry {
        name: "Violet Studio",
        style: TemplateStyle::Creative,
        layout: "two-column",
        sidebar: "left",
        gradient: "none",
        accent: "#6d28d9",
        heading_font: "DM Serif Display",
        body_font: "DM Sans",
        description: "Bold violet section markers and a tinted skills sidebar.",
    },
    CuratedEntry {
        name: "Evergreen",
        style: TemplateStyle::Creative,
        layout: "single-column",
        sidebar: "none",
        gradient: "linear-gradient(90deg, #065f46, #047857)",
        accent: "#065f46",
        heading_font: "Josefin Sans",
        body_font: "Karla",
        description: "Deep green header strip with icon-led contact line.",
    },
];

/// The built-in catalog. Always available, independent of any remote source.
pub fn curated_templates() -> Vec<DesignTemplate> {
    CURATED
        .iter()
        .map(|e| DesignTemplate {
            name: e.name.to_string(),
            style: e.style,
            layout: e.layout.to_string(),
            sidebar: e.sidebar.to_string(),
            gradient: e.gradient.to_string(),
            accent_color: e.accent.to_string(),
            fonts: [e.heading_font.to_string(), e.body_font.to_string()],
            description: e.description.to_string(),
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Selection
// ────────────────────────────────────────────────────────────────────────────

/// Picks `k` distinct templates: full Fisher–Yates shuffle, then the first `k`.
///
/// Returns fewer than `k` only when the catalog is smaller than `k`.
pub fn select_random_templates<R: Rng + ?Sized>(
    catalog: &[DesignTemplate],
    k: usize,
    rng: &mut R,
) -> Vec<DesignTemplate> {
    let mut pool: Vec<&DesignTemplate> = catalog.iter().collect();
    for i in (1..pool.len()).rev() {
        let j = rng.gen_range(0..=i);
        pool.swap(i, j);
    }
    pool.into_iter().take(k).cloned().collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Catalog
// ────────────────────────────────────────────────────────────────────────────

/// Curated templates plus whatever the remote source currently offers.
pub struct TemplateCatalog {
    curated: Vec<DesignTemplate>,
    remote: Arc<TemplateCache>,
}

impl TemplateCatalog {
    pub fn new(remote: Arc<TemplateCache>) -> Self {
        Self {
            curated: curated_templates(),
            remote,
        }
    }

    /// Curated templates first, then remote templates whose names do not
    /// collide with a curated one. Never fails.
    pub async fn all_templates(&self) -> Vec<DesignTemplate> {
        let mut names: HashSet<String> = self
            .curated
            .iter()
            .map(|t| t.name.to_lowercase())
            .collect();
        let mut all = self.curated.clone();
        for template in self.remote.get_or_refresh().await {
            if names.insert(template.name.to_lowercase()) {
                all.push(template);
            }
        }
        all
    }

    /// Case-insensitive lookup across the full catalog.
    pub async fn find_template(&self, name: &str) -> Option<DesignTemplate> {
        let wanted = name.trim().to_lowercase();
        self.all_templates()
            .await
            .into_iter()
            .find(|t| t.name.to_lowercase() == wanted)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
