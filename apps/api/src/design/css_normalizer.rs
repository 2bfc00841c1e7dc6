//! CSS Normalizer: deterministic rewrite of an accepted design's presentation layer.
//!
//! Whatever stylesheet the generator produced is discarded and replaced by one
//! canonical sheet. Only the accent colour and the first font family survive.
//!
//! Steps, in order:
//! 1. capture `@import` and the first `font-family`
//! 2. strip inline `style` on `<body>`
//! 3. replace every `<style>` block with the canonical sheet (inject into `<head>`)
//! 4. remove every `<img>` tag and bare image URL

use once_cell::sync::Lazy;
use regex::Regex;

use crate::design::contrast::canonical_hex;

pub const BODY_PADDING: &str = "0.5in 0.6in";
pub const PAGE_SIZE: &str = "8.5in 11in";
const DEFAULT_FONT_FAMILY: &str = "'Helvetica Neue', Arial, sans-serif";
const FALLBACK_ACCENT: &str = "#1f2937";

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

static FONT_IMPORT: Lazy<Regex> =
    Lazy::new(|| re(r#"(?i)@import\s+(?:url\(\s*["']?[^"')\s<]+["']?\s*\)|["'][^"'<]+["'])[^;<]*;?"#));
static FONT_FAMILY: Lazy<Regex> = Lazy::new(|| re(r"(?i)font-family\s*:\s*([^;}<>]+)"));
static BODY_STYLE_ATTR: Lazy<Regex> =
    Lazy::new(|| re(r#"(?is)(<body\b[^>]*?)\s+style\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#));
static STYLE_BLOCK: Lazy<Regex> = Lazy::new(|| re(r"(?is)<style\b[^>]*>.*?</style\s*>\s*"));
static HEAD_CLOSE: Lazy<Regex> = Lazy::new(|| re(r"(?i)</head\s*>"));
static HEAD_OPEN: Lazy<Regex> = Lazy::new(|| re(r"(?i)<head\b[^>]*>"));
static HTML_OPEN: Lazy<Regex> = Lazy::new(|| re(r"(?i)<html\b[^>]*>"));
static IMG_TAG: Lazy<Regex> = Lazy::new(|| re(r"(?is)<img\b[^>]*>"));
static IMAGE_URL: Lazy<Regex> = Lazy::new(|| {
    re(r#"(?i)(?:https?:)?(?://)?[^\s"'()<>=,]*\.(?:jpe?g|png|gif|svg|webp)\b(?:\?[^\s"'()<>]*)?"#)
});

/// Font information carried over from the generator's stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFonts {
    pub import: Option<String>,
    pub family: String,
}

/// Step 1.
pub fn capture_fonts(html: &str) -> CapturedFonts {
    let import = FONT_IMPORT.find(html).map(|m| {
        let text = m.as_str().trim();
        if text.ends_with(';') {
            text.to_string()
        } else {
            format!("{text};")
        }
    });
    let family = FONT_FAMILY
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().trim_end_matches("!important").trim().to_string())
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string());
    CapturedFonts { import, family }
}

/// The canonical stylesheet. Geometry is fixed; only accent and font vary.
pub fn canonical_stylesheet(accent: &str, fonts: &CapturedFonts) -> String {
    let import = fonts
        .import
        .as_deref()
        .map(|i| format!("{i}\n"))
        .unwrap_or_default();
    format!(
        r#"{import}@page {{ size: {PAGE_SIZE}; margin: {BODY_PADDING}; }}
* {{ box-sizing: border-box; }}
html, body {{ margin: 0; background: #ffffff; }}
body {{ padding: {BODY_PADDING}; font-family: {family}; font-size: 11px; line-height: 1.4; color: #1a1a1a; }}
body > *, main, .container, .wrapper, .resume, .page {{ width: 100%; max-width: none; margin-left: 0; margin-right: 0; }}
h1 {{ font-size: 28px; line-height: 1.2; margin: 0 0 4px 0; color: {accent}; }}
h2 {{ font-size: 14px; line-height: 1.3; margin: 12px 0 6px 0; color: {accent}; text-transform: uppercase; letter-spacing: 0.04em; }}
h3 {{ font-size: 11px; font-weight: 600; margin: 6px 0 2px 0; }}
p {{ margin: 0 0 4px 0; }}
ul {{ margin: 2px 0 6px 0; padding-left: 16px; }}
li {{ margin-bottom: 3px; }}
li::marker {{ color: {accent}; }}
a {{ color: inherit; text-decoration: none; }}
@media print {{ body {{ -webkit-print-color-adjust: exact; print-color-adjust: exact; }} }}"#,
        family = fonts.family,
    )
}

/// Runs all four steps. The output never depends on the input stylesheet's geometry.
pub fn normalize_design(html: &str, accent: &str) -> String {
    let accent = canonical_hex(accent).unwrap_or_else(|| FALLBACK_ACCENT.to_string());

    let fonts = capture_fonts(html);
    let html = BODY_STYLE_ATTR.replace_all(html, "$1");
    let html = STYLE_BLOCK.replace_all(&html, "");
    let style = format!(
        "<style>\n{}\n</style>",
        canonical_stylesheet(&accent, &fonts)
    );
    let html = inject_style(&html, &style);
    strip_images(&html)
}

fn inject_style(html: &str, style: &str) -> String {
    if let Some(m) = HEAD_CLOSE.find(html) {
        return format!("{}{}\n{}", &html[..m.start()], style, &html[m.start()..]);
    }
    if let Some(m) = HEAD_OPEN.find(html) {
        return format!("{}\n{}\n</head>{}", &html[..m.end()], style, &html[m.end()..]);
    }
    if let Some(m) = HTML_OPEN.find(html) {
        return format!(
            "{}\n<head>\n{}\n</head>{}",
            &html[..m.end()],
            style,
            &html[m.end()..]
        );
    }
    format!("<head>\n{style}\n</head>\n{html}")
}

/// Step 4. Unconditional: no image reference survives.
pub fn strip_images(html: &str) -> String {
    let html = IMG_TAG.replace_all(html, "");
    IMAGE_URL.replace_all(&html, "").into_owned()
}
