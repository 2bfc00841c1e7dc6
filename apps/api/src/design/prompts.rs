// All LLM prompt constants for the design pipeline.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for every design call. Replace `{json_only}` and `{response_contract}`.
pub const DESIGN_SYSTEM_TEMPLATE: &str = "\
You are a senior résumé designer who writes print-ready, ATS-friendly HTML and CSS. \
Your output is parsed by machines before any human sees it, so structure matters more than decoration.\n\
{json_only}\n\
{response_contract}";

/// Layout and typography rules shared by both modes. The numbers are exact.
pub const LAYOUT_RULES: &str = "\
LAYOUT RULES (exact values, do not approximate):\n\
- Page: US Letter, 8.5in x 11in.\n\
- body padding: 0.5in top/bottom, 0.6in left/right. No max-width, no centered container.\n\
- line-height: 1.4 for all body text.\n\
- Font sizes: candidate name 28px, section headers 14px, body text 11px.\n\
- List items: 3-4px vertical spacing between bullets.\n\
- Use semantic markup: <header> for the name and contact block, one <section> per résumé section, \
<h1> for the name, <h2> for section headers, <ul>/<li> for bullets.\n\
- Section headers must use standard names: Summary, Experience, Skills, Education.\n\
- NEVER use <table>, <img>, <svg>, position:absolute, or external images.\n\
- Use one consistent date format throughout (for example \"Jan 2021 - Mar 2023\").";

/// Template-mode user prompt.
pub const TEMPLATE_PROMPT_TEMPLATE: &str = "\
Design a résumé in the \"{template_name}\" template.\n\
\n\
TEMPLATE:\n\
- Style: {style}\n\
- Layout: {layout}\n\
- Sidebar: {sidebar}\n\
- Header gradient: {gradient}\n\
- Heading font: {heading_font}; body font: {body_font}\n\
- Description: {description}\n\
\n\
{layout_rules}\n\
\n\
COLOR RULES:\n\
- Accent color: {accent}. Use it for the name, section headers and bullet markers only.\n\
- The ONLY hex colors you may use anywhere in the document are: {allowed_colors}\n\
- Any other hex color causes the design to be rejected.\n\
\n\
{fidelity}\n\
\n\
RESUME TEXT:\n\
{resume_text}";

/// Questionnaire-mode user prompt.
pub const QUESTIONNAIRE_PROMPT_TEMPLATE: &str = "\
Design a custom résumé from the user's stated preferences.\n\
\n\
PREFERENCES:\n\
- Style: {style}\n\
- Layout: {layout}\n\
- Density: {density}\n\
- Icons: {icons}\n\
- Heading font: {heading_font}; body font: {body_font}\n\
- Notes from the user: {notes}\n\
\n\
VARIATION: {variation}\n\
\n\
{layout_rules}\n\
\n\
COLOR RULES:\n\
- Accent color: {accent}.\n\
- The ONLY hex colors you may use anywhere in the document are: {allowed_colors}\n\
- Every background must be white or transparent. Allowed background values: \
white, #fff, #ffffff, transparent, none, inherit, rgba(255,255,255,*). \
Do not tint cards, sidebars or headers.\n\
\n\
{fidelity}\n\
\n\
RESUME TEXT:\n\
{resume_text}";

/// Appended on retries. Replace `{attempt}` and `{reason}`.
pub const CORRECTION_TEMPLATE: &str = "\
\n\nPREVIOUS ATTEMPT {attempt} WAS REJECTED: {reason}\n\
Fix exactly this problem and return the complete document again in the required JSON shape.";
