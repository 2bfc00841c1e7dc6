//! Prompt Builder: turns a template or questionnaire plus résumé text into a prompt pair.
//!
//! The numeric layout values and the colour list stated here are the same ones
//! the validation chain and the CSS normalizer enforce.

use crate::design::prompts::{
    CORRECTION_TEMPLATE, DESIGN_SYSTEM_TEMPLATE, LAYOUT_RULES, QUESTIONNAIRE_PROMPT_TEMPLATE,
    TEMPLATE_PROMPT_TEMPLATE,
};
use crate::design::questionnaire::DesignQuestionnaire;
use crate::design::templates::DesignTemplate;
use crate::design::validation::{AttemptError, ValidationProfile};
use crate::llm_client::prompts::{FIDELITY_INSTRUCTION, HTML_RESPONSE_CONTRACT, JSON_ONLY_SYSTEM};

/// Résumé text beyond this many characters is cut before embedding.
pub const MAX_RESUME_CHARS: usize = 12_000;

/// (label, directive) per candidate index; later indices cycle with a suffix.
const VARIATIONS: &[(&str, &str)] = &[
    (
        "conservative",
        "Conservative: plain section headers with a thin accent underline, no icons, \
         maximum whitespace discipline.",
    ),
    (
        "icon-accented",
        "Icon-accented: prefix contact details and section headers with simple unicode \
         symbols (for example ✉ ☎ ⌂) in the accent color. No images, no SVG.",
    ),
    (
        "bordered",
        "Bordered: separate sections with a 1px accent left border or top rule, \
         compact spacing between entries.",
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignPrompt {
    pub system: String,
    pub user: String,
}

impl DesignPrompt {
    /// The same prompt with a note describing why the previous attempt failed.
    pub fn with_correction(&self, failed_attempt: u32, rejection: &AttemptError) -> DesignPrompt {
        let note = CORRECTION_TEMPLATE
            .replace("{attempt}", &failed_attempt.to_string())
            .replace("{reason}", &rejection.to_string());
        DesignPrompt {
            system: self.system.clone(),
            user: format!("{}{}", self.user, note),
        }
    }
}

/// Short label and full directive for a candidate slot. Distinct for every index.
pub fn variation_directive(index: usize) -> (String, String) {
    let (label, directive) = VARIATIONS[index % VARIATIONS.len()];
    let round = index / VARIATIONS.len();
    if round == 0 {
        (label.to_string(), directive.to_string())
    } else {
        (
            format!("{label} #{}", round + 1),
            format!(
                "{directive} This is alternative #{} of this direction: vary the section order \
                 and header treatment from the earlier ones.",
                round + 1
            ),
        )
    }
}

pub fn build_template_prompt(template: &DesignTemplate, resume_text: &str) -> DesignPrompt {
    let profile = ValidationProfile::for_template(template);
    let gradient = if template.has_gradient() {
        template.gradient.trim()
    } else {
        "none"
    };
    let user = TEMPLATE_PROMPT_TEMPLATE
        .replace("{template_name}", &template.name)
        .replace("{style}", template.style.as_str())
        .replace("{layout}", &template.layout)
        .replace("{sidebar}", &template.sidebar)
        .replace("{gradient}", gradient)
        .replace("{heading_font}", template.heading_font())
        .replace("{body_font}", template.body_font())
        .replace("{description}", &template.description)
        .replace("{layout_rules}", LAYOUT_RULES)
        .replace("{accent}", &template.accent_color)
        .replace("{allowed_colors}", &profile.allowed_colors().join(", "))
        .replace("{fidelity}", FIDELITY_INSTRUCTION)
        .replace("{resume_text}", truncate_resume(resume_text));

    DesignPrompt {
        system: system_prompt(),
        user,
    }
}

pub fn build_questionnaire_prompt(
    questionnaire: &DesignQuestionnaire,
    resume_text: &str,
    candidate_index: usize,
) -> DesignPrompt {
    let accent = questionnaire.accent();
    let profile = ValidationProfile::Questionnaire {
        accent: accent.clone(),
    };
    let (_, variation) = variation_directive(candidate_index);
    let notes = questionnaire
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("none");

    let user = QUESTIONNAIRE_PROMPT_TEMPLATE
        .replace("{style}", questionnaire.style.as_str())
        .replace("{layout}", questionnaire.layout.as_str())
        .replace("{density}", questionnaire.density.as_str())
        .replace(
            "{icons}",
            if questionnaire.include_icons {
                "yes, unicode symbols only"
            } else {
                "no"
            },
        )
        .replace("{heading_font}", questionnaire.heading_font())
        .replace("{body_font}", questionnaire.body_font())
        .replace("{notes}", notes)
        .replace("{variation}", &variation)
        .replace("{layout_rules}", LAYOUT_RULES)
        .replace("{accent}", &accent)
        .replace("{allowed_colors}", &profile.allowed_colors().join(", "))
        .replace("{fidelity}", FIDELITY_INSTRUCTION)
        .replace("{resume_text}", truncate_resume(resume_text));

    DesignPrompt {
        system: system_prompt(),
        user,
    }
}

fn system_prompt() -> String {
    DESIGN_SYSTEM_TEMPLATE
        .replace("{json_only}", JSON_ONLY_SYSTEM)
        .replace("{response_contract}", HTML_RESPONSE_CONTRACT)
}

/// Cuts at a char boundary so multi-byte text never splits.
fn truncate_resume(text: &str) -> &str {
    let text = text.trim();
    match text.char_indices().nth(MAX_RESUME_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::design::questionnaire::{Density, QuestionnaireLayout};
    use crate::design::templates::{curated_templates, TemplateStyle};

    fn questionnaire() -> DesignQuestionnaire {
        DesignQuestionnaire {
            style: TemplateStyle::Minimal,
            layout: QuestionnaireLayout::SingleColumn,
            accent_color: "#0F766E".to_string(),
            heading_font: Some("Lora".to_string()),
            body_font: None,
            density: Density::Spacious,
            include_icons: false,
            notes: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_template_prompt_embeds_exact_numbers_and_colors() {
        let template = curated_templates().remove(0);
        let prompt = build_template_prompt(&template, "Jane Doe\nExperience");
        assert!(prompt.user.contains("0.5in top/bottom, 0.6in left/right"));
        assert!(prompt.user.contains("line-height: 1.4"));
        assert!(prompt.user.contains("3-4px"));
        assert!(prompt.user.contains(&template.accent_color));
        assert!(prompt.user.contains("#ffffff"));
        assert!(prompt.user.contains(&template.name));
        assert!(prompt.user.contains("Jane Doe"));
        assert!(prompt.system.contains("JSON"));
    }

    #[test]
    fn test_template_prompt_lists_gradient_stops_as_allowed() {
        let template = curated_templates()
            .into_iter()
            .find(|t| t.name == "Horizon")
            .unwrap();
        let prompt = build_template_prompt(&template, "resume");
        let allowed_line = prompt
            .user
            .lines()
            .find(|l| l.contains("ONLY hex colors"))
            .unwrap();
        assert!(allowed_line.contains("#3b82f6"), "{allowed_line}");
    }

    #[test]
    fn test_blank_gradient_is_described_as_none() {
        let mut template = curated_templates().remove(0);
        template.gradient = "   ".to_string();
        let prompt = build_template_prompt(&template, "resume");
        assert!(prompt.user.contains("- Header gradient: none\n"));
    }

    #[test]
    fn test_no_placeholders_survive() {
        let template = curated_templates().remove(3);
        for prompt in [
            build_template_prompt(&template, "text"),
            build_questionnaire_prompt(&questionnaire(), "text", 4),
        ] {
            for placeholder in ["{style}", "{accent}", "{allowed_colors}", "{layout_rules}", "{variation}"] {
                assert!(!prompt.user.contains(placeholder), "{placeholder} left in prompt");
            }
        }
    }

    #[test]
    fn test_questionnaire_prompt_uses_curated_palette_and_white_backgrounds() {
        let prompt = build_questionnaire_prompt(&questionnaire(), "resume", 0);
        assert!(prompt.user.contains("#0f766e"));
        assert!(prompt.user.contains("#1e40af"));
        assert!(prompt.user.contains("Every background must be white"));
        assert!(prompt.user.contains("Lora"));
        assert!(prompt.user.contains("Notes from the user: none"));
    }

    #[test]
    fn test_variation_directives_are_distinct_per_index() {
        let directives: HashSet<String> = (0..9).map(|i| variation_directive(i).1).collect();
        assert_eq!(directives.len(), 9);
        let labels: HashSet<String> = (0..9).map(|i| variation_directive(i).0).collect();
        assert_eq!(labels.len(), 9);
        assert_eq!(variation_directive(0).0, "conservative");
        assert_eq!(variation_directive(1).0, "icon-accented");
        assert_eq!(variation_directive(2).0, "bordered");
    }

    #[test]
    fn test_questionnaire_candidates_get_different_prompts() {
        let q = questionnaire();
        let a = build_questionnaire_prompt(&q, "resume", 0);
        let b = build_questionnaire_prompt(&q, "resume", 1);
        let c = build_questionnaire_prompt(&q, "resume", 2);
        assert_ne!(a.user, b.user);
        assert_ne!(b.user, c.user);
        assert_ne!(a.user, c.user);
    }

    #[test]
    fn test_with_correction_appends_reason() {
        let template = curated_templates().remove(0);
        let prompt = build_template_prompt(&template, "resume");
        let corrected = prompt.with_correction(
            1,
            &AttemptError::ColorPolicyViolation(vec!["#ff0000".to_string()]),
        );
        assert!(corrected.user.starts_with(&prompt.user));
        assert!(corrected.user.contains("ATTEMPT 1 WAS REJECTED"));
        assert!(corrected.user.contains("#ff0000"));
        assert_eq!(corrected.system, prompt.system);
    }

    #[test]
    fn test_truncate_resume_respects_char_boundaries() {
        let long = "é".repeat(MAX_RESUME_CHARS + 10);
        assert_eq!(truncate_resume(&long).chars().count(), MAX_RESUME_CHARS);
        assert_eq!(truncate_resume("  short  "), "short");
    }
}
