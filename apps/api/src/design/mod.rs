//! Résumé design generation and validation.
//!
//! Flow per request: prompt builder → k concurrent candidate chains (generate,
//! parse, colour/structure checks, retry) → CSS normalizer → contrast and ATS
//! reports → previews.

pub mod ats;
pub mod chain;
pub mod contrast;
pub mod css_normalizer;
pub mod handlers;
pub mod orchestrator;
pub mod prompt_builder;
pub mod prompts;
pub mod questionnaire;
pub mod template_cache;
pub mod templates;
pub mod validation;
