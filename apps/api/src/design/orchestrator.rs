//! Orchestrator: fans out k candidate pipelines and keeps whatever survives.
//!
//! Pipelines run as concurrent futures and share only read-only inputs. Each
//! accepted candidate passes through the CSS normalizer before anything else
//! sees its HTML, so there is no path for raw generator output to leave.
//! The batch fails only when every candidate is rejected.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::design::ats::{analyze_ats_compatibility, AtsIssue};
use crate::design::chain::{run_candidate, CandidateOutcome, CandidateRequest, RetryPolicy};
use crate::design::contrast::{validate_resume_contrast, ContrastSummary};
use crate::design::css_normalizer::normalize_design;
use crate::design::prompt_builder::{
    build_questionnaire_prompt, build_template_prompt, variation_directive,
};
use crate::design::questionnaire::DesignQuestionnaire;
use crate::design::templates::{select_random_templates, DesignTemplate, TemplateCatalog, TemplateStyle};
use crate::design::validation::ValidationProfile;
use crate::errors::AppError;
use crate::llm_client::GenerationClient;

pub const DEFAULT_CANDIDATE_COUNT: usize = 3;

/// A finished design, ready for the caller. Only ever built from an ACCEPTED candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignPreview {
    pub template_name: String,
    pub template_style: TemplateStyle,
    pub layout: String,
    pub accent_color: String,
    pub html: String,
    pub contrast_passed: bool,
    pub contrast_summary: ContrastSummary,
    pub ats_score: u32,
    pub ats_warnings: Vec<String>,
    pub ats_issues: Vec<AtsIssue>,
}

/// How a single-design request picks its parameters.
#[derive(Debug, Clone)]
pub enum SingleDesignSource {
    Template(DesignTemplate),
    Questionnaire(DesignQuestionnaire),
}

pub struct DesignPipeline {
    client: Arc<dyn GenerationClient>,
    policy: RetryPolicy,
    deadline: Option<Duration>,
}

impl DesignPipeline {
    pub fn new(client: Arc<dyn GenerationClient>, policy: RetryPolicy) -> Self {
        Self {
            client,
            policy,
            deadline: None,
        }
    }

    /// Bounds every batch. Without one, pipelines run until accepted or exhausted.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Draws `k` distinct templates from the catalog and runs one candidate per template.
    pub async fn generate_from_catalog(
        &self,
        catalog: &TemplateCatalog,
        resume_text: &str,
        k: usize,
    ) -> Result<Vec<DesignPreview>, AppError> {
        let all = catalog.all_templates().await;
        let selected = {
            let mut rng = rand::thread_rng();
            select_random_templates(&all, k, &mut rng)
        };
        self.generate_for_templates(resume_text, selected).await
    }

    /// Runs one template-mode candidate per template, concurrently.
    pub async fn generate_for_templates(
        &self,
        resume_text: &str,
        templates: Vec<DesignTemplate>,
    ) -> Result<Vec<DesignPreview>, AppError> {
        let requests = templates
            .into_iter()
            .map(|template| template_request(template, resume_text))
            .collect();
        self.run_batch(requests).await
    }

    /// Runs `k` questionnaire candidates, each with its own variation directive.
    pub async fn generate_for_questionnaire(
        &self,
        questionnaire: &DesignQuestionnaire,
        resume_text: &str,
        k: usize,
    ) -> Result<Vec<DesignPreview>, AppError> {
        questionnaire.validate()?;
        let requests = (0..k)
            .map(|index| questionnaire_request(questionnaire, resume_text, index))
            .collect();
        self.run_batch(requests).await
    }

    /// The single-result flow: one pipeline, one normalised design.
    pub async fn generate_single(
        &self,
        resume_text: &str,
        source: SingleDesignSource,
    ) -> Result<DesignPreview, AppError> {
        let request = match &source {
            SingleDesignSource::Template(template) => template_request(template.clone(), resume_text),
            SingleDesignSource::Questionnaire(questionnaire) => {
                questionnaire.validate()?;
                questionnaire_request(questionnaire, resume_text, 0)
            }
        };
        self.run_batch(vec![request])
            .await?
            .into_iter()
            .next()
            .ok_or(AppError::AllCandidatesFailed { attempted: 1 })
    }

    async fn run_batch(&self, requests: Vec<CandidateRequest>) -> Result<Vec<DesignPreview>, AppError> {
        let attempted = requests.len();
        if attempted == 0 {
            return Err(AppError::Validation(
                "No design candidates to generate".to_string(),
            ));
        }
        info!(candidates = attempted, "Starting design batch");

        let client = self.client.as_ref();
        let policy = &self.policy;
        let pipelines = join_all(
            requests
                .into_iter()
                .map(|request| run_candidate(client, request, policy)),
        );

        let outcomes = match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, pipelines)
                .await
                .map_err(|_| {
                    warn!(deadline_secs = deadline.as_secs_f64(), "Design batch deadline exceeded");
                    AppError::DeadlineExceeded
                })?,
            None => pipelines.await,
        };

        let previews: Vec<DesignPreview> = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                CandidateOutcome::Accepted { candidate, html } => {
                    Some(finalize(&candidate.template, &html))
                }
                CandidateOutcome::Rejected(_) => None,
            })
            .collect();

        if previews.is_empty() {
            warn!(candidates = attempted, "All design candidates rejected");
            return Err(AppError::AllCandidatesFailed { attempted });
        }

        info!(
            accepted = previews.len(),
            candidates = attempted,
            "Design batch complete"
        );
        Ok(previews)
    }
}

fn template_request(template: DesignTemplate, resume_text: &str) -> CandidateRequest {
    CandidateRequest {
        prompt: build_template_prompt(&template, resume_text),
        profile: ValidationProfile::for_template(&template),
        template,
    }
}

fn questionnaire_request(
    questionnaire: &DesignQuestionnaire,
    resume_text: &str,
    index: usize,
) -> CandidateRequest {
    let (label, _) = variation_directive(index);
    CandidateRequest {
        template: questionnaire.as_template(&label),
        profile: ValidationProfile::Questionnaire {
            accent: questionnaire.accent(),
        },
        prompt: build_questionnaire_prompt(questionnaire, resume_text, index),
    }
}

/// Normalises accepted HTML and attaches the contrast and ATS reports.
fn finalize(template: &DesignTemplate, html: &str) -> DesignPreview {
    let html = normalize_design(html, &template.accent_color);
    let contrast = validate_resume_contrast(&html);
    let ats = analyze_ats_compatibility(&html);

    DesignPreview {
        template_name: template.name.clone(),
        template_style: template.style,
        layout: template.layout.clone(),
        accent_color: template.accent_color.clone(),
        contrast_passed: contrast.passed,
        contrast_summary: contrast.summary,
        ats_score: ats.score,
        ats_warnings: ats.warnings,
        ats_issues: ats.issues,
        html,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
