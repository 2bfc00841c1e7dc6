//! Validation Chain: drives one candidate from request to ACCEPTED or REJECTED.
//!
//! ```text
//! REQUESTED → GENERATION_FAILED | GENERATED
//!           → PARSE_FAILED | PARSED
//!           → STRUCTURAL_REJECTED | STRUCTURAL_OK   (questionnaire profile only)
//!           → COLOR_REJECTED | COLOR_OK
//!           → ACCEPTED
//! ```
//!
//! Any failure state schedules another attempt through the injected
//! `RetryPolicy`. Attempts are strictly sequential because each retry carries
//! the previous rejection reason in its prompt.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::design::prompt_builder::DesignPrompt;
use crate::design::templates::DesignTemplate;
use crate::design::validation::{
    check_backgrounds, check_colors, parse_design_response, AttemptError, ValidationProfile,
};
use crate::llm_client::GenerationClient;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CandidateState {
    Requested,
    GenerationFailed,
    Generated,
    ParseFailed,
    Parsed,
    StructuralRejected,
    StructuralOk,
    ColorRejected,
    ColorOk,
    Accepted,
    Rejected,
}

// ────────────────────────────────────────────────────────────────────────────
// Retry policy
// ────────────────────────────────────────────────────────────────────────────

type BackoffFn = dyn Fn(u32) -> Duration + Send + Sync;

/// How many attempts a candidate gets and how long to wait between them.
#[derive(Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    backoff: Arc<BackoffFn>,
}

impl RetryPolicy {
    /// Same delay before every retry. At least one attempt is always made.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::with_backoff(max_attempts, move |_| delay)
    }

    /// `backoff(n)` is the wait after the n-th failed attempt (1-based).
    pub fn with_backoff<F>(max_attempts: u32, backoff: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Arc::new(backoff),
        }
    }

    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        (self.backoff)(failed_attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_MAX_ATTEMPTS, DEFAULT_BACKOFF)
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("first_delay", &self.delay_after(1))
            .finish()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Candidate
// ────────────────────────────────────────────────────────────────────────────

/// One template slot's run through the chain. Discarded once terminal.
#[derive(Debug, Clone)]
pub struct GenerationCandidate {
    pub template: DesignTemplate,
    pub attempts_used: u32,
    pub raw_response: Option<String>,
    pub state: CandidateState,
    /// Why the most recent attempt failed, if it did.
    pub last_rejection: Option<AttemptError>,
}

impl GenerationCandidate {
    pub fn new(template: DesignTemplate) -> Self {
        Self {
            template,
            attempts_used: 0,
            raw_response: None,
            state: CandidateState::Requested,
            last_rejection: None,
        }
    }
}

/// Everything a candidate run needs besides the client and the policy.
#[derive(Debug, Clone)]
pub struct CandidateRequest {
    pub template: DesignTemplate,
    pub profile: ValidationProfile,
    pub prompt: DesignPrompt,
}

#[derive(Debug, Clone)]
pub enum CandidateOutcome {
    /// The validated, not yet normalised, HTML.
    Accepted {
        candidate: GenerationCandidate,
        html: String,
    },
    /// Attempts exhausted. Dropped by the orchestrator, never surfaced as an error.
    Rejected(GenerationCandidate),
}

impl CandidateOutcome {
    pub fn candidate(&self) -> &GenerationCandidate {
        match self {
            CandidateOutcome::Accepted { candidate, .. } | CandidateOutcome::Rejected(candidate) => {
                candidate
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Chain
// ────────────────────────────────────────────────────────────────────────────

/// Runs attempts until one is accepted or `policy.max_attempts` is reached.
pub async fn run_candidate(
    client: &dyn GenerationClient,
    request: CandidateRequest,
    policy: &RetryPolicy,
) -> CandidateOutcome {
    let CandidateRequest {
        template,
        profile,
        prompt,
    } = request;
    let mut candidate = GenerationCandidate::new(template);

    while candidate.attempts_used < policy.max_attempts {
        if candidate.attempts_used > 0 {
            tokio::time::sleep(policy.delay_after(candidate.attempts_used)).await;
        }
        candidate.attempts_used += 1;
        candidate.state = CandidateState::Requested;

        let attempt_prompt = match &candidate.last_rejection {
            Some(rejection) => prompt.with_correction(candidate.attempts_used - 1, rejection),
            None => prompt.clone(),
        };

        match run_attempt(client, &attempt_prompt, &profile, &mut candidate).await {
            Ok(html) => {
                candidate.state = CandidateState::Accepted;
                candidate.last_rejection = None;
                info!(
                    template = %candidate.template.name,
                    attempt = candidate.attempts_used,
                    "Design candidate accepted"
                );
                return CandidateOutcome::Accepted { candidate, html };
            }
            Err((state, rejection)) => {
                warn!(
                    template = %candidate.template.name,
                    attempt = candidate.attempts_used,
                    max_attempts = policy.max_attempts,
                    state = ?state,
                    "Design attempt rejected: {rejection}"
                );
                candidate.state = state;
                candidate.last_rejection = Some(rejection);
            }
        }
    }

    warn!(
        template = %candidate.template.name,
        attempts = candidate.attempts_used,
        "Design candidate rejected: attempts exhausted"
    );
    candidate.state = CandidateState::Rejected;
    CandidateOutcome::Rejected(candidate)
}

/// One pass through the state machine. Returns the accepted HTML, or the
/// failure state together with the reason.
async fn run_attempt(
    client: &dyn GenerationClient,
    prompt: &DesignPrompt,
    profile: &ValidationProfile,
    candidate: &mut GenerationCandidate,
) -> Result<String, (CandidateState, AttemptError)> {
    let raw = client
        .generate(&prompt.system, &prompt.user)
        .await
        .map_err(|e| {
            (
                CandidateState::GenerationFailed,
                AttemptError::Transport(e.to_string()),
            )
        })?;
    candidate.state = CandidateState::Generated;
    let parsed = parse_design_response(&raw);
    candidate.raw_response = Some(raw);

    let html = parsed.map_err(|e| (CandidateState::ParseFailed, e))?;
    candidate.state = CandidateState::Parsed;

    if profile.enforces_backgrounds() {
        check_backgrounds(&html).map_err(|e| (CandidateState::StructuralRejected, e))?;
    }
    candidate.state = CandidateState::StructuralOk;

    check_colors(&html, profile).map_err(|e| (CandidateState::ColorRejected, e))?;
    candidate.state = CandidateState::ColorOk;

    debug!(template = %candidate.template.name, bytes = html.len(), "Attempt passed validation");
    Ok(html)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
