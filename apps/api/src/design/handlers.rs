use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::design::orchestrator::{DesignPreview, SingleDesignSource};
use crate::design::questionnaire::DesignQuestionnaire;
use crate::design::templates::{select_random_templates, DesignTemplate};
use crate::errors::AppError;
use crate::state::AppState;

/// Upper bound on previews per request.
pub const MAX_PREVIEW_COUNT: usize = 5;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub resume_text: String,
    /// Defaults to the configured candidate count.
    pub count: Option<usize>,
    /// Present ⇒ questionnaire mode; absent ⇒ random template selection.
    pub questionnaire: Option<DesignQuestionnaire>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub request_id: Uuid,
    pub previews: Vec<DesignPreview>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleDesignRequest {
    pub resume_text: String,
    pub template_name: Option<String>,
    pub questionnaire: Option<DesignQuestionnaire>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleDesignResponse {
    pub request_id: Uuid,
    pub design: DesignPreview,
}

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<DesignTemplate>,
}

/// GET /api/v1/designs/templates
pub async fn handle_list_templates(
    State(state): State<AppState>,
) -> Result<Json<TemplateListResponse>, AppError> {
    let templates = state.catalog.all_templates().await;
    Ok(Json(TemplateListResponse { templates }))
}

/// POST /api/v1/designs/previews
pub async fn handle_generate_previews(
    State(state): State<AppState>,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    let resume_text = require_resume(&req.resume_text)?;
    let count = req.count.unwrap_or(state.config.candidate_count);
    if count == 0 || count > MAX_PREVIEW_COUNT {
        return Err(AppError::Validation(format!(
            "count must be between 1 and {MAX_PREVIEW_COUNT}"
        )));
    }

    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        count,
        questionnaire = req.questionnaire.is_some(),
        "Design preview request"
    );

    let previews = match &req.questionnaire {
        Some(questionnaire) => {
            state
                .pipeline
                .generate_for_questionnaire(questionnaire, resume_text, count)
                .await?
        }
        None => {
            state
                .pipeline
                .generate_from_catalog(&state.catalog, resume_text, count)
                .await?
        }
    };

    Ok(Json(PreviewResponse {
        request_id,
        previews,
    }))
}

/// POST /api/v1/designs/generate
pub async fn handle_generate_design(
    State(state): State<AppState>,
    Json(req): Json<SingleDesignRequest>,
) -> Result<Json<SingleDesignResponse>, AppError> {
    let resume_text = require_resume(&req.resume_text)?;

    let source = match (req.template_name.as_deref(), req.questionnaire) {
        (Some(_), Some(_)) => {
            return Err(AppError::Validation(
                "Provide either templateName or questionnaire, not both".to_string(),
            ))
        }
        (Some(name), None) => {
            let template = state
                .catalog
                .find_template(name)
                .await
                .ok_or_else(|| AppError::NotFound(format!("Template '{name}' not found")))?;
            SingleDesignSource::Template(template)
        }
        (None, Some(questionnaire)) => SingleDesignSource::Questionnaire(questionnaire),
        (None, None) => {
            let all = state.catalog.all_templates().await;
            let picked = {
                let mut rng = rand::thread_rng();
                select_random_templates(&all, 1, &mut rng)
            };
            let template = picked
                .into_iter()
                .next()
                .ok_or_else(|| AppError::Internal(anyhow::anyhow!("template catalog is empty")))?;
            SingleDesignSource::Template(template)
        }
    };

    let request_id = Uuid::new_v4();
    info!(%request_id, "Single design request");

    let design = state.pipeline.generate_single(resume_text, source).await?;
    Ok(Json(SingleDesignResponse { request_id, design }))
}

fn require_resume(text: &str) -> Result<&str, AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("resumeText must not be empty".to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::design::chain::RetryPolicy;
    use crate::design::orchestrator::DesignPipeline;
    use crate::design::template_cache::{NoRemoteTemplates, SystemClock, TemplateCache};
    use crate::design::templates::TemplateCatalog;
    use crate::llm_client::stub::ScriptedClient;
    use crate::llm_client::GenerationClient;
    use crate::routes::build_router;
    use crate::state::AppState;

    fn compliant_response() -> String {
        let html = "<html><head></head><body><header><h1>Jane</h1></header>\
                    <section><h2>Skills</h2><ul><li>Rust</li></ul></section></body></html>";
        json!({ "html": html }).to_string()
    }

    fn app(client: Arc<dyn GenerationClient>) -> Router {
        let cache = TemplateCache::new(
            Arc::new(NoRemoteTemplates),
            Arc::new(SystemClock),
            chrono::Duration::minutes(5),
        );
        let state = AppState {
            pipeline: Arc::new(DesignPipeline::new(
                client,
                RetryPolicy::fixed(3, Duration::ZERO),
            )),
            catalog: Arc::new(TemplateCatalog::new(Arc::new(cache))),
            config: Config::for_tests(),
        };
        build_router(state)
    }

    async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_previews_default_count() {
        let app = app(Arc::new(ScriptedClient::always(&compliant_response())));
        let (status, body) = post(
            app,
            "/api/v1/designs/previews",
            json!({ "resumeText": "Jane Doe, Rust engineer" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["previews"].as_array().unwrap().len(), 3);
        assert!(body["requestId"].is_string());
        let first = &body["previews"][0];
        assert!(first["html"].as_str().unwrap().contains("padding: 0.5in 0.6in"));
        assert!(first["atsScore"].as_u64().unwrap() <= 100);
    }

    #[tokio::test]
    async fn test_previews_questionnaire_mode() {
        let app = app(Arc::new(ScriptedClient::always(&compliant_response())));
        let (status, body) = post(
            app,
            "/api/v1/designs/previews",
            json!({
                "resumeText": "Jane Doe",
                "count": 2,
                "questionnaire": {
                    "style": "minimal",
                    "layout": "single-column",
                    "accentColor": "#065f46"
                }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let previews = body["previews"].as_array().unwrap();
        assert_eq!(previews.len(), 2);
        assert_eq!(previews[0]["templateName"], "Custom (conservative)");
        assert_eq!(previews[0]["accentColor"], "#065f46");
    }

    #[tokio::test]
    async fn test_empty_resume_is_rejected() {
        let client = Arc::new(ScriptedClient::always(&compliant_response()));
        let (status, body) = post(
            app(client.clone()),
            "/api/v1/designs/previews",
            json!({ "resumeText": "   " }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_count_out_of_range_is_rejected() {
        let app = app(Arc::new(ScriptedClient::always(&compliant_response())));
        let (status, _) = post(
            app.clone(),
            "/api/v1/designs/previews",
            json!({ "resumeText": "Jane", "count": 0 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = post(
            app,
            "/api/v1/designs/previews",
            json!({ "resumeText": "Jane", "count": 6 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_all_failing_maps_to_bad_gateway() {
        let app = app(Arc::new(ScriptedClient::always("not json")));
        let (status, body) = post(
            app,
            "/api/v1/designs/previews",
            json!({ "resumeText": "Jane", "count": 1 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "ALL_CANDIDATES_FAILED");
    }

    #[tokio::test]
    async fn test_generate_by_template_name() {
        let app = app(Arc::new(ScriptedClient::always(&compliant_response())));
        let (status, body) = post(
            app,
            "/api/v1/designs/generate",
            json!({ "resumeText": "Jane", "templateName": "executive navy" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["design"]["templateName"], "Executive Navy");
        assert_eq!(body["design"]["accentColor"], "#1e3a5f");
    }

    #[tokio::test]
    async fn test_generate_unknown_template_is_not_found() {
        let client = Arc::new(ScriptedClient::always(&compliant_response()));
        let (status, _) = post(
            app(client.clone()),
            "/api/v1/designs/generate",
            json!({ "resumeText": "Jane", "templateName": "No Such Template" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_generate_without_selection_picks_a_template() {
        let app = app(Arc::new(ScriptedClient::always(&compliant_response())));
        let (status, body) = post(
            app,
            "/api/v1/designs/generate",
            json!({ "resumeText": "Jane" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["design"]["html"].as_str().unwrap().contains("@page"));
    }

    #[tokio::test]
    async fn test_list_templates() {
        let response = app(Arc::new(ScriptedClient::always("{}")))
            .oneshot(
                Request::builder()
                    .uri("/api/v1/designs/templates")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["templates"].as_array().unwrap().len() >= 12);
    }
}
