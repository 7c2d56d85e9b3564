use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use vriksh_core::error::{ArtifactError, ValidationError};

/// Every failure the HTTP surface can report. Rendered as `{"detail": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Unavailable(String),
    NotFound(String),
    Validation(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            ApiError::Unavailable(d)
            | ApiError::NotFound(d)
            | ApiError::Validation(d)
            | ApiError::Internal(d) => d,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.detail() }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        tracing::info!(error = %err, "rejected invalid request");
        ApiError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::info!(error = %rejection.body_text(), "rejected request body");
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::info!(error = %rejection.body_text(), "rejected path parameter");
        ApiError::Validation(rejection.body_text())
    }
}

/// User-facing wording for one artifact-backed resource.
#[derive(Debug, Clone, Copy)]
pub struct Resource {
    pub file: &'static str,
    pub unavailable: &'static str,
    pub failed: &'static str,
}

/// Maps a loader failure: a missing file means the pipeline has not produced
/// it yet, anything else is ours to fix.
pub fn load_failure(err: ArtifactError, resource: &Resource) -> ApiError {
    if err.is_not_found() {
        tracing::error!(file = resource.file, "artifact not found");
        return ApiError::Unavailable(resource.unavailable.to_string());
    }
    internal(anyhow::Error::new(err), resource.failed)
}

pub fn internal(err: anyhow::Error, detail: &str) -> ApiError {
    sentry_anyhow::capture_anyhow(&err);
    tracing::error!(error = %format!("{err:#}"), "{detail}");
    ApiError::Internal(detail.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const RES: Resource = Resource {
        file: "risk_output.json",
        unavailable: "Risk data is not available yet.",
        failed: "Failed to load risk data.",
    };

    #[test]
    fn not_found_maps_to_unavailable() {
        let err = ArtifactError::NotFound {
            path: PathBuf::from("data/risk_output.json"),
        };
        let api = load_failure(err, &RES);
        assert_eq!(api.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(api.detail(), RES.unavailable);
    }

    #[test]
    fn malformed_maps_to_internal() {
        let err = ArtifactError::Malformed {
            file: "risk_output.json",
            detail: "unexpected JSON structure".into(),
        };
        let api = load_failure(err, &RES);
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.detail(), RES.failed);
    }

    #[test]
    fn validation_joins_issues() {
        let api = ApiError::from(ValidationError {
            issues: vec!["area must be greater than 0 (got 0)".into(), "crop must be non-empty".into()],
        });
        assert_eq!(api.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            api.detail(),
            "area must be greater than 0 (got 0); crop must be non-empty"
        );
    }
}
