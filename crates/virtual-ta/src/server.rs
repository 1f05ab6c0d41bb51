/// HTTP surface for the virtual TA.
///
/// Routes:
/// - `GET /`: service banner and endpoint list
/// - `GET /health`: liveness
/// - `GET /api`, `GET /api/`: request format example
/// - `POST /api`, `POST /api/`: answer a question (JSON or form body)
///
/// Every response carries permissive CORS headers, and preflight `OPTIONS` requests are
/// answered directly.
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::extract::{FromRequest, Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Json, Router};
use ta_common::api::{
    AskRequest, AskResponse, ErrorResponse, HealthResponse, IndexResponse, UsageResponse,
};
use serde_json::Value;
use ta_common::error::CommonError;
use tracing::{info, warn};

use crate::answer::{answer, AnswerConfig};
use crate::error::AppError;
use crate::model::Corpus;

const SERVICE_MESSAGE: &str = "TDS Virtual TA API is running";

#[derive(Clone)]
pub struct AppState {
    corpus: Arc<Corpus>,
    answer_config: AnswerConfig,
}

impl AppState {
    pub fn new(corpus: Corpus, answer_config: AnswerConfig) -> Self {
        Self {
            corpus: Arc::new(corpus),
            answer_config,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api", get(usage).post(ask))
        .route("/api/", get(usage).post(ask))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(cors))
}

/// An `AskRequest` read from either a JSON or a URL-encoded form body.
///
/// A body that carries no fields at all (`{}`, `null`, an empty form) is rejected as
/// missing data, the same as one that cannot be parsed. A body with fields but no usable
/// question gets through here and is rejected by the handler.
pub struct AskPayload(pub AskRequest);

impl<S> FromRequest<S> for AskPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        let parsed = if is_form {
            Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| e.body_text())
                .and_then(|Form(fields)| request_from_form(fields))
        } else {
            Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| e.body_text())
                .and_then(|Json(body)| request_from_json(body))
        };

        parsed.map(AskPayload).map_err(|reason| {
            warn!(reason = %reason, "rejected request body");
            AppError::Common(CommonError::MissingData)
        })
    }
}

fn request_from_json(body: Value) -> Result<AskRequest, String> {
    match body {
        Value::Object(fields) if !fields.is_empty() => {
            serde_json::from_value(Value::Object(fields)).map_err(|e| e.to_string())
        }
        _ => Err("empty or non-object JSON body".to_string()),
    }
}

fn request_from_form(mut fields: HashMap<String, String>) -> Result<AskRequest, String> {
    if fields.is_empty() {
        return Err("empty form body".to_string());
    }
    Ok(AskRequest {
        question: fields.remove("question").unwrap_or_default(),
        image: fields.remove("image"),
    })
}

async fn index() -> Json<IndexResponse> {
    let endpoints = BTreeMap::from([
        ("POST /api/".to_string(), "Ask questions".to_string()),
        ("GET /health".to_string(), "Health check".to_string()),
    ]);
    Json(IndexResponse {
        message: SERVICE_MESSAGE.to_string(),
        endpoints,
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: SERVICE_MESSAGE.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn usage() -> Json<UsageResponse> {
    Json(UsageResponse {
        message: "Send a POST request with JSON body".to_string(),
        example: AskRequest::new("Should I use gpt-4o-mini or gpt-3.5-turbo?")
            .with_image("base64_encoded_image_data_optional"),
        status: "ready".to_string(),
    })
}

async fn ask(
    State(state): State<AppState>,
    AskPayload(request): AskPayload,
) -> Result<Json<AskResponse>, AppError> {
    let question = request.validated_question()?;
    info!(question, image = request.image.is_some(), "question received");

    let result = answer(
        &state.corpus,
        question,
        request.image.as_deref(),
        &state.answer_config,
    );
    Ok(Json(result.into()))
}

async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Endpoint not found".to_string(),
        }),
    )
}

async fn cors(req: Request, next: Next) -> Response {
    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };
    apply_cors_headers(response.headers_mut());
    response
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_body_needs_at_least_one_field() {
        assert!(request_from_json(json!({})).is_err());
        assert!(request_from_json(json!(null)).is_err());
        assert!(request_from_json(json!(["question"])).is_err());

        let request = request_from_json(json!({"question": ""})).expect("has a field");
        assert_eq!(request.validated_question(), Err(CommonError::MissingQuestion));

        let request = request_from_json(json!({"question": " GA5? ", "image": "abc"}))
            .expect("parses");
        assert_eq!(request.validated_question(), Ok("GA5?"));
        assert_eq!(request.image.as_deref(), Some("abc"));
    }

    #[test]
    fn form_body_needs_at_least_one_field() {
        assert!(request_from_form(HashMap::new()).is_err());

        let fields = HashMap::from([("image".to_string(), "abc".to_string())]);
        let request = request_from_form(fields).expect("has a field");
        assert!(request.question.is_empty());
        assert_eq!(request.image.as_deref(), Some("abc"));
    }
}
