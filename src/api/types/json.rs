//! JSON extractor whose rejections use the API error body

use axum::{
    extract::{rejection::JsonRejection as AxumJsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

use super::error::ApiError;

static MISSING_FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"missing field `([^`]+)`").unwrap());

#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match AxumJson::<T>::from_request(req, state).await {
            Ok(AxumJson(value)) => Ok(Json(value)),
            Err(rejection) => Err(rejection_error(&rejection)),
        }
    }
}

fn rejection_error(rejection: &AxumJsonRejection) -> ApiError {
    match rejection {
        AxumJsonRejection::JsonDataError(err) => {
            let text = err.body_text();
            match MISSING_FIELD.captures(&text) {
                Some(caps) => ApiError::bad_request(format!("Missing required field: {}", &caps[1])),
                None => ApiError::bad_request(format!("Invalid JSON data: {}", text)),
            }
        }
        AxumJsonRejection::JsonSyntaxError(err) => {
            ApiError::bad_request(format!("Invalid JSON syntax: {}", err.body_text()))
        }
        AxumJsonRejection::MissingJsonContentType(_) => {
            let mut err =
                ApiError::bad_request("Missing Content-Type header. Expected 'application/json'.");
            err.status = StatusCode::UNSUPPORTED_MEDIA_TYPE;
            err
        }
        other => {
            let mut err = ApiError::bad_request(format!("Invalid JSON request: {}", other.body_text()));
            err.status = other.status();
            err
        }
    }
}

impl<T> IntoResponse for Json<T>
where
    T: serde::Serialize,
{
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct PromptBody {
        prompt: String,
    }

    fn request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_field_message() {
        let err = Json::<PromptBody>::from_request(request(r#"{"provider": "openai"}"#), &())
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error, "Missing required field: prompt");
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let err = Json::<PromptBody>::from_request(request(r#"{"prompt": "#), &())
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.response.error.starts_with("Invalid JSON syntax"));
    }

    #[tokio::test]
    async fn test_valid_body() {
        let Json(body) = Json::<PromptBody>::from_request(request(r#"{"prompt": "hi"}"#), &())
            .await
            .unwrap();
        assert_eq!(body.prompt, "hi");
    }
}
