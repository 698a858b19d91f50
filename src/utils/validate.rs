use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// JSON body extractor that also runs `validator` rules.
///
/// Malformed bodies and rule violations both surface as `AppError::BadRequest`,
/// so clients always receive the `{"error": ...}` shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{self, Method, header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Room {
        #[validate(length(min = 2, max = 10, message = "Room code must be between 2 and 10 characters"))]
        code: String,
        #[validate(range(min = 1, max = 500))]
        seats: u32,
    }

    fn json_request(body: &str) -> Request {
        http::Request::builder()
            .method(Method::POST)
            .uri("/rooms")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn valid_body_is_extracted() {
        let req = json_request(r#"{"code": "B201", "seats": 40}"#);
        let ValidatedJson(room) = ValidatedJson::<Room>::from_request(req, &()).await.unwrap();
        assert_eq!(room.code, "B201");
        assert_eq!(room.seats, 40);
    }

    #[tokio::test]
    async fn rule_violation_is_bad_request() {
        let req = json_request(r#"{"code": "B", "seats": 40}"#);
        match ValidatedJson::<Room>::from_request(req, &()).await {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("between 2 and 10")),
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let req = json_request(r#"{"code": "B201", "seats": }"#);
        let result = ValidatedJson::<Room>::from_request(req, &()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn missing_content_type_is_bad_request() {
        let req = http::Request::builder()
            .method(Method::POST)
            .uri("/rooms")
            .body(Body::from(r#"{"code": "B201", "seats": 40}"#))
            .unwrap();
        let result = ValidatedJson::<Room>::from_request(req, &()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
