use axum::{
    extract::{FromRequestParts, Query as QueryExtractor, Path as PathExtractor},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Path extractor whose rejection renders as `{"error": ...}`.
#[derive(Debug, Clone, Copy)]
pub struct Path<T>(pub T);

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let PathExtractor(value) = PathExtractor::<T>::from_request_parts(parts, state).await?;
        Ok(Path(value))
    }
}

/// Query-string extractor whose rejection renders as `{"error": ...}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let QueryExtractor(value) = QueryExtractor::<T>::from_request_parts(parts, state).await?;
        Ok(Query(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{self, StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Window {
        room: Option<String>,
        seats: Option<u32>,
    }

    fn parts(uri: &str) -> Parts {
        http::Request::builder().uri(uri).body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn query_values_are_extracted() {
        let mut parts = parts("/rooms?room=B201&seats=40");
        let Query(window) = Query::<Window>::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(window.room.as_deref(), Some("B201"));
        assert_eq!(window.seats, Some(40));
    }

    #[tokio::test]
    async fn bad_query_value_is_a_bad_request() {
        let mut parts = parts("/rooms?seats=many");
        let err = Query::<Window>::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_route_params_are_a_bad_request() {
        // Outside a router there are no matched params to deserialize
        let mut parts = parts("/rooms/12");
        let err = Path::<i64>::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
