//! Request extractors whose rejections use the API's JSON error body.

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::error::ServerError;

/// Path parameters; a malformed segment is a 400.
#[derive(Debug, Clone, Copy)]
pub struct Path<T>(pub T);

impl<S, T> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        axum::extract::Path::<T>::from_request_parts(parts, state)
            .await
            .map(|axum::extract::Path(value)| Self(value))
            .map_err(|e| ServerError::BadRequest(e.body_text()))
    }
}

/// Query string parameters; an unparsable query is a 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

impl<S, T> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        axum::extract::Query::<T>::from_request_parts(parts, state)
            .await
            .map(|axum::extract::Query(value)| Self(value))
            .map_err(|e| ServerError::BadRequest(e.body_text()))
    }
}

/// JSON request body; a missing content type or bad payload is a 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        axum::Json::<T>::from_request(req, state)
            .await
            .map(|axum::Json(value)| Self(value))
            .map_err(|e| ServerError::BadRequest(e.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{self, StatusCode};
    use axum::response::IntoResponse;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Flags {
        limit: u32,
    }

    fn status_of(err: ServerError) -> StatusCode {
        err.into_response().status()
    }

    #[tokio::test]
    async fn bad_query_is_bad_request() {
        let (mut parts, ()) = http::Request::builder()
            .uri("/x?limit=many")
            .body(())
            .unwrap()
            .into_parts();
        let err = Query::<Flags>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);

        let (mut parts, ()) = http::Request::builder()
            .uri("/x?limit=3")
            .body(())
            .unwrap()
            .into_parts();
        let Query(flags) = Query::<Flags>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(flags.limit, 3);
    }

    #[tokio::test]
    async fn json_without_content_type_is_bad_request() {
        let req = http::Request::builder()
            .body(Body::from(r#"{"limit": 1}"#))
            .unwrap();
        let err = JsonBody::<Flags>::from_request(req, &()).await.unwrap_err();
        match &err {
            ServerError::BadRequest(msg) => assert!(msg.contains("Content-Type"), "{msg}"),
            other => panic!("expected BadRequest, got {other:?}"),
        }
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }
}
