use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::HOST;
use axum::http::request::Parts;

use super::AppState;

/// Builds absolute links to stored files for the current request.
///
/// The base is `server.external_url` when configured; otherwise it is taken
/// from the request's `Host` header and `X-Forwarded-Proto` (default `http`).
#[derive(Debug, Clone)]
pub struct MediaUrls {
    base: String,
}

impl MediaUrls {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_owned(),
        }
    }

    pub fn file(&self, key: &str) -> String {
        format!("{}/media/{key}", self.base)
    }

    fn from_parts(parts: &Parts) -> Self {
        let host = parts
            .headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .or_else(|| parts.uri.authority().map(ToString::to_string))
            .unwrap_or_else(|| "localhost".to_owned());
        let scheme = parts
            .headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or("http");
        Self::new(&format!("{scheme}://{host}"))
    }
}

impl FromRequestParts<AppState> for MediaUrls {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(match state.external_url.as_deref() {
            Some(base) => Self::new(base),
            None => Self::from_parts(parts),
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/v1/rounds/1/status");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn host_header_with_default_scheme() {
        let urls = MediaUrls::from_parts(&parts(&[("host", "sign.local:8080")]));
        assert_eq!(
            urls.file("documents/a.pdf"),
            "http://sign.local:8080/media/documents/a.pdf"
        );
    }

    #[test]
    fn forwarded_proto_is_honoured() {
        let urls = MediaUrls::from_parts(&parts(&[
            ("host", "sign.example.com"),
            ("x-forwarded-proto", "https, http"),
        ]));
        assert_eq!(urls.file("k"), "https://sign.example.com/media/k");
    }

    #[test]
    fn missing_host_falls_back_to_localhost() {
        let urls = MediaUrls::from_parts(&parts(&[]));
        assert_eq!(urls.file("k"), "http://localhost/media/k");
    }

    #[test]
    fn configured_base_trims_trailing_slash() {
        let urls = MediaUrls::new("https://cdn.example.com/");
        assert_eq!(urls.file("k"), "https://cdn.example.com/media/k");
    }
}
