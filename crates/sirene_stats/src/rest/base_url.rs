//! Absolute URL of the requested collection, used for paging links

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::convert::Infallible;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// `{scheme}://{host}{path}` of the current request, without the query string.
///
/// The scheme comes from `X-Forwarded-Proto` when a proxy sets it and
/// defaults to `http`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(pub String);

impl BaseUrl {
    fn from_parts(parts: &Parts) -> Self {
        let scheme = parts
            .headers
            .get(FORWARDED_PROTO)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or("http");

        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .or_else(|| parts.uri.authority().map(|authority| authority.as_str()))
            .unwrap_or("localhost");

        Self(format!("{}://{}{}", scheme, host, parts.uri.path()))
    }
}

impl<S> FromRequestParts<S> for BaseUrl
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(request: Request<()>) -> Parts {
        request.into_parts().0
    }

    #[test]
    fn test_host_and_path() {
        let parts = parts(
            Request::get("/stats/activites?page=2")
                .header(header::HOST, "api.example.org:3002")
                .body(())
                .unwrap(),
        );
        assert_eq!(
            BaseUrl::from_parts(&parts).0,
            "http://api.example.org:3002/stats/activites"
        );
    }

    #[test]
    fn test_forwarded_proto() {
        let parts = parts(
            Request::get("/stats/top-activites")
                .header(header::HOST, "api.example.org")
                .header(FORWARDED_PROTO, "https, http")
                .body(())
                .unwrap(),
        );
        assert_eq!(
            BaseUrl::from_parts(&parts).0,
            "https://api.example.org/stats/top-activites"
        );
    }

    #[test]
    fn test_missing_host() {
        let parts = parts(Request::get("/stats/activites").body(()).unwrap());
        assert_eq!(
            BaseUrl::from_parts(&parts).0,
            "http://localhost/stats/activites"
        );
    }
}
