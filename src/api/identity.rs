//! Caller identity supplied by the upstream authentication layer.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::UserId;
use crate::error::GatewayError;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user on whose behalf a request runs.
///
/// Authentication happens before requests reach the gateway; this
/// extractor only reads the id the authenticating proxy forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .map(|id| Self(UserId::new(id)))
            .ok_or(GatewayError::MissingIdentity)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(header: Option<&str>) -> Result<AuthenticatedUser, GatewayError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        let Ok(request) = builder.body(()) else {
            panic!("request build failed");
        };
        let (mut parts, ()) = request.into_parts();
        AuthenticatedUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn reads_numeric_user_id() {
        let Ok(user) = extract(Some("42")).await else {
            panic!("extraction failed");
        };
        assert_eq!(user, AuthenticatedUser(UserId::new(42)));
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        assert!(matches!(
            extract(None).await,
            Err(GatewayError::MissingIdentity)
        ));
    }

    #[tokio::test]
    async fn non_numeric_header_is_rejected() {
        assert!(matches!(
            extract(Some("alice")).await,
            Err(GatewayError::MissingIdentity)
        ));
    }
}
