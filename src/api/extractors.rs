//! Request extractors shared by the diary handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::UserId;
use crate::error::DiaryError;

/// Header carrying the authenticated user, set by the upstream auth layer.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user on whose behalf the request runs.
///
/// Rejects with [`DiaryError::Unauthorized`] when the header is missing,
/// blank, or not valid UTF-8.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserId);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = DiaryError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(UserId::parse)
            .map(Self)
            .ok_or(DiaryError::Unauthorized)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<CurrentUser, DiaryError> {
        let mut builder = Request::builder().uri("/api/v1/diary");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        let Ok(request) = builder.body(()) else {
            return Err(DiaryError::Internal("request build failed".to_string()));
        };
        let (mut parts, ()) = request.into_parts();
        CurrentUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn header_identifies_the_user() {
        let Ok(CurrentUser(user)) = extract(Some(" user-42 ")).await else {
            panic!("header should be accepted");
        };
        assert_eq!(user.as_str(), "user-42");
    }

    #[tokio::test]
    async fn missing_or_blank_header_is_unauthorized() {
        assert!(matches!(extract(None).await, Err(DiaryError::Unauthorized)));
        assert!(matches!(extract(Some("   ")).await, Err(DiaryError::Unauthorized)));
    }
}
