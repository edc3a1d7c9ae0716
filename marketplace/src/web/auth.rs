use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::web::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Identity resolved by the upstream auth gateway. The backend trusts the
/// forwarded header; credential checks happen before requests reach us.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ApiError::Unauthorized)?;
        Ok(AuthUser(user_id))
    }
}
