//! Identity facade: resolves the calling principal.
//!
//! Authentication itself happens upstream; the gateway injects the resolved
//! identity as headers on every proxied request. This extractor is the only
//! place those headers are read.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::Error;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ROLE_HEADER: &str = "x-user-role";

/// The authenticated actor behind a request.
#[derive(Clone, Copy, Debug)]
pub struct Principal {
    pub user_id: Uuid,
    pub admin: bool,
}

impl Principal {
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.admin {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
            .ok_or(Error::Unauthorized)?;
        let admin = parts
            .headers
            .get(ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|role| role.eq_ignore_ascii_case("admin"));
        Ok(Principal { user_id, admin })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<Principal, Error> {
        let (mut parts, ()) = request.into_parts();
        Principal::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_user_principal() {
        let id = Uuid::new_v4();
        let request = Request::builder()
            .header(USER_ID_HEADER, id.to_string())
            .body(())
            .unwrap();
        let principal = extract(request).await.unwrap();
        assert_eq!(principal.user_id, id);
        assert!(!principal.admin);
        assert!(principal.require_admin().is_err());
    }

    #[tokio::test]
    async fn test_admin_principal() {
        let request = Request::builder()
            .header(USER_ID_HEADER, Uuid::new_v4().to_string())
            .header(ROLE_HEADER, "admin")
            .body(())
            .unwrap();
        let principal = extract(request).await.unwrap();
        assert!(principal.admin);
        assert!(principal.require_admin().is_ok());
    }

    #[tokio::test]
    async fn test_missing_or_malformed_identity() {
        let missing = Request::builder().body(()).unwrap();
        assert!(matches!(extract(missing).await, Err(Error::Unauthorized)));

        let malformed = Request::builder()
            .header(USER_ID_HEADER, "not-a-uuid")
            .body(())
            .unwrap();
        assert!(matches!(extract(malformed).await, Err(Error::Unauthorized)));
    }
}
