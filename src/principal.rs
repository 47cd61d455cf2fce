use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};

/// The acting principal for a request
///
/// Principals are passed explicitly into every layer that makes ownership
/// or quota decisions; nothing reads the acting user from ambient state.
/// The extractor never rejects: requests with missing or malformed identity
/// headers are treated as anonymous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The ID of the authenticated user, if any
    pub user_id: Option<String>,

    /// Whether the principal has administrative rights
    pub admin: bool,
}

impl Principal {
    /// Creates an anonymous principal
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            admin: false,
        }
    }

    /// Creates an authenticated, non-admin principal
    pub fn user(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            admin: false,
        }
    }

    /// Creates an authenticated admin principal
    pub fn admin(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            admin: true,
        }
    }

    /// Whether this principal carries no user identity
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }

    /// Whether this principal has administrative rights
    pub fn is_admin(&self) -> bool {
        self.admin
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        let admin = parts
            .headers
            .get("x-admin")
            .and_then(|value| value.to_str().ok())
            .map(|value| {
                let value = value.trim();
                value == "1" || value.eq_ignore_ascii_case("true")
            })
            .unwrap_or(false);

        Ok(Self { user_id, admin })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Principal {
        let (mut parts, ()) = request.into_parts();
        Principal::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_missing_headers_give_anonymous() {
        let request = Request::builder().body(()).unwrap();

        let principal = extract(request).await;
        assert!(principal.is_anonymous());
        assert!(!principal.is_admin());
    }

    #[tokio::test]
    async fn test_user_header_is_read() {
        let request = Request::builder()
            .header("X-User-Id", "alice")
            .body(())
            .unwrap();

        let principal = extract(request).await;
        assert_eq!(principal.user_id, Some("alice".to_string()));
        assert!(!principal.is_admin());
    }

    #[tokio::test]
    async fn test_admin_header_forms() {
        for value in ["1", "true", "TRUE"] {
            let request = Request::builder()
                .header("X-User-Id", "root")
                .header("X-Admin", value)
                .body(())
                .unwrap();
            assert!(extract(request).await.is_admin(), "value {:?}", value);
        }

        let request = Request::builder()
            .header("X-User-Id", "root")
            .header("X-Admin", "yes")
            .body(())
            .unwrap();
        assert!(!extract(request).await.is_admin());
    }

    #[tokio::test]
    async fn test_blank_user_header_is_anonymous() {
        let request = Request::builder()
            .header("X-User-Id", "   ")
            .body(())
            .unwrap();

        let principal = extract(request).await;
        assert!(principal.is_anonymous());
    }
}
