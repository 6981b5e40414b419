//! The one place unauthorized-retry logic lives.
//!
//! Authenticated operations themselves carry no retry code; they surface
//! [`ApiError::Unauthorized`] and this wrapper decides what happens next.

use std::future::Future;

use crate::api::{ApiError, NodeApi};
use crate::auth::{AuthError, AuthManager};

use super::SessionError;

/// Run an authenticated operation, refreshing the session at most once.
///
/// The operation receives the current wallet address and bearer token. If it
/// fails unauthorized, the session is re-established and the operation runs
/// exactly one more time; a second failure of any kind propagates. Every
/// other error propagates immediately. Bounded by construction - there is no
/// loop and no recursion here.
pub async fn with_auth<A, T, F, Fut>(
    auth: &mut AuthManager<A>,
    mut op: F,
) -> Result<T, SessionError>
where
    A: NodeApi,
    F: FnMut(String, String) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    if !auth.is_authenticated() {
        auth.authenticate().await?;
    }
    let (address, token) = auth
        .session()
        .credentials()
        .ok_or(AuthError::NotAuthenticated)?;

    match op(address, token).await {
        Ok(value) => Ok(value),
        Err(ApiError::Unauthorized) => {
            auth.reauthenticate().await?;
            let (address, token) = auth
                .session()
                .credentials()
                .ok_or(AuthError::NotAuthenticated)?;
            op(address, token).await.map_err(SessionError::Api)
        }
        Err(e) => Err(SessionError::Api(e)),
    }
}
