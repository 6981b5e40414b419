//! Bearer-token lifecycle for one account.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::api::{ApiError, NodeApi};
use crate::display::Dashboard;
use crate::wallet::{SigningError, WalletSigner};

use super::Session;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("signing failed: {0}")]
    Signing(#[from] SigningError),

    #[error("verification failed: {0}")]
    Verify(#[from] ApiError),

    #[error("not authenticated")]
    NotAuthenticated,
}

/// Owns one account's [`Session`] and knows how to (re)establish it.
///
/// Authentication signs the fixed terms message and exchanges it for a
/// bearer token at the verify endpoint. The private key never leaves the
/// signer and never appears in any log line.
pub struct AuthManager<A> {
    api: Arc<A>,
    signer: WalletSigner,
    session: Session,
    account: usize,
    dashboard: Arc<dyn Dashboard>,
}

impl<A: NodeApi> AuthManager<A> {
    pub fn new(
        api: Arc<A>,
        signer: WalletSigner,
        account: usize,
        dashboard: Arc<dyn Dashboard>,
    ) -> Self {
        Self {
            api,
            signer,
            session: Session::new(),
            account,
            dashboard,
        }
    }

    /// Establish a fresh session: clear, sign, verify, populate.
    ///
    /// There is no recoverable failure for verify itself; any error here is
    /// terminal for the attempt and is surfaced with whatever detail the
    /// remote side provided.
    pub async fn authenticate(&mut self) -> Result<(), AuthError> {
        self.session.clear();

        let payload = self.signer.sign_terms()?;
        self.dashboard.log(
            self.account,
            &format!("Attempting verification for address: {}", payload.address),
        );

        match self.api.verify(&payload).await {
            Ok(response) => {
                self.session.set(payload.address, response.token);
                self.dashboard
                    .log(self.account, "User verification successful");
                Ok(())
            }
            Err(e) => {
                match &e {
                    ApiError::Remote { status, body } => {
                        self.dashboard.log(
                            self.account,
                            &format!("Verification failed: status {status}: {body}"),
                        );
                    }
                    other => {
                        self.dashboard
                            .log(self.account, &format!("Verification failed: {other}"));
                    }
                }
                warn!(account = self.account + 1, error = %e, "Verification failed");
                Err(AuthError::Verify(e))
            }
        }
    }

    /// Re-establish the session after the remote side rejected the token.
    pub async fn reauthenticate(&mut self) -> Result<(), AuthError> {
        self.dashboard
            .log(self.account, "Token expired. Attempting to refresh...");
        self.authenticate().await
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
