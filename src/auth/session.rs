use chrono::{DateTime, Utc};

/// One account's authentication state.
///
/// A session is either cleared (the initial and re-authenticating state) or
/// fully populated by a successful verify call. `set` is the only way to
/// populate it, which is what keeps the token-implies-address invariant: a
/// bearer token can never exist without the wallet address it was issued to.
#[derive(Default)]
pub struct Session {
    wallet_address: Option<String>,
    bearer_token: Option<String>,
    authenticated_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the session from a successful verification.
    pub fn set(&mut self, wallet_address: String, bearer_token: String) {
        self.wallet_address = Some(wallet_address);
        self.bearer_token = Some(bearer_token);
        self.authenticated_at = Some(Utc::now());
    }

    /// Drop the token and address, returning to the cleared state.
    pub fn clear(&mut self) {
        self.wallet_address = None;
        self.bearer_token = None;
        self.authenticated_at = None;
    }

    pub fn wallet_address(&self) -> Option<&str> {
        self.wallet_address.as_deref()
    }

    /// Get the bearer token if the session is populated.
    pub fn token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    pub fn authenticated_at(&self) -> Option<DateTime<Utc>> {
        self.authenticated_at
    }

    pub fn is_authenticated(&self) -> bool {
        self.bearer_token.is_some()
    }

    /// Address and token together, for building an authenticated call.
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.wallet_address, &self.bearer_token) {
            (Some(address), Some(token)) => Some((address.clone(), token.clone())),
            _ => None,
        }
    }
}
