//! Scripted [`NodeApi`] double shared by the auth, scheduler, and
//! orchestrator tests.
//!
//! Every operation succeeds by default so tests only script the outcomes
//! they assert on. Scripted results are consumed front to back, one per
//! call; when a queue runs dry the operation falls back to success.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::NodeStats;
use crate::wallet::SignaturePayload;

use super::client::{NodeApi, VerifyResponse};
use super::ApiError;

#[derive(Default)]
pub(crate) struct MockApi {
    verify_calls: AtomicUsize,
    onboard_calls: AtomicUsize,
    check_in_calls: AtomicUsize,
    stats_calls: AtomicUsize,
    verify_token: Mutex<Option<String>>,
    onboard_results: Mutex<VecDeque<Result<(), ApiError>>>,
    check_in_results: Mutex<VecDeque<Result<(), ApiError>>>,
    stats_results: Mutex<VecDeque<Result<NodeStats, ApiError>>>,
    rejected_addresses: Mutex<HashSet<String>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the token returned by verify (default: "token-<call number>").
    pub fn with_token(self, token: &str) -> Self {
        *self.verify_token.lock().unwrap() = Some(token.to_string());
        self
    }

    /// Make verify fail for one wallet address, leaving the others working.
    pub fn reject_verifications_for(&self, address: &str) {
        self.rejected_addresses
            .lock()
            .unwrap()
            .insert(address.to_string());
    }

    pub fn push_onboard(&self, result: Result<(), ApiError>) {
        self.onboard_results.lock().unwrap().push_back(result);
    }

    pub fn push_check_in(&self, result: Result<(), ApiError>) {
        self.check_in_results.lock().unwrap().push_back(result);
    }

    pub fn push_stats(&self, result: Result<NodeStats, ApiError>) {
        self.stats_results.lock().unwrap().push_back(result);
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn onboard_calls(&self) -> usize {
        self.onboard_calls.load(Ordering::SeqCst)
    }

    pub fn check_in_calls(&self) -> usize {
        self.check_in_calls.load(Ordering::SeqCst)
    }

    pub fn stats_calls(&self) -> usize {
        self.stats_calls.load(Ordering::SeqCst)
    }

    fn pop<T>(queue: &Mutex<VecDeque<Result<T, ApiError>>>) -> Option<Result<T, ApiError>> {
        queue.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl NodeApi for MockApi {
    async fn verify(&self, payload: &SignaturePayload) -> Result<VerifyResponse, ApiError> {
        let call = self.verify_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self
            .rejected_addresses
            .lock()
            .unwrap()
            .contains(&payload.address)
        {
            return Err(ApiError::Remote {
                status: 403,
                body: "address is excluded".into(),
            });
        }
        let token = self
            .verify_token
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| format!("token-{call}"));
        Ok(VerifyResponse { token })
    }

    async fn onboard(&self, _address: &str, _token: &str) -> Result<(), ApiError> {
        self.onboard_calls.fetch_add(1, Ordering::SeqCst);
        Self::pop(&self.onboard_results).unwrap_or(Ok(()))
    }

    async fn check_in(&self, _address: &str, _token: &str) -> Result<(), ApiError> {
        self.check_in_calls.fetch_add(1, Ordering::SeqCst);
        Self::pop(&self.check_in_results).unwrap_or(Ok(()))
    }

    async fn node_stats(&self, _address: &str, _token: &str) -> Result<NodeStats, ApiError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        Self::pop(&self.stats_results).unwrap_or_else(|| Ok(NodeStats::default()))
    }
}
