//! Per-account scheduling: the single-retry auth wrapper and the routine
//! state machine that drives the daily check-in cycle.

pub mod retry;
pub mod routine;

use thiserror::Error;

use crate::api::ApiError;
use crate::auth::AuthError;

pub use retry::with_auth;
pub use routine::{RoutinePhase, RoutineScheduler};

/// Anything that can halt an account pipeline.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
