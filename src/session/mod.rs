//! Recognition session management
//!
//! This module provides the `RecognitionController` abstraction that manages:
//! - Availability check and construction of the host's recognition engine
//! - Reconciliation of caller intent with engine-initiated session ends
//! - Transcript accumulation (finalized text plus interim suffix)
//! - Localized status notifications

mod controller;
mod state;
mod transcript;

pub use controller::RecognitionController;
pub use state::{SessionPhase, SessionState};
pub use transcript::Transcript;
