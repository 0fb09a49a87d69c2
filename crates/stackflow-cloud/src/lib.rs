//! StackFlow stack reconciliation
//!
//! Drives named stacks on a remote orchestration API toward a desired
//! state: create if missing, update, delete, read outputs and apply small
//! structural patches to a deployed template.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                   Runner                      │
//! │  exists / ready / create / update / delete    │
//! │  outputs / patch                              │
//! └───────┬──────────────────────┬───────────────┘
//!         │                      │
//! ┌───────▼───────┐      ┌───────▼───────┐
//! │ trait StackApi │      │  poll::observe │
//! │ (remote calls) │      │  Clock, cancel │
//! └───────────────┘      └───────────────┘
//! ```
//!
//! Implementations of [`StackApi`] live in provider crates.

pub mod action;
pub mod api;
pub mod cache;
pub mod clock;
pub mod collaborators;
pub mod error;
pub mod patch;
pub mod poll;
pub mod runner;
pub mod status;

// Re-exports
pub use action::ActionType;
pub use api::{
    CAPABILITY_AUTO_EXPAND, CAPABILITY_IAM, CAPABILITY_NAMED_IAM, CreateStackInput, StackApi,
    StackDescription, StackOutput, UpdateStackInput,
};
pub use cache::OutputCache;
pub use clock::{Clock, TokioClock};
pub use error::{CloudError, Result};
pub use patch::{ListAction, ListPatch, PatchOperation};
pub use poll::{Observation, Operation, Transition};
pub use runner::{DEFAULT_POLL_INTERVAL, OutputMatching, OutputProcessor, Runner, RunnerConfig};
pub use status::StackStatus;
pub use tokio_util::sync::CancellationToken;
