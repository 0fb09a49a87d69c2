//! StackFlow template composition
//!
//! Builds CloudFormation template documents from typed resources.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                    Composers                      │
//! │  Vpc | ManagedPolicy | SecurityGroup | ...        │
//! └─────────────────┬────────────────────────────────┘
//!                   │ Composition (resources, outputs, transform)
//! ┌─────────────────▼────────────────────────────────┐
//! │                    Builder                        │
//! │  collision checks, transform merge, JSON output   │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Address planning (`address`) and stack naming (`namer`) are independent
//! helpers used by the composers and by callers deciding where to deploy.

pub mod address;
pub mod builder;
pub mod composers;
pub mod composition;
pub mod error;
pub mod intrinsic;
pub mod namer;
pub mod output;
pub mod regions;
pub mod resource;
pub mod resources;

// Re-exports
pub use builder::{Builder, Template};
pub use composition::{Composer, Composition, Transform};
pub use error::{NameKind, Result, TemplateError};
pub use intrinsic::Intrinsic;
pub use namer::{DEFAULT_PREFIX, Purpose, StackNamer};
pub use output::Output;
pub use resource::{Handle, Link, Resolver, Resource};
