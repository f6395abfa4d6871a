//! # Strata Core Kernel
//!
//! The `kernel` module owns one bootstrap run and the pieces shared by every
//! other subsystem.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Application Bootstrapping**: [`Application`](bootstrap::Application) and its
//!   [`ApplicationBuilder`](bootstrap::ApplicationBuilder) run discovery, ordering and
//!   activation, then expose the lifecycle phases.
//! - **Service Container**: [`ServiceContainer`](container::ServiceContainer) keeps
//!   activated modules and services registered by modules, keyed by type.
//! - **Core Constants**: API version and plugin symbol names in `constants`.
//! - **Error Handling**: the aggregate [`Error`](error::Error) and `Result` alias.
pub mod bootstrap;
pub mod constants;
pub mod container;
pub mod error;

pub use bootstrap::{Application, ApplicationBuilder};
pub use container::{ContainerError, ServiceContainer};
pub use error::{BoxError, Error, Result};
