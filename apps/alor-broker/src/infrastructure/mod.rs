//! Infrastructure Layer
//!
//! Adapters for the application ports and the wiring that connects them.
//!
//! - `container`: Explicit dependency-injection container
//! - `paper`: In-memory exchange used for paper sessions and tests

pub mod container;
pub mod paper;

pub use container::{Container, ContainerError};
pub use paper::{PaperCall, PaperExchange, PaperOrder, PaperOrderKind, PaperOrderState};
