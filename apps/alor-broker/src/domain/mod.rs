//! Domain Layer
//!
//! Business types and pure services with no I/O. Everything that talks to the
//! exchange lives in the application layer behind ports.
//!
//! # Bounded Contexts
//!
//! - [`order`]: Order aggregate, status lifecycle, validation vocabulary
//! - [`linking`]: OCO pairs and bracket (parent/children) chains
//! - [`instrument`]: Symbol metadata and price translation
//! - [`position`]: Position merge arithmetic and cash/value pairs
//! - [`shared`]: Typed identifiers

pub mod instrument;
pub mod linking;
pub mod order;
pub mod position;
pub mod shared;
