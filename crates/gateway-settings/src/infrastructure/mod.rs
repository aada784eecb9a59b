//! Infrastructure layer: file-system persistence and environment resolution.
//!
//! **Dependency rule**: this layer may depend on `domain`, but the domain
//! never imports it.  The application layer reaches storage only through the
//! [`storage::DocumentStorage`] trait.

pub mod paths;
pub mod storage;
