//! Chain integrity predicates.
//!
//! This module implements the tamper-evidence checks run when a chain is
//! loaded and on demand:
//!
//! - [`integrity::HashValidity`]: each block's stored hash equals the
//!   digest of its canonical content.
//! - [`integrity::LinkValidity`]: each block's `prev_hash` equals the
//!   previous block's stored hash, and the first block carries the `"0"`
//!   sentinel.
//!
//! Predicates implement [`validator::BlockValidator`] and compose with
//! [`validator::CombinedValidator`].

pub mod integrity;
pub mod validator;

pub use integrity::{DefaultValidator, HashValidity, LinkValidity, is_valid, validate_chain, validate_with};
pub use validator::{BlockValidator, CombinedValidator};
