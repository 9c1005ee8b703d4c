//! Common test utilities for sealwright-reseal
//!
//! - Temporary repositories with metadata documents
//! - The fixture sealing certificate and a decryptor for its envelopes
//! - Mock store and sealer implementations

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod crypto;
pub mod fixtures;
pub mod mocks;

pub use crypto::*;
pub use fixtures::*;
pub use mocks::*;
