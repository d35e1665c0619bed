#![forbid(unsafe_code)]
#![doc = "Deterministic random bit generators (NIST SP 800-90A) for randkit."]

//! Provides the three SP 800-90A mechanisms over a configurable primitive:
//!
//! - Hash-DRBG (Section 10.1.1) — SHA-1, SHA-256, SHA-384, SHA-512
//! - HMAC-DRBG (Section 10.1.2) — HMAC over the same hash set
//! - CTR-DRBG with derivation function (Section 10.2.1) — AES-128/192/256
//!
//! All mechanisms support personalization strings, per-request additional
//! input, explicit reseeding, and optional prediction resistance. The
//! [`state::Drbg`] type is the mechanism core; [`rng`] exposes the
//! process-global instance behind a mutex, with fork detection.

pub mod chain;
pub mod entropy;
pub mod rng;
pub mod state;

mod ctr_drbg;
mod df;
mod hash_drbg;
mod hmac_drbg;
mod mech;
mod prim;
mod selftest;
mod util;

pub use randkit_types::{flags, RandomLevel, RngError, SelftestError};
pub use state::Drbg;
