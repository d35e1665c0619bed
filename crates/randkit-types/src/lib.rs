#![forbid(unsafe_code)]
#![doc = "Common types, error codes, and DRBG selection flags for randkit."]

pub mod error;
pub mod flags;

pub use error::*;
pub use flags::*;
