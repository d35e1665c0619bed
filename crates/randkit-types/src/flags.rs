//! DRBG selection flags.
//!
//! A DRBG configuration is an OR of one mechanism-family bit and one
//! primitive bit, optionally combined with [`DRBG_PREDICTION_RESIST`].
//! The `DRBG_NOPR_*` / `DRBG_PR_*` composites below name every supported
//! combination. Flags of 0 mean "keep the previously selected mechanism"
//! on re-initialization.

/// CTR mechanism family (AES core).
pub const DRBG_CTRAES: u32 = 1 << 0;

/// Hash mechanism over SHA-1.
pub const DRBG_HASHSHA1: u32 = 1 << 4;
/// Hash mechanism over SHA-256.
pub const DRBG_HASHSHA256: u32 = 1 << 5;
/// Hash mechanism over SHA-384.
pub const DRBG_HASHSHA384: u32 = 1 << 6;
/// Hash mechanism over SHA-512.
pub const DRBG_HASHSHA512: u32 = 1 << 7;

/// HMAC mechanism family; combined with one `DRBG_HASHSHA*` bit.
pub const DRBG_HMAC: u32 = 1 << 8;

/// AES-128 key size for the CTR family.
pub const DRBG_SYM128: u32 = 1 << 11;
/// AES-192 key size for the CTR family.
pub const DRBG_SYM192: u32 = 1 << 12;
/// AES-256 key size for the CTR family.
pub const DRBG_SYM256: u32 = 1 << 13;

/// Request a reseed before every generate call.
pub const DRBG_PREDICTION_RESIST: u32 = 1 << 28;

/// All bits selecting a hash-based mechanism (Hash or HMAC families).
pub const DRBG_HASH_MASK: u32 =
    DRBG_HASHSHA1 | DRBG_HASHSHA256 | DRBG_HASHSHA384 | DRBG_HASHSHA512 | DRBG_HMAC;
/// All bits selecting a CTR mechanism.
pub const DRBG_CTR_MASK: u32 = DRBG_CTRAES | DRBG_SYM128 | DRBG_SYM192 | DRBG_SYM256;
/// The (family, primitive) selection bits used for descriptor lookup.
pub const DRBG_CIPHER_MASK: u32 = DRBG_HASH_MASK | DRBG_CTR_MASK;

// Composites without prediction resistance.
pub const DRBG_NOPR_CTRAES128: u32 = DRBG_CTRAES | DRBG_SYM128;
pub const DRBG_NOPR_CTRAES192: u32 = DRBG_CTRAES | DRBG_SYM192;
pub const DRBG_NOPR_CTRAES256: u32 = DRBG_CTRAES | DRBG_SYM256;
pub const DRBG_NOPR_HASHSHA1: u32 = DRBG_HASHSHA1;
pub const DRBG_NOPR_HASHSHA256: u32 = DRBG_HASHSHA256;
pub const DRBG_NOPR_HASHSHA384: u32 = DRBG_HASHSHA384;
pub const DRBG_NOPR_HASHSHA512: u32 = DRBG_HASHSHA512;
pub const DRBG_NOPR_HMACSHA1: u32 = DRBG_HMAC | DRBG_HASHSHA1;
pub const DRBG_NOPR_HMACSHA256: u32 = DRBG_HMAC | DRBG_HASHSHA256;
pub const DRBG_NOPR_HMACSHA384: u32 = DRBG_HMAC | DRBG_HASHSHA384;
pub const DRBG_NOPR_HMACSHA512: u32 = DRBG_HMAC | DRBG_HASHSHA512;

// Composites with prediction resistance.
pub const DRBG_PR_CTRAES128: u32 = DRBG_PREDICTION_RESIST | DRBG_NOPR_CTRAES128;
pub const DRBG_PR_CTRAES192: u32 = DRBG_PREDICTION_RESIST | DRBG_NOPR_CTRAES192;
pub const DRBG_PR_CTRAES256: u32 = DRBG_PREDICTION_RESIST | DRBG_NOPR_CTRAES256;
pub const DRBG_PR_HASHSHA1: u32 = DRBG_PREDICTION_RESIST | DRBG_NOPR_HASHSHA1;
pub const DRBG_PR_HASHSHA256: u32 = DRBG_PREDICTION_RESIST | DRBG_NOPR_HASHSHA256;
pub const DRBG_PR_HASHSHA384: u32 = DRBG_PREDICTION_RESIST | DRBG_NOPR_HASHSHA384;
pub const DRBG_PR_HASHSHA512: u32 = DRBG_PREDICTION_RESIST | DRBG_NOPR_HASHSHA512;
pub const DRBG_PR_HMACSHA1: u32 = DRBG_PREDICTION_RESIST | DRBG_NOPR_HMACSHA1;
pub const DRBG_PR_HMACSHA256: u32 = DRBG_PREDICTION_RESIST | DRBG_NOPR_HMACSHA256;
pub const DRBG_PR_HMACSHA384: u32 = DRBG_PREDICTION_RESIST | DRBG_NOPR_HMACSHA384;
pub const DRBG_PR_HMACSHA512: u32 = DRBG_PREDICTION_RESIST | DRBG_NOPR_HMACSHA512;

/// Strength class requested by callers of the random facade.
///
/// The DRBG serves every level from the same instance; the discriminants
/// are part of the public contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum RandomLevel {
    Weak = 0,
    Strong = 1,
    VeryStrong = 2,
}
