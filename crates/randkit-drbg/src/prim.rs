//! Primitive adapters.
//!
//! Thin contracts invoking a hash, an HMAC, or a single ECB block
//! encryption on behalf of the mechanisms. The primitives themselves come
//! from the RustCrypto crates; every adapter accepts its input as a
//! sequence of byte segments so callers can pass logical concatenations
//! without copying.

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::digest::Digest;
use sha2::{Sha256, Sha384, Sha512};

use aes::cipher::{BlockEncrypt, KeyInit as CipherKeyInit};
use aes::{Aes128Enc, Aes192Enc, Aes256Enc, Block};

use randkit_types::RngError;

/// Largest hash output handled by the mechanisms (SHA-512).
pub(crate) const MAX_OUTLEN: usize = 64;

/// AES block size in bytes.
pub(crate) const AES_BLOCK_LEN: usize = 16;

/// Hash primitive selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlg {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlg {
    /// Digest size in bytes.
    pub fn output_len(self) -> usize {
        match self {
            HashAlg::Sha1 => 20,
            HashAlg::Sha256 => 32,
            HashAlg::Sha384 => 48,
            HashAlg::Sha512 => 64,
        }
    }
}

/// Block cipher primitive selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherAlg {
    Aes128,
    Aes192,
    Aes256,
}

impl CipherAlg {
    /// Key size in bytes.
    pub fn key_len(self) -> usize {
        match self {
            CipherAlg::Aes128 => 16,
            CipherAlg::Aes192 => 24,
            CipherAlg::Aes256 => 32,
        }
    }
}

fn digest_segments<'a, D, I>(segments: I, out: &mut [u8])
where
    D: Digest,
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut h = D::new();
    for seg in segments {
        h.update(seg);
    }
    out.copy_from_slice(&h.finalize());
}

/// Hash the concatenation of `segments` into `out`.
///
/// `out` must be exactly the digest size of `alg`.
pub(crate) fn hash<'a, I>(alg: HashAlg, segments: I, out: &mut [u8])
where
    I: IntoIterator<Item = &'a [u8]>,
{
    debug_assert_eq!(out.len(), alg.output_len());
    match alg {
        HashAlg::Sha1 => digest_segments::<Sha1, _>(segments, out),
        HashAlg::Sha256 => digest_segments::<Sha256, _>(segments, out),
        HashAlg::Sha384 => digest_segments::<Sha384, _>(segments, out),
        HashAlg::Sha512 => digest_segments::<Sha512, _>(segments, out),
    }
}

fn mac_segments<'a, M, I>(key: &[u8], segments: I, out: &mut [u8]) -> Result<(), RngError>
where
    M: Mac + KeyInit,
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut mac = <M as Mac>::new_from_slice(key)
        .map_err(|_| RngError::PrimitiveFail("hmac key setup"))?;
    for seg in segments {
        mac.update(seg);
    }
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(())
}

/// HMAC the concatenation of `segments` under `key` into `out`.
///
/// `out` must be exactly the digest size of `alg`; the key may be any
/// length up to the mechanism state length.
pub(crate) fn hmac<'a, I>(
    alg: HashAlg,
    key: &[u8],
    segments: I,
    out: &mut [u8],
) -> Result<(), RngError>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    debug_assert_eq!(out.len(), alg.output_len());
    match alg {
        HashAlg::Sha1 => mac_segments::<Hmac<Sha1>, _>(key, segments, out),
        HashAlg::Sha256 => mac_segments::<Hmac<Sha256>, _>(key, segments, out),
        HashAlg::Sha384 => mac_segments::<Hmac<Sha384>, _>(key, segments, out),
        HashAlg::Sha512 => mac_segments::<Hmac<Sha512>, _>(key, segments, out),
    }
}

/// Encrypt a single block with AES in ECB mode.
///
/// `input` and `out` must both be one block long.
pub(crate) fn block_encrypt(
    alg: CipherAlg,
    key: &[u8],
    input: &[u8],
    out: &mut [u8],
) -> Result<(), RngError> {
    if input.len() != AES_BLOCK_LEN || out.len() != AES_BLOCK_LEN {
        return Err(RngError::InvalidArg);
    }
    let mut block = Block::clone_from_slice(input);
    match alg {
        CipherAlg::Aes128 => {
            let cipher = <Aes128Enc as CipherKeyInit>::new_from_slice(key)
                .map_err(|_| RngError::PrimitiveFail("aes-128 key setup"))?;
            cipher.encrypt_block(&mut block);
        }
        CipherAlg::Aes192 => {
            let cipher = <Aes192Enc as CipherKeyInit>::new_from_slice(key)
                .map_err(|_| RngError::PrimitiveFail("aes-192 key setup"))?;
            cipher.encrypt_block(&mut block);
        }
        CipherAlg::Aes256 => {
            let cipher = <Aes256Enc as CipherKeyInit>::new_from_slice(key)
                .map_err(|_| RngError::PrimitiveFail("aes-256 key setup"))?;
            cipher.encrypt_block(&mut block);
        }
    }
    out.copy_from_slice(&block);
    Ok(())
}
