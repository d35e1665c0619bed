//! Derivation functions (SP 800-90A section 10.3).
//!
//! `hash_df` compresses arbitrary-length input to a requested length with
//! counter-mode hashing; `block_cipher_df` does the same with AES via BCC
//! (CBC-MAC without output truncation).

use crate::chain::InputChain;
use crate::prim::{self, CipherAlg, HashAlg, AES_BLOCK_LEN, MAX_OUTLEN};
use core::iter::once;
use randkit_types::RngError;
use zeroize::Zeroize;

/// Hash_df (section 10.3.1): fill `out` from the concatenated `input`.
///
/// The input iterator is re-read once per produced hash block, so it must
/// be cheaply cloneable. The single-byte counter limits the construction
/// to 255 blocks; callers request at most seedlen bytes, well below that.
pub(crate) fn hash_df<'a, I>(alg: HashAlg, input: I, out: &mut [u8])
where
    I: Iterator<Item = &'a [u8]> + Clone,
{
    let outlen = alg.output_len();
    // counter || BE32(bits to return)
    let mut prefix = [0u8; 5];
    prefix[0] = 1;
    prefix[1..].copy_from_slice(&((out.len() as u32) * 8).to_be_bytes());

    let mut tmp = [0u8; MAX_OUTLEN];
    let mut len = 0;
    while len < out.len() {
        let chained = once(&prefix[..]).chain(input.clone().map(|s| s as &[u8]));
        prim::hash(alg, chained, &mut tmp[..outlen]);
        prefix[0] = prefix[0].wrapping_add(1);
        let take = outlen.min(out.len() - len);
        out[len..len + take].copy_from_slice(&tmp[..take]);
        len += take;
    }
    tmp.zeroize();
}

/// BCC (section 10.3.3): CBC-MAC over the concatenated `input` without
/// truncation. The input must be block-aligned, which the caller
/// guarantees by construction of S.
fn bcc<'a, I>(alg: CipherAlg, key: &[u8], input: I, out: &mut [u8]) -> Result<(), RngError>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut chaining = [0u8; AES_BLOCK_LEN];
    let mut block = [0u8; AES_BLOCK_LEN];
    let mut fill = 0;
    for seg in input {
        for &byte in seg {
            block[fill] = byte;
            fill += 1;
            if fill == AES_BLOCK_LEN {
                for (b, c) in block.iter_mut().zip(chaining.iter()) {
                    *b ^= *c;
                }
                if let Err(e) = prim::block_encrypt(alg, key, &block, &mut chaining) {
                    block.zeroize();
                    chaining.zeroize();
                    return Err(e);
                }
                fill = 0;
            }
        }
    }
    debug_assert_eq!(fill, 0);
    out.copy_from_slice(&chaining);
    block.zeroize();
    chaining.zeroize();
    Ok(())
}

/// Block_Cipher_df (section 10.3.2): fill `out` from the concatenated
/// `input` using AES.
///
/// The output length is capped at 512/8 bytes; callers request at most
/// seedlen (48).
pub(crate) fn block_cipher_df(
    alg: CipherAlg,
    input: InputChain<'_>,
    out: &mut [u8],
) -> Result<(), RngError> {
    let bytes_to_return = out.len();
    if bytes_to_return > 512 / 8 {
        return Err(RngError::InvalidArg);
    }
    let keylen = alg.key_len();

    // L_N = BE32(input length) || BE32(bytes to return)
    let inputlen = input.total_len();
    let mut l_n = [0u8; 8];
    l_n[..4].copy_from_slice(&(inputlen as u32).to_be_bytes());
    l_n[4..].copy_from_slice(&(bytes_to_return as u32).to_be_bytes());

    // S = L_N || input || 0x80 || zero padding to a block multiple; the
    // BCC input additionally carries the per-round IV block in front.
    let mut padlen = (inputlen + l_n.len() + 1) % AES_BLOCK_LEN;
    if padlen != 0 {
        padlen = AES_BLOCK_LEN - padlen;
    }
    padlen += 1;
    let mut pad = [0u8; AES_BLOCK_LEN];
    pad[0] = 0x80;

    const DF_KEY: [u8; 32] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
        0x0e, 0x0f, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b,
        0x1c, 0x1d, 0x1e, 0x1f,
    ];

    // Derive keylen + blocklen bytes of intermediate material. The buffer
    // is a whole number of blocks even when keylen + blocklen is not
    // (AES-192 needs 40 of the 48).
    let mut temp = [0u8; 48];
    let mut iv = [0u8; AES_BLOCK_LEN];
    let mut templen = 0;
    let mut round: u32 = 0;
    while templen < keylen + AES_BLOCK_LEN {
        iv[..4].copy_from_slice(&round.to_be_bytes());
        let s = once(&iv[..])
            .chain(once(&l_n[..]))
            .chain(input.segments())
            .chain(once(&pad[..padlen]));
        if let Err(e) = bcc(alg, &DF_KEY[..keylen], s, &mut temp[templen..templen + AES_BLOCK_LEN]) {
            temp.zeroize();
            return Err(e);
        }
        round += 1;
        templen += AES_BLOCK_LEN;
    }

    // Split into K' and X, then stream X = AES(K', X) until out is full.
    let mut x = [0u8; AES_BLOCK_LEN];
    x.copy_from_slice(&temp[keylen..keylen + AES_BLOCK_LEN]);
    let mut generated = 0;
    while generated < bytes_to_return {
        let x_in = x;
        if let Err(e) = prim::block_encrypt(alg, &temp[..keylen], &x_in, &mut x) {
            temp.zeroize();
            x.zeroize();
            return Err(e);
        }
        let take = AES_BLOCK_LEN.min(bytes_to_return - generated);
        out[generated..generated + take].copy_from_slice(&x[..take]);
        generated += take;
    }

    temp.zeroize();
    x.zeroize();
    Ok(())
}
