//! HMAC-DRBG engine (SP 800-90A section 10.1.2).
//!
//! State layout: `V` is the chaining value and `C` the HMAC key, each one
//! digest wide. No scratchpad is needed; the primitive streams its input.

use crate::chain::InputChain;
use crate::prim::{self, HashAlg, MAX_OUTLEN};
use crate::state::Drbg;
use core::iter::once;
use randkit_types::RngError;
use zeroize::Zeroize;

/// Update function (section 10.1.2.2).
///
/// Runs the two-round K/V massage; the second round is skipped when no
/// seed material is provided. On initial seeding V starts as 0x01 bytes
/// and the key as zeros (the zero key is the instantiate-time state).
pub(crate) fn update(
    st: &mut Drbg,
    alg: HashAlg,
    seed: InputChain<'_>,
    reseed: bool,
) -> Result<(), RngError> {
    let outlen = alg.output_len();
    if !reseed {
        st.v.fill(0x01);
    }

    let mut tmp = [0u8; MAX_OUTLEN];
    for round in [0x00u8, 0x01] {
        let sep = [round];
        // K = HMAC(K, V || round || seed)
        prim::hmac(
            alg,
            &st.c,
            once(&st.v[..]).chain(once(&sep[..])).chain(seed.segments()),
            &mut tmp[..outlen],
        )?;
        st.c.copy_from_slice(&tmp[..outlen]);

        // V = HMAC(K, V)
        prim::hmac(alg, &st.c, once(&st.v[..]), &mut tmp[..outlen])?;
        st.v.copy_from_slice(&tmp[..outlen]);

        if seed.is_empty() {
            break;
        }
    }
    tmp.zeroize();
    Ok(())
}

/// Generate function (section 10.1.2.5).
pub(crate) fn generate(
    st: &mut Drbg,
    alg: HashAlg,
    buf: &mut [u8],
    addtl: InputChain<'_>,
) -> Result<(), RngError> {
    if !addtl.is_empty() {
        update(st, alg, addtl, true)?;
    }

    let outlen = alg.output_len();
    let mut tmp = [0u8; MAX_OUTLEN];
    let mut len = 0;
    while len < buf.len() {
        // V = HMAC(K, V)
        prim::hmac(alg, &st.c, once(&st.v[..]), &mut tmp[..outlen])?;
        st.v.copy_from_slice(&tmp[..outlen]);

        let take = outlen.min(buf.len() - len);
        buf[len..len + take].copy_from_slice(&st.v[..take]);
        len += take;
    }
    tmp.zeroize();

    // Post-generate massage; runs a single round when addtl is empty.
    update(st, alg, addtl, true)
}
