//! Hash-DRBG engine (SP 800-90A section 10.1.1).
//!
//! State layout: `V` and the constant `C` are each seedlen bytes. The
//! scratchpad holds the hashgen lookaside buffer (seedlen) followed by one
//! digest block, and doubles as the V copy during a reseed update.

use crate::chain::InputChain;
use crate::df::hash_df;
use crate::prim::{self, HashAlg, MAX_OUTLEN};
use crate::state::Drbg;
use crate::util::{add_buf, add_u64};
use core::iter::once;
use randkit_types::RngError;
use zeroize::Zeroize;

const PREFIX0: [u8; 1] = [0x00];
const PREFIX1: [u8; 1] = [0x01];
const PREFIX2: [u8; 1] = [0x02];
const PREFIX3: [u8; 1] = [0x03];

/// Update function (sections 10.1.1.2 and 10.1.1.3).
pub(crate) fn update(
    st: &mut Drbg,
    alg: HashAlg,
    seed: InputChain<'_>,
    reseed: bool,
) -> Result<(), RngError> {
    let statelen = st.core.statelen;

    if reseed {
        // V' = Hash_df(0x01 || V || seed); the old V is staged in the
        // scratchpad because V itself is overwritten.
        st.scratchpad[..statelen].copy_from_slice(&st.v);
        let v_old = &st.scratchpad[..statelen];
        hash_df(
            alg,
            once(&PREFIX1[..]).chain(once(v_old)).chain(seed.segments()),
            &mut st.v,
        );
    } else {
        hash_df(alg, seed.segments(), &mut st.v);
    }

    // C = Hash_df(0x00 || V)
    hash_df(alg, once(&PREFIX0[..]).chain(once(&st.v[..])), &mut st.c);

    st.scratchpad[..statelen].zeroize();
    Ok(())
}

/// Mix additional input into V (section 10.1.1.4 step 2).
fn process_addtl(st: &mut Drbg, alg: HashAlg, addtl: InputChain<'_>) {
    if addtl.is_empty() {
        return;
    }
    let outlen = alg.output_len();
    let mut w = [0u8; MAX_OUTLEN];
    prim::hash(
        alg,
        once(&PREFIX2[..]).chain(once(&st.v[..])).chain(addtl.segments()),
        &mut w[..outlen],
    );
    add_buf(&mut st.v, &w[..outlen]);
    w.zeroize();
}

/// Hashgen (section 10.1.1.4 step 3): stream digests of an incrementing
/// copy of V.
fn hashgen(st: &mut Drbg, alg: HashAlg, buf: &mut [u8]) {
    let statelen = st.core.statelen;
    let outlen = alg.output_len();

    let (data, rest) = st.scratchpad.split_at_mut(statelen);
    let block = &mut rest[..outlen];
    data.copy_from_slice(&st.v);

    let mut len = 0;
    while len < buf.len() {
        prim::hash(alg, once(&*data), block);
        let take = outlen.min(buf.len() - len);
        buf[len..len + take].copy_from_slice(&block[..take]);
        len += take;
        if len < buf.len() {
            add_buf(data, &[1]);
        }
    }

    data.zeroize();
    block.zeroize();
}

/// Generate function (section 10.1.1.4).
///
/// The reseed counter itself is maintained by the caller; its current
/// value is folded into V here.
pub(crate) fn generate(
    st: &mut Drbg,
    alg: HashAlg,
    buf: &mut [u8],
    addtl: InputChain<'_>,
) -> Result<(), RngError> {
    let outlen = alg.output_len();

    process_addtl(st, alg, addtl);
    hashgen(st, alg, buf);

    // V = (V + H(0x03 || V) + C + reseed_counter) mod 2^seedlen
    let mut h = [0u8; MAX_OUTLEN];
    prim::hash(alg, once(&PREFIX3[..]).chain(once(&st.v[..])), &mut h[..outlen]);
    add_buf(&mut st.v, &h[..outlen]);
    h.zeroize();
    add_buf(&mut st.v, &st.c);
    add_u64(&mut st.v, st.reseed_ctr);

    Ok(())
}
