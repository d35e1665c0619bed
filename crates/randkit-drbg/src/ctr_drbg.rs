//! CTR-DRBG engine with derivation function (SP 800-90A section 10.2.1).
//!
//! State layout: the counter `V` occupies the first blocklen bytes of the
//! V buffer and the AES key the first keylen bytes of `C`. The scratchpad
//! carries two regions:
//!
//! ```text
//! [0 .. statelen + blocklen)               temp — update keystream; the
//!                                          extra block absorbs the spill
//!                                          when statelen is not a block
//!                                          multiple (AES-192)
//! [statelen + blocklen .. + statelen)      df_data — derivation function
//!                                          output XORed into temp
//! ```
//!
//! A generate call derives the additional input once into df_data and
//! reuses it for both the pre-generate mix and the post-generate state
//! refresh; with no additional input the region stays zero.

use crate::chain::InputChain;
use crate::df::block_cipher_df;
use crate::prim::{self, CipherAlg, AES_BLOCK_LEN};
use crate::state::Drbg;
use crate::util::add_buf;
use randkit_types::RngError;
use zeroize::Zeroize;

/// The mechanism assumes the AES block size; a descriptor carrying any
/// other blocklen is a configuration error.
fn check_blocklen(st: &Drbg) -> Result<(), RngError> {
    if st.core.blocklen != AES_BLOCK_LEN {
        return Err(RngError::BlockLenMismatch);
    }
    Ok(())
}

/// Update with seed material (sections 10.2.1.3.2 / 10.2.1.4.2): run the
/// derivation function over `seed`, then the core update.
pub(crate) fn update(
    st: &mut Drbg,
    alg: CipherAlg,
    seed: InputChain<'_>,
    _reseed: bool,
) -> Result<(), RngError> {
    check_blocklen(st)?;
    let ret = derive_into_df_data(st, alg, seed).and_then(|()| update_core(st, alg));
    st.scratchpad[..].zeroize();
    ret
}

/// Generate function (section 10.2.1.5.2).
pub(crate) fn generate(
    st: &mut Drbg,
    alg: CipherAlg,
    buf: &mut [u8],
    addtl: InputChain<'_>,
) -> Result<(), RngError> {
    check_blocklen(st)?;
    let ret = generate_inner(st, alg, buf, addtl);
    st.scratchpad[..].zeroize();
    ret
}

fn generate_inner(
    st: &mut Drbg,
    alg: CipherAlg,
    buf: &mut [u8],
    addtl: InputChain<'_>,
) -> Result<(), RngError> {
    let statelen = st.core.statelen;
    let blocklen = st.core.blocklen;
    let keylen = st.core.keylen();

    if !addtl.is_empty() {
        derive_into_df_data(st, alg, addtl)?;
        update_core(st, alg)?;
    } else {
        // The post-generate refresh mixes zeros.
        st.scratchpad[statelen + blocklen..].zeroize();
    }

    let mut block = [0u8; AES_BLOCK_LEN];
    let mut len = 0;
    while len < buf.len() {
        // V = (V + 1) mod 2^blocklen; output block = AES(K, V)
        add_buf(&mut st.v[..blocklen], &[1]);
        if let Err(e) = prim::block_encrypt(alg, &st.c[..keylen], &st.v[..blocklen], &mut block) {
            block.zeroize();
            return Err(e);
        }
        let take = blocklen.min(buf.len() - len);
        buf[len..len + take].copy_from_slice(&block[..take]);
        len += take;
    }
    block.zeroize();

    // Post-generate state refresh with the df output (or zeros).
    update_core(st, alg)
}

/// Run the derivation function over `input` into the df_data region.
fn derive_into_df_data(st: &mut Drbg, alg: CipherAlg, input: InputChain<'_>) -> Result<(), RngError> {
    let statelen = st.core.statelen;
    let blocklen = st.core.blocklen;
    let df_data = &mut st.scratchpad[statelen + blocklen..];
    let ret = block_cipher_df(alg, input, &mut df_data[..statelen]);
    if ret.is_err() {
        df_data.zeroize();
    }
    ret
}

/// Core update (section 10.2.1.2): generate statelen bytes of keystream,
/// XOR with the df_data region, and split the result into the new key
/// and counter.
fn update_core(st: &mut Drbg, alg: CipherAlg) -> Result<(), RngError> {
    let statelen = st.core.statelen;
    let blocklen = st.core.blocklen;
    let keylen = st.core.keylen();

    {
        let (temp, _) = st.scratchpad.split_at_mut(statelen + blocklen);
        temp.fill(0);
    }

    let mut len = 0;
    while len < statelen {
        add_buf(&mut st.v[..blocklen], &[1]);
        let (temp, _) = st.scratchpad.split_at_mut(statelen + blocklen);
        prim::block_encrypt(
            alg,
            &st.c[..keylen],
            &st.v[..blocklen],
            &mut temp[len..len + blocklen],
        )?;
        len += blocklen;
    }

    let (temp, df_data) = st.scratchpad.split_at_mut(statelen + blocklen);
    for (t, d) in temp[..statelen].iter_mut().zip(df_data[..statelen].iter()) {
        *t ^= *d;
    }

    st.c[..keylen].copy_from_slice(&temp[..keylen]);
    st.v[..blocklen].copy_from_slice(&temp[keylen..statelen]);
    temp.zeroize();
    Ok(())
}
