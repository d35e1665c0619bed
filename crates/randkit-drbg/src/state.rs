//! DRBG instance state and lifecycle (SP 800-90A section 9).
//!
//! [`Drbg`] is a value type holding the full mechanism state; the
//! process-global instance lives in [`crate::rng`]. Instantiate, reseed,
//! generate, and uninstantiate enforce the section 9 bounds, the reseed
//! counter, prediction resistance, and fork detection.

use crate::chain::InputChain;
use crate::entropy::{self, EntropyGatherer, OsEntropy};
use crate::mech::{self, DrbgCore, MechKind};
use crate::{ctr_drbg, hash_drbg, hmac_drbg};
use randkit_types::flags::DRBG_PREDICTION_RESIST;
use randkit_types::RngError;
use zeroize::Zeroize;

/// Maximum bytes per generate request (2^19 bits).
pub(crate) const MAX_REQUEST_BYTES: usize = 1 << 16;

/// Maximum generate requests between reseeds.
pub(crate) const MAX_REQUESTS: u64 = 1 << 48;

/// Maximum additional-input / personalization length.
#[cfg(target_pointer_width = "64")]
pub(crate) fn max_addtl_len() -> usize {
    1 << 35
}

/// Maximum additional-input / personalization length. Smaller maxima are
/// permitted on narrow targets; `usize::MAX - 1` keeps the bound testable.
#[cfg(not(target_pointer_width = "64"))]
pub(crate) fn max_addtl_len() -> usize {
    usize::MAX - 1
}

/// Shared request-bound check, also exercised directly by the sanity
/// harness for lengths too large to materialize as slices.
pub(crate) fn check_request_limits(request: usize, addtl_len: usize) -> Result<(), RngError> {
    if request > MAX_REQUEST_BYTES || addtl_len > max_addtl_len() {
        return Err(RngError::InvalidArg);
    }
    Ok(())
}

/// Deterministic overrides for the health-check harness.
#[derive(Default)]
pub(crate) struct TestHook {
    /// Injected seed entropy, used instead of the gatherer.
    pub entropy: Option<Vec<u8>>,
    /// Make the next seed operation fail as if the source broke.
    pub fail_seed_source: bool,
}

/// A DRBG instance.
pub struct Drbg {
    /// Internal state value V (statelen bytes; CTR uses the leading
    /// blocklen bytes as the counter).
    pub(crate) v: Vec<u8>,
    /// Hash: constant C. HMAC / CTR: key (CTR uses the leading keylen
    /// bytes).
    pub(crate) c: Vec<u8>,
    /// Generate requests since the last (re)seed.
    pub(crate) reseed_ctr: u64,
    /// Mechanism working memory; layout is engine-specific.
    pub(crate) scratchpad: Vec<u8>,
    pub(crate) seeded: bool,
    pub(crate) pr: bool,
    /// Process that performed the last successful seed; a mismatch means
    /// we are in a fork child and must reseed before producing output.
    pub(crate) seed_owner_pid: u32,
    pub(crate) core: &'static DrbgCore,
    entropy_source: Box<dyn EntropyGatherer>,
    pub(crate) test: Option<TestHook>,
}

impl Drbg {
    /// Instantiate with the OS entropy source (section 9.1).
    ///
    /// `flags` selects the mechanism and primitive and may carry
    /// [`DRBG_PREDICTION_RESIST`]; `pers` is the optional personalization
    /// string.
    pub fn instantiate(flags: u32, pers: Option<&[u8]>) -> Result<Self, RngError> {
        Self::instantiate_with_source(flags, pers, Box::new(OsEntropy))
    }

    /// Instantiate with a caller-provided entropy source.
    pub fn instantiate_with_source(
        flags: u32,
        pers: Option<&[u8]>,
        source: Box<dyn EntropyGatherer>,
    ) -> Result<Self, RngError> {
        let mut drbg = Self::alloc(flags, source)?;
        drbg.seed(pers, false)?;
        Ok(drbg)
    }

    /// Instantiate with injected test entropy (health-check harness).
    pub(crate) fn instantiate_for_test(
        flags: u32,
        pers: Option<&[u8]>,
        hook: TestHook,
    ) -> Result<Self, RngError> {
        let mut drbg = Self::alloc(flags, Box::new(OsEntropy))?;
        drbg.test = Some(hook);
        drbg.seed(pers, false)?;
        Ok(drbg)
    }

    /// Allocate zero-filled state for the selected mechanism.
    fn alloc(flags: u32, source: Box<dyn EntropyGatherer>) -> Result<Self, RngError> {
        let core = mech::core_for_flags(flags)?;
        let scratch = match core.kind {
            MechKind::Hmac(_) => 0,
            MechKind::Hash(_) => core.statelen + core.blocklen,
            MechKind::Ctr(_) => core.statelen + core.blocklen + core.statelen,
        };
        Ok(Drbg {
            v: vec![0; core.statelen],
            c: vec![0; core.statelen],
            reseed_ctr: 0,
            scratchpad: vec![0; scratch],
            seeded: false,
            pr: flags & DRBG_PREDICTION_RESIST != 0,
            seed_owner_pid: 0,
            core,
            entropy_source: source,
            test: None,
        })
    }

    /// Seed or reseed (section 9.1 / 9.2).
    ///
    /// Pulls entropy equal to the security strength; the initial seed also
    /// covers the nonce (at least half the strength), so it requests 3/2
    /// of the strength, rounded up.
    fn seed(&mut self, pers: Option<&[u8]>, reseed: bool) -> Result<(), RngError> {
        if let Some(p) = pers {
            if p.len() > max_addtl_len() {
                return Err(RngError::InvalidArg);
            }
        }
        if self.test.as_ref().is_some_and(|t| t.fail_seed_source) {
            return Err(RngError::EntropySourceFail);
        }

        let mut entropy_buf = match self.test.as_ref().and_then(|t| t.entropy.clone()) {
            Some(injected) => injected,
            None => {
                let mut len = mech::sec_strength(self.core.flags);
                if !reseed {
                    len = ((len + 1) / 2) * 3;
                }
                let mut buf = vec![0u8; len];
                if let Err(e) = entropy::get_entropy(self.entropy_source.as_mut(), &mut buf) {
                    buf.zeroize();
                    return Err(e);
                }
                buf
            }
        };

        let segments: [&[u8]; 2];
        let chain = match pers {
            Some(p) if !p.is_empty() => {
                segments = [&entropy_buf, p];
                InputChain::new(&segments)
            }
            _ => {
                segments = [&entropy_buf, &[]];
                InputChain::new(&segments[..1])
            }
        };

        let ret = self.dispatch_update(chain, reseed);
        entropy_buf.zeroize();
        ret?;

        self.seeded = true;
        self.reseed_ctr = 1;
        self.seed_owner_pid = std::process::id();
        Ok(())
    }

    pub(crate) fn dispatch_update(
        &mut self,
        seed: InputChain<'_>,
        reseed: bool,
    ) -> Result<(), RngError> {
        match self.core.kind {
            MechKind::Hash(alg) => hash_drbg::update(self, alg, seed, reseed),
            MechKind::Hmac(alg) => hmac_drbg::update(self, alg, seed, reseed),
            MechKind::Ctr(alg) => ctr_drbg::update(self, alg, seed, reseed),
        }
    }

    /// Reseed with fresh entropy, mixing in optional additional input
    /// (section 9.2).
    pub fn reseed(&mut self, addtl: Option<&[u8]>) -> Result<(), RngError> {
        self.seed(addtl, true)
    }

    /// Generate `buf.len()` pseudorandom bytes (section 9.3.1).
    ///
    /// Either the whole buffer is written or an error is returned and no
    /// output escapes. A reseed precedes generation when prediction
    /// resistance is on, the reseed counter is exhausted, the instance is
    /// unseeded, or the process has forked since the last seed.
    pub fn generate(&mut self, buf: &mut [u8], addtl: Option<&[u8]>) -> Result<(), RngError> {
        if buf.is_empty() {
            return Err(RngError::InvalidArg);
        }
        check_request_limits(buf.len(), addtl.map_or(0, |a| a.len()))?;

        if self.seeded && self.seed_owner_pid != std::process::id() {
            // Fork child: the state is shared with the parent and must be
            // replaced before any output. Failure here is fatal.
            self.seed(None, true)
                .map_err(|_| RngError::Fatal("reseed after fork failed"))?;
        }

        if self.reseed_ctr > MAX_REQUESTS {
            self.seeded = false;
        }

        let mut addtl = addtl;
        if self.pr || !self.seeded {
            self.seed(addtl, true)?;
            addtl = None;
        }

        let segments: [&[u8]; 1];
        let chain = match addtl {
            Some(a) if !a.is_empty() => {
                segments = [a];
                InputChain::new(&segments)
            }
            _ => InputChain::empty(),
        };

        match self.core.kind {
            MechKind::Hash(alg) => hash_drbg::generate(self, alg, buf, chain),
            MechKind::Hmac(alg) => hmac_drbg::generate(self, alg, buf, chain),
            MechKind::Ctr(alg) => ctr_drbg::generate(self, alg, buf, chain),
        }?;

        self.reseed_ctr += 1;
        Ok(())
    }

    /// Generate arbitrarily long output in slices of at most
    /// [`MAX_REQUEST_BYTES`].
    pub fn generate_long(&mut self, buf: &mut [u8], addtl: Option<&[u8]>) -> Result<(), RngError> {
        if buf.len() <= MAX_REQUEST_BYTES {
            return self.generate(buf, addtl);
        }
        for chunk in buf.chunks_mut(MAX_REQUEST_BYTES) {
            self.generate(chunk, addtl)?;
        }
        Ok(())
    }

    /// Zeroize and clear all state (section 9.4). The instance reseeds
    /// itself from scratch if generate is called again.
    pub fn uninstantiate(&mut self) {
        self.v.zeroize();
        self.c.zeroize();
        self.scratchpad.zeroize();
        self.reseed_ctr = 0;
        self.seeded = false;
        self.pr = false;
        self.seed_owner_pid = 0;
        self.test = None;
    }

    /// Number of generate requests since the last (re)seed.
    pub fn reseed_counter(&self) -> u64 {
        self.reseed_ctr
    }

    /// True once the instance holds a fresh seed.
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// True if every generate call reseeds first.
    pub fn prediction_resistance(&self) -> bool {
        self.pr
    }

    /// Selection flags of the instantiated mechanism (without the
    /// prediction-resistance bit).
    pub fn mechanism_flags(&self) -> u32 {
        self.core.flags
    }

    /// Replace the injected test entropy for the next seed operation.
    pub(crate) fn set_test_entropy(&mut self, bytes: &[u8]) {
        self.test.get_or_insert_with(TestHook::default).entropy = Some(bytes.to_vec());
    }

    /// Best-effort release of entropy-source resources.
    pub(crate) fn close_entropy_source(&mut self) {
        self.entropy_source.close();
    }
}

impl Drop for Drbg {
    fn drop(&mut self) {
        self.v.zeroize();
        self.c.zeroize();
        self.scratchpad.zeroize();
    }
}
