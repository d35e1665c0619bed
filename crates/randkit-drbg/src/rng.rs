//! Process-global RNG facade.
//!
//! One DRBG instance serves the whole process, guarded by a single
//! exclusive mutex held for the entire call — there is no internal
//! parallelism and the one blocking operation (the entropy pull) happens
//! under the lock. Fork detection lives in [`Drbg::generate`], so output
//! after a fork is always preceded by a reseed.

use crate::selftest;
use crate::state::Drbg;
use randkit_types::flags::*;
use randkit_types::{RandomLevel, RngError};
use std::sync::{Mutex, PoisonError};

/// Mechanism used when nothing else was selected.
const DEFAULT_FLAGS: u32 = DRBG_NOPR_HMACSHA256;

struct Shared {
    drbg: Option<Drbg>,
    /// Flags of the last successful selection; `reinit(0, ..)` reuses them.
    last_flags: u32,
}

static SHARED: Mutex<Shared> = Mutex::new(Shared {
    drbg: None,
    last_flags: 0,
});

fn lock() -> std::sync::MutexGuard<'static, Shared> {
    SHARED.lock().unwrap_or_else(PoisonError::into_inner)
}

fn init_internal(sh: &mut Shared, flags: u32, pers: Option<&[u8]>) -> Result<(), RngError> {
    let flags = if flags == 0 { sh.last_flags } else { flags };
    // Instantiate the replacement first: on any failure the previous
    // instance stays alive and selected.
    let fresh = Drbg::instantiate(flags, pers)?;
    if let Some(mut old) = sh.drbg.take() {
        old.uninstantiate();
    }
    sh.drbg = Some(fresh);
    sh.last_flags = flags;
    Ok(())
}

fn with_drbg<R>(f: impl FnOnce(&mut Drbg) -> Result<R, RngError>) -> Result<R, RngError> {
    let mut sh = lock();
    if sh.drbg.is_none() {
        init_internal(&mut sh, DEFAULT_FLAGS, None)?;
    }
    match sh.drbg.as_mut() {
        Some(drbg) => f(drbg),
        None => Err(RngError::Fatal("global drbg missing after init")),
    }
}

/// One-shot initialization.
///
/// With `full == false` only the cheap invariant checks run; with
/// `full == true` the default mechanism (HMAC-SHA-256, no prediction
/// resistance) is instantiated unless an instance already exists.
pub fn init(full: bool) -> Result<(), RngError> {
    debug_assert!(
        RandomLevel::Weak as u8 == 0
            && RandomLevel::Strong as u8 == 1
            && RandomLevel::VeryStrong as u8 == 2
    );
    if !full {
        return Ok(());
    }
    let mut sh = lock();
    if sh.drbg.is_none() {
        init_internal(&mut sh, DEFAULT_FLAGS, None)?;
    }
    Ok(())
}

/// Tear down the current instance and instantiate the mechanism selected
/// by `flags`, optionally with a personalization string.
///
/// `flags == 0` keeps the previously selected mechanism. On error the
/// previous instance remains untouched and alive.
pub fn reinit(flags: u32, pers: Option<&[u8]>) -> Result<(), RngError> {
    let mut sh = lock();
    init_internal(&mut sh, flags, pers)
}

/// Fill `buf` with random bytes. A zero-length buffer is a no-op.
///
/// Every level is served by the same DRBG instance.
pub fn randomize(buf: &mut [u8], level: RandomLevel) -> Result<(), RngError> {
    let _ = level;
    if buf.is_empty() {
        return Ok(());
    }
    with_drbg(|drbg| drbg.generate_long(buf, None))
}

/// Fill `buf` with random bytes, mixing per-request additional input into
/// the state.
pub fn randomize_with_addtl(
    buf: &mut [u8],
    addtl: &[u8],
    level: RandomLevel,
) -> Result<(), RngError> {
    let _ = level;
    if buf.is_empty() {
        return Ok(());
    }
    with_drbg(|drbg| drbg.generate_long(buf, Some(addtl)))
}

/// Mix caller-provided bytes into the state via a reseed. Entropy is
/// still pulled from the gateway; `quality` is accepted for interface
/// compatibility and ignored.
pub fn add_bytes(buf: &[u8], quality: i32) -> Result<(), RngError> {
    let _ = quality;
    with_drbg(|drbg| drbg.reseed(Some(buf)))
}

/// Run the health check (known-answer and sanity tests). The first
/// failure is passed to `report` as text and returned as an error.
pub fn selftest(report: Option<&mut dyn FnMut(&str)>) -> Result<(), RngError> {
    let _guard = lock();
    match selftest::healthcheck() {
        Ok(()) => Ok(()),
        Err(e) => {
            if let Some(report) = report {
                report(&e.to_string());
            }
            Err(e.into())
        }
    }
}

/// Release entropy-source resources (best effort).
pub fn close_fds() {
    let mut sh = lock();
    if let Some(drbg) = sh.drbg.as_mut() {
        drbg.close_entropy_source();
    }
}

/// True if the RNG runs in a degraded or faked mode. Faked random is not
/// supported, so this is always false.
pub fn is_faked() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_without_full_is_check_only() {
        init(false).unwrap();
    }

    #[test]
    fn test_randomize_lazy_initializes() {
        let mut buf = [0u8; 32];
        randomize(&mut buf, RandomLevel::Strong).unwrap();
        assert!(buf.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_randomize_empty_buffer() {
        let mut buf = [0u8; 0];
        randomize(&mut buf, RandomLevel::Weak).unwrap();
    }

    #[test]
    fn test_randomize_with_addtl() {
        let mut buf = [0u8; 48];
        randomize_with_addtl(&mut buf, b"per-request input", RandomLevel::VeryStrong).unwrap();
        assert!(buf.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_add_bytes() {
        add_bytes(b"extra seed material from the caller", -1).unwrap();
        let mut buf = [0u8; 16];
        randomize(&mut buf, RandomLevel::Strong).unwrap();
    }

    #[test]
    fn test_reinit_rejects_unknown_flags() {
        let err = reinit(DRBG_PREDICTION_RESIST, None);
        assert!(matches!(err, Err(RngError::UnknownFlags)));
        // The previous instance (if any) must still serve requests.
        let mut buf = [0u8; 16];
        randomize(&mut buf, RandomLevel::Strong).unwrap();
    }

    #[test]
    fn test_reinit_with_personalization() {
        reinit(DRBG_NOPR_HASHSHA256, Some(b"facade personalization")).unwrap();
        let mut buf = [0u8; 16];
        randomize(&mut buf, RandomLevel::Strong).unwrap();
        // flags == 0 re-instantiates the same selection.
        reinit(0, None).unwrap();
        randomize(&mut buf, RandomLevel::Strong).unwrap();
    }

    #[test]
    fn test_is_faked() {
        assert!(!is_faked());
    }

    #[test]
    fn test_close_fds_is_idempotent() {
        close_fds();
        close_fds();
    }
}
