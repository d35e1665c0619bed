//! Entropy gateway.
//!
//! The DRBG pulls seed entropy through the [`EntropyGatherer`] trait.
//! Gatherers deliver bytes to a sink in chunks of whatever size is
//! convenient; the gateway assembles the requested amount and ignores any
//! excess. Callers hold the DRBG lock for the whole pull, so a single
//! reader is guaranteed.

use randkit_types::{RandomLevel, RngError};
use zeroize::Zeroize;

/// A source of raw seed entropy.
pub trait EntropyGatherer: Send {
    /// Deliver at least `requested` bytes of at least `min_level` quality
    /// to `sink`, in arbitrary-sized chunks. Delivering more than
    /// requested is allowed; the gateway discards the excess.
    fn gather(
        &mut self,
        sink: &mut dyn FnMut(&[u8]),
        min_level: RandomLevel,
        requested: usize,
    ) -> Result<(), RngError>;

    /// Release any OS resources held open (best effort).
    fn close(&mut self) {}
}

/// OS-backed gatherer using `getrandom`.
pub struct OsEntropy;

impl EntropyGatherer for OsEntropy {
    fn gather(
        &mut self,
        sink: &mut dyn FnMut(&[u8]),
        _min_level: RandomLevel,
        requested: usize,
    ) -> Result<(), RngError> {
        let mut buf = [0u8; 64];
        let mut remaining = requested;
        while remaining > 0 {
            let n = remaining.min(buf.len());
            if getrandom::getrandom(&mut buf[..n]).is_err() {
                buf.zeroize();
                return Err(RngError::EntropySourceFail);
            }
            sink(&buf[..n]);
            remaining -= n;
        }
        buf.zeroize();
        Ok(())
    }
}

/// Fill `dest` from `source`, tolerating gatherers that deliver more than
/// requested. Under-delivery is an entropy-source failure.
pub(crate) fn get_entropy(
    source: &mut dyn EntropyGatherer,
    dest: &mut [u8],
) -> Result<(), RngError> {
    let requested = dest.len();
    let mut filled = 0usize;
    {
        let mut sink = |chunk: &[u8]| {
            let take = chunk.len().min(dest.len() - filled);
            dest[filled..filled + take].copy_from_slice(&chunk[..take]);
            filled += take;
        };
        source.gather(&mut sink, RandomLevel::VeryStrong, requested)?;
    }
    if filled < requested {
        return Err(RngError::EntropySourceFail);
    }
    Ok(())
}
