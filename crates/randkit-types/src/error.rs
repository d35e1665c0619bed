/// DRBG operation errors.
#[derive(Debug, thiserror::Error)]
pub enum RngError {
    #[error("invalid argument")]
    InvalidArg,
    #[error("unknown drbg selection flags")]
    UnknownFlags,
    #[error("memory allocation failed")]
    MemAllocFail,
    #[error("failed to obtain entropy")]
    EntropySourceFail,
    #[error("primitive failure: {0}")]
    PrimitiveFail(&'static str),
    #[error("cipher block length does not match mechanism block length")]
    BlockLenMismatch,
    #[error("fatal: {0}")]
    Fatal(&'static str),
    #[error("selftest: {0}")]
    Selftest(#[from] SelftestError),
}

/// Health-check (known-answer and sanity) test failures.
#[derive(Debug, thiserror::Error)]
pub enum SelftestError {
    #[error("known-answer test failed: {0}")]
    KatFailure(String),
    #[error("sanity test failed: {0}")]
    SanityFailure(String),
}
