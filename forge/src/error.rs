use bakepay_crypto::CryptoError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForgeError {
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("counter overflow after {counter}")]
    CounterOverflow { counter: u64 },
}

impl ForgeError {
    pub(crate) fn invalid(what: &str, input: &str, source: CryptoError) -> Self {
        Self::Encoding(format!("invalid {what} {input:?}: {source}"))
    }
}
