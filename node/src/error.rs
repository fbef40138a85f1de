use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("wallet error: {0}")]
    Wallet(#[from] bakepay_crypto::CryptoError),

    #[error("RPC error: {0}")]
    Rpc(#[from] bakepay_rpc::RpcError),

    #[error("payout error: {0}")]
    Payout(#[from] bakepay_payout::PayoutError),

    #[error("payout queue is closed")]
    QueueClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("shutdown timeout")]
    ShutdownTimeout,
}
