//! Error types for the Dusk collector.
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("arithmetic overflow")] Overflow,
    #[error("division by zero")] DivisionByZero,
}

/// Failure reported by the external fungible-token capability.
///
/// Any transfer failure is fatal to the enclosing entrypoint; the ledger is
/// left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("insufficient balance: have {have}, need {need}")] InsufficientBalance { have: u128, need: u128 },
    #[error("transfer rejected: {0}")] Rejected(String),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveError {
    #[error("deceleration {0} out of range (0, 10^36)")] DecelerationOutOfRange(u128),
    #[error("floor value must be positive")] ZeroFloor,
    #[error(transparent)] Math(#[from] MathError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectorError {
    #[error("not enough tokens: requested {requested}, available {available}")] InsufficientLiquidity { requested: u128, available: u128 },
    #[error("epoch already finalized")] EpochAlreadyFinalized,
    #[error("epoch funds already claimed")] EpochFundsAlreadyClaimed,
    #[error(transparent)] Transfer(#[from] TransferError),
    #[error(transparent)] Math(#[from] MathError),
}

#[derive(Error, Debug)]
pub enum DuskError {
    #[error(transparent)] Math(#[from] MathError),
    #[error(transparent)] Transfer(#[from] TransferError),
    #[error(transparent)] Curve(#[from] CurveError),
    #[error(transparent)] Collector(#[from] CollectorError),
}
