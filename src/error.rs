use thiserror::Error;

/// Every way a pool operation can fail. All failures abort the whole
/// operation; no partial state is ever left behind.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    #[error("Liquidity amount must be greater than zero")]
    ZeroLiquidity,

    #[error("Tick range is inverted or outside the supported bounds")]
    InvalidTickRange,

    #[error("Tick conversion input is outside the supported range")]
    TickOutOfRange,

    #[error("Tick liquidity would exceed the per-tick maximum")]
    LiquidityOverflow,

    #[error("Liquidity delta underflows the tracked amount")]
    LiquidityUnderflow,

    #[error("Not enough liquidity in range to fill the swap")]
    NotEnoughLiquidity,

    #[error("Callback did not deliver the owed input amount")]
    InsufficientInputAmount,

    #[error("Arithmetic overflow")]
    Overflow,
}
