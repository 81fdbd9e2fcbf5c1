//! Concentrated-liquidity pool engine.
//!
//! A [`Pool`] holds two assets and a book of liquidity ranges indexed by
//! tick. Callers deposit liquidity into a bounded price range with
//! [`Pool::mint`] and trade one asset for the other with [`Pool::swap`],
//! which walks the piecewise-constant liquidity curve one initialized tick
//! at a time. Token custody stays outside the engine: a [`PoolHost`] supplies
//! balance reads, outbound transfers and the settlement callbacks.

pub mod bit_math;
pub mod error;
pub mod fixed_point_96;
pub mod full_math;
pub mod liquidity_math;
pub mod pool;
pub mod position;
pub mod sqrt_price_math;
pub mod swap_math;
pub mod tick;
pub mod tick_bitmap;
pub mod tick_math;

#[cfg(test)]
mod test_utilities;

pub use error::PoolError;
pub use pool::{Pool, PoolHost, Slot0};
pub use position::position_key;
pub use tick::TickInfo;
