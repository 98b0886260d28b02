//! Resource ledger and store pricing for the `CityTalk` command pipeline.
//!
//! The city owns six counters (Wood, Salt, Stone, Iron, Money, Food). The
//! store buys and sells the five goods at a fixed unit price; Money is the
//! currency and never has a price of its own.
//!
//! # Trading rules
//!
//! | Operation | Rejected when | Effect |
//! |-----------|---------------|--------|
//! | Buy | bundle empty, any quantity negative, price > Money | goods += bundle, Money -= price |
//! | Sell | bundle empty, any quantity negative, any quantity > held | goods -= bundle, Money += price |
//!
//! A rejected trade leaves every counter untouched. All arithmetic is
//! checked; an overflow rejects the trade instead of wrapping.
//!
//! # Usage
//!
//! ```
//! use citytalk_ledger::ResourceLedger;
//! use citytalk_types::{Resource, ResourceBundle};
//!
//! let mut ledger = ResourceLedger::starting();
//! let trade = ledger
//!     .buy(ResourceBundle::default().with(Resource::Wood, 10))
//!     .ok();
//! assert_eq!(trade.map(|t| t.price), Some(10));
//! assert_eq!(ledger.get(Resource::Wood), 110);
//! ```

pub mod ledger;

// Re-export primary types at crate root.
pub use ledger::{ResourceLedger, STARTING_HOLDINGS, Trade, TradeSide};

use citytalk_types::Resource;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Reasons a trade is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Every traded counter in the bundle is zero.
    #[error("bundle is empty")]
    EmptyBundle,

    /// A counter in the bundle is below zero.
    #[error("bundle quantity for {resource} must not be negative, got {quantity}")]
    NegativeQuantity {
        /// The offending resource.
        resource: Resource,
        /// The negative quantity.
        quantity: i64,
    },

    /// The bundle costs more Money than the ledger holds.
    #[error("insufficient funds: price {price}, available {available}")]
    InsufficientFunds {
        /// Price of the bundle.
        price: i64,
        /// Money held.
        available: i64,
    },

    /// The bundle asks to sell more of a resource than is held.
    #[error("insufficient {resource}: requested {requested}, held {held}")]
    InsufficientStock {
        /// The resource that runs short.
        resource: Resource,
        /// Quantity in the bundle.
        requested: i64,
        /// Quantity held.
        held: i64,
    },

    /// A counter or the price would overflow.
    #[error("arithmetic overflow in ledger")]
    ArithmeticOverflow,
}
