//! The city's resource counters and the Buy/Sell rules applied to them.
//!
//! # Design
//!
//! - **All-or-nothing**: a trade computes the full new holdings on a copy and
//!   commits only if every step succeeded.
//! - **Checked arithmetic**: no counter can wrap.
//! - **Money is currency**: the `money` field of a trade bundle is ignored.

use citytalk_types::{Resource, ResourceBundle};

use crate::LedgerError;

/// Holdings at the start of a game.
pub const STARTING_HOLDINGS: ResourceBundle = ResourceBundle::new(100, 50, 75, 25, 100_000, 200);

/// Direction of a trade with the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    /// Goods come in, Money goes out.
    Buy,
    /// Goods go out, Money comes in.
    Sell,
}

/// A completed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trade {
    /// Direction.
    pub side: TradeSide,
    /// Goods exchanged (Money counter ignored).
    pub bundle: ResourceBundle,
    /// Money paid or received.
    pub price: i64,
    /// Money held after the trade.
    pub money_after: i64,
}

/// The six resource counters of the city.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLedger {
    holdings: ResourceBundle,
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::starting()
    }
}

impl ResourceLedger {
    /// Create a ledger with explicit holdings.
    pub const fn new(holdings: ResourceBundle) -> Self {
        Self { holdings }
    }

    /// Create a ledger seeded with [`STARTING_HOLDINGS`].
    pub const fn starting() -> Self {
        Self::new(STARTING_HOLDINGS)
    }

    /// Current holdings.
    pub const fn holdings(&self) -> ResourceBundle {
        self.holdings
    }

    /// One counter.
    pub const fn get(&self, resource: Resource) -> i64 {
        self.holdings.get(resource)
    }

    /// Price the bundle after checking it is non-empty and non-negative.
    pub fn quote(bundle: &ResourceBundle) -> Result<i64, LedgerError> {
        if let Some(resource) = bundle.first_negative() {
            return Err(LedgerError::NegativeQuantity {
                resource,
                quantity: bundle.get(resource),
            });
        }
        if bundle.is_empty() {
            return Err(LedgerError::EmptyBundle);
        }
        bundle.price().ok_or(LedgerError::ArithmeticOverflow)
    }

    /// Buy the bundle from the store.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientFunds`] if the price exceeds the Money held;
    /// see [`Self::quote`] for bundle validation errors.
    pub fn buy(&mut self, bundle: ResourceBundle) -> Result<Trade, LedgerError> {
        let price = Self::quote(&bundle)?;
        let available = self.holdings.money;
        if available < price {
            return Err(LedgerError::InsufficientFunds { price, available });
        }

        let mut next = self.holdings;
        for resource in Resource::TRADED {
            let counter = next.get_mut(resource);
            *counter = counter
                .checked_add(bundle.get(resource))
                .ok_or(LedgerError::ArithmeticOverflow)?;
        }
        next.money = available
            .checked_sub(price)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        Ok(self.commit(TradeSide::Buy, bundle, price, next))
    }

    /// Sell the bundle to the store.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientStock`] if any requested quantity exceeds
    /// what is held; see [`Self::quote`] for bundle validation errors.
    pub fn sell(&mut self, bundle: ResourceBundle) -> Result<Trade, LedgerError> {
        let price = Self::quote(&bundle)?;

        let mut next = self.holdings;
        for resource in Resource::TRADED {
            let held = self.holdings.get(resource);
            let requested = bundle.get(resource);
            if requested > held {
                return Err(LedgerError::InsufficientStock {
                    resource,
                    requested,
                    held,
                });
            }
            let counter = next.get_mut(resource);
            *counter = held
                .checked_sub(requested)
                .ok_or(LedgerError::ArithmeticOverflow)?;
        }
        next.money = next
            .money
            .checked_add(price)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        Ok(self.commit(TradeSide::Sell, bundle, price, next))
    }

    /// Remove up to `amount` Food, never going below zero.
    ///
    /// Returns the quantity actually consumed.
    pub fn consume_food(&mut self, amount: i64) -> i64 {
        let consumed = amount.clamp(0, self.holdings.food.max(0));
        self.holdings.food = self.holdings.food.saturating_sub(consumed);
        if consumed < amount {
            tracing::warn!(requested = amount, consumed, "food ran out");
        }
        consumed
    }

    fn commit(
        &mut self,
        side: TradeSide,
        bundle: ResourceBundle,
        price: i64,
        next: ResourceBundle,
    ) -> Trade {
        self.holdings = next;
        tracing::info!(
            side = ?side,
            price,
            money = next.money,
            "trade settled"
        );
        Trade {
            side,
            bundle,
            price,
            money_after: next.money,
        }
    }
}

impl core::fmt::Display for ResourceLedger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.holdings, f)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(resource: Resource, quantity: i64) -> ResourceBundle {
        ResourceBundle::default().with(resource, quantity)
    }

    #[test]
    fn buy_moves_goods_in_and_money_out() {
        let mut ledger = ResourceLedger::starting();
        let trade = ledger.buy(ResourceBundle::new(10, 0, 0, 5, 0, 3));
        // 10*1 + 5*4 + 3*2
        assert_eq!(trade.map(|t| t.price), Ok(36));
        assert_eq!(
            ledger.holdings(),
            ResourceBundle::new(110, 50, 75, 30, 99_964, 203)
        );
    }

    #[test]
    fn buy_beyond_funds_leaves_ledger_unchanged() {
        let mut ledger = ResourceLedger::new(ResourceBundle::new(0, 0, 0, 0, 5, 0));
        let before = ledger;
        let result = ledger.buy(bundle(Resource::Stone, 2));
        assert_eq!(
            result,
            Err(LedgerError::InsufficientFunds {
                price: 6,
                available: 5
            })
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn buy_with_exact_funds_succeeds() {
        let mut ledger = ResourceLedger::new(ResourceBundle::new(0, 0, 0, 0, 6, 0));
        assert!(ledger.buy(bundle(Resource::Stone, 2)).is_ok());
        assert_eq!(ledger.get(Resource::Money), 0);
        assert_eq!(ledger.get(Resource::Stone), 2);
    }

    #[test]
    fn money_field_of_bundle_is_ignored() {
        let mut ledger = ResourceLedger::starting();
        let result = ledger.buy(ResourceBundle::new(1, 0, 0, 0, 500, 0));
        assert_eq!(result.map(|t| t.price), Ok(1));
        assert_eq!(ledger.get(Resource::Money), 99_999);
    }

    #[test]
    fn sell_more_than_held_is_rejected_whole() {
        let mut ledger = ResourceLedger::starting();
        let before = ledger;
        let result = ledger.sell(ResourceBundle::new(10, 51, 0, 0, 0, 0));
        assert_eq!(
            result,
            Err(LedgerError::InsufficientStock {
                resource: Resource::Salt,
                requested: 51,
                held: 50
            })
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn sell_moves_goods_out_and_money_in() {
        let mut ledger = ResourceLedger::starting();
        let trade = ledger.sell(ResourceBundle::new(100, 0, 0, 25, 0, 0));
        assert_eq!(trade.map(|t| t.money_after), Ok(100_200));
        assert_eq!(ledger.get(Resource::Wood), 0);
        assert_eq!(ledger.get(Resource::Iron), 0);
    }

    #[test]
    fn empty_and_negative_bundles_are_rejected() {
        let mut ledger = ResourceLedger::starting();
        assert_eq!(
            ledger.buy(ResourceBundle::default()),
            Err(LedgerError::EmptyBundle)
        );
        assert_eq!(
            ledger.sell(bundle(Resource::Food, -4)),
            Err(LedgerError::NegativeQuantity {
                resource: Resource::Food,
                quantity: -4
            })
        );
        assert_eq!(ledger, ResourceLedger::starting());
    }

    #[test]
    fn overflowing_buy_is_rejected() {
        let mut ledger = ResourceLedger::new(ResourceBundle::new(i64::MAX, 0, 0, 0, 10, 0));
        assert_eq!(
            ledger.buy(bundle(Resource::Wood, 1)),
            Err(LedgerError::ArithmeticOverflow)
        );
        assert_eq!(ledger.get(Resource::Money), 10);
    }

    #[test]
    fn food_consumption_stops_at_zero() {
        let mut ledger = ResourceLedger::new(bundle(Resource::Food, 3));
        assert_eq!(ledger.consume_food(2), 2);
        assert_eq!(ledger.consume_food(5), 1);
        assert_eq!(ledger.get(Resource::Food), 0);
        assert_eq!(ledger.consume_food(-1), 0);
    }

    #[test]
    fn summary_lists_all_counters() {
        assert_eq!(
            ResourceLedger::starting().to_string(),
            "Wood: 100, Salt: 50, Stone: 75, Iron: 25, Money: 100000, Food: 200"
        );
    }
}
