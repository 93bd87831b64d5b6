//! Currency amounts: user budgets and item prices.
//!
//! Both are whole-dollar, non-negative amounts. The database stores them as
//! `INTEGER`; conversion happens at the persistence boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Non-negative whole-dollar price of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u32);

impl Price {
    #[must_use]
    pub const fn new(amount: u32) -> Self {
        Self(amount)
    }

    #[must_use]
    pub const fn amount(self) -> u32 {
        self.0
    }

    /// Render with thousands separators and a trailing `$`, e.g. `1,250 $`.
    #[must_use]
    pub fn pretty(self) -> String {
        format!("{} $", group_thousands(self.0))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned by [`Budget::debit`] when the balance cannot cover a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("budget of {available} cannot cover price {required}")]
pub struct InsufficientFunds {
    pub required: Price,
    pub available: Budget,
}

/// A user's spendable balance.
///
/// # Examples
/// ```
/// use market::domain::{Budget, Price};
///
/// let budget = Budget::STARTING.debit(Price::new(300)).expect("affordable");
/// assert_eq!(budget.amount(), 700);
/// assert_eq!(Budget::STARTING.pretty(), "1,000 $");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Budget(u32);

impl Budget {
    /// Balance granted to every newly registered user.
    pub const STARTING: Budget = Budget(1000);

    #[must_use]
    pub const fn new(amount: u32) -> Self {
        Self(amount)
    }

    #[must_use]
    pub const fn amount(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn can_afford(self, price: Price) -> bool {
        self.0 >= price.0
    }

    /// Subtract `price`, refusing to go below zero.
    pub fn debit(self, price: Price) -> Result<Self, InsufficientFunds> {
        self.0
            .checked_sub(price.0)
            .map(Self)
            .ok_or(InsufficientFunds {
                required: price,
                available: self,
            })
    }

    /// Add `price` back, saturating at `u32::MAX`.
    #[must_use]
    pub fn credit(self, price: Price) -> Self {
        Self(self.0.saturating_add(price.0))
    }

    #[must_use]
    pub fn pretty(self) -> String {
        format!("{} $", group_thousands(self.0))
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::STARTING
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn group_thousands(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
