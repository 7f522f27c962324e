//! Value objects for the order domain.

use serde::Serialize;

use super::OrderError;

fn require(value: impl Into<String>, field: &'static str) -> Result<String, OrderError> {
    let value = value.into();
    if value.trim().is_empty() {
        return Err(OrderError::Required(field));
    }
    Ok(value)
}

/// Customer as captured when the order was placed.
///
/// Never resolved live against a customer registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerSnapshot {
    id: String,
    name: String,
}

impl CustomerSnapshot {
    /// Creates a customer snapshot. Both fields must be non-empty.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Result<Self, OrderError> {
        Ok(Self {
            id: require(id, "customer id")?,
            name: require(name, "customer name")?,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Restaurant as captured when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestaurantSnapshot {
    id: String,
    name: String,
}

impl RestaurantSnapshot {
    /// Creates a restaurant snapshot. Both fields must be non-empty.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Result<Self, OrderError> {
        Ok(Self {
            id: require(id, "restaurant id")?,
            name: require(name, "restaurant name")?,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The purchased product as it existed at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSnapshot {
    id: String,
    description: String,
}

impl ProductSnapshot {
    /// Creates a product snapshot. The id must be non-empty.
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Result<Self, OrderError> {
        Ok(Self {
            id: require(id, "product id")?,
            description: description.into(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A discount coupon attached to an order.
///
/// The stored `discount` is carried along for reference; the order applies a
/// fixed rate regardless of it (see [`super::pricing`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coupon {
    code: String,
    discount: Money,
}

impl Coupon {
    /// Creates a coupon. The code is trimmed and must be non-empty.
    pub fn new(code: impl Into<String>, discount: Money) -> Result<Self, OrderError> {
        let code = require(code, "coupon code")?;
        if discount.is_negative() {
            return Err(OrderError::NegativeAmount {
                field: "coupon discount",
                amount: discount,
            });
        }
        Ok(Self {
            code: code.trim().to_string(),
            discount,
        })
    }

    /// Creates a coupon that carries no discount amount of its own.
    pub fn with_code(code: impl Into<String>) -> Result<Self, OrderError> {
        Self::new(code, Money::zero())
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn discount(&self) -> Money {
        self.discount
    }
}

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from a whole-unit value, saturating at
    /// the representable range.
    pub fn from_units(units: i64) -> Self {
        Self {
            cents: units.saturating_mul(100),
        }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the whole-unit portion.
    pub fn units(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after whole units).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Adds two amounts, or `None` on overflow.
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.cents.checked_add(rhs.cents).map(Money::from_cents)
    }

    /// Subtracts `rhs`, or `None` on overflow.
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.cents.checked_sub(rhs.cents).map(Money::from_cents)
    }

    /// Multiplies by a quantity, or `None` on overflow.
    pub fn checked_multiply(self, quantity: u32) -> Option<Money> {
        self.cents
            .checked_mul(i64::from(quantity))
            .map(Money::from_cents)
    }

    /// Returns `percent`% of this amount rounded to the cent, with halves
    /// rounded away from zero. `None` if the result does not fit.
    pub fn percent(self, percent: i64) -> Option<Money> {
        let scaled = i128::from(self.cents) * i128::from(percent);
        let mut cents = scaled / 100;
        if (scaled % 100).abs() * 2 >= 100 {
            cents += scaled.signum();
        }
        i64::try_from(cents).ok().map(Money::from_cents)
    }

    /// Sums amounts, or `None` on overflow.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }

    /// Clamps negative amounts to zero.
    pub fn max_zero(self) -> Money {
        if self.is_negative() { Money::zero() } else { self }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-{}.{:02}", self.units().abs(), self.cents_part())
        } else {
            write!(f, "{}.{:02}", self.units(), self.cents_part())
        }
    }
}
