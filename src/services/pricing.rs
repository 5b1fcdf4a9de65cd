use rust_decimal::Decimal;
use serde::Serialize;

/// Computed totals for a resolved cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl Totals {
    pub const ZERO: Totals = Totals {
        subtotal: Decimal::ZERO,
        tax: Decimal::ZERO,
        total: Decimal::ZERO,
    };
}

/// Pure pricing arithmetic over (price, quantity) pairs.
///
/// The tax rate is fixed once at process start from configuration. All
/// arithmetic is decimal; the tax is rounded to 2 decimal places with
/// round-half-even (banker's rounding), the `round_dp` default, so display
/// and persisted values always agree. Example: subtotal 23.50 at 19% gives
/// tax 4.465, rounded half-even to 4.46, total 27.96.
#[derive(Debug, Clone)]
pub struct PricingCalculator {
    tax_rate: Decimal,
}

impl PricingCalculator {
    pub fn new(tax_rate: Decimal) -> Self {
        Self { tax_rate }
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    pub fn line_total(price: Decimal, quantity: i32) -> Decimal {
        price * Decimal::from(quantity)
    }

    /// Derives subtotal, tax and total from (unit price, quantity) pairs.
    /// No side effects; callers resolve carts against the catalog first.
    pub fn totals<I>(&self, lines: I) -> Totals
    where
        I: IntoIterator<Item = (Decimal, i32)>,
    {
        let subtotal: Decimal = lines
            .into_iter()
            .map(|(price, qty)| Self::line_total(price, qty))
            .sum();

        let tax = (subtotal * self.tax_rate).round_dp(2);
        let total = subtotal + tax;

        Totals {
            subtotal,
            tax,
            total,
        }
    }
}
