//! Prices

use rusty_money::{Money, MoneyError, iso};
use thiserror::Error;

use crate::{cart::CartLine, products::ProductId};

/// Errors that can occur while calculating total price.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// A line total does not fit in minor units.
    #[error("line total for product {0} overflows")]
    Overflow(ProductId),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculates the price of a single cart line (unit price times quantity)
///
/// # Errors
///
/// - [`TotalPriceError::Overflow`]: The line total does not fit in minor units.
pub fn line_total(line: &CartLine) -> Result<Money<'static, iso::Currency>, TotalPriceError> {
    let unit_price = line.unit_price();

    let minor_units = unit_price
        .to_minor_units()
        .checked_mul(i64::from(line.quantity()))
        .ok_or(TotalPriceError::Overflow(line.id()))?;

    Ok(Money::from_minor(minor_units, unit_price.currency()))
}

/// Calculates the total price of a list of cart lines, starting from zero in `currency`
///
/// # Errors
///
/// - [`TotalPriceError::Overflow`]: A line total does not fit in minor units.
/// - [`TotalPriceError::Money`]: Wrapped money arithmetic or currency mismatch error.
pub fn total_price(
    lines: &[CartLine],
    currency: &'static iso::Currency,
) -> Result<Money<'static, iso::Currency>, TotalPriceError> {
    lines
        .iter()
        .try_fold(
            Money::from_minor(0, currency),
            |acc, line| -> Result<_, TotalPriceError> { Ok(acc.add(line_total(line)?)?) },
        )
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use rusty_money::iso::{GBP, INR};
    use testresult::TestResult;

    use super::*;
    use crate::products::{Category, Product};

    fn line(id: u32, price_minor: i64, quantity: u32) -> CartLine {
        let product = Product::new(
            id,
            "Juice",
            Category::Juice,
            Money::from_minor(price_minor, INR),
        );

        let line = CartLine::from_product(&product);

        match NonZeroU32::new(quantity) {
            Some(quantity) => line.with_quantity(quantity),
            None => line,
        }
    }

    #[test]
    fn test_line_total() -> TestResult {
        assert_eq!(line_total(&line(1, 250, 3))?, Money::from_minor(750, INR));

        Ok(())
    }

    #[test]
    fn test_total_price() -> TestResult {
        let lines = [line(1, 100, 2), line(2, 299, 1)];

        assert_eq!(total_price(&lines, INR)?, Money::from_minor(499, INR));

        Ok(())
    }

    #[test]
    fn test_total_price_empty_is_zero() -> TestResult {
        assert_eq!(total_price(&[], INR)?, Money::from_minor(0, INR));

        Ok(())
    }

    #[test]
    fn test_total_price_currency_mismatch() {
        let lines = [line(1, 100, 1)];

        assert!(matches!(
            total_price(&lines, GBP),
            Err(TotalPriceError::Money(_))
        ));
    }

    #[test]
    fn test_line_total_overflow() {
        let overflowing = line(7, i64::MAX, 2);

        assert_eq!(
            line_total(&overflowing),
            Err(TotalPriceError::Overflow(ProductId(7)))
        );
    }
}
