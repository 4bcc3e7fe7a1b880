//! Cart lines and snapshots

use std::{num::NonZeroU32, sync::Arc};

use rusty_money::{Money, iso::Currency};

use crate::{
    pricing::{TotalPriceError, line_total, total_price},
    products::{Product, ProductId},
};

/// One distinct product in the cart.
///
/// Name, image and unit price are copied from the product when it is first added; later
/// additions of the same product only change the quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    id: ProductId,
    name: String,
    image: String,
    unit_price: Money<'static, Currency>,
    quantity: NonZeroU32,
}

impl CartLine {
    /// A new line holding one unit of `product`.
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            image: product.image.clone(),
            unit_price: product.price,
            quantity: NonZeroU32::MIN,
        }
    }

    /// Product identifier
    pub fn id(&self) -> ProductId {
        self.id
    }

    /// Product name at add time
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Product image at add time
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Price per unit at add time
    pub fn unit_price(&self) -> &Money<'static, Currency> {
        &self.unit_price
    }

    /// Number of units, always at least one
    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    /// Unit price times quantity
    ///
    /// # Errors
    ///
    /// Returns a `TotalPriceError` if the total does not fit in minor units.
    pub fn total(&self) -> Result<Money<'static, Currency>, TotalPriceError> {
        line_total(self)
    }

    /// `None` when the quantity is already at its maximum.
    pub(crate) fn incremented(&self) -> Option<Self> {
        self.quantity.checked_add(1).map(|quantity| Self {
            quantity,
            ..self.clone()
        })
    }

    #[cfg(test)]
    pub(crate) fn with_quantity(self, quantity: NonZeroU32) -> Self {
        Self { quantity, ..self }
    }

    /// `None` when the line would drop to zero units.
    pub(crate) fn decremented(&self) -> Option<Self> {
        NonZeroU32::new(self.quantity.get() - 1).map(|quantity| Self {
            quantity,
            ..self.clone()
        })
    }
}

/// Immutable view of the cart at one revision.
///
/// Cloning is cheap; holders keep seeing the revision they cloned even after the store moves on.
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    lines: Arc<[CartLine]>,
    currency: &'static Currency,
    revision: u64,
}

impl CartSnapshot {
    pub(crate) fn empty(currency: &'static Currency) -> Self {
        Self {
            lines: Arc::from(Vec::new()),
            currency,
            revision: 0,
        }
    }

    pub(crate) fn next(&self, lines: Vec<CartLine>) -> Self {
        Self {
            lines: Arc::from(lines),
            currency: self.currency,
            revision: self.revision.wrapping_add(1),
        }
    }

    /// Lines in the order their products were first added.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Iterate over the lines.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Line for a product, if present.
    pub fn get(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// Quantity of a product, zero when absent.
    pub fn quantity_of(&self, id: ProductId) -> u32 {
        self.get(id).map_or(0, CartLine::quantity)
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all quantities.
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity())).sum()
    }

    /// Sum of unit price times quantity over all lines, recomputed on every call.
    ///
    /// # Errors
    ///
    /// Returns a `TotalPriceError` if there was a money arithmetic or currency mismatch error.
    pub fn total_price(&self) -> Result<Money<'static, Currency>, TotalPriceError> {
        total_price(&self.lines, self.currency)
    }

    /// Currency totals are reported in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Number of committed mutations that produced this snapshot.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;

    use super::*;
    use crate::products::Category;

    fn product() -> Product {
        Product::new(5, "Dry Fruits Smoothie", Category::Smoothie, Money::from_minor(5900, INR))
            .with_image("https://img.example/smoothie.jpg")
    }

    #[test]
    fn from_product_copies_display_metadata() {
        let line = CartLine::from_product(&product());

        assert_eq!(line.id(), ProductId(5));
        assert_eq!(line.name(), "Dry Fruits Smoothie");
        assert_eq!(line.image(), "https://img.example/smoothie.jpg");
        assert_eq!(line.unit_price(), &Money::from_minor(5900, INR));
        assert_eq!(line.quantity(), 1);
    }

    #[test]
    fn decrementing_the_last_unit_yields_none() {
        let line = CartLine::from_product(&product());

        assert_eq!(
            line.incremented()
                .and_then(|line| line.decremented())
                .as_ref()
                .map(CartLine::quantity),
            Some(1)
        );
        assert_eq!(line.decremented(), None);
    }

    #[test]
    fn incrementing_a_full_line_yields_none() {
        let line = CartLine::from_product(&product()).with_quantity(NonZeroU32::MAX);

        assert_eq!(line.incremented(), None);
    }

    #[test]
    fn snapshot_totals() -> testresult::TestResult {
        let line = CartLine::from_product(&product())
            .with_quantity(NonZeroU32::MIN.saturating_add(1));
        let snapshot = CartSnapshot::empty(INR).next(vec![line]);

        assert_eq!(snapshot.total_items(), 2);
        assert_eq!(snapshot.total_price()?, Money::from_minor(11_800, INR));
        assert_eq!(snapshot.quantity_of(ProductId(5)), 2);
        assert_eq!(snapshot.quantity_of(ProductId(6)), 0);
        assert_eq!(snapshot.revision(), 1);

        Ok(())
    }
}
