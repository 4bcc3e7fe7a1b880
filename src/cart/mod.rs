//! Cart
//!
//! The cart store holds the shopper's lines for one session. Every mutation copies the current
//! lines, applies the change and commits the result as a new [`CartSnapshot`] in one step, then
//! submits a notification request describing the change to the store's sink.

use rusty_money::{Money, iso::Currency};
use tracing::debug;

use crate::{
    notifications::{NotificationKind, NotificationRequest, NotificationSink},
    observer::{CartObserver, NoopObserver},
    pricing::TotalPriceError,
    products::{Product, ProductId},
};

mod lines;

pub use lines::{CartLine, CartSnapshot};

/// Cart store for one shopping session.
#[derive(Debug)]
pub struct CartStore<S: NotificationSink, O: CartObserver = NoopObserver> {
    snapshot: CartSnapshot,
    sink: S,
    observer: O,
}

impl<S: NotificationSink> CartStore<S> {
    /// Create an empty cart that totals in `currency` and reports changes to `sink`.
    pub fn new(currency: &'static Currency, sink: S) -> Self {
        CartStore {
            snapshot: CartSnapshot::empty(currency),
            sink,
            observer: NoopObserver,
        }
    }
}

impl<S: NotificationSink, O: CartObserver> CartStore<S, O> {
    /// Replace the observer told about committed changes.
    pub fn with_observer<P: CartObserver>(self, observer: P) -> CartStore<S, P> {
        CartStore {
            snapshot: self.snapshot,
            sink: self.sink,
            observer,
        }
    }

    /// Add one unit of `product`.
    ///
    /// An existing line for the product gains a unit; otherwise a new line with one unit is
    /// appended. Either way a success notification reports the resulting quantity. A line
    /// already holding `u32::MAX` units is left as it is.
    pub fn add_to_cart(&mut self, product: &Product) -> CartSnapshot {
        let mut lines = self.snapshot.lines().to_vec();

        let line = if let Some(line) = lines.iter_mut().find(|line| line.id() == product.id) {
            let Some(next) = line.incremented() else {
                return self.snapshot();
            };

            *line = next;
            line.clone()
        } else {
            let line = CartLine::from_product(product);
            lines.push(line.clone());
            line
        };

        self.commit(lines);
        self.sink.submit(notification(NotificationKind::Success, &line));

        self.snapshot()
    }

    /// Remove a product's line entirely. Absent products are ignored.
    pub fn remove_from_cart(&mut self, id: ProductId) -> CartSnapshot {
        if self.snapshot.get(id).is_none() {
            return self.snapshot();
        }

        let lines = self
            .snapshot
            .iter()
            .filter(|line| line.id() != id)
            .cloned()
            .collect();

        self.commit(lines);

        self.snapshot()
    }

    /// Add one unit to an existing line and report the new quantity.
    ///
    /// Absent products and lines already holding `u32::MAX` units are left as they are.
    pub fn increase_quantity(&mut self, id: ProductId) -> CartSnapshot {
        let Some(next) = self.snapshot.get(id).and_then(CartLine::incremented) else {
            return self.snapshot();
        };

        let lines = self
            .snapshot
            .iter()
            .map(|line| {
                if line.id() == id {
                    next.clone()
                } else {
                    line.clone()
                }
            })
            .collect();

        self.commit(lines);
        self.sink.submit(notification(NotificationKind::Success, &next));

        self.snapshot()
    }

    /// Take one unit from an existing line.
    ///
    /// A line that drops to zero units is removed and no notification is sent; otherwise an
    /// info notification reports the remaining quantity.
    pub fn decrease_quantity(&mut self, id: ProductId) -> CartSnapshot {
        let Some(next) = self.snapshot.get(id).map(CartLine::decremented) else {
            return self.snapshot();
        };

        let lines = self
            .snapshot
            .iter()
            .filter_map(|line| {
                if line.id() == id {
                    next.clone()
                } else {
                    Some(line.clone())
                }
            })
            .collect();

        self.commit(lines);

        if let Some(line) = next {
            self.sink.submit(notification(NotificationKind::Info, &line));
        }

        self.snapshot()
    }

    /// Sum of all quantities.
    pub fn total_items(&self) -> u64 {
        self.snapshot.total_items()
    }

    /// Sum of unit price times quantity, recomputed from the current lines.
    ///
    /// # Errors
    ///
    /// Returns a `TotalPriceError` if there was a money arithmetic or currency mismatch error.
    pub fn total_price(&self) -> Result<Money<'static, Currency>, TotalPriceError> {
        self.snapshot.total_price()
    }

    /// Current lines, in the order their products were first added.
    pub fn lines(&self) -> &[CartLine] {
        self.snapshot.lines()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> CartSnapshot {
        self.snapshot.clone()
    }

    /// Currency totals are reported in.
    pub fn currency(&self) -> &'static Currency {
        self.snapshot.currency()
    }

    /// The notification sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The notification sink, mutably (e.g. to dismiss or tick a queue).
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    fn commit(&mut self, lines: Vec<CartLine>) {
        self.snapshot = self.snapshot.next(lines);

        debug!(
            revision = self.snapshot.revision(),
            lines = self.snapshot.len(),
            total_items = self.snapshot.total_items(),
            "committed cart"
        );

        self.observer.on_cart_changed(&self.snapshot);
    }
}

fn notification(kind: NotificationKind, line: &CartLine) -> NotificationRequest {
    debug!(product_id = %line.id(), quantity = line.quantity(), %kind, "cart line changed");

    NotificationRequest {
        subject_name: line.name().to_string(),
        subject_image: line.image().to_string(),
        quantity: line.quantity(),
        kind,
    }
}
