//! Checkout
//!
//! Checkout reads the cart's final snapshot; it never mutates the cart. It adds the delivery
//! fee, validates the shopper's contact details and produces an [`OrderDraft`] carrying the
//! amount a payment gateway would be asked to charge.

use std::{fmt, io};

use rusty_money::{Money, MoneyError, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;
use tracing::info;

use crate::{cart::CartSnapshot, pricing::TotalPriceError};

/// Errors that can occur during checkout.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// A required contact field is blank.
    #[error("contact field `{0}` is required")]
    MissingField(&'static str),

    /// The email address is not plausibly deliverable.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// Error calculating line or cart totals.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// How the order is delivered.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum DeliveryMethod {
    /// Delivery within 2-3 business days.
    #[default]
    Standard,

    /// Next day delivery for orders placed before 2 PM.
    Express,

    /// Same day delivery within city limits.
    SameDay,
}

impl DeliveryMethod {
    /// Fee in the given currency.
    pub fn fee(self, currency: &'static Currency) -> Money<'static, Currency> {
        let minor_units = match self {
            DeliveryMethod::Standard => 4_900,
            DeliveryMethod::Express => 9_900,
            DeliveryMethod::SameDay => 14_900,
        };

        Money::from_minor(minor_units, currency)
    }

    /// Delivery estimate shown to the shopper.
    pub fn estimate(self) -> &'static str {
        match self {
            DeliveryMethod::Standard => "2-3 business days",
            DeliveryMethod::Express => "next day",
            DeliveryMethod::SameDay => "same day",
        }
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeliveryMethod::Standard => "Standard Delivery",
            DeliveryMethod::Express => "Express Delivery",
            DeliveryMethod::SameDay => "Same Day Delivery",
        })
    }
}

/// How the order is paid for.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum PaymentMethod {
    /// Paid in cash when delivered.
    #[default]
    CashOnDelivery,

    /// Paid up front through the payment gateway.
    Online,
}

/// Shopper contact and delivery address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    /// Full name
    pub name: String,

    /// Email address
    pub email: String,

    /// Phone number
    pub phone: String,

    /// Delivery address
    pub address: String,

    /// Optional delivery instructions
    pub instructions: Option<String>,
}

impl ContactDetails {
    /// Check that every required field is filled in.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::MissingField`]: Name, email, phone or address is blank.
    /// - [`CheckoutError::InvalidEmail`]: The email has no local part, `@` or dotted domain.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
        ] {
            if value.trim().is_empty() {
                return Err(CheckoutError::MissingField(field));
            }
        }

        let email = self.email.trim();
        let valid_email = email.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        });

        if valid_email {
            Ok(())
        } else {
            Err(CheckoutError::InvalidEmail(email.to_string()))
        }
    }
}

/// A priced line on the checkout summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLine {
    /// Product name
    pub name: String,

    /// Units ordered
    pub quantity: u32,

    /// Price per unit
    pub unit_price: Money<'static, Currency>,

    /// Unit price times quantity
    pub total: Money<'static, Currency>,
}

/// Priced view of a cart snapshot plus delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSummary {
    lines: Vec<SummaryLine>,
    subtotal: Money<'static, Currency>,
    delivery: DeliveryMethod,
    delivery_fee: Money<'static, Currency>,
    total: Money<'static, Currency>,
}

impl CheckoutSummary {
    /// Price every line of `snapshot` and add the delivery fee.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`]: The snapshot has no lines.
    /// - [`CheckoutError::TotalPrice`]: A line or cart total could not be computed.
    /// - [`CheckoutError::Money`]: Adding the delivery fee failed.
    pub fn from_snapshot(
        snapshot: &CartSnapshot,
        delivery: DeliveryMethod,
    ) -> Result<Self, CheckoutError> {
        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let lines = snapshot
            .iter()
            .map(|line| -> Result<SummaryLine, CheckoutError> {
                Ok(SummaryLine {
                    name: line.name().to_string(),
                    quantity: line.quantity(),
                    unit_price: *line.unit_price(),
                    total: line.total()?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let subtotal = snapshot.total_price()?;
        let delivery_fee = delivery.fee(snapshot.currency());
        let total = subtotal.add(delivery_fee)?;

        Ok(Self {
            lines,
            subtotal,
            delivery,
            delivery_fee,
            total,
        })
    }

    /// Priced lines in cart order.
    pub fn lines(&self) -> &[SummaryLine] {
        &self.lines
    }

    /// Sum of line totals.
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.subtotal
    }

    /// Chosen delivery method.
    pub fn delivery(&self) -> DeliveryMethod {
        self.delivery
    }

    /// Fee for the chosen delivery method.
    pub fn delivery_fee(&self) -> Money<'static, Currency> {
        self.delivery_fee
    }

    /// Subtotal plus delivery fee.
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// Write the summary as a table followed by totals.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::IO`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), CheckoutError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Qty", "Unit Price", "Total"]);

        for line in &self.lines {
            builder.push_record([
                line.name.clone(),
                line.quantity.to_string(),
                line.unit_price.to_string(),
                line.total.to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(1..4), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| CheckoutError::IO)?;
        writeln!(out, " Subtotal: {}", self.subtotal).map_err(|_err| CheckoutError::IO)?;
        writeln!(
            out,
            " Delivery: {} ({}, {})",
            self.delivery_fee,
            self.delivery,
            self.delivery.estimate()
        )
        .map_err(|_err| CheckoutError::IO)?;
        writeln!(out, " \x1b[1mTotal:\x1b[0m    {}", self.total).map_err(|_err| CheckoutError::IO)
    }
}

/// Everything the shopper submitted at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Contact details and address
    pub contact: ContactDetails,

    /// Delivery method
    pub delivery: DeliveryMethod,

    /// Payment method
    pub payment: PaymentMethod,
}

/// A validated, priced order ready for payment.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    summary: CheckoutSummary,
    contact: ContactDetails,
    payment: PaymentMethod,
}

impl OrderDraft {
    /// Priced summary.
    pub fn summary(&self) -> &CheckoutSummary {
        &self.summary
    }

    /// Shopper contact details.
    pub fn contact(&self) -> &ContactDetails {
        &self.contact
    }

    /// Chosen payment method.
    pub fn payment(&self) -> PaymentMethod {
        self.payment
    }

    /// Grand total in minor units (e.g., paise), as a payment gateway expects it.
    ///
    /// This is the amount charged, so it includes the delivery fee; a charge for the goods
    /// alone would be `summary().subtotal()`.
    pub fn payment_amount_minor(&self) -> i64 {
        self.summary.total.to_minor_units()
    }

    /// Whether payment must go through the gateway before the order is placed.
    pub fn requires_gateway(&self) -> bool {
        self.payment == PaymentMethod::Online
    }
}

/// Validate a checkout request against the cart's final snapshot.
///
/// # Errors
///
/// Returns an error if the contact details are invalid or the cart cannot be priced (see
/// [`ContactDetails::validate`] and [`CheckoutSummary::from_snapshot`]).
pub fn checkout(
    snapshot: &CartSnapshot,
    request: CheckoutRequest,
) -> Result<OrderDraft, CheckoutError> {
    request.contact.validate()?;

    let summary = CheckoutSummary::from_snapshot(snapshot, request.delivery)?;

    info!(
        lines = summary.lines.len(),
        total_minor = summary.total.to_minor_units(),
        delivery = ?request.delivery,
        payment = ?request.payment,
        "order drafted"
    );

    Ok(OrderDraft {
        summary,
        contact: request.contact,
        payment: request.payment,
    })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use super::*;
    use crate::{
        cart::CartStore,
        notifications::NotificationRequest,
        products::{Category, Product},
    };

    fn contact() -> ContactDetails {
        ContactDetails {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "+91 98765 43210".to_string(),
            address: "12 MG Road, Bengaluru".to_string(),
            instructions: None,
        }
    }

    fn snapshot() -> CartSnapshot {
        let mut cart = CartStore::new(INR, Vec::<NotificationRequest>::new());
        let smoothie = Product::new(
            5,
            "Smoothie",
            Category::Smoothie,
            Money::from_minor(5_900, INR),
        );
        let water = Product::new(1, "Water", Category::Water, Money::from_minor(299, INR));

        cart.add_to_cart(&smoothie);
        cart.add_to_cart(&smoothie);
        cart.add_to_cart(&water)
    }

    #[test]
    fn summary_adds_delivery_fee() -> TestResult {
        let summary = CheckoutSummary::from_snapshot(&snapshot(), DeliveryMethod::Express)?;

        assert_eq!(summary.lines().len(), 2);
        assert_eq!(summary.subtotal(), Money::from_minor(12_099, INR));
        assert_eq!(summary.delivery_fee(), Money::from_minor(9_900, INR));
        assert_eq!(summary.total(), Money::from_minor(21_999, INR));

        Ok(())
    }

    #[test]
    fn empty_cart_cannot_check_out() {
        let cart = CartStore::new(INR, Vec::<NotificationRequest>::new());

        assert_eq!(
            CheckoutSummary::from_snapshot(&cart.snapshot(), DeliveryMethod::Standard),
            Err(CheckoutError::EmptyCart)
        );
    }

    #[test]
    fn blank_fields_are_rejected() {
        let details = ContactDetails {
            address: "   ".to_string(),
            ..contact()
        };

        assert_eq!(details.validate(), Err(CheckoutError::MissingField("address")));
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in ["asha", "@example.com", "asha@", "asha@example", "a@b@c.com"] {
            let details = ContactDetails {
                email: email.to_string(),
                ..contact()
            };

            assert!(
                matches!(details.validate(), Err(CheckoutError::InvalidEmail(_))),
                "{email} should be rejected"
            );
        }
    }

    #[test]
    fn online_orders_go_through_the_gateway() -> TestResult {
        let draft = checkout(
            &snapshot(),
            CheckoutRequest {
                contact: contact(),
                delivery: DeliveryMethod::Standard,
                payment: PaymentMethod::Online,
            },
        )?;

        assert!(draft.requires_gateway());
        assert_eq!(draft.payment_amount_minor(), 16_999);
        assert_eq!(draft.contact(), &contact());

        Ok(())
    }

    #[test]
    fn gateway_amount_includes_delivery_fee() -> TestResult {
        let draft = checkout(
            &snapshot(),
            CheckoutRequest {
                contact: contact(),
                delivery: DeliveryMethod::Express,
                payment: PaymentMethod::CashOnDelivery,
            },
        )?;

        let summary = draft.summary();

        assert_eq!(summary.delivery(), DeliveryMethod::Express);
        assert_eq!(summary.subtotal().to_minor_units(), 12_099);
        assert_eq!(
            draft.payment_amount_minor(),
            summary.subtotal().to_minor_units() + summary.delivery_fee().to_minor_units()
        );
        assert!(!draft.requires_gateway());

        Ok(())
    }

    #[test]
    fn write_to_renders_lines_and_totals() -> TestResult {
        let summary = CheckoutSummary::from_snapshot(&snapshot(), DeliveryMethod::SameDay)?;
        let mut out = Vec::new();

        summary.write_to(&mut out)?;

        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("Smoothie"));
        assert!(rendered.contains("Same Day Delivery"));
        assert!(rendered.contains("Total"));

        Ok(())
    }
}
