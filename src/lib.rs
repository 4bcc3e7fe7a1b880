//! Juicebar
//!
//! Juicebar is the cart and notification core of an organic juice storefront: a menu catalog,
//! a shopping cart with derived totals, a capped feed of self-expiring notifications and a
//! checkout summary that reads the cart's final state.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod clock;
pub mod notifications;
pub mod observer;
pub mod prelude;
pub mod pricing;
pub mod products;
