//! Juicebar prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{CartLine, CartSnapshot, CartStore},
    catalog::{Catalog, CatalogError},
    checkout::{
        CheckoutError, CheckoutRequest, CheckoutSummary, ContactDetails, DeliveryMethod,
        OrderDraft, PaymentMethod, checkout,
    },
    clock::{Clock, ManualClock, SystemClock},
    notifications::{
        Notification, NotificationError, NotificationId, NotificationKind, NotificationQueue,
        NotificationRequest, NotificationSink, Phase, QueueSettings, RemovalReason,
    },
    observer::{CartObserver, NoopObserver, NotificationObserver},
    pricing::TotalPriceError,
    products::{Availability, Category, Product, ProductId},
};
