//! Store observers
//!
//! Presentation layers subscribe to the cart and the notification queue through these traits
//! instead of polling. Both stores call their observer after a change has been committed, so an
//! observer only ever sees consistent state.
//!
//! When no observer is provided the stores use [`NoopObserver`], and the calls compile away.

use crate::{
    cart::CartSnapshot,
    notifications::{Notification, RemovalReason},
};

/// Observer of cart changes.
pub trait CartObserver {
    /// Called after every committed cart mutation with the new snapshot.
    fn on_cart_changed(&mut self, snapshot: &CartSnapshot);
}

/// Observer of notification queue changes.
pub trait NotificationObserver {
    /// Called after the set of queued notifications (or a fade flag) changed.
    ///
    /// # Parameters
    ///
    /// - `notifications`: Queued notifications, oldest first
    fn on_notifications_changed(&mut self, notifications: &[Notification]);

    /// Called when a notification leaves the queue, before `on_notifications_changed`.
    fn on_removed(&mut self, _notification: &Notification, _reason: RemovalReason) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CartObserver for NoopObserver {
    fn on_cart_changed(&mut self, _snapshot: &CartSnapshot) {}
}

impl NotificationObserver for NoopObserver {
    fn on_notifications_changed(&mut self, _notifications: &[Notification]) {}
}

impl<O: CartObserver + ?Sized> CartObserver for &mut O {
    fn on_cart_changed(&mut self, snapshot: &CartSnapshot) {
        (**self).on_cart_changed(snapshot);
    }
}

impl<O: NotificationObserver + ?Sized> NotificationObserver for &mut O {
    fn on_notifications_changed(&mut self, notifications: &[Notification]) {
        (**self).on_notifications_changed(notifications);
    }

    fn on_removed(&mut self, notification: &Notification, reason: RemovalReason) {
        (**self).on_removed(notification, reason);
    }
}
