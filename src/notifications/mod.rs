//! Notifications
//!
//! A capped, time-ordered feed of transient messages. Each entry registers two timers when it is
//! enqueued: one that marks it as fading out and one that removes it. Entries that leave the
//! queue early (dismissed by the shopper or evicted because the feed is full) cancel their
//! timers, so nothing scheduled outlives its entry.
//!
//! Timers fire when the queue is [ticked](NotificationQueue::tick); an event loop is expected to
//! call `tick` whenever [`NotificationQueue::next_deadline`] passes.

use std::{fmt, time::Duration};

use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{
    clock::{Clock, SystemClock},
    notifications::timers::{TimerKey, Timers},
    observer::{NoopObserver, NotificationObserver},
};

pub mod timers;

/// Default maximum number of notifications shown at once.
pub const DEFAULT_CAPACITY: usize = 5;

/// Default delay between enqueue and fade-out, in milliseconds.
pub const DEFAULT_FADE_AFTER_MS: u64 = 2_000;

/// Default delay between enqueue and removal, in milliseconds.
pub const DEFAULT_REMOVE_AFTER_MS: u64 = 2_500;

/// Default delay between enqueue and fade-out.
pub const DEFAULT_FADE_AFTER: Duration = Duration::from_millis(DEFAULT_FADE_AFTER_MS);

/// Default delay between enqueue and removal.
pub const DEFAULT_REMOVE_AFTER: Duration = Duration::from_millis(DEFAULT_REMOVE_AFTER_MS);

/// Errors raised when configuring a notification queue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotificationError {
    /// The queue must be able to hold at least one notification.
    #[error("notification capacity must be at least 1")]
    ZeroCapacity,

    /// Entries must fade before they are removed.
    #[error("removal delay {remove_after:?} is shorter than fade delay {fade_after:?}")]
    RemovalBeforeFade {
        /// Configured fade delay
        fade_after: Duration,
        /// Configured removal delay
        remove_after: Duration,
    },
}

/// Capacity and lifetime settings for a [`NotificationQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSettings {
    capacity: usize,
    fade_after: Duration,
    remove_after: Duration,
}

impl QueueSettings {
    /// Create validated queue settings.
    ///
    /// # Errors
    ///
    /// - [`NotificationError::ZeroCapacity`]: `capacity` is zero.
    /// - [`NotificationError::RemovalBeforeFade`]: `remove_after` is shorter than `fade_after`.
    pub fn new(
        capacity: usize,
        fade_after: Duration,
        remove_after: Duration,
    ) -> Result<Self, NotificationError> {
        if capacity == 0 {
            return Err(NotificationError::ZeroCapacity);
        }

        if remove_after < fade_after {
            return Err(NotificationError::RemovalBeforeFade {
                fade_after,
                remove_after,
            });
        }

        Ok(Self {
            capacity,
            fade_after,
            remove_after,
        })
    }

    /// Maximum number of entries held at once.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Delay from enqueue until an entry starts fading out.
    pub fn fade_after(&self) -> Duration {
        self.fade_after
    }

    /// Delay from enqueue until an entry is removed.
    pub fn remove_after(&self) -> Duration {
        self.remove_after
    }
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            fade_after: DEFAULT_FADE_AFTER,
            remove_after: DEFAULT_REMOVE_AFTER,
        }
    }
}

/// Notification identifier, assigned by the queue and never reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u64);

impl NotificationId {
    /// Raw identifier value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for NotificationId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display category of a notification.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Something was added.
    Success,

    /// Something was reduced.
    Info,

    /// Something went wrong outside the cart.
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NotificationKind::Success => "success",
            NotificationKind::Info => "info",
            NotificationKind::Error => "error",
        })
    }
}

/// Payload for a new notification; the queue assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    /// Name of the product the message is about
    pub subject_name: String,

    /// Image of the product the message is about
    pub subject_image: String,

    /// Resulting quantity after the triggering operation
    pub quantity: u32,

    /// Display category
    pub kind: NotificationKind,
}

/// Anything that accepts notification requests.
///
/// The cart submits into a sink and never reads back what it submitted.
pub trait NotificationSink {
    /// Submit a request for a new notification.
    fn submit(&mut self, request: NotificationRequest);
}

impl NotificationSink for Vec<NotificationRequest> {
    fn submit(&mut self, request: NotificationRequest) {
        self.push(request);
    }
}

impl<S: NotificationSink + ?Sized> NotificationSink for &mut S {
    fn submit(&mut self, request: NotificationRequest) {
        (**self).submit(request);
    }
}

/// Presentation phase of a queued notification.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Fully visible.
    Active,

    /// Transitioning out ahead of removal.
    FadingOut,
}

/// Why a notification left the queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RemovalReason {
    /// Its removal timer fired.
    Expired,

    /// The shopper dismissed it.
    Dismissed,

    /// A newer notification pushed it out of a full queue.
    Evicted,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct LifecycleTimers {
    fade: TimerKey,
    removal: TimerKey,
}

/// A queued notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    id: NotificationId,
    subject_name: String,
    subject_image: String,
    quantity: u32,
    kind: NotificationKind,
    fading_out: bool,
    enqueued_at: Duration,
    timers: LifecycleTimers,
}

impl Notification {
    /// Identifier assigned at enqueue.
    pub fn id(&self) -> NotificationId {
        self.id
    }

    /// Name of the product the message is about.
    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    /// Image of the product the message is about.
    pub fn subject_image(&self) -> &str {
        &self.subject_image
    }

    /// Resulting quantity after the triggering operation.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Display category.
    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Whether the fade-out transition has started.
    pub fn is_fading_out(&self) -> bool {
        self.fading_out
    }

    /// Clock reading when the notification was enqueued.
    pub fn enqueued_at(&self) -> Duration {
        self.enqueued_at
    }

    /// Current presentation phase.
    pub fn phase(&self) -> Phase {
        if self.fading_out {
            Phase::FadingOut
        } else {
            Phase::Active
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Transition {
    FadeOut(NotificationId),
    Remove(NotificationId),
}

/// Capped feed of self-expiring notifications.
#[derive(Debug)]
pub struct NotificationQueue<C: Clock = SystemClock, O: NotificationObserver = NoopObserver> {
    entries: SmallVec<[Notification; DEFAULT_CAPACITY]>,
    timers: Timers<Transition>,
    next_id: u64,
    settings: QueueSettings,
    clock: C,
    observer: O,
}

impl NotificationQueue {
    /// Create a queue with default settings driven by wall time.
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> NotificationQueue<C> {
    /// Create a queue with default settings driven by `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self::with_settings(clock, QueueSettings::default())
    }

    /// Create a queue with custom settings driven by `clock`.
    pub fn with_settings(clock: C, settings: QueueSettings) -> Self {
        Self {
            entries: SmallVec::new(),
            timers: Timers::new(),
            next_id: 0,
            settings,
            clock,
            observer: NoopObserver,
        }
    }
}

impl<C: Clock, O: NotificationObserver> NotificationQueue<C, O> {
    /// Replace the observer told about queue changes.
    pub fn with_observer<P: NotificationObserver>(self, observer: P) -> NotificationQueue<C, P> {
        NotificationQueue {
            entries: self.entries,
            timers: self.timers,
            next_id: self.next_id,
            settings: self.settings,
            clock: self.clock,
            observer,
        }
    }

    /// Append a notification, evicting the oldest entries if the queue is full.
    ///
    /// Registers the entry's fade and removal timers relative to the current clock reading.
    pub fn enqueue(&mut self, request: NotificationRequest) -> NotificationId {
        while self.entries.len() >= self.settings.capacity && !self.entries.is_empty() {
            let evicted = self.entries.remove(0);
            self.retire(&evicted, RemovalReason::Evicted);
        }

        let id = NotificationId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);

        let now = self.clock.now();
        let timers = LifecycleTimers {
            fade: self.timers.schedule(
                now.saturating_add(self.settings.fade_after),
                Transition::FadeOut(id),
            ),
            removal: self.timers.schedule(
                now.saturating_add(self.settings.remove_after),
                Transition::Remove(id),
            ),
        };

        debug!(
            notification_id = %id,
            kind = %request.kind,
            quantity = request.quantity,
            "enqueued notification"
        );

        self.entries.push(Notification {
            id,
            subject_name: request.subject_name,
            subject_image: request.subject_image,
            quantity: request.quantity,
            kind: request.kind,
            fading_out: false,
            enqueued_at: now,
            timers,
        });

        self.observer.on_notifications_changed(&self.entries);

        id
    }

    /// Remove a notification immediately. Returns `false` if it was not queued.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        if !self.take(id, RemovalReason::Dismissed) {
            return false;
        }

        self.observer.on_notifications_changed(&self.entries);

        true
    }

    /// Fire every timer that is due at the clock's current reading.
    ///
    /// Returns the number of transitions applied.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let mut applied = 0;

        while let Some((_, transition)) = self.timers.pop_due(now) {
            let changed = match transition {
                Transition::FadeOut(id) => self.fade(id),
                Transition::Remove(id) => self.take(id, RemovalReason::Expired),
            };

            if changed {
                applied += 1;
            }
        }

        if applied > 0 {
            self.observer.on_notifications_changed(&self.entries);
        }

        applied
    }

    /// When the next timer is due, if any are pending.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Time left before a queued notification is removed.
    pub fn remaining(&self, id: NotificationId) -> Option<Duration> {
        let notification = self.get(id)?;

        Some(
            notification
                .enqueued_at
                .saturating_add(self.settings.remove_after)
                .saturating_sub(self.clock.now()),
        )
    }

    /// Look up a queued notification.
    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.entries.iter().find(|notification| notification.id == id)
    }

    /// Queued notifications, oldest first.
    pub fn notifications(&self) -> &[Notification] {
        &self.entries
    }

    /// Number of queued notifications.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of timers still waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Queue settings.
    pub fn settings(&self) -> &QueueSettings {
        &self.settings
    }

    /// The clock driving entry lifetimes.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn fade(&mut self, id: NotificationId) -> bool {
        let Some(notification) = self
            .entries
            .iter_mut()
            .find(|notification| notification.id == id)
        else {
            return false;
        };

        notification.fading_out = true;

        debug!(notification_id = %id, "notification fading out");

        true
    }

    fn take(&mut self, id: NotificationId, reason: RemovalReason) -> bool {
        let Some(position) = self
            .entries
            .iter()
            .position(|notification| notification.id == id)
        else {
            return false;
        };

        let removed = self.entries.remove(position);
        self.retire(&removed, reason);

        true
    }

    fn retire(&mut self, notification: &Notification, reason: RemovalReason) {
        self.timers.cancel(notification.timers.fade);
        self.timers.cancel(notification.timers.removal);

        debug!(notification_id = %notification.id, ?reason, "removed notification");

        self.observer.on_removed(notification, reason);
    }
}

impl<C: Clock, O: NotificationObserver> NotificationSink for NotificationQueue<C, O> {
    fn submit(&mut self, request: NotificationRequest) {
        self.enqueue(request);
    }
}
