//! Juicebar session replay
//!
//! Loads the menu, replays a scripted shopping session against a cart wired to the
//! notification feed, then prints the cart summary and whatever notifications are still
//! on screen.
//!
//! ```text
//! juicebar --menu add:1 add:1 add:5 wait:2100 dec:1
//! ```

use std::{
    io::{self, Write},
    process::ExitCode,
    time::Duration,
};

use clap::Parser;
use humanize_duration::{Truncate, prelude::DurationExt};
use tabled::{
    builder::Builder,
    settings::{Color, Style, object::Rows},
};
use thiserror::Error;
use tracing::{error, warn};

use juicebar::{
    cart::CartStore,
    catalog::{Catalog, CatalogError},
    checkout::{CheckoutError, CheckoutSummary},
    clock::ManualClock,
    notifications::{
        NotificationError, NotificationKind, NotificationQueue, NotificationRequest, Phase,
    },
    pricing::TotalPriceError,
    products::Product,
};

use crate::config::{Action, CliConfig};

mod config;
mod logging;

/// Errors that end a session replay.
#[derive(Debug, Error)]
enum AppError {
    /// Menu could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Summary could not be produced.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Cart totals could not be calculated.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// Notification settings are invalid.
    #[error(transparent)]
    Notifications(#[from] NotificationError),

    /// Writing output failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

type Store = CartStore<NotificationQueue<ManualClock>>;

/// Session replay entry point
fn main() -> ExitCode {
    let config = CliConfig::parse();

    if let Err(err) = logging::init_subscriber(&config.logging) {
        #[expect(clippy::print_stderr, reason = "logging not initialized, must use eprintln")]
        {
            eprintln!("juicebar: failed to initialise logging: {err}");
        }

        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "session failed");

            ExitCode::FAILURE
        }
    }
}

fn run(config: &CliConfig) -> Result<(), AppError> {
    let catalog = Catalog::load(&config.catalog)?;

    let clock = ManualClock::new();
    let queue = NotificationQueue::with_settings(clock.clone(), config.notifications.settings()?);
    let mut store = CartStore::new(catalog.currency(), queue);

    for &action in &config.actions {
        replay(&mut store, &catalog, &clock, action);
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if config.menu {
        write_menu(&mut handle, &catalog, config)?;
    }

    write_cart(&mut handle, &store, config)?;
    write_notifications(&mut handle, store.sink())?;

    Ok(())
}

fn replay(store: &mut Store, catalog: &Catalog, clock: &ManualClock, action: Action) {
    match action {
        Action::Add(id) => match catalog.orderable(id) {
            Ok(product) => {
                store.add_to_cart(product);
            }
            Err(err) => {
                warn!(product = %id, %err, "cannot add product");

                let (subject_name, subject_image) = catalog.get(id).map_or_else(
                    || (id.to_string(), String::new()),
                    |product| (product.name.clone(), product.image.clone()),
                );
                let quantity = store.snapshot().quantity_of(id);

                store.sink_mut().enqueue(NotificationRequest {
                    subject_name,
                    subject_image,
                    quantity,
                    kind: NotificationKind::Error,
                });
            }
        },
        Action::Increase(id) => {
            store.increase_quantity(id);
        }
        Action::Decrease(id) => {
            store.decrease_quantity(id);
        }
        Action::Remove(id) => {
            store.remove_from_cart(id);
        }
        Action::Wait(by) => {
            clock.advance(by);
            store.sink_mut().tick();
        }
        Action::Dismiss(id) => {
            if !store.sink_mut().dismiss(id) {
                warn!(notification = %id, "no such notification");
            }
        }
    }
}

fn write_menu(out: &mut impl Write, catalog: &Catalog, config: &CliConfig) -> io::Result<()> {
    let query = config.search.as_deref().unwrap_or_default();
    let matches: Vec<&Product> = catalog.search(query).collect();

    let mut builder = Builder::default();

    builder.push_record(["ID", "Name", "Category", "Price", "Status"]);

    for product in catalog
        .in_category(config.category)
        .filter(|product| matches.iter().any(|found| found.id == product.id))
    {
        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.category.label().to_string(),
            product.price.to_string(),
            product.availability.to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);

    writeln!(out, "\n{table}")
}

fn write_cart(out: &mut impl Write, store: &Store, config: &CliConfig) -> Result<(), AppError> {
    let snapshot = store.snapshot();

    if snapshot.is_empty() {
        writeln!(out, "\nCart is empty")?;

        return Ok(());
    }

    CheckoutSummary::from_snapshot(&snapshot, config.delivery)?.write_to(&mut *out)?;

    writeln!(
        out,
        " Items:    {} (cart total {})",
        store.total_items(),
        store.total_price()?
    )?;

    Ok(())
}

fn write_notifications(
    out: &mut impl Write,
    queue: &NotificationQueue<ManualClock>,
) -> io::Result<()> {
    if queue.is_empty() {
        return writeln!(out, "\nNo notifications");
    }

    let mut builder = Builder::default();

    builder.push_record(["ID", "Kind", "Product", "Qty", "Phase", "Removed In"]);

    for notification in queue.notifications() {
        let phase = match notification.phase() {
            Phase::Active => "active",
            Phase::FadingOut => "fading out",
        };

        let remaining = queue
            .remaining(notification.id())
            .unwrap_or(Duration::ZERO);

        builder.push_record([
            notification.id().to_string(),
            notification.kind().to_string(),
            notification.subject_name().to_string(),
            notification.quantity().to_string(),
            phase.to_string(),
            remaining.human(Truncate::Nano).to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);

    writeln!(out, "\n{table}")
}

#[cfg(test)]
mod tests {
    use juicebar::{notifications::Notification, products::ProductId};
    use testresult::TestResult;

    use super::*;

    const MENU: &str = r#"
products:
  - id: 1
    name: Ionized Alkaline Water
    category: water
    image: https://img.example/water.jpg
    price: "2.99 INR"
  - id: 3
    name: Natural Green Juice
    category: juice
    image: https://img.example/green.jpg
    price: "49 INR"
    status: sold_out
"#;

    fn session(catalog: &Catalog) -> (Store, ManualClock) {
        let clock = ManualClock::new();
        let store = CartStore::new(
            catalog.currency(),
            NotificationQueue::with_clock(clock.clone()),
        );

        (store, clock)
    }

    #[test]
    fn unorderable_products_queue_error_notifications() -> TestResult {
        let catalog = Catalog::from_yaml_str(MENU)?;
        let (mut store, clock) = session(&catalog);

        replay(&mut store, &catalog, &clock, Action::Add(ProductId(3)));
        replay(&mut store, &catalog, &clock, Action::Add(ProductId(42)));

        let queued: Vec<_> = store
            .sink()
            .notifications()
            .iter()
            .map(|notification| {
                (
                    notification.subject_name(),
                    notification.subject_image(),
                    notification.quantity(),
                    notification.kind(),
                )
            })
            .collect();

        assert_eq!(
            queued,
            [
                (
                    "Natural Green Juice",
                    "https://img.example/green.jpg",
                    0,
                    NotificationKind::Error
                ),
                ("42", "", 0, NotificationKind::Error),
            ]
        );
        assert!(store.snapshot().is_empty());
        assert_eq!(store.snapshot().revision(), 0);

        Ok(())
    }

    #[test]
    fn orderable_products_are_added() -> TestResult {
        let catalog = Catalog::from_yaml_str(MENU)?;
        let (mut store, clock) = session(&catalog);

        replay(&mut store, &catalog, &clock, Action::Add(ProductId(1)));
        replay(&mut store, &catalog, &clock, Action::Increase(ProductId(1)));

        assert_eq!(store.total_items(), 2);
        assert_eq!(
            store.sink().notifications().last().map(Notification::kind),
            Some(NotificationKind::Success)
        );

        Ok(())
    }

    #[test]
    fn wait_and_dismiss_drive_the_queue() -> TestResult {
        let catalog = Catalog::from_yaml_str(MENU)?;
        let (mut store, clock) = session(&catalog);

        replay(&mut store, &catalog, &clock, Action::Add(ProductId(1)));
        replay(&mut store, &catalog, &clock, Action::Add(ProductId(1)));

        let first = store
            .sink()
            .notifications()
            .first()
            .map(Notification::id)
            .ok_or("no notifications queued")?;

        replay(&mut store, &catalog, &clock, Action::Dismiss(first));
        replay(&mut store, &catalog, &clock, Action::Wait(Duration::from_millis(2_000)));

        let phases: Vec<_> = store
            .sink()
            .notifications()
            .iter()
            .map(Notification::phase)
            .collect();

        assert_eq!(phases, [Phase::FadingOut]);

        replay(&mut store, &catalog, &clock, Action::Wait(Duration::from_millis(500)));

        assert!(store.sink().is_empty());
        assert_eq!(store.total_items(), 2);

        Ok(())
    }
}
