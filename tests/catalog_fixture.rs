//! Integration tests for loading the menu fixture from disk.

use std::{io::Write, path::PathBuf};

use rusty_money::{Money, iso::INR};
use tempfile::NamedTempFile;
use testresult::TestResult;

use juicebar::prelude::*;

fn menu_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("menu.yml")
}

#[test]
fn bundled_menu_loads_in_order() -> TestResult {
    let catalog = Catalog::load(menu_path())?;

    let ids: Vec<_> = catalog.iter().map(|product| product.id.0).collect();

    assert_eq!(ids, [1, 2, 3, 4, 5]);
    assert_eq!(catalog.currency(), INR);

    let water = catalog.orderable(ProductId(1))?;

    assert_eq!(water.price, Money::from_minor(299, INR));
    assert_eq!(water.benefits.len(), 3);

    Ok(())
}

#[test]
fn bundled_menu_only_sells_available_products() -> TestResult {
    let catalog = Catalog::load(menu_path())?;

    let orderable: Vec<_> = catalog
        .iter()
        .filter(|product| catalog.orderable(product.id).is_ok())
        .map(|product| product.id.0)
        .collect();

    assert_eq!(orderable, [1, 5]);
    assert!(matches!(
        catalog.orderable(ProductId(2)),
        Err(CatalogError::Unavailable(_, Availability::ComingSoon))
    ));

    Ok(())
}

#[test]
fn bundled_menu_filters_by_category_and_text() -> TestResult {
    let catalog = Catalog::load(menu_path())?;

    let smoothies: Vec<_> = catalog
        .in_category(Some(Category::Smoothie))
        .map(|product| product.id.0)
        .collect();
    let natural: Vec<_> = catalog.search("natural").map(|product| product.id.0).collect();

    assert_eq!(smoothies, [5]);
    assert_eq!(natural, [2, 3, 4]);

    Ok(())
}

#[test]
fn menu_loads_from_any_path() -> TestResult {
    let mut file = NamedTempFile::new()?;

    writeln!(
        file,
        "products:\n  - id: 7\n    name: Coconut Water\n    category: water\n    price: \"1.50 GBP\"\n"
    )?;

    let catalog = Catalog::load(file.path())?;

    assert_eq!(catalog.len(), 1);
    assert_eq!(
        catalog.get(ProductId(7)).map(|product| product.availability),
        Some(Availability::Available)
    );
    assert_eq!(catalog.currency().iso_alpha_code, "GBP");

    Ok(())
}

#[test]
fn missing_menu_is_an_io_error() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("no-such-menu.yml");

    assert!(matches!(Catalog::load(path), Err(CatalogError::Io(_))));
}

#[test]
fn full_session_against_the_bundled_menu() -> TestResult {
    let catalog = Catalog::load(menu_path())?;
    let clock = ManualClock::new();
    let mut store = CartStore::new(catalog.currency(), NotificationQueue::with_clock(clock));

    store.add_to_cart(catalog.orderable(ProductId(5))?);
    store.add_to_cart(catalog.orderable(ProductId(5))?);
    store.add_to_cart(catalog.orderable(ProductId(1))?);

    let summary = CheckoutSummary::from_snapshot(&store.snapshot(), DeliveryMethod::Standard)?;

    assert_eq!(summary.subtotal(), Money::from_minor(12_099, INR));
    assert_eq!(summary.total(), Money::from_minor(16_999, INR));
    assert_eq!(store.sink().len(), 3);

    let mut rendered = Vec::new();
    summary.write_to(&mut rendered)?;
    let rendered = String::from_utf8(rendered)?;

    assert!(rendered.contains("Super Foods Dry Fruits Smoothie"));

    Ok(())
}
