//! Catalog
//!
//! The storefront menu: every product on sale, in menu order, with lookups by id, category
//! filters and free-text search.

use std::{fs, path::Path};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::info;

use crate::products::{Availability, Category, Product, ProductId};

pub mod fixture;

/// Catalog loading and lookup errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading the menu file
    #[error("Failed to read menu file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// A product price below zero
    #[error("Product {0} has a negative price")]
    NegativePrice(ProductId),

    /// Two products share an identifier
    #[error("Duplicate product id: {0}")]
    DuplicateProduct(ProductId),

    /// The menu lists no products, so its currency is unknown
    #[error("Menu has no products; currency unknown")]
    NoProducts,

    /// Product not found
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// Product exists but cannot be ordered right now
    #[error("Product {0} is {1}")]
    Unavailable(ProductId, Availability),
}

/// Menu of products in a single currency.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    index: FxHashMap<ProductId, usize>,
    currency: &'static Currency,
}

impl Catalog {
    /// Build a catalog from products in menu order.
    ///
    /// # Errors
    ///
    /// Returns an error if a product id repeats, a price is negative, or a price is not in
    /// `currency`.
    pub fn from_products(
        currency: &'static Currency,
        products: impl IntoIterator<Item = Product>,
    ) -> Result<Self, CatalogError> {
        let products: Vec<Product> = products.into_iter().collect();
        let mut index = FxHashMap::default();

        for (position, product) in products.iter().enumerate() {
            let product_currency = product.price.currency();

            if product_currency != currency {
                return Err(CatalogError::CurrencyMismatch(
                    currency.iso_alpha_code,
                    product_currency.iso_alpha_code,
                ));
            }

            if product.price.to_minor_units() < 0 {
                return Err(CatalogError::NegativePrice(product.id));
            }

            if index.insert(product.id, position).is_some() {
                return Err(CatalogError::DuplicateProduct(product.id));
            }
        }

        Ok(Self {
            products,
            index,
            currency,
        })
    }

    /// Parse a YAML menu.
    ///
    /// The catalog currency is taken from the first product's price.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, a price cannot be parsed, the menu is empty,
    /// or the products fail [`Catalog::from_products`] validation.
    pub fn from_yaml_str(contents: &str) -> Result<Self, CatalogError> {
        let fixture: fixture::MenuFixture = serde_norway::from_str(contents)?;

        let products = fixture
            .products
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let currency = products
            .first()
            .map(|product| product.price.currency())
            .ok_or(CatalogError::NoProducts)?;

        Self::from_products(currency, products)
    }

    /// Load a YAML menu from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails [`Catalog::from_yaml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let catalog = Self::from_yaml_str(&contents)?;

        info!(
            path = %path.display(),
            products = catalog.len(),
            currency = catalog.currency.iso_alpha_code,
            "loaded catalog"
        );

        Ok(catalog)
    }

    /// Look up a product.
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.index
            .get(&id)
            .and_then(|&position| self.products.get(position))
    }

    /// Look up a product that can be added to a cart.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::NotFound`]: No product has this id.
    /// - [`CatalogError::Unavailable`]: The product is coming soon or sold out.
    pub fn orderable(&self, id: ProductId) -> Result<&Product, CatalogError> {
        let product = self.get(id).ok_or(CatalogError::NotFound(id))?;

        if product.is_orderable() {
            Ok(product)
        } else {
            Err(CatalogError::Unavailable(id, product.availability))
        }
    }

    /// Products in a category, in menu order. `None` lists every product.
    pub fn in_category(&self, category: Option<Category>) -> impl Iterator<Item = &Product> {
        self.products
            .iter()
            .filter(move |product| category.is_none_or(|category| product.category == category))
    }

    /// Products whose name or description contains `query`, ignoring case.
    ///
    /// An empty query matches every product.
    pub fn search(&self, query: &str) -> impl Iterator<Item = &Product> {
        let needle = query.trim().to_lowercase();

        self.products.iter().filter(move |product| {
            product.name.to_lowercase().contains(&needle)
                || product.description.to_lowercase().contains(&needle)
        })
    }

    /// All products in menu order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Currency every price is in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
