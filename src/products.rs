//! Products

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use smallvec::SmallVec;

/// Product identifier, unique within a catalog.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl From<u32> for ProductId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Menu category
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Ionized and flavoured waters.
    Water,

    /// Cold-pressed juices.
    Juice,

    /// Blended smoothies.
    Smoothie,
}

impl Category {
    /// Display label used on the menu.
    pub fn label(self) -> &'static str {
        match self {
            Category::Water => "Water",
            Category::Juice => "Juices",
            Category::Smoothie => "Smoothies",
        }
    }
}

/// Whether a product can currently be ordered.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// In stock and orderable.
    #[default]
    Available,

    /// Listed on the menu, not yet orderable.
    ComingSoon,

    /// Temporarily out of stock.
    SoldOut,
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Availability::Available => "available",
            Availability::ComingSoon => "coming soon",
            Availability::SoldOut => "sold out",
        })
    }
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product identifier
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Short menu description
    pub description: String,

    /// Image URL
    pub image: String,

    /// Menu category
    pub category: Category,

    /// Current availability
    pub availability: Availability,

    /// Headline benefits shown on the menu card
    pub benefits: SmallVec<[String; 3]>,

    /// Unit price
    pub price: Money<'static, Currency>,
}

impl Product {
    /// Create an available product with no description, image or benefits.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        category: Category,
        price: Money<'static, Currency>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            image: String::new(),
            category,
            availability: Availability::Available,
            benefits: SmallVec::new(),
            price,
        }
    }

    /// Set the image URL.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Set the menu description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the availability.
    #[must_use]
    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// Whether the product can be added to a cart from the menu.
    pub fn is_orderable(&self) -> bool {
        self.availability == Availability::Available
    }
}
