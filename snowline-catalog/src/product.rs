use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Equipment categories offered for rent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    Ski,
    Snowboard,
    SkiBoots,
    SnowboardBoots,
    Helmet,
    Poles,
    Goggles,
}

impl ProductType {
    pub const ALL: [ProductType; 7] = [
        ProductType::Ski,
        ProductType::Snowboard,
        ProductType::SkiBoots,
        ProductType::SnowboardBoots,
        ProductType::Helmet,
        ProductType::Poles,
        ProductType::Goggles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Ski => "SKI",
            ProductType::Snowboard => "SNOWBOARD",
            ProductType::SkiBoots => "SKI_BOOTS",
            ProductType::SnowboardBoots => "SNOWBOARD_BOOTS",
            ProductType::Helmet => "HELMET",
            ProductType::Poles => "POLES",
            ProductType::Goggles => "GOGGLES",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = ProductError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ProductError::UnknownType(s.to_string()))
    }
}

/// Quality tier derived from the standard/professional flags
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductTier {
    Standard,
    Professional,
}

/// A rentable equipment item. `price_cents` is the price per rental day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub product_type: ProductType,
    pub name: String,
    pub price_cents: i64,
    pub size: Option<String>,
    pub is_standard: bool,
    pub is_professional: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        product_type: ProductType,
        name: impl Into<String>,
        price_cents: i64,
        size: Option<String>,
        tier: ProductTier,
    ) -> Result<Self, ProductError> {
        let now = Utc::now();
        let mut product = Self {
            id: Uuid::new_v4(),
            product_type,
            name: name.into(),
            price_cents,
            size: None,
            is_standard: true,
            is_professional: false,
            created_at: now,
            updated_at: now,
        };
        product.set_size(size);
        product.set_tier(tier);
        product.validate()?;
        Ok(product)
    }

    pub fn tier(&self) -> ProductTier {
        if self.is_professional {
            ProductTier::Professional
        } else {
            ProductTier::Standard
        }
    }

    pub fn set_tier(&mut self, tier: ProductTier) {
        self.is_professional = tier == ProductTier::Professional;
        self.is_standard = !self.is_professional;
    }

    /// Blank sizes are stored as `None`
    pub fn set_size(&mut self, size: Option<String>) {
        self.size = size
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
    }

    pub fn validate(&self) -> Result<(), ProductError> {
        if self.name.trim().is_empty() {
            return Err(ProductError::Invalid("name must not be empty".to_string()));
        }
        if self.price_cents < 0 {
            return Err(ProductError::Invalid("price must not be negative".to_string()));
        }
        if self.is_standard == self.is_professional {
            return Err(ProductError::Invalid(
                "product must be either standard or professional".to_string(),
            ));
        }
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProductError {
    #[error("Unknown product type: {0}")]
    UnknownType(String),

    #[error("Invalid product: {0}")]
    Invalid(String),
}
