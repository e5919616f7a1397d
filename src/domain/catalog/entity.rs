//! Catalog projections fetched from the storage layer

use serde::{Deserialize, Serialize};

/// Store reference embedded in every product record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRef {
    pub id: String,
    pub name: String,
}

/// Store returned by lexical store search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl StoreSummary {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            logo_url: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_logo_url(mut self, url: impl Into<String>) -> Self {
        self.logo_url = Some(url.into());
        self
    }

    pub fn to_ref(&self) -> StoreRef {
        StoreRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Denormalized product projection
///
/// `preview_image` is the first variant's image, if the product has any
/// variant with an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub store: StoreRef,
    pub preview_image: Option<String>,
}

impl ProductSummary {
    pub fn new(id: impl Into<String>, name: impl Into<String>, store: StoreRef) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: String::new(),
            price: 0.0,
            store,
            preview_image: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn with_preview_image(mut self, url: impl Into<String>) -> Self {
        self.preview_image = Some(url.into());
        self
    }
}
