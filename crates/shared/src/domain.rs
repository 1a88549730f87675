use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ShopId);
id_newtype!(ProductId);
id_newtype!(CategoryId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    #[serde(default)]
    pub in_vacations: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nb_products: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedProduct {
    pub locale: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub price: i64,
    #[serde(default)]
    pub localized_product: Vec<LocalizedProduct>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Product {
    /// Name for `locale`, falling back to the first localization.
    pub fn display_name(&self, locale: &str) -> Option<&str> {
        self.localized_product
            .iter()
            .find(|entry| entry.locale.eq_ignore_ascii_case(locale))
            .or_else(|| self.localized_product.first())
            .map(|entry| entry.name.as_str())
    }
}
