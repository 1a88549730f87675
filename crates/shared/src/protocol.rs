use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{CategoryId, ShopId};

pub const PAGE_PARAM: &str = "page";
pub const SIZE_PARAM: &str = "size";
pub const SORT_PARAM: &str = "sortBy";
pub const SEARCH_PARAM: &str = "label";

/// Spring Data style page envelope returned by every listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedEnvelope<T> {
    pub content: Vec<T>,
    pub total_pages: u32,
    pub pageable: Pageable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pageable {
    /// Zero-based.
    pub page_number: u32,
}

impl<T> PagedEnvelope<T> {
    pub fn new(content: Vec<T>, total_pages: u32, page_number: u32) -> Self {
        Self {
            content,
            total_pages,
            pageable: Pageable { page_number },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Shops,
    Products,
    Categories,
}

impl Resource {
    pub fn path(self) -> &'static str {
        match self {
            Resource::Shops => "shops",
            Resource::Products => "products",
            Resource::Categories => "categories",
        }
    }
}

/// Server sort syntax is `field` or `field,desc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub descending: bool,
}

impl SortSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    pub fn to_param(&self) -> String {
        if self.descending {
            format!("{},desc", self.field)
        } else {
            self.field.clone()
        }
    }
}

/// A filter dimension rendered into one query parameter.
pub trait FilterDimension {
    fn key(&self) -> &'static str;
    fn value(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopFilter {
    InVacations(bool),
    CreatedAfter(NaiveDate),
    CreatedBefore(NaiveDate),
}

impl ShopFilter {
    pub const IN_VACATIONS: &'static str = "inVacations";
    pub const CREATED_AFTER: &'static str = "createdAfter";
    pub const CREATED_BEFORE: &'static str = "createdBefore";
}

impl FilterDimension for ShopFilter {
    fn key(&self) -> &'static str {
        match self {
            ShopFilter::InVacations(_) => Self::IN_VACATIONS,
            ShopFilter::CreatedAfter(_) => Self::CREATED_AFTER,
            ShopFilter::CreatedBefore(_) => Self::CREATED_BEFORE,
        }
    }

    fn value(&self) -> String {
        match self {
            ShopFilter::InVacations(flag) => flag.to_string(),
            ShopFilter::CreatedAfter(date) | ShopFilter::CreatedBefore(date) => {
                date.format("%Y-%m-%d").to_string()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductFilter {
    Shop(ShopId),
    Category(CategoryId),
}

impl ProductFilter {
    pub const SHOP_ID: &'static str = "shopId";
    pub const CATEGORY_ID: &'static str = "categoryId";
}

impl FilterDimension for ProductFilter {
    fn key(&self) -> &'static str {
        match self {
            ProductFilter::Shop(_) => Self::SHOP_ID,
            ProductFilter::Category(_) => Self::CATEGORY_ID,
        }
    }

    fn value(&self) -> String {
        match self {
            ProductFilter::Shop(id) => id.to_string(),
            ProductFilter::Category(id) => id.to_string(),
        }
    }
}
