use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::ProductSummary;

pub const DEFAULT_PAGE_SIZE: usize = 12;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Unknown sort order: {0} (expected default, price_asc, price_desc or sales)")]
    UnknownSort(String),
}

/// Listing order. Sorting is stable, so ties keep catalog order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
    /// Catalog order.
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
    /// Best sellers first.
    Sales,
}

impl ProductSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductSort::Default => "default",
            ProductSort::PriceAsc => "price_asc",
            ProductSort::PriceDesc => "price_desc",
            ProductSort::Sales => "sales",
        }
    }

    pub(super) fn apply(&self, items: &mut [ProductSummary]) {
        match self {
            ProductSort::Default => {}
            ProductSort::PriceAsc => items.sort_by(|a, b| a.price.total_cmp(&b.price)),
            ProductSort::PriceDesc => items.sort_by(|a, b| b.price.total_cmp(&a.price)),
            ProductSort::Sales => items.sort_by(|a, b| b.sales.cmp(&a.sales)),
        }
    }
}

impl fmt::Display for ProductSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductSort {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "default" => Ok(ProductSort::Default),
            "price_asc" => Ok(ProductSort::PriceAsc),
            "price_desc" => Ok(ProductSort::PriceDesc),
            "sales" => Ok(ProductSort::Sales),
            other => Err(CatalogError::UnknownSort(other.to_string())),
        }
    }
}

/// Listing criteria. Every set criterion must hold for a product to match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Case-insensitive substring of the product name.
    pub query: Option<String>,
    pub category: Option<String>,
    /// The product must carry all of these.
    pub tags: Vec<String>,
    /// Inclusive bounds on the listing price.
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: ProductSort,
}

impl ProductFilter {
    pub fn matches(&self, product: &ProductSummary) -> bool {
        if let Some(query) = self.query.as_deref().filter(|q| !q.is_empty()) {
            if !product.name.to_lowercase().contains(&query.to_lowercase()) {
                return false;
            }
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if product.category != category {
                return false;
            }
        }
        if !self.tags.iter().all(|t| product.tags.contains(t)) {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        true
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Matches across all pages.
    pub total: usize,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Cut page `page` out of `results`. Zero page or page size fall back to
    /// the first page and the default size.
    pub fn slice(results: Vec<T>, page: usize, page_size: usize) -> Self {
        let page = page.max(1);
        let page_size = if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size };
        let total = results.len();
        let start = (page - 1).saturating_mul(page_size).min(total);
        let items: Vec<T> = results.into_iter().skip(start).take(page_size).collect();
        let has_more = start + items.len() < total;
        Self {
            items,
            total,
            page,
            page_size,
            has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Catalog, PriceRange, Product};
    use super::*;

    fn product(id: &str, name: &str, category: &str, price: f64, sales: u64, tags: &[&str]) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            category: category.to_string(),
            price_range: PriceRange { min: price, max: price },
            sales,
            images: Vec::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            attributes: Vec::new(),
            skus: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            product("a", "Red T-shirt", "clothes", 49.0, 1200, &["hot"]),
            product("b", "Blue Jeans", "clothes", 129.0, 800, &["hot", "new"]),
            product("c", "Desk Lamp", "home", 35.0, 300, &["new"]),
            product("d", "Red Mug", "home", 12.0, 1500, &[]),
            product("e", "Wool Scarf", "clothes", 49.0, 50, &["new"]),
        ])
    }

    fn ids(page: &Page<ProductSummary>) -> Vec<&str> {
        page.items.iter().map(|p| p.id.as_str()).collect()
    }

    fn list(filter: ProductFilter) -> Page<ProductSummary> {
        catalog().query(&filter, 1, DEFAULT_PAGE_SIZE)
    }

    #[test]
    fn test_no_filter_keeps_catalog_order() {
        let page = list(ProductFilter::default());
        assert_eq!(ids(&page), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(page.total, 5);
        assert!(!page.has_more);
    }

    #[test]
    fn test_query_is_case_insensitive_substring() {
        let page = list(ProductFilter {
            query: Some("RED".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&page), vec!["a", "d"]);
    }

    #[test]
    fn test_category_filter() {
        let page = list(ProductFilter {
            category: Some("home".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&page), vec!["c", "d"]);
    }

    #[test]
    fn test_tags_must_all_match() {
        let page = list(ProductFilter {
            tags: vec!["new".to_string()],
            ..Default::default()
        });
        assert_eq!(ids(&page), vec!["b", "c", "e"]);

        let page = list(ProductFilter {
            tags: vec!["hot".to_string(), "new".to_string()],
            ..Default::default()
        });
        assert_eq!(ids(&page), vec!["b"]);
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let page = list(ProductFilter {
            min_price: Some(35.0),
            max_price: Some(49.0),
            ..Default::default()
        });
        assert_eq!(ids(&page), vec!["a", "c", "e"]);

        let page = list(ProductFilter {
            min_price: Some(100.0),
            ..Default::default()
        });
        assert_eq!(ids(&page), vec!["b"]);
    }

    #[test]
    fn test_sort_orders() {
        let sorted = |sort| {
            list(ProductFilter {
                sort,
                ..Default::default()
            })
        };
        // Equal prices keep catalog order.
        assert_eq!(ids(&sorted(ProductSort::PriceAsc)), vec!["d", "c", "a", "e", "b"]);
        assert_eq!(ids(&sorted(ProductSort::PriceDesc)), vec!["b", "a", "e", "c", "d"]);
        assert_eq!(ids(&sorted(ProductSort::Sales)), vec!["d", "a", "b", "c", "e"]);
    }

    #[test]
    fn test_filters_combine_with_sort() {
        let page = list(ProductFilter {
            category: Some("clothes".to_string()),
            tags: vec!["new".to_string()],
            sort: ProductSort::PriceAsc,
            ..Default::default()
        });
        assert_eq!(ids(&page), vec!["e", "b"]);
    }

    #[test]
    fn test_pagination() {
        let catalog = catalog();
        let filter = ProductFilter::default();

        let first = catalog.query(&filter, 1, 2);
        assert_eq!(ids(&first), vec!["a", "b"]);
        assert_eq!((first.total, first.page, first.page_size), (5, 1, 2));
        assert!(first.has_more);

        let last = catalog.query(&filter, 3, 2);
        assert_eq!(ids(&last), vec!["e"]);
        assert!(!last.has_more);

        let exact = catalog.query(&filter, 1, 5);
        assert_eq!(exact.items.len(), 5);
        assert!(!exact.has_more);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let page = catalog().query(&ProductFilter::default(), 9, 2);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
        assert_eq!(page.page, 9);
        assert!(!page.has_more);
    }

    #[test]
    fn test_zero_page_and_size_use_defaults() {
        let page = catalog().query(&ProductFilter::default(), 0, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(page.items.len(), 5);
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("price_asc".parse::<ProductSort>().unwrap(), ProductSort::PriceAsc);
        assert_eq!("".parse::<ProductSort>().unwrap(), ProductSort::Default);
        assert_eq!(ProductSort::Sales.to_string(), "sales");
        assert_eq!(
            "cheapest".parse::<ProductSort>().unwrap_err(),
            CatalogError::UnknownSort("cheapest".to_string())
        );
    }

    #[test]
    fn test_page_wire_names() {
        let page = Page::slice(vec![1, 2, 3], 1, 2);
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"items": [1, 2], "total": 3, "page": 1, "pageSize": 2, "hasMore": true})
        );
    }
}
