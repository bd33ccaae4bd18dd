//! Product catalog: products own their SKUs, and the catalog answers
//! filtered, sorted, paginated listings.
//!
//! Wire names follow the storefront API (`priceRange`, `productId`, ...), so
//! the same types decode `GET /products` and `GET /product/{id}` responses.

mod query;

pub use query::{CatalogError, Page, ProductFilter, ProductSort, DEFAULT_PAGE_SIZE};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::LineSnapshot;

/// One purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSku {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub image: String,
    /// Selected attribute values, e.g. `{"color": "red", "size": "s"}`.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl ProductSku {
    /// Cart line snapshot priced at this SKU.
    pub fn snapshot(&self) -> LineSnapshot {
        LineSnapshot {
            name: self.name.clone(),
            image_url: self.image.clone(),
            unit_price: self.price,
            attributes: self.attributes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Selectable attribute axis, e.g. color or size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAttribute {
    pub name: String,
    pub key: String,
    pub values: Vec<AttributeValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// Full product detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub price_range: PriceRange,
    #[serde(default)]
    pub sales: u64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<ProductAttribute>,
    #[serde(default)]
    pub skus: Vec<ProductSku>,
    #[serde(default)]
    pub recommendations: Vec<ProductSummary>,
}

impl Product {
    /// Listing entry: priced at the cheapest variant, first image as cover.
    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            category: self.category.clone(),
            price: self.price_range.min,
            sales: self.sales,
            image: self.images.first().cloned().unwrap_or_default(),
            tags: self.tags.clone(),
        }
    }

    pub fn sku(&self, sku_id: &str) -> Option<&ProductSku> {
        self.skus.iter().find(|s| s.id == sku_id)
    }
}

/// Listing entry for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub sales: u64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Ordered, immutable set of products.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The storefront's sample products.
    pub fn with_default_products() -> Self {
        Self::new(vec![
            Product {
                id: "p1".to_string(),
                name: "Red T-shirt".to_string(),
                description: "Soft cotton, made for everyday wear".to_string(),
                category: "clothes".to_string(),
                price_range: PriceRange { min: 49.0, max: 99.0 },
                sales: 1200,
                images: vec!["https://placehold.co/600x600/png?text=Red+T-shirt".to_string()],
                tags: Vec::new(),
                attributes: vec![
                    attribute("Color", "color", &[("red", "Red"), ("blue", "Blue")]),
                    attribute("Size", "size", &[("s", "S"), ("m", "M")]),
                ],
                skus: vec![
                    sku(
                        "sku_p1_r_s",
                        "p1",
                        "Red S",
                        49.0,
                        10,
                        "https://placehold.co/400x400/png?text=Red+S",
                        &[("color", "red"), ("size", "s")],
                    ),
                    sku(
                        "sku_p1_r_m",
                        "p1",
                        "Red M",
                        59.0,
                        5,
                        "https://placehold.co/400x400/png?text=Red+M",
                        &[("color", "red"), ("size", "m")],
                    ),
                ],
                recommendations: Vec::new(),
            },
            Product {
                id: "p2".to_string(),
                name: "Blue Jeans".to_string(),
                description: "Hard-wearing denim that keeps its shape".to_string(),
                category: "clothes".to_string(),
                price_range: PriceRange { min: 129.0, max: 169.0 },
                sales: 800,
                images: vec!["https://placehold.co/600x600/png?text=Jeans+Blue".to_string()],
                tags: Vec::new(),
                attributes: vec![attribute(
                    "Size",
                    "size",
                    &[("s", "S"), ("m", "M"), ("l", "L")],
                )],
                skus: vec![sku(
                    "sku_p2_m",
                    "p2",
                    "Blue M",
                    129.0,
                    7,
                    "https://placehold.co/400x400/png?text=Jeans+M",
                    &[("size", "m")],
                )],
                recommendations: Vec::new(),
            },
        ])
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Look a SKU up across every product.
    pub fn sku(&self, sku_id: &str) -> Option<&ProductSku> {
        self.products.iter().find_map(|p| p.sku(sku_id))
    }

    /// Filter, sort and paginate the product listing.
    pub fn query(&self, filter: &ProductFilter, page: usize, page_size: usize) -> Page<ProductSummary> {
        let mut results: Vec<ProductSummary> = self
            .products
            .iter()
            .map(Product::summary)
            .filter(|p| filter.matches(p))
            .collect();
        filter.sort.apply(&mut results);
        Page::slice(results, page, page_size)
    }
}

fn attribute(name: &str, key: &str, values: &[(&str, &str)]) -> ProductAttribute {
    ProductAttribute {
        name: name.to_string(),
        key: key.to_string(),
        values: values
            .iter()
            .map(|(value, label)| AttributeValue {
                value: value.to_string(),
                label: label.to_string(),
                image: None,
            })
            .collect(),
    }
}

fn sku(
    id: &str,
    product_id: &str,
    name: &str,
    price: f64,
    stock: u32,
    image: &str,
    attributes: &[(&str, &str)],
) -> ProductSku {
    ProductSku {
        id: id.to_string(),
        product_id: product_id.to_string(),
        name: name.to_string(),
        price,
        stock,
        image: image.to_string(),
        attributes: attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_lookup() {
        let catalog = Catalog::with_default_products();
        assert_eq!(catalog.products().len(), 2);

        let product = catalog.product("p1").unwrap();
        assert_eq!(product.skus.len(), 2);
        assert!(catalog.product("p9").is_none());

        let sku = catalog.sku("sku_p2_m").unwrap();
        assert_eq!(sku.product_id, "p2");
        assert_eq!(sku.price, 129.0);
        assert!(catalog.sku("sku_missing").is_none());
    }

    #[test]
    fn test_summary_uses_lowest_price_and_cover_image() {
        let catalog = Catalog::with_default_products();
        let summary = catalog.product("p1").unwrap().summary();
        assert_eq!(summary.price, 49.0);
        assert_eq!(summary.image, "https://placehold.co/600x600/png?text=Red+T-shirt");
        assert_eq!(summary.category, "clothes");
    }

    #[test]
    fn test_sku_snapshot() {
        let catalog = Catalog::with_default_products();
        let snapshot = catalog.sku("sku_p1_r_m").unwrap().snapshot();
        assert_eq!(snapshot.name, "Red M");
        assert_eq!(snapshot.unit_price, 59.0);
        assert_eq!(snapshot.attributes.get("size").map(String::as_str), Some("m"));
    }

    #[test]
    fn test_product_wire_names() {
        let catalog = Catalog::with_default_products();
        let value = serde_json::to_value(catalog.product("p2").unwrap()).unwrap();
        assert_eq!(value["priceRange"]["min"], 129.0);
        assert_eq!(value["skus"][0]["productId"], "p2");
        assert!(value["attributes"][0]["values"][0].get("image").is_none());

        let decoded: Product = serde_json::from_value(serde_json::json!({
            "id": "p3",
            "name": "Hat",
            "priceRange": {"min": 10, "max": 12}
        }))
        .unwrap();
        assert!(decoded.skus.is_empty());
        assert_eq!(decoded.summary().price, 10.0);
    }
}
