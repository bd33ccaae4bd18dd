use std::fmt::Write;

use storefront_cart::{Cart, ControllerState, Page, Product, ProductSummary};

pub fn render_cart(cart: &Cart) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Cart {} ({} items, total {:.2})",
        cart.owner_id, cart.total_quantity, cart.total_price
    );
    if cart.is_empty() {
        out.push_str("  (empty)\n");
        return out;
    }

    let _ = writeln!(
        out,
        "  {:<16} {:>5} {:>10} {:>10}  {}",
        "SKU", "QTY", "UNIT", "SUBTOTAL", "NAME"
    );
    for line in &cart.lines {
        let name = line.snapshot.as_ref().map_or("-", |s| s.name.as_str());
        let _ = writeln!(
            out,
            "  {:<16} {:>5} {:>10.2} {:>10.2}  {}",
            line.sku_id,
            line.quantity,
            line.unit_price(),
            line.subtotal(),
            name
        );
    }
    out
}

pub fn render_state(state: &ControllerState) -> String {
    let mut out = match &state.cart {
        Some(cart) => render_cart(cart),
        None => "No cart loaded\n".to_string(),
    };
    if let Some(err) = &state.last_error {
        let _ = writeln!(out, "⚠️  Last sync failed: {}", err);
    }
    out
}

pub fn render_products(page: &Page<ProductSummary>) -> String {
    let mut out = String::new();
    if page.items.is_empty() {
        let _ = writeln!(out, "No products on page {} ({} matches)", page.page, page.total);
        return out;
    }

    let first = page.page.saturating_sub(1) * page.page_size + 1;
    let _ = writeln!(
        out,
        "Products {}-{} of {} (page {})",
        first,
        first + page.items.len() - 1,
        page.total,
        page.page
    );
    let _ = writeln!(
        out,
        "  {:<8} {:>10} {:>7} {:<12}  {}",
        "ID", "FROM", "SALES", "CATEGORY", "NAME"
    );
    for item in &page.items {
        let _ = writeln!(
            out,
            "  {:<8} {:>10.2} {:>7} {:<12}  {}",
            item.id, item.price, item.sales, item.category, item.name
        );
    }
    if page.has_more {
        let _ = writeln!(out, "  more on page {}", page.page + 1);
    }
    out
}

pub fn render_product(product: &Product) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", product.name, product.id);
    let _ = writeln!(
        out,
        "  {:.2} - {:.2}, {} sold, {}",
        product.price_range.min, product.price_range.max, product.sales, product.category
    );
    if !product.description.is_empty() {
        let _ = writeln!(out, "  {}", product.description);
    }
    if product.skus.is_empty() {
        out.push_str("  (no SKUs)\n");
        return out;
    }

    let _ = writeln!(out, "  {:<16} {:>10} {:>6}  {}", "SKU", "PRICE", "STOCK", "OPTIONS");
    for sku in &product.skus {
        let options = sku
            .attributes
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "  {:<16} {:>10.2} {:>6}  {}",
            sku.id, sku.price, sku.stock, options
        );
    }
    out
}
