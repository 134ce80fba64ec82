//! Wire formats for the storefront REST API.
//!
//! The backend wraps most payloads in a `{ success, message, data }`
//! envelope and is loose about numeric types: prices arrive as JSON
//! strings or numbers depending on the endpoint. Everything here is
//! deserialized permissively into `Raw*` structs, then converted into the
//! validated domain types from `phutung_core`. A field the client depends
//! on that is absent becomes [`ApiError::MissingField`] instead of a
//! silent default.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use phutung_core::{
    CartLine, CartLineId, Category, CategoryId, Order, OrderId, OrderItem, OrderStatus, Pricing,
    Product, ProductId, ProductSummary, Role, UserId, UserRecord,
};

use crate::error::{ApiError, Result};

// === Envelope ===

/// The `{ success, message, data }` wrapper most endpoints reply with.
///
/// All fields are optional because some endpoints reply with a bare
/// payload and no wrapper at all.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, failing if the server flagged the request as
    /// unsuccessful or omitted the data.
    pub fn into_data(self, resource: &'static str) -> Result<T> {
        self.check(resource)?;
        self.data.ok_or(ApiError::MissingField {
            resource,
            field: "data",
        })
    }

    /// Check the success flag without consuming the payload.
    pub fn check(&self, resource: &'static str) -> Result<()> {
        if self.success == Some(false) {
            return Err(ApiError::Api(
                self.message
                    .clone()
                    .unwrap_or_else(|| format!("{resource} request failed")),
            ));
        }
        Ok(())
    }
}

// === Field helpers ===

/// Parse a decimal out of a JSON value that may be a string, a number, or
/// null. Unparseable values are treated as absent; required call sites
/// turn `None` into a missing-field error.
pub(crate) fn decimal_opt(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn require<T>(value: Option<T>, resource: &'static str, field: &'static str) -> Result<T> {
    value.ok_or(ApiError::MissingField { resource, field })
}

// === Products ===

#[derive(Debug, Deserialize)]
pub(crate) struct RawDiscount {
    #[serde(default)]
    pub percentage: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawProduct {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub price: Value,
    #[serde(default)]
    pub final_price: Value,
    #[serde(default)]
    pub discount: Option<RawDiscount>,
    #[serde(default)]
    pub category: Option<Value>,
    #[serde(default)]
    pub featured: Option<bool>,
}

impl RawProduct {
    pub fn into_product(self) -> Result<Product> {
        let id = require(self.id, "product", "id")?;
        let name = require(self.name, "product", "name")?;

        // A discount object without a percentage means the catalog row is
        // broken; surface it rather than rendering a bogus price.
        let percentage = match self.discount {
            None => None,
            Some(d) => Some(require(d.percentage, "product", "discount.percentage")?),
        };

        let pricing = Pricing::from_parts(
            decimal_opt(&self.price),
            decimal_opt(&self.final_price),
            percentage,
        )?;

        Ok(Product {
            id: ProductId::from(id),
            name,
            slug: self.slug.unwrap_or_default(),
            image: self.image,
            pricing,
            category: category_name(self.category.as_ref()),
            featured: self.featured.unwrap_or(false),
        })
    }
}

/// The category on a product row is sometimes a bare string, sometimes a
/// nested `{ name }` object.
fn category_name(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("name")
            .and_then(Value::as_str)
            .map(String::from),
        _ => None,
    }
}

/// Product listings arrive as `{ rows, count }`, but a couple of endpoints
/// use `data` for the row array instead.
#[derive(Debug, Deserialize)]
pub(crate) struct RawProductList {
    #[serde(default)]
    pub rows: Option<Vec<RawProduct>>,
    #[serde(default)]
    pub data: Option<Vec<RawProduct>>,
    #[serde(default)]
    pub count: Option<u64>,
}

impl RawProductList {
    pub fn into_rows(self) -> Result<(Vec<Product>, u64)> {
        let raw = require(self.rows.or(self.data), "product list", "rows")?;
        let count = self.count.unwrap_or(raw.len() as u64);
        let rows = raw
            .into_iter()
            .map(RawProduct::into_product)
            .collect::<Result<Vec<_>>>()?;
        Ok((rows, count))
    }
}

// === Categories ===

#[derive(Debug, Deserialize)]
pub(crate) struct RawCategory {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub products: Option<Vec<RawProduct>>,
}

impl RawCategory {
    pub fn into_category(self) -> Result<Category> {
        let id = require(self.id, "category", "id")?;
        let name = require(self.name, "category", "name")?;
        let products = self
            .products
            .unwrap_or_default()
            .into_iter()
            .map(RawProduct::into_product)
            .collect::<Result<Vec<_>>>()?;
        Ok(Category {
            id: CategoryId::from(id),
            name,
            products,
        })
    }
}

pub(crate) fn into_categories(raw: Vec<RawCategory>) -> Result<Arc<Vec<Category>>> {
    Ok(Arc::new(
        raw.into_iter()
            .map(RawCategory::into_category)
            .collect::<Result<Vec<_>>>()?,
    ))
}

// === Cart ===

#[derive(Debug, Deserialize)]
pub(crate) struct RawProductRef {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl RawProductRef {
    fn into_summary(self, id: ProductId) -> ProductSummary {
        ProductSummary {
            id,
            name: self.name.unwrap_or_default(),
            image: self.image,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCartLine {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub product_id: Option<i32>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub price: Value,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub product: Option<RawProductRef>,
}

impl RawCartLine {
    pub fn into_cart_line(self) -> Result<CartLine> {
        let id = require(self.id, "cart line", "id")?;
        let product_id = require(
            self.product_id.or_else(|| self.product.as_ref().and_then(|p| p.id)),
            "cart line",
            "productId",
        )?;
        let quantity = require(self.quantity, "cart line", "quantity")?;
        let unit_price = require(decimal_opt(&self.price), "cart line", "price")?;
        let created_at = require(self.created_at, "cart line", "createdAt")?;
        let product_id = ProductId::from(product_id);

        let product = match self.product {
            Some(p) => p.into_summary(product_id),
            None => ProductSummary {
                id: product_id,
                name: String::new(),
                image: None,
            },
        };

        Ok(CartLine {
            id: CartLineId::from(id),
            product_id,
            product,
            quantity,
            unit_price,
            created_at,
        })
    }
}

// === Orders ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawOrderItem {
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub price: Value,
    #[serde(default)]
    pub product: Option<RawProductRef>,
}

impl RawOrderItem {
    fn into_order_item(self) -> Result<OrderItem> {
        let quantity = require(self.quantity, "order item", "quantity")?;
        let price = require(decimal_opt(&self.price), "order item", "price")?;
        let product_id = ProductId::from(require(
            self.product.as_ref().and_then(|p| p.id),
            "order item",
            "product.id",
        )?);
        let product = self
            .product
            .map(|p| p.into_summary(product_id))
            .unwrap_or(ProductSummary {
                id: product_id,
                name: String::new(),
                image: None,
            });
        Ok(OrderItem {
            product,
            quantity,
            price,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawOrder {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
    // The backend keeps this one field snake_cased.
    #[serde(default, rename = "total_price")]
    pub total_price: Value,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order_items: Option<Vec<RawOrderItem>>,
}

impl RawOrder {
    pub fn into_order(self) -> Result<Order> {
        let id = require(self.id, "order", "id")?;
        let status = OrderStatus::parse(&require(self.status, "order", "status")?);
        let total_price = require(decimal_opt(&self.total_price), "order", "total_price")?;
        let created_at = require(self.created_at, "order", "createdAt")?;
        let items = self
            .order_items
            .unwrap_or_default()
            .into_iter()
            .map(RawOrderItem::into_order_item)
            .collect::<Result<Vec<_>>>()?;
        Ok(Order {
            id: OrderId::from(id),
            status,
            total_price,
            created_at,
            items,
        })
    }
}

// === Users ===

#[derive(Debug, Deserialize)]
pub(crate) struct RawUser {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl RawUser {
    pub fn into_user(self) -> Result<UserRecord> {
        let id = require(self.id, "user", "id")?;
        Ok(UserRecord {
            id: UserId::from(id),
            firstname: self.firstname.unwrap_or_default(),
            lastname: self.lastname.unwrap_or_default(),
            email: require(self.email, "user", "email")?,
            phone: self.phone,
            role: match self.role.as_deref() {
                Some("admin") => Role::Admin,
                _ => Role::Customer,
            },
            image: self.image,
        })
    }
}
