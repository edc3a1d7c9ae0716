use chrono::NaiveDateTime;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::error::Error;

pub type GenericError = Box<dyn Error + Send + Sync>;

/// One pending purchase inside a cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ObjectId,
    pub selected_quantity: i64,
}

/// Per-user pending purchase list. Carts are created elsewhere (at signup);
/// handlers treat a missing cart as a client error rather than creating one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub _id: ObjectId,
    pub owner_id: String,
    #[serde(default)]
    pub products: Vec<CartLine>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Cart {
    pub fn line(&self, product_id: ObjectId) -> Option<&CartLine> {
        self.products.iter().find(|l| l.product_id == product_id)
    }

    pub fn contains(&self, product_id: ObjectId) -> bool {
        self.line(product_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Inventory record owned by a seller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub _id: ObjectId,
    pub title: String,
    pub price: f64,
    pub quantity: i64,
    pub owner_id: String,
}

impl Product {
    pub fn has_stock_for(&self, requested: i64) -> bool {
        requested <= self.quantity
    }
}

/// One completed sale inside a seller's ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub product_id: ObjectId,
    pub buy_quantity: i64,
    pub buyer_id: String,
    pub created_at: NaiveDateTime,
}

/// Per-seller ledger of completed sales. One document aggregates every sale
/// for a given seller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub _id: ObjectId,
    pub owner_id: String,
    #[serde(default)]
    pub products: Vec<SaleRecord>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Slim projection of a user document, read to denormalize the buyer side of
/// the order view. Profiles are owned by the auth service; fields beyond the
/// identity may be absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub _id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
