use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;

use crate::model::{Order, Product, UserSummary};
use crate::server::AppState;
use crate::web::{bad_request, ApiError, AuthUser};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineView {
    pub product_id: String,
    pub buy_quantity: i64,
    pub buyer_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: String,
    pub owner_id: String,
    pub products: Vec<SaleLineView>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        OrderView {
            id: order._id.to_hex(),
            owner_id: order.owner_id.clone(),
            products: order
                .products
                .iter()
                .map(|record| SaleLineView {
                    product_id: record.product_id.to_hex(),
                    buy_quantity: record.buy_quantity,
                    buyer_id: record.buyer_id.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoldProductView {
    pub product_id: String,
    pub title: String,
    pub price: f64,
}

impl From<&Product> for SoldProductView {
    fn from(product: &Product) -> Self {
        SoldProductView {
            product_id: product._id.to_hex(),
            title: product.title.clone(),
            price: product.price,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerView {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<&UserSummary> for BuyerView {
    fn from(user: &UserSummary) -> Self {
        BuyerView {
            id: user._id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// One ledger entry joined to the live product and buyer documents. Either
/// side may have vanished since the sale; the raw ids in `orders` still tell
/// the whole story.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleView {
    pub product: Option<SoldProductView>,
    pub buyer: Option<BuyerView>,
    pub buy_quantity: i64,
    pub sold_at: NaiveDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersResponse {
    pub orders: OrderView,
    pub sales: Vec<SaleView>,
}

/// GET /api/orders
///
/// The caller's seller ledger, each sale joined to the product and buyer
/// records.
pub async fn get_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, ApiError> {
    let order = state
        .storage
        .find_order(&user.0)
        .await?
        .ok_or_else(|| bad_request("Order table does not exist."))?;

    // Repeat buyers are common in a single ledger; look each identity up once.
    let mut buyers: HashMap<String, Option<UserSummary>> = HashMap::new();
    let mut sales = Vec::with_capacity(order.products.len());
    for record in &order.products {
        let product = state.storage.find_product(record.product_id).await?;
        if !buyers.contains_key(&record.buyer_id) {
            let fetched = state.storage.find_user(&record.buyer_id).await?;
            buyers.insert(record.buyer_id.clone(), fetched);
        }
        let buyer = buyers
            .get(&record.buyer_id)
            .and_then(|entry| entry.as_ref());

        sales.push(SaleView {
            product: product.as_ref().map(SoldProductView::from),
            buyer: buyer.map(BuyerView::from),
            buy_quantity: record.buy_quantity,
            sold_at: record.created_at,
        });
    }

    Ok((
        StatusCode::OK,
        Json(OrdersResponse {
            orders: OrderView::from(&order),
            sales,
        }),
    )
        .into_response())
}
