use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use futures::future::try_join_all;
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::model::{Cart, CartLine, Product, SaleRecord};
use crate::server::AppState;
use crate::web::{bad_request, parse_object_id, ApiError, AuthUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartLineRequest {
    pub product_id: String,
    pub selected_quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartLineRequest {
    pub selected_quantity: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub product_id: String,
    pub selected_quantity: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub id: String,
    pub owner_id: String,
    pub products: Vec<CartLineView>,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        CartView {
            id: cart._id.to_hex(),
            owner_id: cart.owner_id.clone(),
            products: cart
                .products
                .iter()
                .map(|line| CartLineView {
                    product_id: line.product_id.to_hex(),
                    selected_quantity: line.selected_quantity,
                })
                .collect(),
        }
    }
}

/// A cart line joined to the live seller product.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProductView {
    pub product_id: String,
    pub title: String,
    pub price: f64,
    pub quantity: i64,
    pub owner_id: String,
    pub selected_quantity: i64,
}

impl CartProductView {
    fn new(product: &Product, selected_quantity: i64) -> Self {
        CartProductView {
            product_id: product._id.to_hex(),
            title: product.title.clone(),
            price: product.price,
            quantity: product.quantity,
            owner_id: product.owner_id.clone(),
            selected_quantity,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub cart: CartView,
    pub cart_products: Vec<CartProductView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEnvelope {
    pub cart: CartView,
}

/// GET /api/carts
///
/// The cart plus each line joined to the live seller product. Lines whose
/// product no longer exists on the seller end are pruned from the document
/// and omitted from the view.
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, ApiError> {
    let mut cart = state
        .storage
        .find_cart(&user.0)
        .await?
        .ok_or_else(|| bad_request("Cart does not exist."))?;

    let products = try_join_all(
        cart.products
            .iter()
            .map(|line| state.storage.find_product(line.product_id)),
    )
    .await?;

    let mut cart_products = Vec::with_capacity(cart.products.len());
    let mut vanished = Vec::new();
    for (line, product) in cart.products.iter().zip(products.iter()) {
        match product {
            Some(product) => {
                cart_products.push(CartProductView::new(product, line.selected_quantity))
            }
            None => vanished.push(line.product_id),
        }
    }
    for product_id in vanished {
        tracing::info!(product = %product_id, owner = %user.0, "pruning vanished product from cart");
        cart = state.storage.pull_cart_line(&user.0, product_id).await?;
    }

    Ok((
        StatusCode::OK,
        Json(CartResponse {
            cart: CartView::from(&cart),
            cart_products,
        }),
    )
        .into_response())
}

/// POST /api/carts
pub async fn add_cart_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<AddCartLineRequest>,
) -> Result<Response, ApiError> {
    let product_id = parse_object_id(&request.product_id)?;
    if request.selected_quantity < 1 {
        return Err(bad_request("Please enter valid quantity."));
    }

    let cart = state
        .storage
        .find_cart(&user.0)
        .await?
        .ok_or_else(|| bad_request("Cart does not exist."))?;
    if cart.contains(product_id) {
        return Err(bad_request("Product is already in your cart."));
    }

    let product = state
        .storage
        .find_product(product_id)
        .await?
        .ok_or_else(|| bad_request("Product does not exist on Seller end."))?;
    if !product.has_stock_for(request.selected_quantity) {
        return Err(bad_request(format!(
            "Product {} has {} units available only.",
            product.title, product.quantity
        )));
    }

    let updated = state
        .storage
        .push_cart_line(
            &user.0,
            CartLine {
                product_id,
                selected_quantity: request.selected_quantity,
            },
        )
        .await?;

    Ok((
        StatusCode::OK,
        Json(CartEnvelope {
            cart: CartView::from(&updated),
        }),
    )
        .into_response())
}

/// PUT /api/carts/{product_id}
pub async fn update_cart_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<String>,
    Json(request): Json<UpdateCartLineRequest>,
) -> Result<Response, ApiError> {
    let product_id = parse_object_id(&product_id)?;
    if request.selected_quantity < 1 {
        return Err(bad_request("Please enter valid quantity."));
    }

    let cart = state
        .storage
        .find_cart(&user.0)
        .await?
        .ok_or_else(|| bad_request("Cart does not exist."))?;
    if !cart.contains(product_id) {
        return Err(bad_request("Product does not exist in your cart."));
    }

    let product = state
        .storage
        .find_product(product_id)
        .await?
        .ok_or_else(|| bad_request("Product does not exist on Seller end."))?;
    if !product.has_stock_for(request.selected_quantity) {
        return Err(bad_request(format!(
            "Product {} has {} units available only.",
            product.title, product.quantity
        )));
    }

    let updated = state
        .storage
        .set_cart_line_quantity(&user.0, product_id, request.selected_quantity)
        .await?;

    Ok((
        StatusCode::OK,
        Json(CartEnvelope {
            cart: CartView::from(&updated),
        }),
    )
        .into_response())
}

/// DELETE /api/carts/{product_id}
pub async fn delete_cart_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<String>,
) -> Result<Response, ApiError> {
    let product_id = parse_object_id(&product_id)?;

    let cart = state
        .storage
        .find_cart(&user.0)
        .await?
        .ok_or_else(|| bad_request("Cart does not exist."))?;
    if !cart.contains(product_id) {
        return Err(bad_request("Product does not exist in your cart."));
    }

    let updated = state.storage.pull_cart_line(&user.0, product_id).await?;

    Ok((
        StatusCode::OK,
        Json(CartEnvelope {
            cart: CartView::from(&updated),
        }),
    )
        .into_response())
}

/// DELETE /api/carts/buy
///
/// Buy every line in the cart. Validation runs over the whole cart before
/// anything is mutated; execution then reserves stock per line with a
/// conditional decrement, records the sale on the seller's ledger and drops
/// the line. A reservation miss means a concurrent purchase got there first:
/// the loop stops, purchased lines stay purchased and the rest stay in the
/// cart.
pub async fn buy_cart(State(state): State<AppState>, user: AuthUser) -> Result<Response, ApiError> {
    let started = Instant::now();

    let cart = state
        .storage
        .find_cart(&user.0)
        .await?
        .ok_or_else(|| bad_request("Cart does not exist."))?;
    if cart.is_empty() {
        return Err(bad_request("Cart is empty."));
    }

    for line in &cart.products {
        let product = state
            .storage
            .find_product(line.product_id)
            .await?
            .ok_or_else(|| {
                bad_request(format!(
                    "Product with ID {} is not available.",
                    line.product_id.to_hex()
                ))
            })?;
        if !product.has_stock_for(line.selected_quantity) {
            return Err(bad_request(format!(
                "Product {} has {} units available only.",
                product.title, product.quantity
            )));
        }
    }

    let mut latest = cart.clone();
    let mut sold_units: i64 = 0;
    for line in &cart.products {
        let product = match state
            .storage
            .reserve_stock(line.product_id, line.selected_quantity)
            .await?
        {
            Some(product) => product,
            None => {
                // Stock moved between validation and reservation.
                let available = state
                    .storage
                    .find_product(line.product_id)
                    .await?
                    .map(|p| p.quantity)
                    .unwrap_or(0);
                return Err(bad_request(format!(
                    "Product with ID {} has {} units available only.",
                    line.product_id.to_hex(),
                    available
                )));
            }
        };

        state
            .storage
            .append_sale(
                &product.owner_id,
                SaleRecord {
                    product_id: line.product_id,
                    buy_quantity: line.selected_quantity,
                    buyer_id: user.0.clone(),
                    created_at: Utc::now().naive_utc(),
                },
            )
            .await?;

        latest = state.storage.pull_cart_line(&user.0, line.product_id).await?;
        sold_units += line.selected_quantity;
    }

    histogram!("marketplace_backend_request_seconds", "op" => "buy_cart")
        .record(started.elapsed().as_secs_f64());
    counter!("marketplace_backend_units_sold_total").increment(sold_units as u64);
    tracing::info!(
        buyer = %user.0,
        lines = cart.products.len(),
        units = sold_units,
        "cart purchased"
    );

    Ok((
        StatusCode::OK,
        Json(CartEnvelope {
            cart: CartView::from(&latest),
        }),
    )
        .into_response())
}
