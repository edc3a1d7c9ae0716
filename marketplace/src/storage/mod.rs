// Re-export all storage-related modules
pub mod mongo;

pub use mongo::MongoShopStorage;

use crate::model::{Cart, CartLine, GenericError, Order, Product, SaleRecord, UserSummary};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

/// Document access for carts, products and order ledgers. Handlers only see
/// this trait; the Mongo implementation lives in [`mongo`].
#[async_trait]
pub trait ShopStorage: Send + Sync {
    async fn find_cart(&self, owner_id: &str) -> Result<Option<Cart>, GenericError>;

    /// Append a line to the owner's cart and return the updated document.
    async fn push_cart_line(&self, owner_id: &str, line: CartLine) -> Result<Cart, GenericError>;

    async fn set_cart_line_quantity(
        &self,
        owner_id: &str,
        product_id: ObjectId,
        selected_quantity: i64,
    ) -> Result<Cart, GenericError>;

    async fn pull_cart_line(
        &self,
        owner_id: &str,
        product_id: ObjectId,
    ) -> Result<Cart, GenericError>;

    async fn find_product(&self, product_id: ObjectId) -> Result<Option<Product>, GenericError>;

    /// Conditionally take `amount` units off the shelf. Returns the product as
    /// it was before the decrement, or `None` when the live stock no longer
    /// covers the amount. The check and the decrement are a single document
    /// update, so concurrent purchases cannot oversell.
    async fn reserve_stock(
        &self,
        product_id: ObjectId,
        amount: i64,
    ) -> Result<Option<Product>, GenericError>;

    /// Append a sale record to the seller's ledger, creating the ledger on
    /// first sale.
    async fn append_sale(&self, seller_id: &str, sale: SaleRecord) -> Result<(), GenericError>;

    async fn find_order(&self, owner_id: &str) -> Result<Option<Order>, GenericError>;

    async fn find_user(&self, user_id: &str) -> Result<Option<UserSummary>, GenericError>;
}
