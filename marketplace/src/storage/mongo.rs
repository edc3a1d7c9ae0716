use crate::model::{Cart, CartLine, GenericError, Order, Product, SaleRecord, UserSummary};
use crate::storage::ShopStorage;
use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId, to_bson};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection, Database};
use tracing::debug;

#[derive(Clone)]
pub struct MongoShopStorage {
    pub client: Client,
    pub database: Database,
}

impl MongoShopStorage {
    pub async fn new(conn_str: &str, db_name: &str) -> Result<Self, GenericError> {
        debug!(uri = conn_str, "connecting to mongo");
        let client = Client::with_uri_str(conn_str).await?;
        let database = client.database(db_name);
        Ok(Self { client, database })
    }

    fn carts(&self) -> Collection<Cart> {
        self.database.collection("carts")
    }

    fn products(&self) -> Collection<Product> {
        self.database.collection("products")
    }

    fn orders(&self) -> Collection<Order> {
        self.database.collection("orders")
    }

    fn users(&self) -> Collection<UserSummary> {
        self.database.collection("users")
    }
}

#[async_trait]
impl ShopStorage for MongoShopStorage {
    async fn find_cart(&self, owner_id: &str) -> Result<Option<Cart>, GenericError> {
        let cart = self.carts().find_one(doc! { "owner_id": owner_id }).await?;
        Ok(cart)
    }

    async fn push_cart_line(&self, owner_id: &str, line: CartLine) -> Result<Cart, GenericError> {
        let now = Utc::now().naive_utc();
        let updated = self
            .carts()
            .find_one_and_update(
                doc! { "owner_id": owner_id },
                doc! {
                    "$push": { "products": to_bson(&line)? },
                    "$set": { "updated_at": to_bson(&now)? },
                },
            )
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| format!("cart for user {} vanished during update", owner_id))?;
        Ok(updated)
    }

    async fn set_cart_line_quantity(
        &self,
        owner_id: &str,
        product_id: ObjectId,
        selected_quantity: i64,
    ) -> Result<Cart, GenericError> {
        let now = Utc::now().naive_utc();
        let updated = self
            .carts()
            .find_one_and_update(
                doc! { "owner_id": owner_id, "products.product_id": product_id },
                doc! {
                    "$set": {
                        "products.$.selected_quantity": selected_quantity,
                        "updated_at": to_bson(&now)?,
                    },
                },
            )
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| {
                format!(
                    "cart line {} for user {} vanished during update",
                    product_id, owner_id
                )
            })?;
        Ok(updated)
    }

    async fn pull_cart_line(
        &self,
        owner_id: &str,
        product_id: ObjectId,
    ) -> Result<Cart, GenericError> {
        let now = Utc::now().naive_utc();
        let updated = self
            .carts()
            .find_one_and_update(
                doc! { "owner_id": owner_id },
                doc! {
                    "$pull": { "products": { "product_id": product_id } },
                    "$set": { "updated_at": to_bson(&now)? },
                },
            )
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| format!("cart for user {} vanished during update", owner_id))?;
        Ok(updated)
    }

    async fn find_product(&self, product_id: ObjectId) -> Result<Option<Product>, GenericError> {
        let product = self.products().find_one(doc! { "_id": product_id }).await?;
        Ok(product)
    }

    async fn reserve_stock(
        &self,
        product_id: ObjectId,
        amount: i64,
    ) -> Result<Option<Product>, GenericError> {
        // Filter and decrement are one atomic update; the default return
        // document is the pre-image, which carries the seller for the ledger
        // append that follows.
        let before = self
            .products()
            .find_one_and_update(
                doc! { "_id": product_id, "quantity": { "$gte": amount } },
                doc! { "$inc": { "quantity": -amount } },
            )
            .await?;
        Ok(before)
    }

    async fn append_sale(&self, seller_id: &str, sale: SaleRecord) -> Result<(), GenericError> {
        let now = Utc::now().naive_utc();
        self.orders()
            .update_one(
                doc! { "owner_id": seller_id },
                doc! {
                    "$push": { "products": to_bson(&sale)? },
                    "$set": { "updated_at": to_bson(&now)? },
                    "$setOnInsert": { "created_at": to_bson(&now)? },
                },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn find_order(&self, owner_id: &str) -> Result<Option<Order>, GenericError> {
        let order = self.orders().find_one(doc! { "owner_id": owner_id }).await?;
        Ok(order)
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<UserSummary>, GenericError> {
        let user = self.users().find_one(doc! { "_id": user_id }).await?;
        Ok(user)
    }
}
