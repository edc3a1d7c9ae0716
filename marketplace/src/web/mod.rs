pub mod auth;
pub mod carts;
pub mod error;
pub mod orders;

pub use auth::AuthUser;
pub use error::{bad_request, ApiError};

use mongodb::bson::oid::ObjectId;

/// Product ids travel as hex strings on the wire; a malformed id is a client
/// error, not a lookup miss.
pub(crate) fn parse_object_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| bad_request("Invalid product ID."))
}
