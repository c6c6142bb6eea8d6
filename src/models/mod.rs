pub mod object_id;
pub mod product;

pub use object_id::{InvalidObjectId, ObjectId};
pub use product::*;
