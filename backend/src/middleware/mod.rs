pub mod identity;
pub mod request_id;

pub use identity::identity;
pub use request_id::request_id;
