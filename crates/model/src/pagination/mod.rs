pub mod bounds;
pub mod position;
pub mod request;
