pub mod error;
pub mod mode;
pub mod validated;
