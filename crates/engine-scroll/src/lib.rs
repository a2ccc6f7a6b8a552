pub mod cursor;
pub mod error;
pub mod fetch;
pub mod window;

#[cfg(test)]
mod tests;

pub use cursor::ScrollCursor;
pub use error::CursorError;
