pub mod cache;
pub mod models;

pub use cache::{BookCache, BookState};
pub use models::{Book, Genre, BOOK_DATE_FIELDS};
