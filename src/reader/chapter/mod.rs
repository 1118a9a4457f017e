pub mod cache;
pub mod models;

pub use cache::{ChapterCache, ChapterState};
pub use models::{Chapter, CHAPTER_DATE_FIELDS};
