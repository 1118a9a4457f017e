pub mod analysis;
pub mod cache;
pub mod models;

pub use analysis::{analyze_reviews, ReviewAnalysis};
pub use cache::{ReviewCache, ReviewState};
pub use models::{Review, REVIEW_DATE_FIELDS};
