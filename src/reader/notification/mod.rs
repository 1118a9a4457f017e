pub mod cache;
pub mod models;

pub use cache::{NotificationCache, NotificationState};
pub use models::{FormattedNotification, NotificationEntry, NotificationGroup};
