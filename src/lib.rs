pub mod reader;

// 重新导出常用类型和函数，方便外部使用
pub use reader::{
    account::{AccountAggregate, AccountListener, AccountState, EmptyAccountListener, User},
    book::{Book, BookCache, Genre},
    chapter::{Chapter, ChapterCache},
    client::{ClientConfig, ReaderClient},
    error::StoreError,
    gateway::{DocumentGateway, MemoryGateway, RestDocumentGateway},
    notification::{NotificationCache, NotificationGroup},
    review::{analyze_reviews, Review, ReviewAnalysis, ReviewCache},
    session::SessionStore,
};
