pub mod account;
pub mod auth;
pub mod book;
pub mod chapter;
pub mod client;
pub mod db;
pub mod error;
pub mod gateway;
pub mod notification;
pub mod review;
pub mod serialization;
pub mod session;
pub mod types;

// 重新导出认证相关函数
pub use auth::AuthApi;

// 重新导出网关与错误类型
pub use error::StoreError;
pub use gateway::{DocumentGateway, MemoryGateway, RestDocumentGateway};
