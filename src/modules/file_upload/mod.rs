pub mod handle;
pub mod model;
pub mod repository;
pub mod repository_pg;
pub mod route;
pub mod schema;
pub mod service;
pub mod storage;

pub use model::UploadConfig;
pub use repository_pg::FileRepositoryPg;
pub use storage::{LocalStorage, UrlSigner};
