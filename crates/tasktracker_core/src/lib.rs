pub mod config;
pub mod error;
pub mod ledger;
pub mod model;
pub mod report;
pub mod storage;

pub use error::AppError;
pub use ledger::Ledger;
pub use model::Task;
