pub mod builders;
pub mod db;
pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;
pub mod settings;

pub use builders::{build_all, Repositories, Services};
pub use error::{ReportError, Result};
