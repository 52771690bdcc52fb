pub mod config;
pub mod error;
pub mod series;

pub use config::Settings;
pub use error::*;
pub use series::*;
