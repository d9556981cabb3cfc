//! Data module - vocabulary, CSV loading and filtering

pub mod categories;
pub mod filter;
pub mod loader;

pub use categories::CategoryVocabulary;
pub use filter::{FilterError, RecordFilter};
pub use loader::{discover, DatasetLoader, LoaderError};
