pub mod config;
pub mod document;
pub mod draft;
pub mod errors;
pub mod models;
pub mod render;
pub mod sections;
pub mod state;
pub mod ui;
pub mod upload;
pub mod validation;

pub use errors::FormError;
pub use state::FormSession;
