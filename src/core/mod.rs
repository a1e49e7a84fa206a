pub mod decoder;
pub mod error_interpreter;
pub mod url_builder;
pub mod wrapper;

pub use crate::domain::ports::Transport;
pub use crate::utils::error::Result;
