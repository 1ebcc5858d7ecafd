//! Templates wrapping the rendered units.
pub mod dir;
pub mod kind;
pub mod manager;

pub use dir::*;
pub use kind::*;
pub use manager::*;
