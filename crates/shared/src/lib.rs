pub mod config;
pub mod display;
pub mod error;
pub mod grid;
pub mod models;
pub mod view;
pub mod zoom;

pub use error::{MapError, MapResult};
