pub mod analysis;
pub mod config;
pub mod data_handling;
pub mod error;
pub mod helper_functions;
pub mod models;
pub mod pipeline;
pub mod plotting;
pub mod report;

pub use error::{FigureError, Result};
