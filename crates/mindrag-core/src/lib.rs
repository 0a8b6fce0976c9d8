#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod extract;
pub mod mindmap;
pub mod traits;
pub mod types;

pub use error::{EmbedStage, Error, Result};
