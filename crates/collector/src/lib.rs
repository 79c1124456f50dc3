mod domains;
pub mod render;
mod utils;

pub use domains::*;
pub use utils::*;
