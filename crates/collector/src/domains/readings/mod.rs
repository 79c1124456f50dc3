mod dew_point;
mod extract;
mod reading;

pub use dew_point::*;
pub use extract::*;
pub use reading::*;
