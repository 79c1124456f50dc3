mod consolidate;
mod storage;
mod time_series;

pub use consolidate::*;
pub use storage::*;
pub use time_series::*;
