pub mod collection;
pub mod readings;
pub mod series;
pub mod stations;

pub use collection::*;
pub use readings::*;
pub use series::*;
pub use stations::*;
