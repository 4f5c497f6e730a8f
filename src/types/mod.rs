pub mod phase;
pub mod row;
pub mod summary;

pub use phase::*;
pub use row::*;
pub use summary::*;
