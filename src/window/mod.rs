pub mod bounded;
pub mod focus;

pub use bounded::*;
pub use focus::*;
