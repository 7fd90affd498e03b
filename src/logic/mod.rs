pub mod apply;
pub mod builder;

pub use apply::*;
pub use builder::*;
