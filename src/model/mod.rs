pub mod aspect;
pub mod common;
pub mod ownership;
pub mod patch;
pub mod properties;
pub mod proposal;
pub mod stored;
pub mod tags;
pub mod terms;
pub mod urn;

pub use aspect::*;
pub use common::*;
pub use ownership::*;
pub use patch::*;
pub use properties::*;
pub use proposal::*;
pub use stored::*;
pub use tags::*;
pub use terms::*;
pub use urn::*;
