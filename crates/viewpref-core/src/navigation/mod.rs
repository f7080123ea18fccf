//! Navigation requests and the rewrite applied before the host renders them

pub mod overrider;
pub mod request;

pub use overrider::{FORCED_MODE_DIRECTIVES, Overrider, PRIMARY_MODE_DIRECTIVE};
pub use request::{ModeDescriptor, NavigationRequest};
