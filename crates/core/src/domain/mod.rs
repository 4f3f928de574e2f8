pub mod action;
pub mod request;
pub mod resource;
pub mod variable;

pub use action::{ActionHandle, ActionState};
pub use request::{DeployRequest, PreviewScope};
pub use resource::{Readiness, ResourceState, ResourceStatuses};
pub use variable::{parse_variables, Variable};
