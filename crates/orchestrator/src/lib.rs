pub mod action_waiter;
pub mod deployer;
pub mod error;
pub mod pipeline;
pub mod resource_poller;

#[cfg(test)]
mod testing;

pub use action_waiter::{ActionWaitConfig, ActionWaiter};
pub use deployer::{render_summary, DeployInputs, DeployRequester};
pub use error::{PreviewError, Result};
pub use pipeline::{PipelineConfig, PreviewDeployment, PreviewPipeline};
pub use resource_poller::{ResourcePollConfig, ResourcePoller};
