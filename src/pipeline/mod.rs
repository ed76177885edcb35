//! Pipeline orchestration
//!
//! Five ordered stages driven by a deterministic state machine, with
//! short-circuit failure propagation: the first stage to fail absorbs the
//! run into `Failed` and no later stage executes.

pub mod orchestrator;
pub mod state;
pub mod validation;

pub use orchestrator::{PipelineOrchestrator, StageClients};
pub use state::{PipelineRun, PipelineState, Stage, StageEvent, StageOutcome, StageResult};
