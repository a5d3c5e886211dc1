pub mod config;
pub mod errors;
pub mod spaces;
pub mod text_env;
pub mod traits;
pub mod types;

pub use config::EnvConfig;
pub use errors::{EnvError, Stage};
pub use spaces::{ObservationSpace, RewardRange, Spaces, TextSpace};
pub use text_env::{TextEnvironment, coerce_query};
pub use traits::{Env, StepResult};
pub use types::{Phase, StepInfo, Trajectory, Transition};
