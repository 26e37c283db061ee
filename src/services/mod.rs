pub mod convergence_controller;
pub mod evaluation_dispatcher;
pub mod evolution_step;
pub mod retrying_oracle;

pub use convergence_controller::{ConvergenceController, SessionOutcome, StopReason};
pub use evaluation_dispatcher::{EvaluationDispatcher, PROGRESS_LABEL};
pub use evolution_step::EvolutionStep;
pub use retrying_oracle::{RetryPolicy, RetryingCreativeOracle, RetryingReactionOracle};
