// Application layer - Use case interactors

pub mod batch_interactor;
pub mod container;
pub mod convert_interactor;
pub mod plan_interactor;
pub mod stack_interactor;

// Re-export interactors
pub use batch_interactor::{BatchInteractor, BatchReport, BatchRequest};
pub use convert_interactor::{ConvertInteractor, ConvertRequest};
pub use plan_interactor::{PlanInteractor, PlanReport, PlanRequest, PlanSource};
pub use stack_interactor::{RunReport, StackInteractor, StackRequest};
