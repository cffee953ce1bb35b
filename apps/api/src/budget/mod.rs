// Printing-cost estimation against a user budget.
// Advisory only: estimates never block generation or export.

pub mod estimator;
pub mod handlers;

pub use estimator::{estimate_for_model, BudgetError, BudgetEstimate, PriceSchedule};
