pub mod model;
pub mod validate;

pub use model::{compute_financing_model, FinancingModel};
pub use validate::{validate, Violation};
