pub mod allocator;
pub mod classifier;
pub mod contribution;
pub mod growth;
pub mod plan;
pub mod templates;

pub use plan::PlanEngine;
