pub mod money;
pub mod plan;
pub mod request;
pub mod risk;
