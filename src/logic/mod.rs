pub mod alerts;
pub mod classifier;
pub mod estimator;
pub mod pipeline;

pub use estimator::EnvironmentalEstimator;
pub use pipeline::Pipeline;
