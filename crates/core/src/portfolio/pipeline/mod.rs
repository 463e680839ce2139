//! End-to-end run of the three stages over one set of inputs.

mod pipeline_model;
mod pipeline_service;

#[cfg(test)]
mod pipeline_service_tests;

pub use pipeline_model::{PipelineInputs, PipelineReport};
pub use pipeline_service::PortfolioPipeline;
