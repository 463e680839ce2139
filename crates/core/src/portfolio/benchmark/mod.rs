//! Benchmark index comparison over the same period as the portfolio.

mod benchmark_model;
mod benchmark_service;

pub use benchmark_model::{BenchmarkComparison, BenchmarkPoint, BenchmarkSeries};
pub use benchmark_service::{excess_return, BenchmarkService};
