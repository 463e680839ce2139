pub mod benchmark;
pub mod history;
pub mod ledger;
pub mod performance;
pub mod pipeline;

pub use benchmark::*;
pub use history::*;
pub use ledger::*;
pub use performance::*;
pub use pipeline::*;
