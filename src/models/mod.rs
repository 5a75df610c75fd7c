pub mod telemetry;

pub use telemetry::{CostInfo, QueryExecutionRecord};
