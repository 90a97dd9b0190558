// src/aggregation/mod.rs
pub mod allocation;
pub mod discovery;
pub mod engine;
pub mod loader;
pub mod natural_key;
pub mod table;

pub use allocation::Allocation;
pub use discovery::{discover, Condition, ConditionValue};
pub use engine::{AggregationEngine, TableKey};
pub use table::{DegreeTable, RunRecord, RunTable, Table, WinRecord, WinTable};
