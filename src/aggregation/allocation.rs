// src/aggregation/allocation.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How protection resources were assigned in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Allocation {
    Deterministic,
    Mixed,
    Random,
}

impl Allocation {
    pub const ALL: [Allocation; 3] = [
        Allocation::Deterministic,
        Allocation::Mixed,
        Allocation::Random,
    ];

    /// Directory and file-name stem used on disk
    pub fn as_str(&self) -> &'static str {
        match self {
            Allocation::Deterministic => "Deterministic",
            Allocation::Mixed => "Mixed",
            Allocation::Random => "Random",
        }
    }

    /// Glob for the per-run data files of this allocation
    pub fn data_file_pattern(&self) -> String {
        format!("{}Data*.csv", self.as_str())
    }

    /// File name of the consolidated win counts
    pub fn winner_file_name(&self) -> String {
        format!("{}Winner.csv", self.as_str())
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Allocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deterministic" => Ok(Allocation::Deterministic),
            "mixed" => Ok(Allocation::Mixed),
            "random" => Ok(Allocation::Random),
            other => Err(format!("unknown allocation strategy: {}", other)),
        }
    }
}
