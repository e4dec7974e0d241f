use serde::Serialize;

use super::process::ProcessEntry;
use super::source::{LoadAverage, MemoryCounters};

/// Result of one sampling cycle, handed to the renderer read-only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub cpu_percent: f64,
    pub memory: MemoryCounters,
    pub load_average: LoadAverage,
    /// Set when the load average could not be read this cycle and the
    /// previous value is being shown.
    pub load_stale: bool,
    /// Processes enumerated before any filtering.
    pub process_count: usize,
    /// Entries dropped during enumeration (exited mid-scan or malformed).
    pub skipped_count: usize,
    pub processes: Vec<ProcessEntry>,
}
