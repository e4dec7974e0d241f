use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::process::ProcessEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortKey {
    #[default]
    Memory,
    Cpu,
    Pid,
    Name,
}

impl SortKey {
    pub fn next(self) -> Self {
        match self {
            SortKey::Memory => SortKey::Cpu,
            SortKey::Cpu => SortKey::Pid,
            SortKey::Pid => SortKey::Name,
            SortKey::Name => SortKey::Memory,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Memory => "memory",
            SortKey::Cpu => "cpu",
            SortKey::Pid => "pid",
            SortKey::Name => "name",
        }
    }

    /// Unknown names fall back to memory.
    pub fn from_str_config(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "cpu" => SortKey::Cpu,
            "pid" => SortKey::Pid,
            "name" => SortKey::Name,
            _ => SortKey::Memory,
        }
    }

    /// Natural order of the key: biggest first for memory and cpu, smallest
    /// first for pid and name.
    pub fn compare(self, a: &ProcessEntry, b: &ProcessEntry) -> Ordering {
        match self {
            SortKey::Memory => b.memory_kb.cmp(&a.memory_kb),
            SortKey::Cpu => b.cpu_percent.total_cmp(&a.cpu_percent),
            SortKey::Pid => a.pid.cmp(&b.pid),
            SortKey::Name => a.name.cmp(&b.name),
        }
    }
}

impl From<String> for SortKey {
    fn from(s: String) -> Self {
        SortKey::from_str_config(&s)
    }
}

impl From<SortKey> for String {
    fn from(key: SortKey) -> Self {
        key.label().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortOrder {
    pub key: SortKey,
    pub reverse: bool,
}

impl SortOrder {
    pub fn compare(&self, a: &ProcessEntry, b: &ProcessEntry) -> Ordering {
        let ord = self.key.compare(a, b);
        if self.reverse { ord.reverse() } else { ord }
    }
}

/// Visibility filters, ordering and row cap applied to each cycle's process
/// list.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessPolicy {
    pub max_processes: usize,
    pub show_kernel_threads: bool,
    /// Case-sensitive substrings; a match on the name hides the entry.
    pub hide_processes: Vec<String>,
    /// Exact user names; empty means every user is shown.
    pub show_only_users: Vec<String>,
    pub order: SortOrder,
}

impl Default for ProcessPolicy {
    fn default() -> Self {
        Self {
            max_processes: 20,
            show_kernel_threads: false,
            hide_processes: Vec::new(),
            show_only_users: Vec::new(),
            order: SortOrder::default(),
        }
    }
}

impl ProcessPolicy {
    pub fn is_visible(&self, entry: &ProcessEntry) -> bool {
        if entry.is_kernel_thread && !self.show_kernel_threads {
            return false;
        }
        if self
            .hide_processes
            .iter()
            .any(|pattern| entry.name.contains(pattern.as_str()))
        {
            return false;
        }
        self.show_only_users.is_empty() || self.show_only_users.iter().any(|u| *u == entry.user)
    }

    /// Filter, sort, then keep the first `max_processes` rows so the cap
    /// always retains the top entries under the active order.
    pub fn apply(&self, mut processes: Vec<ProcessEntry>) -> Vec<ProcessEntry> {
        processes.retain(|p| self.is_visible(p));
        processes.sort_by(|a, b| self.order.compare(a, b));
        processes.truncate(self.max_processes);
        processes
    }
}
