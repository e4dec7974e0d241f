//! Readers for the aggregate kernel counters exposed under procfs.
//!
//! Each reader is a plain read-and-parse with no state of its own. Parsing is
//! split out into functions over `&str` so fixture text can be fed directly.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Column order of the aggregate `cpu` line in `/proc/stat`.
pub const CPU_FIELDS: [&str; 8] = [
    "user", "nice", "system", "idle", "iowait", "irq", "softirq", "steal",
];

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("cannot read {}: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed record in {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateCpuCounters {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl AggregateCpuCounters {
    pub fn total(&self) -> u64 {
        self.user
            .saturating_add(self.nice)
            .saturating_add(self.system)
            .saturating_add(self.idle)
            .saturating_add(self.iowait)
            .saturating_add(self.irq)
            .saturating_add(self.softirq)
            .saturating_add(self.steal)
    }

    pub fn idle_class(&self) -> u64 {
        self.idle.saturating_add(self.iowait)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemoryCounters {
    pub total_kb: u64,
    pub free_kb: u64,
    pub used_kb: u64,
}

impl MemoryCounters {
    pub fn used_ratio(&self) -> f64 {
        if self.total_kb == 0 {
            return 0.0;
        }
        (self.used_kb as f64 / self.total_kb as f64).clamp(0.0, 1.0)
    }
}

/// 1, 5 and 15 minute load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LoadAverage(pub [f64; 3]);

#[derive(Debug, Clone)]
pub struct ProcSource {
    root: PathBuf,
}

impl Default for ProcSource {
    fn default() -> Self {
        Self::new(DEFAULT_PROC_ROOT)
    }
}

impl ProcSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn read_cpu_counters(&self) -> Result<AggregateCpuCounters, ReadError> {
        let path = self.root.join("stat");
        let contents = read_source(&path)?;
        parse_cpu_counters(&contents).map_err(|reason| ReadError::Malformed { path, reason })
    }

    pub fn read_memory_counters(&self) -> Result<MemoryCounters, ReadError> {
        let path = self.root.join("meminfo");
        let contents = read_source(&path)?;
        Ok(parse_meminfo(&contents))
    }

    pub fn read_load_average(&self) -> Result<LoadAverage, ReadError> {
        let path = self.root.join("loadavg");
        let contents = read_source(&path)?;
        parse_loadavg(&contents).map_err(|reason| ReadError::Malformed { path, reason })
    }
}

fn read_source(path: &Path) -> Result<String, ReadError> {
    fs::read_to_string(path).map_err(|source| ReadError::Unavailable {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse the first line of `/proc/stat`: a label followed by at least eight
/// tick counters. Trailing guest columns are ignored.
pub fn parse_cpu_counters(contents: &str) -> Result<AggregateCpuCounters, String> {
    let line = contents.lines().next().ok_or("empty source")?;
    let mut tokens = line.split_whitespace();
    let label = tokens.next().ok_or("missing label")?;

    let mut values = [0u64; CPU_FIELDS.len()];
    for (slot, name) in values.iter_mut().zip(CPU_FIELDS) {
        let token = tokens
            .next()
            .ok_or_else(|| format!("`{label}` line ends before `{name}`"))?;
        *slot = token
            .parse()
            .map_err(|_| format!("`{name}` is not a counter: {token:?}"))?;
    }

    let [user, nice, system, idle, iowait, irq, softirq, steal] = values;
    Ok(AggregateCpuCounters {
        user,
        nice,
        system,
        idle,
        iowait,
        irq,
        softirq,
        steal,
    })
}

/// Parse `/proc/meminfo`. Only `MemTotal:`, `MemAvailable:` and `MemFree:` are
/// looked at; `MemAvailable:` wins over `MemFree:` when both are present.
pub fn parse_meminfo(contents: &str) -> MemoryCounters {
    let mut total_kb = 0;
    let mut available_kb = None;
    let mut raw_free_kb = 0;

    for line in contents.lines() {
        let mut tokens = line.split_whitespace();
        let (Some(key), Some(value)) = (tokens.next(), tokens.next()) else {
            continue;
        };
        let Ok(value) = value.parse::<u64>() else {
            continue;
        };
        match key {
            "MemTotal:" => total_kb = value,
            "MemAvailable:" => available_kb = Some(value),
            "MemFree:" => raw_free_kb = value,
            _ => {}
        }
    }

    let free_kb = available_kb.unwrap_or(raw_free_kb);
    MemoryCounters {
        total_kb,
        free_kb,
        used_kb: total_kb.saturating_sub(free_kb),
    }
}

pub fn parse_loadavg(contents: &str) -> Result<LoadAverage, String> {
    let mut tokens = contents.split_whitespace();
    let mut load = [0.0; 3];
    for slot in &mut load {
        let token = tokens.next().ok_or("fewer than three load values")?;
        *slot = token
            .parse()
            .map_err(|_| format!("load value is not a number: {token:?}"))?;
    }
    Ok(LoadAverage(load))
}

/// Keeps the last good load average so a failed read never zeroes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadTracker {
    last: LoadAverage,
    stale: bool,
}

impl LoadTracker {
    pub fn update(&mut self, reading: Result<LoadAverage, ReadError>) -> (LoadAverage, bool) {
        match reading {
            Ok(load) => {
                self.last = load;
                self.stale = false;
            }
            Err(err) => {
                tracing::warn!(error = %err, "load average unavailable, keeping previous value");
                self.stale = true;
            }
        }
        (self.last, self.stale)
    }
}
