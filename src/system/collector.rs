use super::platform;
use super::policy::ProcessPolicy;
use super::process::ProcessEnumerator;
use super::snapshot::Snapshot;
use super::source::{AggregateCpuCounters, LoadTracker, ProcSource};
use super::users::{SystemUsers, UserResolver};

/// Reduced form of the aggregate counters kept between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuSample {
    pub total: u64,
    pub idle: u64,
}

impl From<&AggregateCpuCounters> for CpuSample {
    fn from(c: &AggregateCpuCounters) -> Self {
        CpuSample {
            total: c.total(),
            idle: c.idle_class(),
        }
    }
}

/// Turns successive aggregate counter readings into a busy percentage.
#[derive(Debug, Clone, Default)]
pub struct CpuTracker {
    baseline: Option<CpuSample>,
}

impl CpuTracker {
    /// Busy percentage since the previous sample. The first sample only sets
    /// the baseline and reports 0.0. Counters that went backwards (reset or
    /// wrap) give a zero delta instead of wrapping around.
    pub fn update(&mut self, counters: &AggregateCpuCounters) -> f64 {
        let sample = CpuSample::from(counters);
        let percent = match self.baseline {
            None => 0.0,
            Some(prev) => {
                let total_delta = sample.total.saturating_sub(prev.total);
                let idle_delta = sample.idle.saturating_sub(prev.idle);
                if total_delta == 0 {
                    0.0
                } else {
                    let busy = 1.0 - idle_delta as f64 / total_delta as f64;
                    (100.0 * busy).clamp(0.0, 100.0)
                }
            }
        };
        self.baseline = Some(sample);
        percent
    }

    pub fn baseline(&self) -> Option<CpuSample> {
        self.baseline
    }
}

/// Owns the only state that survives between cycles: the CPU baseline, the
/// last good load average and the user-name cache.
pub struct Collector<U: UserResolver = SystemUsers> {
    source: ProcSource,
    users: U,
    page_size_kb: u64,
    cpu: CpuTracker,
    load: LoadTracker,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector {
    pub fn new() -> Self {
        Collector::with_source(ProcSource::default(), SystemUsers::new())
    }
}

impl<U: UserResolver> Collector<U> {
    pub fn with_source(source: ProcSource, users: U) -> Self {
        Collector {
            source,
            users,
            page_size_kb: platform::page_size_kb(),
            cpu: CpuTracker::default(),
            load: LoadTracker::default(),
        }
    }

    /// Override the page size used to scale resident page counts.
    pub fn with_page_size_kb(mut self, page_size_kb: u64) -> Self {
        self.page_size_kb = page_size_kb;
        self
    }

    /// One full sampling cycle with the unfiltered process list.
    pub fn sample(&mut self) -> Snapshot {
        let _span = tracing::debug_span!("collector.sample").entered();

        let cpu_percent = match self.source.read_cpu_counters() {
            Ok(counters) => self.cpu.update(&counters),
            Err(err) => {
                tracing::warn!(error = %err, "cpu counters unavailable this cycle");
                0.0
            }
        };

        let memory = self.source.read_memory_counters().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "memory counters unavailable this cycle");
            Default::default()
        });

        let (load_average, load_stale) = self.load.update(self.source.read_load_average());

        self.users.begin_cycle();
        let mut enumerator =
            ProcessEnumerator::new(self.source.root(), self.page_size_kb, &mut self.users);
        let processes: Vec<_> = enumerator.by_ref().collect();
        let skipped_count = enumerator.skipped();

        tracing::debug!(
            cpu_percent,
            process_count = processes.len(),
            skipped_count,
            "sampled"
        );

        Snapshot {
            cpu_percent,
            memory,
            load_average,
            load_stale,
            process_count: processes.len(),
            skipped_count,
            processes,
        }
    }

    /// Sample, then filter, sort and cap the process list with `policy`.
    pub fn refresh(&mut self, policy: &ProcessPolicy) -> Snapshot {
        let mut snapshot = self.sample();
        snapshot.processes = policy.apply(std::mem::take(&mut snapshot.processes));
        snapshot
    }
}
