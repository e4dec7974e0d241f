use std::fs;
use std::path::Path;

use mtop::system::collector::Collector;
use mtop::system::policy::{ProcessPolicy, SortKey, SortOrder};
use mtop::system::source::{LoadAverage, ProcSource};
use mtop::system::users::StaticUsers;
use tempfile::TempDir;

const MEMINFO: &str = "MemTotal:       16384000 kB\n\
MemFree:         1024000 kB\n\
MemAvailable:    8192000 kB\n\
Buffers:          204800 kB\n";

fn stat_line(pid: u32, name: &str, state: char, ppid: u32, rss_pages: u64) -> String {
    let mut fields = vec![state.to_string(), ppid.to_string()];
    fields.extend((2..21).map(|i| i.to_string()));
    fields.push(rss_pages.to_string());
    fields.extend(["18446744073709551615", "1", "1", "0"].map(String::from));
    format!("{pid} ({name}) {}\n", fields.join(" "))
}

fn status(name: &str, uid: u32) -> String {
    format!("Name:\t{name}\nState:\tS (sleeping)\nUid:\t{uid}\t{uid}\t{uid}\t{uid}\nGid:\t0\t0\t0\t0\n")
}

struct FakeProc {
    dir: TempDir,
}

impl FakeProc {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let fake = FakeProc { dir };
        fake.write("stat", "cpu  100 0 50 800 50 0 0 0 0 0\ncpu0 100 0 50 800 50 0 0 0 0 0\n");
        fake.write("meminfo", MEMINFO);
        fake.write("loadavg", "0.52 0.58 0.59 2/345 6789\n");
        fake
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, rel: &str, contents: &str) {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn add_process(&self, pid: u32, name: &str, state: char, ppid: u32, rss_pages: u64, uid: u32) {
        self.write(&format!("{pid}/stat"), &stat_line(pid, name, state, ppid, rss_pages));
        self.write(&format!("{pid}/status"), &status(name, uid));
    }

    fn collector(&self) -> Collector<StaticUsers> {
        let users = StaticUsers::new([(0, "root"), (1000, "alice"), (1001, "bob")]);
        Collector::with_source(ProcSource::new(self.root()), users).with_page_size_kb(4)
    }
}

fn populated() -> FakeProc {
    let fake = FakeProc::new();
    fake.add_process(1, "systemd", 'S', 0, 3000, 0);
    fake.add_process(2, "kthreadd", 'S', 0, 0, 0);
    fake.add_process(15, "rcu_sched", 'I', 2, 0, 0);
    fake.add_process(40, "[kworker/0:1]", 'I', 1, 0, 0);
    fake.add_process(1200, "my (weird) proc", 'R', 1, 500, 1000);
    fake.add_process(1300, "firefox", 'S', 1, 250_000, 1000);
    fake.add_process(1400, "postgres", 'D', 1, 40_000, 1001);
    fake.add_process(1500, "zombie", 'Z', 1400, 0, 4242);
    fake
}

#[test]
fn aggregate_metrics_from_fixture() {
    let fake = populated();
    let mut collector = fake.collector();
    let snapshot = collector.sample();

    assert_eq!(snapshot.cpu_percent, 0.0, "first sample has no baseline");
    assert_eq!(snapshot.memory.total_kb, 16_384_000);
    assert_eq!(snapshot.memory.free_kb, 8_192_000);
    assert_eq!(snapshot.memory.used_kb, 8_192_000);
    assert_eq!(snapshot.load_average, LoadAverage([0.52, 0.58, 0.59]));
    assert!(!snapshot.load_stale);
    assert_eq!(snapshot.process_count, 8);
    assert_eq!(snapshot.skipped_count, 0);
}

#[test]
fn cpu_percent_from_two_cycles() {
    let fake = populated();
    let mut collector = fake.collector();
    collector.sample();

    fake.write("stat", "cpu  150 0 70 830 50 0 0 0 0 0\n");
    let snapshot = collector.sample();
    assert!((snapshot.cpu_percent - 70.0).abs() < 1e-9, "{}", snapshot.cpu_percent);

    // Same counters again: no time has passed as far as the kernel is concerned.
    let snapshot = collector.sample();
    assert_eq!(snapshot.cpu_percent, 0.0);
}

#[test]
fn unreadable_cpu_counters_report_zero_and_keep_baseline() {
    let fake = populated();
    let mut collector = fake.collector();
    collector.sample();

    fake.write("stat", "cpu  garbage\n");
    assert_eq!(collector.sample().cpu_percent, 0.0);

    fake.write("stat", "cpu  150 0 70 830 50 0 0 0 0 0\n");
    let pct = collector.sample().cpu_percent;
    assert!((pct - 70.0).abs() < 1e-9, "{pct}");
}

#[test]
fn process_entries_are_parsed() {
    let fake = populated();
    let mut collector = fake.collector();
    let snapshot = collector.sample();
    let by_pid = |pid: u32| {
        snapshot
            .processes
            .iter()
            .find(|p| p.pid == pid)
            .unwrap_or_else(|| panic!("pid {pid} missing"))
    };

    let weird = by_pid(1200);
    assert_eq!(weird.name, "my (weird) proc");
    assert_eq!(weird.state, 'R');
    assert_eq!(weird.memory_kb, 2000);
    assert_eq!(weird.uid, 1000);
    assert_eq!(weird.user, "alice");
    assert!(!weird.is_kernel_thread);
    assert_eq!(weird.cpu_percent, 0.0);

    assert!(by_pid(15).is_kernel_thread, "child of kthreadd");
    assert!(by_pid(40).is_kernel_thread, "bracketed name");
    assert!(!by_pid(2).is_kernel_thread);
    assert_eq!(by_pid(1500).user, "4242", "unresolvable uid falls back to decimal");
}

#[test]
fn missing_uid_line_defaults_to_root() {
    let fake = FakeProc::new();
    fake.add_process(77, "noid", 'S', 1, 1, 1000);
    fake.write("77/status", "Name:\tnoid\n");
    let snapshot = fake.collector().sample();
    assert_eq!(snapshot.processes[0].uid, 0);
    assert_eq!(snapshot.processes[0].user, "root");
}

#[test]
fn broken_entries_are_skipped_silently() {
    let fake = populated();
    // Exited between listing and reading: directory without a stat file.
    fs::create_dir_all(fake.root().join("2000")).unwrap();
    // Truncated record.
    fake.write("2001/stat", "2001 (short) S 1 2 3\n");
    // Not a pid.
    fake.write("self/stat", &stat_line(9, "self", 'S', 1, 1));
    fake.write("sys/kernel", "");

    let snapshot = fake.collector().sample();
    assert_eq!(snapshot.process_count, 8);
    assert_eq!(snapshot.skipped_count, 2);
    assert!(snapshot.processes.iter().all(|p| p.pid != 2000 && p.pid != 2001));
}

#[test]
fn missing_sources_degrade_to_zero_or_previous() {
    let fake = populated();
    let mut collector = fake.collector();
    collector.sample();

    fs::remove_file(fake.root().join("meminfo")).unwrap();
    fs::remove_file(fake.root().join("loadavg")).unwrap();
    let snapshot = collector.sample();
    assert_eq!(snapshot.memory.total_kb, 0);
    assert_eq!(snapshot.load_average, LoadAverage([0.52, 0.58, 0.59]));
    assert!(snapshot.load_stale);
}

#[test]
fn refresh_applies_policy_after_counting() {
    let fake = populated();
    let mut collector = fake.collector();
    let policy = ProcessPolicy {
        max_processes: 3,
        ..ProcessPolicy::default()
    };

    let snapshot = collector.refresh(&policy);
    assert_eq!(snapshot.process_count, 8, "count is taken before filtering");
    let names: Vec<&str> = snapshot.processes.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["firefox", "postgres", "systemd"]);
}

#[test]
fn refresh_with_user_filter_and_pid_order() {
    let fake = populated();
    let mut collector = fake.collector();
    let policy = ProcessPolicy {
        max_processes: 10,
        show_kernel_threads: true,
        hide_processes: vec!["fire".to_string()],
        show_only_users: vec!["alice".to_string(), "root".to_string()],
        order: SortOrder {
            key: SortKey::Pid,
            reverse: true,
        },
    };

    let pids: Vec<u32> = collector
        .refresh(&policy)
        .processes
        .iter()
        .map(|p| p.pid)
        .collect();
    assert_eq!(pids, vec![1200, 40, 15, 2, 1]);
}

#[test]
fn live_procfs_contains_current_process() {
    if !Path::new("/proc/self/stat").exists() {
        return;
    }
    let mut collector = Collector::new();
    let snapshot = collector.sample();
    let me = std::process::id();
    let entry = snapshot
        .processes
        .iter()
        .find(|p| p.pid == me)
        .expect("current process should be listed");
    assert!(!entry.name.is_empty());
    assert!(entry.memory_kb > 0);
    assert!(snapshot.memory.total_kb > 0);
}
