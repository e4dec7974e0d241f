use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::{Action, Direction};
use crate::config::{Config, DisplayConfig};
use crate::system::collector::Collector;
use crate::system::policy::ProcessPolicy;
use crate::system::process::ProcessEntry;
use crate::system::snapshot::Snapshot;
use crate::system::users::{SystemUsers, UserResolver};
use crate::ui::theme::Theme;

/// Polling-loop state: the collector, the latest snapshot and the
/// interactive overrides of the loaded configuration.
pub struct App<U: UserResolver = SystemUsers> {
    pub running: bool,
    pub collector: Collector<U>,
    pub snapshot: Snapshot,
    /// Process list of the last sample before filtering, so policy changes
    /// can be re-applied without taking a new sample.
    pub unfiltered: Vec<ProcessEntry>,
    pub display: DisplayConfig,
    pub show_process_state: bool,
    pub show_process_user: bool,
    pub policy: ProcessPolicy,
    pub theme: Theme,
    pub selected_index: usize,
    pub show_help: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        App::with_collector(config, Collector::new())
    }
}

impl<U: UserResolver> App<U> {
    pub fn with_collector(config: Config, collector: Collector<U>) -> Self {
        let theme = Theme::from_config(&config.display.theme, config.display.show_colors);

        let policy = config.policy();
        let mut app = App {
            running: true,
            collector,
            snapshot: Snapshot::default(),
            unfiltered: Vec::new(),
            show_process_state: config.processes.show_process_state,
            show_process_user: config.processes.show_process_user,
            display: config.display,
            policy,
            theme,
            selected_index: 0,
            show_help: false,
        };
        app.refresh_data();
        app
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_secs(self.display.update_interval.max(1))
    }

    /// Take a new sample. Only the refresh timer and an explicit refresh
    /// call this, so the CPU baseline advances once per interval.
    pub fn refresh_data(&mut self) {
        self.snapshot = self.collector.sample();
        self.unfiltered = std::mem::take(&mut self.snapshot.processes);
        self.reapply_policy();
    }

    /// Filter, sort and cap the last sample again under the current policy.
    fn reapply_policy(&mut self) {
        self.snapshot.processes = self.policy.apply(self.unfiltered.clone());
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.snapshot.processes.len();
        if len == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        if self.show_help {
            return match key.code {
                KeyCode::Char('?') | KeyCode::Esc => Action::ToggleHelp,
                KeyCode::Char('q') => Action::Quit,
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Up => Action::Navigate(Direction::Up),
            KeyCode::Down => Action::Navigate(Direction::Down),
            KeyCode::Char('s') => Action::CycleSort,
            KeyCode::Char('r') => Action::ToggleReverse,
            KeyCode::Char('k') => Action::ToggleKernelThreads,
            KeyCode::Char('?') => Action::ToggleHelp,
            KeyCode::Char(' ') => Action::Refresh,
            _ => Action::None,
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Navigate(Direction::Up) => {
                self.selected_index = self.selected_index.saturating_sub(1);
            }
            Action::Navigate(Direction::Down) => {
                self.selected_index += 1;
                self.clamp_selection();
            }
            Action::CycleSort => {
                self.policy.order.key = self.policy.order.key.next();
                self.reapply_policy();
            }
            Action::ToggleReverse => {
                self.policy.order.reverse = !self.policy.order.reverse;
                self.reapply_policy();
            }
            Action::ToggleKernelThreads => {
                self.policy.show_kernel_threads = !self.policy.show_kernel_threads;
                self.reapply_policy();
            }
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::Refresh => self.refresh_data(),
            Action::None => {}
        }
    }

    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        vec![
            ("q".to_string(), "Quit"),
            ("s".to_string(), "Cycle sort key"),
            ("r".to_string(), "Reverse sort"),
            ("k".to_string(), "Toggle kernel threads"),
            ("Space".to_string(), "Refresh now"),
            ("\u{2191}\u{2193}".to_string(), "Move selection"),
            ("?".to_string(), "Toggle help"),
            ("Ctrl+C".to_string(), "Quit (always)"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::policy::SortKey;
    use crate::system::source::ProcSource;
    use crate::system::users::StaticUsers;

    fn app() -> App<StaticUsers> {
        // An empty procfs root: every read fails and the app keeps running.
        let dir = std::env::temp_dir().join("mtop_app_test_empty_root");
        let collector = Collector::with_source(ProcSource::new(dir), StaticUsers::default());
        App::with_collector(Config::default(), collector)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn missing_sources_give_zeroed_snapshot() {
        let app = app();
        assert_eq!(app.snapshot.cpu_percent, 0.0);
        assert_eq!(app.snapshot.process_count, 0);
        assert!(app.snapshot.processes.is_empty());
        assert!(app.snapshot.load_stale);
    }

    #[test]
    fn ctrl_c_always_quits() {
        let mut app = app();
        app.show_help = true;
        let action = app.map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(action, Action::Quit);
        app.dispatch(action);
        assert!(!app.running);
    }

    #[test]
    fn sort_and_filter_keys_update_policy() {
        let mut app = app();
        assert_eq!(app.policy.order.key, SortKey::Memory);

        let action = app.map_key(key(KeyCode::Char('s')));
        app.dispatch(action);
        assert_eq!(app.policy.order.key, SortKey::Cpu);

        app.dispatch(app.map_key(key(KeyCode::Char('r'))));
        assert!(app.policy.order.reverse);

        app.dispatch(app.map_key(key(KeyCode::Char('k'))));
        assert!(app.policy.show_kernel_threads);
    }

    #[test]
    fn help_mode_swallows_other_keys() {
        let mut app = app();
        app.dispatch(app.map_key(key(KeyCode::Char('?'))));
        assert!(app.show_help);
        assert_eq!(app.map_key(key(KeyCode::Char('s'))), Action::None);
        app.dispatch(app.map_key(key(KeyCode::Esc)));
        assert!(!app.show_help);
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut app = app();
        app.dispatch(Action::Navigate(Direction::Down));
        assert_eq!(app.selected_index, 0);
        app.dispatch(Action::Navigate(Direction::Up));
        assert_eq!(app.selected_index, 0);
    }

    fn write_stat(root: &std::path::Path, line: &str) {
        std::fs::write(root.join("stat"), line).unwrap();
    }

    #[test]
    fn policy_keys_do_not_take_a_sample() {
        let dir = tempfile::tempdir().unwrap();
        write_stat(dir.path(), "cpu  100 0 50 800 50 0 0 0 0 0\n");
        for (pid, name, rss) in [(1, "init", 10), (2, "kthreadd", 0), (15, "[rcu]", 0)] {
            let proc_dir = dir.path().join(pid.to_string());
            std::fs::create_dir_all(&proc_dir).unwrap();
            let tail: Vec<String> = (2..21).map(|i| i.to_string()).collect();
            let ppid = if pid == 15 { 2 } else { 0 };
            std::fs::write(
                proc_dir.join("stat"),
                format!("{pid} ({name}) S {ppid} {} {rss} 0 0 0 0\n", tail.join(" ")),
            )
            .unwrap();
        }
        let collector =
            Collector::with_source(ProcSource::new(dir.path()), StaticUsers::default());
        let mut app = App::with_collector(Config::default(), collector);
        assert_eq!(app.snapshot.processes.len(), 2);

        write_stat(dir.path(), "cpu  150 0 70 830 50 0 0 0 0 0\n");
        app.dispatch(Action::CycleSort);
        app.dispatch(Action::ToggleKernelThreads);
        assert_eq!(app.snapshot.cpu_percent, 0.0);
        assert_eq!(app.snapshot.processes.len(), 3, "re-filtered from the last sample");
        assert_eq!(app.snapshot.process_count, 3);

        app.refresh_data();
        assert!(
            (app.snapshot.cpu_percent - 70.0).abs() < 1e-9,
            "{}",
            app.snapshot.cpu_percent
        );
    }

    #[test]
    fn tick_rate_never_zero() {
        let mut app = app();
        app.display.update_interval = 0;
        assert_eq!(app.tick_rate(), Duration::from_secs(1));
    }
}
