//! Activity feed and code-runner console.

use std::collections::VecDeque;

use collabix_shared::time::local_time_of_day;

/// Maximum number of activity entries kept.
pub const ACTIVITY_CAPACITY: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub message: String,
    /// Unix timestamp (milliseconds)
    pub at: i64,
}

impl ActivityEntry {
    /// `HH:MM` in local time
    pub fn time_of_day(&self) -> String {
        local_time_of_day(self.at)
    }
}

/// Newest-first activity feed, capped at [`ACTIVITY_CAPACITY`].
#[derive(Debug, Default)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, message: impl Into<String>, at: i64) {
        self.entries.push_front(ActivityEntry {
            message: message.into(),
            at,
        });
        self.entries.truncate(ACTIVITY_CAPACITY);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub text: String,
    pub is_error: bool,
}

/// Output of remote code runs.
#[derive(Debug, Default)]
pub struct ConsoleLog {
    lines: Vec<ConsoleLine>,
    running: bool,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new run was requested: clear previous output.
    pub fn start_run(&mut self) {
        self.lines.clear();
        self.running = true;
    }

    pub fn push_output(&mut self, text: impl Into<String>, is_error: bool) {
        self.running = false;
        self.lines.push(ConsoleLine {
            text: text.into(),
            is_error,
        });
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn lines(&self) -> &[ConsoleLine] {
        &self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_log_is_newest_first_and_capped() {
        // テスト項目: アクティビティは新しい順に並び、上限件数を超えると古いものから捨てられる
        // given (前提条件):
        let mut log = ActivityLog::new();

        // when (操作):
        for i in 0..(ACTIVITY_CAPACITY + 5) {
            log.record(format!("event {}", i), i as i64);
        }

        // then (期待する結果):
        assert_eq!(log.len(), ACTIVITY_CAPACITY);
        let newest = log.entries().next().unwrap();
        assert_eq!(newest.message, format!("event {}", ACTIVITY_CAPACITY + 4));
        let oldest = log.entries().last().unwrap();
        assert_eq!(oldest.message, "event 5");
    }

    #[test]
    fn test_console_run_lifecycle() {
        // テスト項目: 実行開始で出力がクリアされ、出力受信で実行中フラグが解除される
        // given (前提条件):
        let mut console = ConsoleLog::new();
        console.push_output("old", false);

        // when (操作):
        console.start_run();
        let running = console.is_running();
        console.push_output("boom", true);

        // then (期待する結果):
        assert!(running);
        assert!(!console.is_running());
        assert_eq!(
            console.lines(),
            &[ConsoleLine {
                text: "boom".to_string(),
                is_error: true
            }]
        );
    }
}
