use std::cell::Cell;
use std::io::{IsTerminal, Write};
use std::time::{Duration, Instant};

/// Interval between progress line refreshes
const REFRESH: Duration = Duration::from_millis(50);

/// Throttled single-line progress display on stderr.
///
/// Prints `[current/total] prefix: text`, truncated to the terminal width.
/// Once a task has been running for a couple of seconds, a percentage and
/// an ETA are added to the line.
pub struct ProgressPrinter {
    term_width: usize,
    total: usize,
    prefix: String,
    last_print: Cell<Option<Instant>>,
    start_time: Instant,
}

impl ProgressPrinter {
    pub fn new(total: usize, prefix: impl Into<String>) -> Self {
        let term_width = if std::io::stderr().is_terminal() {
            match terminal_size::terminal_size() {
                Some((width, _)) => width.0 as usize,
                None => 0,
            }
        } else {
            0
        };
        Self {
            term_width,
            total,
            prefix: prefix.into(),
            last_print: Cell::new(None),
            start_time: Instant::now(),
        }
    }

    pub fn print(&self, current: usize, text: impl std::fmt::Display) {
        let now = Instant::now();
        if let Some(last) = self.last_print.get() {
            if now.duration_since(last) < REFRESH {
                return;
            }
        }
        self.last_print.set(Some(now));

        let prefix = if self.total == 0 {
            format!("{1} {0} ", self.prefix, current)
        } else {
            let mut s = format!("[{1}/{2}] {0}: ", self.prefix, current, self.total);
            let elapsed = self.start_time.elapsed().as_secs_f32();
            if elapsed > 2.0 {
                let percentage = (current as f32 / self.total as f32) * 100.0;
                let speed = current as f32 / elapsed;
                let eta = (self.total - current) as f32 / speed;
                s.push_str(&format!("{:.02}% ETA {:.02}s ", percentage, eta));
            }
            s
        };
        if prefix.len() + 1 >= self.term_width {
            eprintln!("{}{}", prefix, text);
            return;
        }
        let remaining = self.term_width - prefix.len() - 1;
        let text = text.to_string();
        // keep the tail, the interesting part of a long name is usually there
        let text = match text.len().checked_sub(remaining) {
            Some(start) if start > 0 => &text[start..],
            _ => &text,
        };
        eprint!("\u{1b}[1K\r{}{}", prefix, text);
        let _ = std::io::stderr().flush();
    }

    pub fn set_total(&mut self, total: usize) {
        self.total = total;
    }

    pub fn done(&self) {
        if self.total == 0 {
            println!("\u{1b}[1K\r{}", self.prefix);
        } else {
            println!("\u{1b}[1K\r[{1}/{1}] {0}", self.prefix, self.total);
        }
    }
}
