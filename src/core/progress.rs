use std::io::Write;
use std::time::{Duration, Instant};

const RENDER_INTERVAL: Duration = Duration::from_millis(100);

/// Carriage-return progress line for a single download.
///
/// Sized by the response's declared content length; falls back to a plain
/// byte counter when the length is unknown.
pub struct Progress {
    label: String,
    total: Option<u64>,
    current: u64,
    last_render: Instant,
}

impl Progress {
    pub fn new(label: &str, total: Option<u64>) -> Self {
        let progress = Self {
            label: label.to_string(),
            total,
            current: 0,
            last_render: Instant::now(),
        };
        progress.render();
        progress
    }

    pub fn add(&mut self, bytes: u64) {
        self.current += bytes;
        if self.last_render.elapsed() >= RENDER_INTERVAL {
            self.render();
            self.last_render = Instant::now();
        }
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn finish(&self) {
        self.render();
        println!();
    }

    fn render(&self) {
        match self.total {
            Some(total) if total > 0 => {
                let percent = (self.current as f64 / total as f64 * 100.0).min(100.0);
                print!(
                    "\r  {}: {} / {} ({percent:.0}%)",
                    self.label,
                    human_bytes(self.current),
                    human_bytes(total)
                );
            }
            _ => {
                print!("\r  {}: {}", self.label, human_bytes(self.current));
            }
        }
        let _ = std::io::stdout().flush();
    }
}

pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
