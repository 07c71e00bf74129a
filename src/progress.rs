//! Byte-based progress display for the synthesis phase

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::debug;

const TEMPLATE: &str =
    "{msg}: [{elapsed_precise}] [{wide_bar:.cyan/blue}] {binary_bytes}/{binary_total_bytes} ({eta})";

/// Progress over the source text, counted in bytes
///
/// The counter is kept alongside the bar so it can be read back even when
/// nothing is drawn.
pub struct Progress {
    bar: ProgressBar,
    processed: u64,
}

impl Progress {
    /// Progress over `total` bytes, drawn on stderr when `visible`
    pub fn new(total: Option<u64>, visible: bool) -> Self {
        let bar = match total {
            Some(total) => {
                let bar = ProgressBar::new(total);
                match ProgressStyle::default_bar().template(TEMPLATE) {
                    Ok(style) => bar.set_style(style.progress_chars("#>-")),
                    Err(e) => debug!("Invalid progress template: {}", e),
                }
                bar
            }
            None => ProgressBar::new_spinner(),
        };

        if !visible {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_message("Processing");

        Self { bar, processed: 0 }
    }

    pub fn advance(&mut self, bytes: usize) {
        self.processed += bytes as u64;
        self.bar.inc(bytes as u64);
    }

    /// Bytes processed so far
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Print a line without tearing the bar
    pub fn println(&self, line: impl AsRef<str>) {
        if self.bar.is_hidden() {
            return;
        }
        self.bar.println(line);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
