use crate::constants::{PROGRESS_BAR_CHARS, PROGRESS_BAR_TEMPLATE};
use crate::task::Outcome;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Prints one line per finished task, above a progress bar when enabled.
pub struct Reporter {
    progress: Option<ProgressBar>,
}

impl Reporter {
    pub fn new(total: usize, show_progress: bool) -> Self {
        let progress = show_progress.then(|| {
            let bar = ProgressBar::new(total as u64);
            if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_BAR_TEMPLATE) {
                bar.set_style(style.progress_chars(PROGRESS_BAR_CHARS));
            }
            bar
        });
        Self { progress }
    }

    pub fn report(&self, outcome: &Outcome) {
        match &self.progress {
            Some(bar) => {
                bar.println(outcome.to_string());
                bar.inc(1);
            }
            None => println!("{}", outcome),
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.progress {
            bar.finish_and_clear();
        }
    }
}

/// Totals for a finished batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub original_bytes: u64,
    pub compressed_bytes: u64,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Success {
                original_size,
                compressed_size,
                ..
            } => {
                self.succeeded += 1;
                self.original_bytes += original_size;
                self.compressed_bytes += compressed_size;
            }
            Outcome::Failure { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Size reduction over successful files, in percent. Negative when the
    /// outputs grew.
    pub fn compression_ratio(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        (self.original_bytes as f64 - self.compressed_bytes as f64) / self.original_bytes as f64
            * 100.0
    }

    pub fn files_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.total() as f64 / secs
    }

    pub fn print(&self) {
        println!("\n📊 Batch Compression Summary:");
        println!("  📁 Total files processed: {}", self.total());
        println!("  ✅ Succeeded: {}", self.succeeded);
        if self.failed > 0 {
            println!("  ⚠️  Failed files: {}", self.failed);
        }
        println!("  📊 Total original size: {} bytes", self.original_bytes);
        println!("  📊 Total compressed size: {} bytes", self.compressed_bytes);
        println!("  🎯 Overall compression ratio: {:.1}%", self.compression_ratio());
        println!("  ⏱️  Total time: {:?}", self.elapsed);
        println!("  ⚡ Average speed: {:.2} files/second", self.files_per_second());
    }
}
