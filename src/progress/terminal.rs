use crate::progress::ProgressSink;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

const BAR_TEMPLATE: &str = "[{bar:50}] page {pos} of {len}";

const BAR_CHARS: &str = "##-";

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .map(|style| style.progress_chars(BAR_CHARS))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Text progress bar on stderr, one bar per chapter
#[derive(Default)]
pub struct TerminalProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn position(&self) -> Option<(u64, Option<u64>)> {
        let slot = self.bar.lock().ok()?;
        slot.as_ref().map(|bar| (bar.position(), bar.length()))
    }
}

impl ProgressSink for TerminalProgress {
    fn update(&self, done: usize, total: usize) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };

        if done == 0 || slot.is_none() {
            if let Some(previous) = slot.take() {
                previous.finish_and_clear();
            }
            let bar = ProgressBar::new(total as u64);
            bar.set_style(bar_style());
            *slot = Some(bar);
        }

        if let Some(bar) = slot.as_ref() {
            bar.set_length(total as u64);
            bar.set_position(done as u64);
        }
    }

    fn finish(&self) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish();
            }
        }
    }
}
