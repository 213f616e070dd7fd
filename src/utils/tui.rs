use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use decacal_core::{Backend, EventStore};
use indicatif::{ProgressBar, ProgressStyle};

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    // The template is a literal; fall back to the default style rather than fail.
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["-", "\\", "|", "/"])
        .template("{msg} {spinner}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Run `work` against the store, showing a spinner whenever the store
/// reports a backend call in flight. Local stores finish on the first
/// poll and never show one.
pub async fn while_busy<B, F>(store: &EventStore<B>, message: &str, work: F) -> F::Output
where
    B: Backend,
    F: Future,
{
    let mut work = pin!(work);
    let mut check = tokio::time::interval(Duration::from_millis(50));
    let mut spinner: Option<ProgressBar> = None;

    let output = loop {
        tokio::select! {
            biased;
            output = &mut work => break output,
            _ = check.tick() => {
                let busy = store.is_busy();
                if busy && spinner.is_none() {
                    spinner = Some(create_spinner(message.to_string()));
                } else if !busy {
                    if let Some(shown) = spinner.take() {
                        shown.finish_and_clear();
                    }
                }
            }
        }
    };

    if let Some(shown) = spinner {
        shown.finish_and_clear();
    }
    output
}
