//! Progress bar reporter with Ctrl-C cancellation.

use indicatif::{ProgressBar, ProgressStyle};

use navcompiler::progress::{CancellationToken, ProgressReporter};

use crate::error::CliError;

const BAR_TEMPLATE: &str = "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}";

/// Create the bar for a run of `total` steps; hidden when `visible` is false.
pub fn resolve_bar(total: u64, visible: bool) -> Result<ProgressBar, CliError> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }

    let style = ProgressStyle::default_bar()
        .template(BAR_TEMPLATE)
        .map_err(|e| CliError::Output(e.to_string()))?
        .progress_chars("=> ");
    let bar = ProgressBar::new(total);
    bar.set_style(style);
    Ok(bar)
}

/// Install the Ctrl-C handler that cancels `token`.
pub fn cancel_on_ctrlc(token: &CancellationToken) -> Result<(), CliError> {
    let token = token.clone();
    ctrlc::set_handler(move || {
        token.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))
}

/// Advances a progress bar and aborts once the token is cancelled.
pub struct BarReporter {
    bar: ProgressBar,
    token: CancellationToken,
}

impl BarReporter {
    pub fn new(bar: ProgressBar, token: CancellationToken) -> Self {
        Self { bar, token }
    }
}

impl ProgressReporter for BarReporter {
    fn report_progress(&mut self, message: &str, silent: bool) -> bool {
        self.bar.inc(1);
        if !silent {
            self.bar.set_message(message.to_string());
        }
        self.token.is_cancelled()
    }

    fn increase_current(&mut self, steps: u64) {
        self.bar.inc(steps);
    }
}
