use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressStyle};

/// A bar counting channel-days, drawn on stderr unless `quiet` or stderr is not a terminal.
pub fn channel_day_bar(total: u64, quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
