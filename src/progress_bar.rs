pub use crate::traits::Progress;

use log::LevelFilter;

impl Progress for indicatif::ProgressBar {
    fn inc(&self, i: u64) {
        indicatif::ProgressBar::inc(self, i)
    }

    fn finish(&self) {
        indicatif::ProgressBar::finish(self)
    }
}

impl Progress for logbar::ProgressBar {
    fn inc(&self, i: u64) {
        logbar::ProgressBar::inc(self, i as usize)
    }

    fn finish(&self) {
        logbar::ProgressBar::finish(self)
    }
}

/// Dummy progress indicator
pub struct NoProgress {}
impl Progress for NoProgress {
    fn inc(&self, _i: u64) {}

    fn finish(&self) {}
}

/// Don't show any progress indicator
pub const NO_PROGRESS: NoProgress = NoProgress {};

/// Progress over the processed events
///
/// Shown only at the default `info` log level. An interactive terminal
/// gets an `indicatif` bar, otherwise a `logbar` is printed. Logging is
/// muted while the bar is visible.
pub struct ProgressBar {
    bar: Box<dyn Progress + Send + Sync>,
    muted: Option<LevelFilter>,
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self {
            bar: Box::new(NO_PROGRESS),
            muted: None,
        }
    }
}

impl Progress for ProgressBar {
    fn inc(&self, i: u64) {
        self.bar.inc(i);
    }

    fn finish(&self) {
        self.bar.finish();
        if let Some(level) = self.muted {
            log::set_max_level(level);
        }
    }
}

impl ProgressBar {
    /// A new progress bar for `nevents` events
    pub fn new(nevents: u64, message: &str) -> Self {
        if log::max_level() != LevelFilter::Info {
            ProgressBar::default()
        } else if console::Term::stderr().features().is_attended() {
            ProgressBar::indicatif(nevents, message)
        } else {
            ProgressBar::logbar(nevents, message)
        }
    }

    fn indicatif(nevents: u64, message: &str) -> Self {
        let bar = indicatif::ProgressBar::new(nevents);
        if let Ok(style) = indicatif::ProgressStyle::default_bar()
            .template("{bar:60.green/green} {msg} {pos}/{len} events [{elapsed}]")
        {
            bar.set_style(style);
        }
        bar.set_message(message.to_owned());
        Self::muting_logs(Box::new(bar))
    }

    fn logbar(nevents: u64, message: &str) -> Self {
        let style = logbar::Style::new().indicator('█');
        eprintln!("{message}");
        let bar = logbar::ProgressBar::with_style(nevents as usize, style);
        Self::muting_logs(Box::new(bar))
    }

    fn muting_logs(bar: Box<dyn Progress + Send + Sync>) -> Self {
        let level = log::max_level();
        log::set_max_level(LevelFilter::Off);
        Self {
            bar,
            muted: Some(level),
        }
    }
}
