//! Batch progress reporting.
//!
//! The batch runner emits [`ProgressEvent`]s; a [`ProgressReporter`] turns
//! them into console lines (or drops them). Batches run on one thread, so
//! reporters keep their counters in `Cell`s.
//!
//! # Example
//!
//! ```ignore
//! use tilesmith::batch::progress::{ConsoleProgress, ImageStatus, ProgressEvent, ProgressReporter};
//!
//! let reporter = ConsoleProgress::new();
//! reporter.report(ProgressEvent::BatchStarted { transform: "gaps".into(), total_images: 2 });
//! reporter.report(ProgressEvent::ImageCompleted {
//!     image: "town.png".into(),
//!     status: ImageStatus::Processed,
//!     duration_ms: 12,
//! });
//! ```

use std::cell::{Cell, RefCell};
use std::io::Write;

/// What happened to one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    /// Transform applied and outputs written
    Processed,
    /// Output already existed
    Skipped,
    /// Loading, transforming or saving failed
    Failed(String),
}

impl std::fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageStatus::Processed => write!(f, "processed"),
            ImageStatus::Skipped => write!(f, "skipped"),
            ImageStatus::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

/// Events reported during a batch run.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    BatchStarted {
        transform: String,
        total_images: usize,
    },
    ImageStarted {
        image: String,
    },
    ImageCompleted {
        image: String,
        status: ImageStatus,
        /// Duration in milliseconds
        duration_ms: u64,
    },
    BatchCompleted {
        processed: usize,
        skipped: usize,
        failed: usize,
        /// Total duration in milliseconds
        duration_ms: u64,
    },
    /// Message produced by a transform, or a non-fatal problem
    Warning {
        image: Option<String>,
        message: String,
    },
    Error {
        image: Option<String>,
        message: String,
    },
}

/// Receiver of batch progress events.
pub trait ProgressReporter {
    fn report(&self, event: ProgressEvent);

    /// Whether per-image start lines are wanted.
    fn is_verbose(&self) -> bool {
        false
    }
}

/// A progress reporter that discards all events.
#[derive(Debug, Default)]
pub struct NullProgress;

impl NullProgress {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for NullProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Console progress reporter with optional colors.
pub struct ConsoleProgress {
    use_colors: bool,
    verbose: bool,
    current: Cell<usize>,
    total: Cell<usize>,
    output: RefCell<Box<dyn Write>>,
}

impl std::fmt::Debug for ConsoleProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleProgress")
            .field("use_colors", &self.use_colors)
            .field("verbose", &self.verbose)
            .field("current", &self.current.get())
            .field("total", &self.total.get())
            .finish()
    }
}

impl ConsoleProgress {
    /// Reporter on stderr; colors are on when stderr is a terminal.
    pub fn new() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stderr),
            verbose: false,
            current: Cell::new(0),
            total: Cell::new(0),
            output: RefCell::new(Box::new(std::io::stderr())),
        }
    }

    /// Reporter writing to a custom output, without colors.
    pub fn with_output<W: Write + 'static>(output: W) -> Self {
        Self {
            use_colors: false,
            verbose: false,
            current: Cell::new(0),
            total: Cell::new(0),
            output: RefCell::new(Box::new(output)),
        }
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn color(&self, text: &str, code: &str) -> String {
        if self.use_colors {
            format!("{}{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.color(text, "\x1b[32m")
    }

    fn yellow(&self, text: &str) -> String {
        self.color(text, "\x1b[33m")
    }

    fn red(&self, text: &str) -> String {
        self.color(text, "\x1b[31m")
    }

    fn cyan(&self, text: &str) -> String {
        self.color(text, "\x1b[36m")
    }

    fn bold(&self, text: &str) -> String {
        self.color(text, "\x1b[1m")
    }

    fn writeln(&self, line: &str) {
        if let Ok(mut output) = self.output.try_borrow_mut() {
            let _ = writeln!(output, "{}", line);
        }
    }

    fn prefixed(image: Option<String>, message: &str) -> String {
        match image {
            Some(image) => format!("{}: {}", image, message),
            None => message.to_string(),
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::BatchStarted { transform, total_images } => {
                self.total.set(total_images);
                self.current.set(0);
                self.writeln(&format!(
                    "{} Applying {} to {} image{}...",
                    self.cyan("[batch]"),
                    self.bold(&transform),
                    total_images,
                    if total_images == 1 { "" } else { "s" }
                ));
            }
            ProgressEvent::ImageStarted { image } => {
                if self.verbose {
                    self.writeln(&format!(
                        "{} [{}/{}] Processing {}...",
                        self.cyan("[batch]"),
                        self.current.get() + 1,
                        self.total.get(),
                        image
                    ));
                }
            }
            ProgressEvent::ImageCompleted { image, status, duration_ms } => {
                self.current.set(self.current.get() + 1);
                let status_str = match &status {
                    ImageStatus::Processed => self.green("ok"),
                    ImageStatus::Skipped => self.yellow("skipped"),
                    ImageStatus::Failed(_) => self.red("FAILED"),
                };
                self.writeln(&format!(
                    "{} [{}/{}] {} {} ({})",
                    self.cyan("[batch]"),
                    self.current.get(),
                    self.total.get(),
                    status_str,
                    image,
                    format_duration(duration_ms)
                ));
            }
            ProgressEvent::BatchCompleted { processed, skipped, failed, duration_ms } => {
                if failed == 0 {
                    self.writeln(&format!(
                        "\n{} {} processed, {} skipped in {}",
                        self.green("[done]"),
                        self.bold(&processed.to_string()),
                        skipped,
                        format_duration(duration_ms)
                    ));
                } else {
                    self.writeln(&format!(
                        "\n{} {} processed, {} skipped, {} {} in {}",
                        self.red("[error]"),
                        processed,
                        skipped,
                        failed,
                        if failed == 1 { "failure" } else { "failures" },
                        format_duration(duration_ms)
                    ));
                }
            }
            ProgressEvent::Warning { image, message } => {
                self.writeln(&format!("{} {}", self.yellow("[note]"), Self::prefixed(image, &message)));
            }
            ProgressEvent::Error { image, message } => {
                self.writeln(&format!("{} {}", self.red("[error]"), Self::prefixed(image, &message)));
            }
        }
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Format a duration in milliseconds to a human-readable string.
pub(crate) fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{}m {}s", ms / 60_000, (ms % 60_000) / 1000)
    }
}
