//! Terminal output for the `ftcache` binary.
//!
//! Transformed contents and listings go to stdout; status lines go to
//! stderr so they never mix with piped data.
//!
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for real terminals
//! - [`MockUI`] for capturing output in tests
//!
//! # Example
//!
//! ```
//! use file_transform_cache::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.success("2 files transformed");
//! ui.data(b"[hello]").unwrap();
//!
//! assert!(ui.has_success("2 files transformed"));
//! assert_eq!(ui.stdout(), b"[hello]");
//! ```

pub mod mock;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, Theme};

use crate::error::Result;

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Show status lines.
    #[default]
    Normal,
    /// Show nothing except errors and data.
    Quiet,
}

impl OutputMode {
    /// Pick the mode for the `--quiet` flag.
    pub fn from_quiet(quiet: bool) -> Self {
        if quiet {
            Self::Quiet
        } else {
            Self::Normal
        }
    }

    /// Check if this mode shows status messages.
    pub fn shows_status(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Show a plain status line.
    fn message(&mut self, msg: &str);

    /// Show a success line.
    fn success(&mut self, msg: &str);

    /// Show a warning line.
    fn warning(&mut self, msg: &str);

    /// Show an error line. Errors are shown in every mode.
    fn error(&mut self, msg: &str);

    /// Write command output to stdout.
    fn data(&mut self, bytes: &[u8]) -> Result<()>;
}
