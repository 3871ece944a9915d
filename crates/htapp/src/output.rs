//! Colored terminal output on stderr.

use std::fmt::Display;

use console::{Style, Term};

/// Width labels are padded to in [`Output::field`].
const LABEL_WIDTH: usize = 12;

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    label: Style,
    url: Style,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            label: Style::new().bold(),
            url: Style::new().cyan().underlined(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    /// Print a plain line.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print an aligned `label value` line.
    pub(crate) fn field(&self, label: &str, value: impl Display) {
        let label = format!("{label:>width$}", width = LABEL_WIDTH);
        let _ = self
            .term
            .write_line(&format!("{} {value}", self.label.apply_to(label)));
    }

    /// Print an aligned line whose value is a URL.
    pub(crate) fn url(&self, label: &str, url: &str) {
        self.field(label, self.url.apply_to(url));
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }
}
