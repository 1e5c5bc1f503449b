//! Named option choosers for pre-match selection

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::SchedError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A named set of selectable options with a default.
///
/// Used to pick the autonomous routine and the match mode before the run
/// starts. Options keep their insertion order for display purposes.
pub struct Chooser<T> {
    name: &'static str,
    options: Vec<(String, T)>,
    default: Option<usize>,
    selected: Option<usize>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T> Chooser<T> {
    pub fn new(name: &'static str) -> Self {
        Chooser {
            name,
            options: Vec::new(),
            default: None,
            selected: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Add a selectable option.
    pub fn add_option<S: Into<String>>(&mut self, label: S, value: T) {
        self.options.push((label.into(), value));
    }

    /// Add an option and make it the default selection.
    pub fn set_default<S: Into<String>>(&mut self, label: S, value: T) {
        self.options.push((label.into(), value));
        self.default = Some(self.options.len() - 1);
    }

    /// Select an option by its label.
    pub fn select(&mut self, label: &str) -> Result<(), SchedError> {
        match self.options.iter().position(|(l, _)| l == label) {
            Some(index) => {
                self.selected = Some(index);
                Ok(())
            }
            None => Err(SchedError::UnknownOption(label.into(), self.name)),
        }
    }

    /// The explicitly selected option, or the default if nothing has been
    /// selected, or `None` if there is no default either.
    pub fn get(&self) -> Option<&T> {
        self.selected
            .or(self.default)
            .map(|index| &self.options[index].1)
    }

    /// The label of the option `get` would return.
    pub fn selected_label(&self) -> Option<&str> {
        self.selected
            .or(self.default)
            .map(|index| self.options[index].0.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|(l, _)| l.as_str())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
