use enslookup_types::{LookupMode, LookupQuery};

/// Draft state of the lookup form.
///
/// Edits only change the draft; [`LookupForm::submit`] is the single point
/// where a query is published.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupForm {
    mode: LookupMode,
    input: String,
}

impl LookupForm {
    pub fn new(mode: LookupMode) -> Self {
        Self {
            mode,
            input: String::new(),
        }
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }

    pub fn mode(&self) -> LookupMode {
        self.mode
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_mode(&mut self, mode: LookupMode) {
        self.mode = mode;
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn placeholder(&self) -> &'static str {
        self.mode.placeholder()
    }

    /// Publish the draft as an immutable query.
    pub fn submit(&self) -> LookupQuery {
        LookupQuery::new(self.mode, &self.input)
    }
}
