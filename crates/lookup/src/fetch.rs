use std::fmt::Display;

/// State of one lookup for the current query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Fetch<T> {
    /// Not requested for the current query.
    #[default]
    Idle,
    Pending,
    /// Finished; `None` is "not found".
    Ready(Option<T>),
    Failed(String),
}

impl<T> Fetch<T> {
    pub fn from_result<E: Display>(result: Result<Option<T>, E>) -> Self {
        match result {
            Ok(value) => Fetch::Ready(value),
            Err(err) => Fetch::Failed(err.to_string()),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Fetch::Pending)
    }

    /// The resolved value, if the lookup finished with one.
    pub fn value(&self) -> Option<&T> {
        match self {
            Fetch::Ready(Some(value)) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Fetch::Failed(message) => Some(message),
            _ => None,
        }
    }
}
