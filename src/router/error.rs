/// A route table that can not be built.
#[derive(Debug, thiserror::Error)]
#[error("{msg}: pattern = {pattern:?}")]
pub struct RouterError {
    msg: &'static str,
    pattern: String,
}

impl RouterError {
    pub(crate) fn new(msg: &'static str, pattern: impl Into<String>) -> Self {
        Self {
            msg,
            pattern: pattern.into(),
        }
    }

    pub fn msg(&self) -> &'static str {
        self.msg
    }

    /// The offending pattern, as written or as displayed.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}
