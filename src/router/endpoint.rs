use super::RouterBuilder;
use crate::pattern::{PathPattern, Pattern};

pub(super) enum Endpoint<T> {
    Rule(Pattern, T),
    Nested(PathPattern, RouterBuilder<T>),
}

impl<T> Endpoint<T> {
    #[inline]
    pub(super) fn is_nested(&self) -> bool {
        match self {
            Self::Rule(..) => false,
            Self::Nested(..) => true,
        }
    }
}
