use std::fmt;

use crate::{Capabilities, Error};

const DELIMITER: &str = "; ";

/// Two errors reported as one.
///
/// `previous` and `next` may themselves be [`Error::Multi`], so chains are
/// built by repeated [`append`]. Every capability query is answered by OR-ing
/// both sides.
#[derive(Debug)]
pub struct Multi {
    previous: Error,
    next: Error,
}

impl Multi {
    pub(crate) fn new(previous: Error, next: Error) -> Self {
        Self { previous, next }
    }

    pub fn previous(&self) -> &Error {
        &self.previous
    }

    pub fn next(&self) -> &Error {
        &self.next
    }

    /// Splits the composite back into its two parts.
    pub fn into_parts(self) -> (Error, Error) {
        (self.previous, self.next)
    }

    /// Walks the non-composite errors of the chain, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Error> + '_ {
        let mut stack = vec![&self.next, &self.previous];
        std::iter::from_fn(move || {
            while let Some(err) = stack.pop() {
                match err {
                    Error::Multi(multi) => {
                        stack.push(&multi.next);
                        stack.push(&multi.previous);
                    }
                    leaf => return Some(leaf),
                }
            }
            None
        })
    }
}

impl fmt::Display for Multi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{DELIMITER}{}", self.previous, self.next)
    }
}

impl std::error::Error for Multi {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.previous)
    }
}

impl Capabilities for Multi {
    fn conflict(&self) -> bool {
        self.previous.conflict() || self.next.conflict()
    }

    fn exists(&self) -> bool {
        self.previous.exists() || self.next.exists()
    }

    fn not_found(&self) -> bool {
        self.previous.not_found() || self.next.not_found()
    }

    fn retry(&self) -> bool {
        self.previous.retry() || self.next.retry()
    }

    fn temporary(&self) -> bool {
        self.previous.temporary() || self.next.temporary()
    }
}

/// Combines two optional errors into one.
///
/// A missing side yields the other side unchanged; two missing sides yield
/// `None`. Only when both are present is an [`Error::Multi`] built.
pub fn append(previous: Option<Error>, next: Option<Error>) -> Option<Error> {
    match (previous, next) {
        (None, None) => None,
        (Some(err), None) | (None, Some(err)) => Some(err),
        (Some(previous), Some(next)) => Some(previous.append(next)),
    }
}
