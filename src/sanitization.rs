//! Sanitizer - Value sanitization contract.
//!
//! A sanitizer is optional. When one is given at bootstrap it is stored on the
//! component's view record and used for every value written under that view.

/// Where a value is about to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityContext {
    None,
    Html,
    Style,
    Url,
    ResourceUrl,
    Script,
}

pub trait Sanitizer {
    /// Return the value to write, or `None` to drop it.
    fn sanitize(&self, context: SecurityContext, value: &str) -> Option<String>;
}
