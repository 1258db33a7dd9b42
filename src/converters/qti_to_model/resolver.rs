//! Resolution of external item references
//!
//! Tests may point at items stored elsewhere (`qti-assessment-item-ref
//! href="..."`). The parser does no I/O itself: the caller supplies the
//! referenced item text through an `ItemResolver`.

use std::collections::{BTreeMap, HashMap};

/// Source of item XML for `href` references
pub trait ItemResolver {
    /// Return the XML text of the referenced item, or `None` if unknown
    fn resolve(&self, href: &str) -> Option<String>;
}

impl<F> ItemResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, href: &str) -> Option<String> {
        self(href)
    }
}

impl ItemResolver for HashMap<String, String> {
    fn resolve(&self, href: &str) -> Option<String> {
        self.get(href).cloned()
    }
}

impl ItemResolver for BTreeMap<String, String> {
    fn resolve(&self, href: &str) -> Option<String> {
        self.get(href).cloned()
    }
}
