//! Element identity signatures
//!
//! Two elements are considered the same child when their signatures are
//! equal. A signature covers the tag, the attributes sorted by key and the
//! trimmed text; child elements are not part of it.
//!
//! Attribute pairs are concatenated without a delimiter, so values that
//! themselves contain `=` can make distinct attribute sets collide.

use std::fmt;

use crate::document::Element;

/// Separator between the tag, attribute and text sections of a signature
pub const SEPARATOR: char = '|';

/// Deterministic identity string of a single element
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature(String);

impl Signature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the signature of `element`
pub fn signature(element: &Element) -> Signature {
    let mut attributes: Vec<(&String, &String)> = element.attributes.iter().collect();
    attributes.sort_by(|a, b| a.0.cmp(b.0));

    let mut value = String::with_capacity(element.tag.len() + 16);
    value.push_str(&element.tag);
    value.push(SEPARATOR);
    for (key, attr_value) in attributes {
        value.push_str(key);
        value.push('=');
        value.push_str(attr_value);
    }
    value.push(SEPARATOR);
    value.push_str(element.trimmed_text());

    Signature(value)
}
