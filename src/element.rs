// src/element.rs

//! Element-level view of the template

/// A single `name="value"` pair on an element
///
/// Elements keep their attributes as an ordered list; duplicates are
/// preserved exactly as the input gave them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A start tag read from the template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement {
    /// Qualified element name as written
    pub name: String,
    /// Attributes in document order, values unescaped
    pub attributes: Vec<Attribute>,
    /// `true` for `<name/>`, which has no matching end tag
    pub is_empty: bool,
    /// 1-based line on which the tag begins
    pub line: u64,
}
