//! operation descriptor
//!
//! anything that carries serialized query text can be sent.

/// graphql operation as seen by the fetch adapter
pub trait Operation {
    /// serialized query or mutation text
    fn text(&self) -> &str;

    /// operation name, used only for logging
    fn name(&self) -> Option<&str> {
        None
    }
}

impl Operation for str {
    fn text(&self) -> &str {
        self
    }
}

impl Operation for String {
    fn text(&self) -> &str {
        self
    }
}

/// named operation with its query text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// operation name
    pub name: String,
    /// serialized query text
    pub text: String,
}

impl OperationDescriptor {
    /// create a descriptor
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl Operation for OperationDescriptor {
    fn text(&self) -> &str {
        &self.text
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}
