pub mod extract;

pub use extract::extract;

/// Platform-specific identifier or path naming one program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgramHandle(String);

impl ProgramHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProgramHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One in-scope asset of a program.
#[derive(Debug, Clone)]
pub struct ScopeElement {
    pub target: String,
    pub description: String,
    pub category: String,
}

/// The resolved scope of a single program, immutable once returned.
#[derive(Debug, Clone, Default)]
pub struct ProgramData {
    pub url: String,
    pub in_scope: Vec<ScopeElement>,
}

impl ProgramData {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            in_scope: Vec::new(),
        }
    }
}
