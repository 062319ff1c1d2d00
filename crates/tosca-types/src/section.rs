//! The fixed section schema of a group type definition.

use std::fmt;

/// A recognized top-level key of a group type definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    DerivedFrom,
    Version,
    Metadata,
    Description,
    Properties,
    Members,
    Interfaces,
    Capabilities,
    Requirements,
}

impl Section {
    /// Every recognized section, in schema order.
    pub const ALL: [Section; 9] = [
        Section::DerivedFrom,
        Section::Version,
        Section::Metadata,
        Section::Description,
        Section::Properties,
        Section::Members,
        Section::Interfaces,
        Section::Capabilities,
        Section::Requirements,
    ];

    /// The key as written in a definition.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DerivedFrom => "derived_from",
            Self::Version => "version",
            Self::Metadata => "metadata",
            Self::Description => "description",
            Self::Properties => "properties",
            Self::Members => "members",
            Self::Interfaces => "interfaces",
            Self::Capabilities => "capabilities",
            Self::Requirements => "requirements",
        }
    }

    /// Map a definition key to its section. `None` means the key is outside
    /// the schema.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == key)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
