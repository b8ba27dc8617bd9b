use std::fmt;

/// One of the two upstream documents kept in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// carrier flight data
    Primary,
    /// carrier updates
    Secondary,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Primary => "flightdata",
            Resource::Secondary => "updates",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
