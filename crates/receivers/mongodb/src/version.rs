use std::cmp::Ordering;

pub const V2_6: ServerVersion = ServerVersion::new(2, 6, 0);
pub const V3_0: ServerVersion = ServerVersion::new(3, 0, 0);

/// Server version, reduced to a `(major, minor, patch)` triple.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ServerVersion(semver::Version);

impl ServerVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    /// Parses a loosely formatted version string such as `"2.6.11-pre"`.
    ///
    /// Every character that is neither a digit nor a period is dropped before
    /// splitting, so suffixes never fail the parse. Missing or unparseable
    /// components are zero.
    pub fn parse(version: &str) -> Self {
        let cleaned: String = version
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        let mut components = cleaned
            .split('.')
            .map(|component| component.parse::<u64>().unwrap_or(0));
        let major = components.next().unwrap_or(0);
        let minor = components.next().unwrap_or(0);
        let patch = components.next().unwrap_or(0);
        Self::new(major, minor, patch)
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    pub fn era(&self) -> SchemaEra {
        SchemaEra::classify(self)
    }
}

impl std::fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Version range within which the server status layout is stable.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, strum::IntoStaticStr)]
pub enum SchemaEra {
    /// Before 2.6: flat cursor counters, index counters.
    #[strum(serialize = "legacy")]
    Legacy,
    /// 2.6 up to 3.0: `metrics.cursor`, index counters, freelist storage.
    #[strum(serialize = "transitional")]
    Transitional,
    /// 3.0 and later: per-namespace lock acquisition counters.
    #[strum(serialize = "modern")]
    Modern,
}

impl SchemaEra {
    pub fn classify(version: &ServerVersion) -> Self {
        if *version < V2_6 {
            Self::Legacy
        } else if *version < V3_0 {
            Self::Transitional
        } else {
            Self::Modern
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}
