/// Process exit status of a plugin run.
///
/// The first four follow the usual monitoring plugin convention. Failing to
/// reach the database and failing to make sense of a reachable database get
/// their own codes so that "db down" and "db up, status unusable" can be told
/// apart from a threshold breach.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, strum::IntoStaticStr)]
pub enum ExitStatus {
    #[strum(serialize = "OK")]
    Ok,
    #[strum(serialize = "WARNING")]
    Warning,
    #[strum(serialize = "CRITICAL")]
    Critical,
    #[strum(serialize = "UNKNOWN")]
    Unknown,
    #[strum(serialize = "CONNECTION FAILED")]
    ConnectionFailed,
    #[strum(serialize = "COLLECTION FAILED")]
    CollectionFailed,
}

impl ExitStatus {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Warning => 1,
            Self::Critical => 2,
            Self::Unknown => 3,
            Self::ConnectionFailed => 4,
            Self::CollectionFailed => 5,
        }
    }
}

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
