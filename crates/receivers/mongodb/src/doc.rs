use mongodb::bson::{self, Bson};

#[derive(Copy, Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum BsonKey<'a> {
    Key(&'a str),
    Index(usize),
}

impl<'a> std::fmt::Display for BsonKey<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key(key) => std::fmt::Display::fmt(key, f),
            Self::Index(idx) => std::fmt::Display::fmt(idx, f),
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum OwnedBsonKey {
    Key(String),
    Index(usize),
}

impl std::fmt::Display for OwnedBsonKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key(key) => std::fmt::Display::fmt(key, f),
            Self::Index(idx) => std::fmt::Display::fmt(idx, f),
        }
    }
}

impl<'a> BsonKey<'a> {
    fn to_owned_key(self) -> OwnedBsonKey {
        match self {
            Self::Index(idx) => OwnedBsonKey::Index(idx),
            Self::Key(key) => OwnedBsonKey::Key(key.to_string()),
        }
    }
}

impl<'a> From<usize> for BsonKey<'a> {
    fn from(value: usize) -> Self {
        BsonKey::Index(value)
    }
}

impl<'a> From<&'a str> for BsonKey<'a> {
    fn from(value: &'a str) -> Self {
        BsonKey::Key(value)
    }
}

pub fn get<'b>(value: &'b Bson, key: BsonKey<'_>) -> Option<&'b Bson> {
    match (value, key) {
        (Bson::Array(arr), BsonKey::Index(idx)) => arr.get(idx),
        (Bson::Document(doc), BsonKey::Key(key)) => doc.get(key),
        _ => None,
    }
}

pub trait BsonValue {
    fn get_str(&self) -> Result<&str, InvalidTypeError>;
    fn get_f64(&self) -> Result<f64, InvalidTypeError>;
}

impl BsonValue for Bson {
    fn get_str(&self) -> Result<&str, InvalidTypeError> {
        self.as_str().ok_or_else(|| InvalidTypeError {
            expected_type: "string",
            value: self.clone(),
        })
    }

    fn get_f64(&self) -> Result<f64, InvalidTypeError> {
        match self {
            Bson::Double(v) => Ok(*v),
            Bson::Int64(v) => Ok(*v as f64),
            Bson::Int32(v) => Ok((*v).into()),
            _ => Err(InvalidTypeError {
                expected_type: "number",
                value: self.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedPath(Vec<OwnedBsonKey>);

impl std::fmt::Display for OwnedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self.0.len();
        for (idx, key) in self.0.iter().enumerate() {
            write!(f, "{}", key)?;
            if idx + 1 < len {
                write!(f, ".")?;
            }
        }
        Ok(())
    }
}

impl<'a> FromIterator<&'a BsonKey<'a>> for OwnedPath {
    fn from_iter<T: IntoIterator<Item = &'a BsonKey<'a>>>(iter: T) -> Self {
        Self(iter.into_iter().map(|k| k.to_owned_key()).collect())
    }
}

impl<'a> FromIterator<BsonKey<'a>> for OwnedPath {
    fn from_iter<T: IntoIterator<Item = BsonKey<'a>>>(iter: T) -> Self {
        Self(iter.into_iter().map(BsonKey::to_owned_key).collect())
    }
}

#[derive(Debug)]
pub struct Match {
    pub path: OwnedPath,
    pub value: Bson,
}

#[derive(thiserror::Error, Debug)]
#[error("invalid type: expected {expected_type}, found {value:?}")]
pub struct InvalidTypeError {
    pub expected_type: &'static str,
    pub value: Bson,
}

#[derive(thiserror::Error, Debug)]
pub struct Error {
    pub path: OwnedPath,
    #[source]
    pub source: QueryError,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.path.to_string(), self.source)
    }
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self.source, QueryError::NotFound { .. })
    }

    /// The deepest value that could still be resolved along the path.
    pub fn partial_match(&self) -> Option<&Match> {
        match &self.source {
            QueryError::NotFound { partial_match } => partial_match.as_ref(),
            QueryError::InvalidType(_) => None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum QueryError {
    #[error("not found")]
    NotFound { partial_match: Option<Match> },
    #[error(transparent)]
    InvalidType(InvalidTypeError),
}

pub fn get_path<'b>(document: &'b Bson, path: &[BsonKey<'_>]) -> Result<&'b Bson, Error> {
    let mut value: &Bson = document;
    for (idx, key) in path.iter().copied().enumerate() {
        value = get(value, key).ok_or_else(|| Error {
            path: OwnedPath::from_iter(path.iter()),
            source: QueryError::NotFound {
                partial_match: Some(Match {
                    path: OwnedPath::from_iter(path[..idx].iter()),
                    value: value.clone(),
                }),
            },
        })?;
    }
    Ok(value)
}

/// Resolves a path of document keys, as used by the static field tables.
///
/// Unlike [`get_path`], a miss carries no partial match: most fields of a
/// status document are optional, so misses are frequent and expected.
pub fn lookup<'b>(document: &'b Bson, path: &[&str]) -> Result<&'b Bson, Error> {
    let mut value: &Bson = document;
    for key in path.iter().copied() {
        value = get(value, BsonKey::Key(key)).ok_or_else(|| Error {
            path: path.iter().copied().map(BsonKey::Key).collect(),
            source: QueryError::NotFound {
                partial_match: None,
            },
        })?;
    }
    Ok(value)
}

/// Whether every key of `path` resolves, regardless of the value it leads to.
pub fn contains_path(document: &Bson, path: &[&str]) -> bool {
    lookup(document, path).is_ok()
}

/// Replaces nested documents and arrays below `depth` with a placeholder,
/// to keep trace output of large status documents readable.
pub fn omit_values(mut value: Bson, depth: usize) -> Bson {
    omit_values_visitor(&mut value, depth);
    value
}

fn omit_values_visitor(value: &mut Bson, depth: usize) {
    match value {
        Bson::Document(value) => {
            if depth == 0 {
                *value = bson::doc! {"omitted": true};
            } else {
                for (_, v) in value.iter_mut() {
                    omit_values_visitor(v, depth - 1);
                }
            }
        }
        Bson::Array(value) => {
            if depth == 0 {
                *value = bson::Array::from_iter([Bson::String("omitted".to_string())]);
            } else {
                for v in value.iter_mut() {
                    omit_values_visitor(v, depth - 1);
                }
            }
        }
        _ => {
            // keep
        }
    };
}

#[macro_export]
macro_rules! path {
    ( $( $x:expr ),* ) => {
        {
            let mut path: Vec<$crate::doc::BsonKey> = Vec::new();
            $(
                let key = $crate::doc::BsonKey::from($x);
                path.push(key);
            )*
            path
        }
    }
}

#[macro_export]
macro_rules! get_str {
    ( $doc:expr, $( $x:expr ),* ) => {{
        let path = $crate::path!($($x),*);
        $crate::doc::get_path($doc, path.as_slice()).and_then(|v|
            $crate::doc::BsonValue::get_str(v).map_err(|err| {
                $crate::doc::Error {
                    path: $crate::doc::OwnedPath::from_iter(path.iter()),
                    source: $crate::doc::QueryError::InvalidType(err),
                }
        }))
    }};
}
