//! Namespaced identifiers of items, blocks and enchantments.

use std::str::FromStr;
use std::fmt;

use arcstr::ArcStr;


/// The namespace used when an identifier is parsed without one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";


/// A namespaced identifier such as `minecraft:wool`. Both parts are reference counted
/// so cloning an identifier is cheap.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    namespace: ArcStr,
    path: ArcStr,
}

impl Identifier {

    /// Identifier of air, used by empty item stacks.
    pub const AIR: Self = Self {
        namespace: arcstr::literal!("minecraft"),
        path: arcstr::literal!("air"),
    };

    /// Create a new identifier after checking that both parts are valid.
    pub fn new(namespace: &str, path: &str) -> Result<Self, IdentifierError> {

        if namespace.is_empty() {
            return Err(IdentifierError::EmptyNamespace);
        } else if path.is_empty() {
            return Err(IdentifierError::EmptyPath);
        }

        if let Some(c) = namespace.chars().find(|&c| !is_namespace_char(c)) {
            return Err(IdentifierError::IllegalNamespaceChar(c));
        }

        if let Some(c) = path.chars().find(|&c| !is_path_char(c)) {
            return Err(IdentifierError::IllegalPathChar(c));
        }

        Ok(Self {
            namespace: ArcStr::from(namespace),
            path: ArcStr::from(path),
        })

    }

    /// Create an identifier in the default namespace. The path is not checked, this is
    /// intended for identifiers written in static tables.
    pub fn minecraft(path: &str) -> Self {
        Self {
            namespace: arcstr::literal!("minecraft"),
            path: ArcStr::from(path),
        }
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

}

impl FromStr for Identifier {

    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((namespace, path)) => Self::new(namespace, path),
            None => Self::new(DEFAULT_NAMESPACE, s),
        }
    }

}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}


#[inline]
fn is_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.')
}

#[inline]
fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}


/// Error returned when parsing an invalid identifier.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Empty identifier namespace.")]
    EmptyNamespace,
    #[error("Empty identifier path.")]
    EmptyPath,
    #[error("Illegal character {0:?} in identifier namespace.")]
    IllegalNamespaceChar(char),
    #[error("Illegal character {0:?} in identifier path.")]
    IllegalPathChar(char),
}
