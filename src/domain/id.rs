use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of random characters following the type prefix.
const RANDOM_LEN: usize = 10;

/// The kind of record an identifier belongs to.
///
/// The kind determines the single-letter prefix of generated identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// A blood bank (`b…`)
    Bank,
    /// A donor (`d…`)
    Donor,
    /// A blood request (`r…`)
    Request,
}

impl IdKind {
    const fn prefix(self) -> char {
        match self {
            Self::Bank => 'b',
            Self::Donor => 'd',
            Self::Request => 'r',
        }
    }
}

/// An opaque record identifier.
///
/// Generated identifiers are short and random, but identifiers arriving
/// through import are kept verbatim, so no format is assumed when reading.
/// An empty identifier means "not yet assigned".
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Generate a fresh identifier for the given kind.
    #[must_use]
    pub fn generate(kind: IdKind) -> Self {
        let random = Uuid::new_v4().simple().to_string();
        Self(format!("{}{}", kind.prefix(), &random[..RANDOM_LEN]))
    }

    /// Generate an identifier for which `is_taken` returns `false`.
    pub(crate) fn generate_unique(kind: IdKind, is_taken: impl Fn(&Self) -> bool) -> Self {
        loop {
            let id = Self::generate(kind);
            if !is_taken(&id) {
                return id;
            }
            tracing::debug!("identifier collision on {id}, drawing again");
        }
    }

    /// Whether this identifier has yet to be assigned.
    #[must_use]
    pub fn is_unassigned(&self) -> bool {
        self.0.is_empty()
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Id {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, collections::HashSet};

    use super::*;

    #[test]
    fn generated_ids_carry_kind_prefix() {
        assert!(Id::generate(IdKind::Bank).as_str().starts_with('b'));
        assert!(Id::generate(IdKind::Donor).as_str().starts_with('d'));
        assert!(Id::generate(IdKind::Request).as_str().starts_with('r'));
        assert_eq!(Id::generate(IdKind::Bank).as_str().len(), RANDOM_LEN + 1);
    }

    #[test]
    fn generated_ids_do_not_repeat() {
        let ids: HashSet<_> = (0..1000).map(|_| Id::generate(IdKind::Donor)).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn generate_unique_redraws_on_collision() {
        let draws = Cell::new(0);
        let id = Id::generate_unique(IdKind::Request, |_| {
            draws.set(draws.get() + 1);
            draws.get() < 3
        });

        assert_eq!(draws.get(), 3);
        assert!(!id.is_unassigned());
    }

    #[test]
    fn default_is_unassigned() {
        assert!(Id::default().is_unassigned());
        assert!(!Id::from("b1").is_unassigned());
    }
}
