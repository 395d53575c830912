//! Error kinds raised at the boundary of the writer and reflection tree.
//!
//! Encoding never partially emits and then fails silently: a failure before
//! `finish` leaves the writer in a defined-but-unusable state and the caller
//! must discard it via `reset`. Resolution errors abort the containing
//! `resolve_all` (first error wins).

/// Errors produced by the writer and reflection tree.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A field was constructed with a negative or non-integer id.
    #[error("field `{name}` has an invalid id: {id}")]
    InvalidFieldId { name: String, id: i64 },

    /// A reflection object was constructed with an invalid type/kind.
    #[error("`{name}` has an invalid type: {reason}")]
    InvalidType { name: String, reason: &'static str },

    /// A field's `rule` is not one of required/optional/repeated.
    #[error("field `{name}` has an invalid rule")]
    InvalidRule { name: String },

    /// Adding a child under a name that collides with an existing,
    /// non-upgradable child.
    #[error("duplicate name `{name}` in namespace `{parent}`")]
    NameConflict { parent: String, name: String },

    /// `Field::resolve` could not find its declared type.
    #[error("unresolvable field type `{type_name}` for field `{field}`")]
    Unresolvable { field: String, type_name: String },

    /// A namespace-level field was added without an `extend` path.
    #[error("field `{field}` has no parent message and carries no extend path")]
    RootlessExtension { field: String },

    /// A `BufferWriter` feature requires a platform primitive that is
    /// unavailable.
    #[error("unsupported environment: {0}")]
    UnsupportedEnvironment(&'static str),

    /// A defensive bounds check inside the writer's internals failed; this
    /// should be unreachable given a correct `expand`, but is surfaced
    /// rather than silently truncating.
    #[error("range error: needed {need} bytes, had {have}")]
    RangeError { need: usize, have: usize },

    /// A JSON object did not match any reflection kind's `testJSON`
    /// classifier.
    #[error("`{name}` does not match any known JSON schema shape")]
    InvalidJsonShape { name: String },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_type(name: impl Into<String>, reason: &'static str) -> Self {
        Error::InvalidType {
            name: name.into(),
            reason,
        }
    }
}

