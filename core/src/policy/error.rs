/// Inconsistencies found while building a policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("'{0}' is a forbidden call target and cannot also be allowed")]
    ForbiddenNameAllowed(String),
    #[error("'{0}' is reserved for the access guards")]
    ReservedNameAllowed(String),
    #[error("'{0}' starts with '_' and cannot be allowed")]
    PrivateName(String),
    #[error("library '{0}' would shadow the builtin of the same name")]
    LibraryShadowsBuiltin(String),
    #[error("builtin '{0}' has no implementation")]
    UnknownBuiltin(String),
    #[error("library '{0}' has no implementation")]
    UnknownLibrary(String),
    #[error("library member '{library}.{member}' has no implementation")]
    UnknownLibraryMember { library: String, member: String },
}
