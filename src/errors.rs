//! Error handling for the org-mover crate.
use std::{error::Error as StdError, fmt};

/// Error type for the org-mover crate.
#[derive(Debug)]
pub struct OrgMoverError {
    /// Inner error.
    inner: Box<Inner>,
}

/// One of the network-facing steps of a repository transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStep {
    /// Mirror-clone from the source organization.
    Clone,
    /// Creation of the destination repository.
    Create,
    /// Mirror-push to the destination organization.
    Push,
}

impl fmt::Display for TransferStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferStep::Clone => write!(f, "clone"),
            TransferStep::Create => write!(f, "create"),
            TransferStep::Push => write!(f, "push"),
        }
    }
}

impl OrgMoverError {
    /// Create a new error.
    pub(crate) fn new(kind: OrgMoverErrorKind) -> Self {
        Self {
            inner: Box::new(Inner {
                kind,
                context: None,
                source: None,
            }),
        }
    }

    /// Attach a human-readable detail to the error.
    pub(crate) fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.inner.context = Some(text.into());
        self
    }

    /// Create a new error wrapping an underlying one.
    pub(crate) fn new_with_source<E>(text: &str, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            inner: Box::new(Inner {
                kind: OrgMoverErrorKind::Io,
                context: Some(text.to_string()),
                source: Some(Box::new(source)),
            }),
        }
    }

    /// Wrap a step error into a `Transfer` error carrying the last detail.
    pub(crate) fn transfer(step: TransferStep, source: OrgMoverError) -> Self {
        Self {
            inner: Box::new(Inner {
                kind: OrgMoverErrorKind::Transfer(step),
                context: None,
                source: Some(Box::new(source)),
            }),
        }
    }

    /// The transfer step this error failed at, if it is a transfer error.
    pub fn transfer_step(&self) -> Option<TransferStep> {
        match self.inner.kind {
            OrgMoverErrorKind::Transfer(step) => Some(step),
            _ => None,
        }
    }

    /// Whether this error aborts the whole run before any transfer.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.inner.kind,
            OrgMoverErrorKind::Access | OrgMoverErrorKind::Conflict
        )
    }
}

/// Type alias for a boxed error.
pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// Inner error type for the org-mover crate.
#[derive(Debug)]
struct Inner {
    /// Error kind.
    kind: OrgMoverErrorKind,

    /// Human-readable detail.
    context: Option<String>,

    /// Source error.
    source: Option<BoxError>,
}

/// Error kinds for the org-mover crate.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum OrgMoverErrorKind {
    /// The caller lacks admin visibility into an organization. Fatal.
    Access,

    /// The destination organization already contains source names. Fatal.
    Conflict,

    /// One repository's transfer failed after exhausting retries.
    Transfer(TransferStep),

    /// Error related to repository creation on the platform.
    RepoCreation,

    /// Error related to listing an organization's repositories.
    ListRepos,

    /// Error related to the progress ledger or run logs.
    Ledger,

    /// Error related to the configuration file.
    Config,

    /// Error related to console input.
    Input,

    /// Error related to the reqwest crate.
    Reqwest,

    /// Error related to serde.
    Serde,

    /// Error related to git2.
    Git2,

    /// Error related to the filesystem.
    Io,
}

impl fmt::Display for OrgMoverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.kind {
            OrgMoverErrorKind::Access => write!(f, "admin access denied")?,
            OrgMoverErrorKind::Conflict => write!(f, "conflicting repository names")?,
            OrgMoverErrorKind::Transfer(step) => write!(f, "transfer failed at {step}")?,
            kind => write!(f, "{kind:?}")?,
        }
        if let Some(context) = &self.inner.context {
            write!(f, ": {context}")?;
        }
        if let Some(source) = &self.inner.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl StdError for OrgMoverError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| &**e as _)
    }
}

impl From<reqwest::Error> for OrgMoverError {
    fn from(e: reqwest::Error) -> Self {
        Self {
            inner: Box::new(Inner {
                kind: OrgMoverErrorKind::Reqwest,
                context: None,
                source: Some(Box::new(e)),
            }),
        }
    }
}

impl From<serde_json::Error> for OrgMoverError {
    fn from(e: serde_json::Error) -> Self {
        Self {
            inner: Box::new(Inner {
                kind: OrgMoverErrorKind::Serde,
                context: None,
                source: Some(Box::new(e)),
            }),
        }
    }
}

impl From<toml::de::Error> for OrgMoverError {
    fn from(e: toml::de::Error) -> Self {
        Self {
            inner: Box::new(Inner {
                kind: OrgMoverErrorKind::Config,
                context: None,
                source: Some(Box::new(e)),
            }),
        }
    }
}

impl From<std::io::Error> for OrgMoverError {
    fn from(e: std::io::Error) -> Self {
        Self {
            inner: Box::new(Inner {
                kind: OrgMoverErrorKind::Io,
                context: None,
                source: Some(Box::new(e)),
            }),
        }
    }
}

impl From<git2::Error> for OrgMoverError {
    fn from(e: git2::Error) -> Self {
        Self {
            inner: Box::new(Inner {
                kind: OrgMoverErrorKind::Git2,
                context: None,
                source: Some(Box::new(e)),
            }),
        }
    }
}
