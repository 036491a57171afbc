use crate::backup::result_error::{Categorize, WithDebugObjectAndFnName, WithMsg};
use derive_more::Display;
use std::fmt::Debug;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    #[error(transparent)]
    ValidationError(#[from] validator::ValidationErrors),
    #[error(transparent)]
    SerdeYml(#[from] serde_yml::Error),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error(transparent)]
    StripPrefix(#[from] std::path::StripPrefixError),
    #[error("Invalid INI file: {0}")]
    Ini(String),
    #[error("Configuration error:\n{}", indent::indent_all_with("  ", .0.to_string()))]
    Configuration(Box<Error>),
    #[error("Path '{}' does not exist or is invalid", path.display())]
    SourceUnreadable { path: PathBuf },
    #[error("Cannot create or access destination {:?}:\n{}", path, indent::indent_all_with("  ", error.to_string()))]
    DestinationAccess { path: PathBuf, error: Box<Error> },
    #[error("{} {:?}:\n{}", archive_write_headline(error), path, indent::indent_all_with("  ", error.to_string()))]
    ArchiveWrite { path: PathBuf, error: Box<Error> },
    #[error("Unexpected error:\n{}", indent::indent_all_with("  ", .0.to_string()))]
    Unexpected(Box<Error>),
    #[error("{}:\n{}", msg, indent::indent_all_with("  ", error.to_string()))]
    WithMsg { msg: String, error: Box<Error> },
    #[error("{:?} {} failed:\n{}", obj_debug, fn_name, indent::indent_all_with("  ", error.to_string()))]
    WithDebugObjAndFnName {
        error: Box<Error>,
        obj_debug: Box<dyn Debug + Send>,
        fn_name: String,
    },
}

/// Failure categories reported to the operator.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("configuration error")]
    Configuration,
    #[display("unreadable source")]
    SourceUnreadable,
    #[display("destination access error")]
    DestinationAccess,
    #[display("archive write error")]
    ArchiveWrite,
    #[display("unexpected error")]
    Unexpected,
}

fn archive_write_headline(error: &Error) -> &'static str {
    if error.is_permission_denied() {
        "Permission denied while writing archive"
    } else {
        "Error creating ZIP file"
    }
}

impl<S: Into<String>, O: Debug + Send + 'static> WithDebugObjectAndFnName<S, O> for Error {
    fn with_debug_object_and_fn_name(self, obj: O, fn_name: S) -> Self {
        Error::WithDebugObjAndFnName {
            error: Box::new(self),
            obj_debug: Box::new(obj),
            fn_name: fn_name.into(),
        }
    }
}

impl<S: Into<String>> WithMsg<S> for Error {
    fn with_msg(self, msg: S) -> Self {
        Self::WithMsg {
            msg: msg.into(),
            error: Box::new(self),
        }
    }
}

impl Categorize for Error {
    fn into_configuration(self) -> Self {
        match self.kind() {
            ErrorKind::Configuration => self,
            _ => Error::Configuration(Box::new(self)),
        }
    }

    fn into_destination_access<P: Into<PathBuf>>(self, path: P) -> Self {
        match self.kind() {
            ErrorKind::DestinationAccess => self,
            _ => Error::DestinationAccess {
                path: path.into(),
                error: Box::new(self),
            },
        }
    }

    fn into_archive_write<P: Into<PathBuf>>(self, path: P) -> Self {
        match self.kind() {
            ErrorKind::ArchiveWrite => self,
            _ => Error::ArchiveWrite {
                path: path.into(),
                error: Box::new(self),
            },
        }
    }
}

impl Error {
    pub fn unexpected<E: Into<Error>>(error: E) -> Self {
        Error::Unexpected(Box::new(error.into()))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::SourceUnreadable { .. } => ErrorKind::SourceUnreadable,
            Error::DestinationAccess { .. } => ErrorKind::DestinationAccess,
            Error::ArchiveWrite { .. } => ErrorKind::ArchiveWrite,
            Error::WithMsg { error, .. } | Error::WithDebugObjAndFnName { error, .. } => {
                error.kind()
            }
            _ => ErrorKind::Unexpected,
        }
    }

    /// Whether a permission failure sits anywhere in the cause chain.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Error::Io(e) => e.kind() == std::io::ErrorKind::PermissionDenied,
            Error::Zip(zip::result::ZipError::Io(e)) => {
                e.kind() == std::io::ErrorKind::PermissionDenied
            }
            Error::Configuration(error)
            | Error::Unexpected(error)
            | Error::DestinationAccess { error, .. }
            | Error::ArchiveWrite { error, .. }
            | Error::WithMsg { error, .. }
            | Error::WithDebugObjAndFnName { error, .. } => error.is_permission_denied(),
            _ => false,
        }
    }
}
