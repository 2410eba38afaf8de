#![deny(unused_must_use)]
#![warn(missing_docs)]

//! Defines the error type used by safetext.
//!
//! The text pipeline itself never fails. Errors only come from loading configuration or drop
//! tables, and from panics inside user-supplied collaborators when they are caught with
//! [`catch_panic`]. Normally, the API exposed in the `safetext` crate should be enough.

use backtrace::Backtrace;
use std::any::Any;
use std::borrow::Cow;
use std::error::{Error as StdError};
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use thiserror::*;

pub use std::result::{Result as StdResult};

/// A wrapper around a [`std::error::Error`].
///
/// This is used to help ensure that all errors returned from `safetext` have a proper cause
/// attached.
#[derive(Debug)]
pub struct LibError(Box<dyn StdError + Send + 'static>);
impl LibError {
    /// Borrows the wrapped error.
    pub fn as_error(&self) -> &(dyn StdError + Send + 'static) {
        &*self.0
    }
}
impl <T: StdError + Send + 'static> From<T> for LibError {
    #[inline(never)] #[cold]
    fn from(t: T) -> Self {
        LibError(Box::new(t))
    }
}

/// Represents the kind of error that occurred.
#[derive(Error, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An internal error has occurred.
    ///
    /// This generally indicates a bug in the library.
    #[error("Internal error: {0}")]
    InternalError(&'static str),
    /// A panic occurred inside a text collaborator.
    ///
    /// This is only returned by the `try_` variants of the pipeline operations. The other
    /// variants let the panic propagate to the caller.
    #[error("{0}")]
    Panicked(Cow<'static, str>),

    /// A drop table could not be parsed, or contained an invalid entry.
    #[error("Invalid drop table: {0}")]
    InvalidDropTable(Cow<'static, str>),
    /// Pipeline options could not be parsed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

struct ErrorData {
    kind: ErrorKind,
    backtrace: Option<Backtrace>,
    cause: Option<LibError>,
}

/// An error type used throughout the library.
pub struct Error(Box<ErrorData>);
impl Error {
    /// Creates a new error with no backtrace or cause.
    #[inline(never)] #[cold]
    pub fn new(kind: ErrorKind) -> Self {
        Error(Box::new(ErrorData {
            kind, backtrace: None, cause: None,
        }))
    }

    /// Creates a new error with the given cause.
    #[inline(never)] #[cold]
    pub fn new_with_cause(kind: ErrorKind, cause: impl Into<LibError>) -> Self {
        Error::new(kind).with_cause(cause)
    }

    /// Creates a new error with a backtrace.
    #[inline(never)] #[cold]
    pub fn new_with_backtrace(kind: ErrorKind) -> Self {
        Error::new(kind).with_backtrace()
    }

    /// Attaches a cause to this error.
    #[inline(never)] #[cold]
    pub fn with_cause(mut self, cause: impl Into<LibError>) -> Self {
        self.0.cause = Some(cause.into());
        self
    }

    /// Attaches a backtrace to this error.
    #[inline(never)] #[cold]
    pub fn with_backtrace(mut self) -> Self {
        if self.backtrace().is_none() {
            self.0.backtrace = Some(Backtrace::new());
        }
        self
    }

    #[inline(never)] #[cold]
    fn wrap_panic(panic: Box<dyn Any + Send + 'static>) -> Error {
        let panic: Cow<'static, str> = if let Some(s) = panic.downcast_ref::<&'static str>() {
            (*s).into()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone().into()
        } else {
            "<non-string panic info>".into()
        };
        Error::new(ErrorKind::Panicked(panic))
    }

    /// Returns the type of error contained in this object.
    pub fn error_kind(&self) -> &ErrorKind {
        &self.0.kind
    }

    /// Returns the backtrace, if one was recorded.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.0.backtrace.as_ref()
    }

    /// Returns `true` if this error was likely due to a bug in either user code or safetext.
    pub fn is_error(&self) -> bool {
        match self.error_kind() {
            ErrorKind::InternalError(_) | ErrorKind::Panicked(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this error was caused by malformed configuration or drop table data.
    pub fn is_config(&self) -> bool {
        match self.error_kind() {
            ErrorKind::InvalidDropTable(_) | ErrorKind::InvalidConfig(_) => true,
            _ => false,
        }
    }
}
impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self.0.cause.as_ref() {
            Some(x) => Some(x.as_error()),
            None => None,
        }
    }
}
impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Error")
            .field(&self.0.kind)
            .field(&self.0.cause)
            .finish()
    }
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.kind, f)?;
        if let Some(cause) = &self.0.cause {
            f.write_str(": ")?;
            fmt::Display::fmt(cause.as_error(), f)?;
        }
        Ok(())
    }
}

/// The result type used throughout the library.
pub type Result<T> = StdResult<T, Error>;

/// Helpers for converting [`LibError`]s into [`Error`]s
pub trait ErrorExt<T>: Sized {
    /// Converts this into an safetext error given an error type.
    fn context(self, kind: ErrorKind) -> Result<T>;

    /// Creates an error indicating an internal error.
    fn internal_err(self, text: &'static str) -> Result<T> {
        self.context(ErrorKind::InternalError(text))
    }
    /// Creates an error indicating malformed configuration.
    fn invalid_config(self, text: &'static str) -> Result<T> {
        self.context(ErrorKind::InvalidConfig(text))
    }
    /// Creates an error indicating a malformed drop table.
    fn invalid_drop_table(self, text: &'static str) -> Result<T> {
        self.context(ErrorKind::InvalidDropTable(text.into()))
    }
}
impl <T> ErrorExt<T> for Option<T> {
    #[inline(always)]
    fn context(self, kind: ErrorKind) -> Result<T> {
        match self {
            Some(x) => Ok(x),
            None => Err(Error::new_with_backtrace(kind)),
        }
    }
}
impl <T, E: Into<LibError>> ErrorExt<T> for StdResult<T, E> {
    #[inline(always)]
    fn context(self, kind: ErrorKind) -> Result<T> {
        match self {
            Ok(x) => Ok(x),
            Err(e) => Err(Error::new_with_cause(kind, e.into()).with_backtrace()),
        }
    }
}

/// Catches panics and wraps them in an [`Error`].
///
/// This is exposed as an non-inherent method to avoid namespace pollution.
pub fn catch_panic<T>(func: impl FnOnce() -> Result<T>) -> Result<T> {
    match catch_unwind(AssertUnwindSafe(func)) {
        Ok(r) => r,
        Err(e) => Err(Error::wrap_panic(e)),
    }
}

/// A macro to help with creating [`ErrorKind`]s.
///
/// # Examples
///
/// ```rust
/// # use safetext_errors::*;
/// assert_eq!(error_kind!("Internal error."), ErrorKind::InternalError("Internal error."));
/// assert_eq!(error_kind!(InvalidConfig, "test"), ErrorKind::InvalidConfig("test"));
/// ```
#[macro_export]
macro_rules! error_kind {
    ($error:literal $(,)?) => {
        $crate::ErrorKind::InternalError($error)
    };
    ($variant:ident, $($body:expr),* $(,)?) => {
        $crate::ErrorKind::$variant($($body,)*)
    };
}

/// Returns an error, using the same syntax as [`error_kind!`].
#[macro_export]
macro_rules! bail {
    ($($tt:tt)*) => {
        return Err($crate::Error::new_with_backtrace($crate::error_kind!($($tt)*)))
    }
}

/// Checks a condition then returns an error, using the same syntax as [`error_kind!`].
#[macro_export]
macro_rules! ensure {
    ($check:expr, $($tt:tt)*) => {
        if !$check {
            $crate::bail!($($tt)*);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_version(v: u32) -> Result<u32> {
        ensure!(v > 0, InvalidDropTable, "version must be positive".into());
        Ok(v)
    }

    #[test]
    fn ensure_returns_kind() {
        assert_eq!(check_version(3).unwrap(), 3);
        let err = check_version(0).unwrap_err();
        assert_eq!(err.error_kind(), &ErrorKind::InvalidDropTable("version must be positive".into()));
        assert!(err.is_config());
        assert!(!err.is_error());
        assert!(err.backtrace().is_some());
    }

    #[test]
    fn internal_errors_are_bugs() {
        let err = None::<()>.internal_err("missing value").unwrap_err();
        assert_eq!(err.error_kind(), &error_kind!("missing value"));
        assert!(err.is_error());
        assert!(!err.is_config());
    }

    #[test]
    fn context_keeps_cause() {
        let parsed: StdResult<u32, _> = "abc".parse::<u32>();
        let err = parsed.invalid_config("not a number").unwrap_err();
        assert!(err.is_config());
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Invalid configuration: not a number: "));
    }

    #[test]
    fn catch_panic_wraps_message() {
        let res: Result<()> = catch_panic(|| panic!("collaborator exploded"));
        let err = res.unwrap_err();
        assert_eq!(err.error_kind(), &ErrorKind::Panicked("collaborator exploded".into()));
    }
}
