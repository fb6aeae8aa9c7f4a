//! Command implementations.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod pincode;

use std::io::{self, Write};

use futurelabs_storefront::AppError;
use futurelabs_storefront::loader::{DataSource, FallbackReason};
use serde::Serialize;
use thiserror::Error;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Storefront operation failed. The shopper has already been told.
    #[error("{0}")]
    App(#[from] AppError),

    /// Terminal I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Output could not be encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input ended before the command finished.
    #[error("input closed before {0} completed")]
    Aborted(&'static str),
}

/// Write one line to stdout.
pub(crate) fn say(line: &str) -> io::Result<()> {
    writeln!(io::stdout().lock(), "{line}")
}

/// Write a value to stdout as pretty JSON.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), CommandError> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Short label for where page data came from.
pub(crate) fn describe_source(source: &DataSource) -> String {
    match source {
        DataSource::Mock => "mock".to_string(),
        DataSource::Live => "live".to_string(),
        DataSource::Fallback(FallbackReason::Timeout(after)) => {
            format!("fallback (timed out after {after:?})")
        }
        DataSource::Fallback(FallbackReason::Request(reason)) => format!("fallback ({reason})"),
    }
}
