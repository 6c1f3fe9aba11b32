// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Detector errors.

use alloc::string::String;
use core::fmt;

/// Reasons a detector could not start.
///
/// A missing native capability is not an error; it selects the fallback
/// backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObserveError {
    /// No document or viewport exists in this runtime.
    NoRuntime,
    /// The native observer refused the configuration.
    ObserverRejected(String),
    /// A viewport listener could not be registered.
    ListenerRejected(String),
}

impl fmt::Display for ObserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRuntime => f.write_str("no document or viewport is available"),
            Self::ObserverRejected(reason) => {
                write!(f, "intersection observer rejected its options: {reason}")
            }
            Self::ListenerRejected(reason) => {
                write!(f, "viewport listener could not be registered: {reason}")
            }
        }
    }
}

impl core::error::Error for ObserveError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_includes_rejection_reason() {
        let err = ObserveError::ObserverRejected("bad margin".to_string());
        assert_eq!(
            err.to_string(),
            "intersection observer rejected its options: bad margin"
        );
        assert_eq!(
            ObserveError::NoRuntime.to_string(),
            "no document or viewport is available"
        );
        assert_eq!(
            ObserveError::ListenerRejected("denied".to_string()).to_string(),
            "viewport listener could not be registered: denied"
        );
    }
}
