// Copyright 2025 the Loopguard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types reported by host collaborators.
//!
//! None of these ever reach the host through the [`Observer`](crate::Observer)
//! entry points; they are logged and the observer carries on.

use thiserror::Error;

/// A host command (subscription, watch, timer) could not be carried out.
#[derive(Debug, Error)]
pub enum HostError {
    /// The capability does not exist in this host.
    #[error("{0} is unavailable")]
    Unavailable(&'static str),
    /// The host refused the request.
    #[error("host rejected {op}: {reason}")]
    Rejected {
        /// Operation name.
        op: &'static str,
        /// Host supplied detail.
        reason: String,
    },
}

/// A playback command on the tracked element failed.
#[derive(Debug, Error)]
pub enum ActuationError {
    /// The element is no longer part of the page.
    #[error("element is detached")]
    Detached,
    /// The element refused the command.
    #[error("command rejected: {0}")]
    Rejected(String),
}
