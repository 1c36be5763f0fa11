// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised while applying a [`crate::Mutation`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MutateError {
    /// An operation keyword has no registered implementation and the
    /// [`Modder`](crate::Modder) was constructed with `strict: true`.
    #[error("unsupported action {0:?}")]
    UnsupportedAction(String),

    /// An op that requires a list found something else at the target key.
    #[error("value at key {key:?} is not an array")]
    NotAnArray { key: String },

    /// An operand was missing a key the op requires (e.g. `dest` for
    /// `_file_move`).
    #[error("operand for key {0:?} is missing a required field")]
    MissingKey(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
