// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]

//! The mutation sub-language (spec §4.1): applies an ansible-style ops-map
//! to an in-memory JSON mapping or to files on disk.

pub mod dict;
pub mod error;
pub mod file;
pub mod modder;
pub mod path;

pub use custodian_core::{CorrectionRecord, Mutation, OpMap};
pub use error::MutateError;
pub use modder::{ActionClass, Modder};
