// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The run log (spec §3 "RunLogEntry", §7, persisted as `custodian.json`).
//!
//! "Why did this job stop" has a natural four-way shape (`max_errors`,
//! `max_errors_per_job`, `max_errors_per_handler`, `nonzero_return_code`),
//! but at most one of those is ever true for a given entry. The wire
//! format keeps all four as sibling boolean fields — other tooling reads
//! `custodian.json` — but internally this is one sum type, so the
//! supervisor can't construct a contradictory combination of them.

use serde::de::{Error as DeError, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::handler::HandlerId;
use crate::mutation::CorrectionRecord;
use crate::validator::ValidatorId;

/// Why a job's attempt loop stopped before producing a clean success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    MaxErrors,
    MaxErrorsPerJob,
    MaxErrorsPerHandler,
    NonzeroReturnCode,
}

/// One entry in the run log: one job's full correction history plus, if
/// the run ended because of this job, why (spec §3 "RunLogEntry").
#[derive(Debug, Clone)]
pub struct RunLogEntry {
    pub job: String,
    pub corrections: Vec<CorrectionRecord>,
    /// Set once a validator runs against this job's output.
    pub validator: Option<ValidatorId>,
    /// Set when termination is attributable to a specific handler hitting
    /// its per-handler cap.
    pub handler: Option<HandlerId>,
    pub termination: Option<TerminationReason>,
}

impl RunLogEntry {
    pub fn new(job: impl Into<String>) -> Self {
        Self {
            job: job.into(),
            corrections: Vec::new(),
            validator: None,
            handler: None,
            termination: None,
        }
    }
}

impl Serialize for RunLogEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("job", &self.job)?;
        map.serialize_entry("corrections", &self.corrections)?;
        if let Some(v) = &self.validator {
            map.serialize_entry("validator", v)?;
        }
        if let Some(v) = &self.handler {
            map.serialize_entry("handler", v)?;
        }
        match self.termination {
            Some(TerminationReason::MaxErrors) => map.serialize_entry("max_errors", &true)?,
            Some(TerminationReason::MaxErrorsPerJob) => {
                map.serialize_entry("max_errors_per_job", &true)?
            }
            Some(TerminationReason::MaxErrorsPerHandler) => {
                map.serialize_entry("max_errors_per_handler", &true)?
            }
            Some(TerminationReason::NonzeroReturnCode) => {
                map.serialize_entry("nonzero_return_code", &true)?
            }
            None => {}
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RunLogEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = RunLogEntry;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a RunLogEntry object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut job = None;
                let mut corrections = Vec::new();
                let mut validator = None;
                let mut handler = None;
                let mut termination = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "job" => job = Some(map.next_value()?),
                        "corrections" => corrections = map.next_value()?,
                        "validator" => validator = Some(map.next_value()?),
                        "handler" => handler = Some(map.next_value()?),
                        "max_errors" => {
                            if map.next_value::<bool>()? {
                                termination = Some(TerminationReason::MaxErrors);
                            }
                        }
                        "max_errors_per_job" => {
                            if map.next_value::<bool>()? {
                                termination = Some(TerminationReason::MaxErrorsPerJob);
                            }
                        }
                        "max_errors_per_handler" => {
                            if map.next_value::<bool>()? {
                                termination = Some(TerminationReason::MaxErrorsPerHandler);
                            }
                        }
                        "nonzero_return_code" => {
                            if map.next_value::<bool>()? {
                                termination = Some(TerminationReason::NonzeroReturnCode);
                            }
                        }
                        _ => {
                            let _ignore: serde::de::IgnoredAny = map.next_value()?;
                        }
                    }
                }

                Ok(RunLogEntry {
                    job: job.ok_or_else(|| DeError::missing_field("job"))?,
                    corrections,
                    validator,
                    handler,
                    termination,
                })
            }
        }

        deserializer.deserialize_map(EntryVisitor)
    }
}

#[cfg(test)]
#[path = "run_log_tests.rs"]
mod tests;