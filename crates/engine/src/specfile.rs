// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Spec Loader (spec §4.6): turns a structured, already-deserialized
//! job description into the merged job/handler/validator params and a
//! `SupervisorConfig`. It does not read or parse any file format itself —
//! the caller deserializes YAML/TOML/JSON/whatever into a value and hands
//! it here, which keeps this crate's own dependency on any one spec-file
//! syntax to none.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use custodian_core::SupervisorConfig;

/// One entry of the `jobs:` list: a collaborator identifier plus its
/// constructor params. The identifier is opaque to this crate — nothing
/// here resolves `jb`/`hdlr`/`vldr` strings to a concrete type, since
/// `Job`/`Handler`/`Validator` are compile-time trait objects, not
/// dynamically loaded classes.
#[derive(Debug, Clone, Deserialize)]
pub struct JobSpec {
    pub jb: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HandlerSpec {
    pub hdlr: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidatorSpec {
    pub vldr: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

/// The whole structured description (spec §4.6).
#[derive(Debug, Clone, Deserialize)]
pub struct SupervisorSpec {
    #[serde(default)]
    pub jobs: Vec<JobSpec>,
    #[serde(default)]
    pub jobs_common_params: Map<String, Value>,
    #[serde(default)]
    pub jobs_common_auto_params: Map<String, Value>,
    #[serde(default)]
    pub handlers: Vec<HandlerSpec>,
    #[serde(default)]
    pub validators: Vec<ValidatorSpec>,
    #[serde(default)]
    pub custodian_params: Map<String, Value>,
}

/// A job/handler/validator entry after `$VAR` expansion and common-param
/// merging, still identified by its opaque class string.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedEntry {
    pub class: String,
    pub params: Map<String, Value>,
}

/// The fully-resolved result of loading a [`SupervisorSpec`]: ready to
/// hand to whatever code maps `class` strings onto concrete
/// `Job`/`Handler`/`Validator` implementations and calls `Supervisor::new`.
#[derive(Debug, Clone)]
pub struct LoadedSpec {
    pub jobs: Vec<LoadedEntry>,
    pub handlers: Vec<LoadedEntry>,
    pub validators: Vec<LoadedEntry>,
    pub config: SupervisorConfig,
}

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("could not interpret spec description: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("invalid value for custodian parameter `{key}`: {message}")]
    BadParam { key: String, message: String },
}

/// Loads `source` into a [`LoadedSpec`] (spec §4.6). `source` may be any
/// serde `Serialize` value — a `toml::Value`, a `serde_json::Value`, or a
/// caller's own deserialized document type — since expansion runs over the
/// generic `serde_json::Value` tree rather than over Rust structs.
pub fn load<T: Serialize>(source: T) -> Result<LoadedSpec, SpecError> {
    let value = serde_json::to_value(source)?;
    let value = expand_env_value(value);
    let spec: SupervisorSpec = serde_json::from_value(value)?;

    let jobs = spec
        .jobs
        .into_iter()
        .map(|job| LoadedEntry {
            class: job.jb,
            params: merge_params(&spec.jobs_common_params, &spec.jobs_common_auto_params, job.params),
        })
        .collect();
    let handlers = spec
        .handlers
        .into_iter()
        .map(|handler| LoadedEntry {
            class: handler.hdlr,
            params: handler.params,
        })
        .collect();
    let validators = spec
        .validators
        .into_iter()
        .map(|validator| LoadedEntry {
            class: validator.vldr,
            params: validator.params,
        })
        .collect();
    let config = supervisor_config_from_params(&spec.custodian_params)?;

    Ok(LoadedSpec {
        jobs,
        handlers,
        validators,
        config,
    })
}

/// Per-job params win over `jobs_common_params`, which wins over
/// `jobs_common_auto_params` — the common blocks supply defaults a job
/// can still override, and the "auto" block is filled in first so an
/// explicit common param always beats an automatic one.
fn merge_params(
    common: &Map<String, Value>,
    auto: &Map<String, Value>,
    own: Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = Map::new();
    for (key, value) in auto {
        merged.insert(key.clone(), value.clone());
    }
    for (key, value) in common {
        merged.insert(key.clone(), value.clone());
    }
    for (key, value) in own {
        merged.insert(key, value);
    }
    merged
}

/// Recursively expands `$NAME`-shaped strings and object keys against the
/// environment (spec §4.6: "Keys in params whose name begins with `$`...";
/// the original loader this is modeled on expands matching *values* the
/// same way, e.g. a `$PBS_NODEFILE` element inside a command-line array,
/// so both are handled here). A `$NAME` with no such environment variable
/// set is left untouched rather than erroring, since a missing override is
/// not by itself a malformed spec.
fn expand_env_value(value: Value) -> Value {
    match value {
        Value::String(s) => match env_name(&s).and_then(|name| std::env::var(name).ok()) {
            Some(resolved) => Value::String(resolved),
            None => Value::String(s),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(expand_env_value).collect()),
        Value::Object(map) => Value::Object(expand_env_map(map)),
        other => other,
    }
}

fn expand_env_map(map: Map<String, Value>) -> Map<String, Value> {
    let mut expanded = Map::with_capacity(map.len());
    for (key, value) in map {
        let value = expand_env_value(value);
        let key = match env_name(&key) {
            Some(name) => name.to_string(),
            None => key,
        };
        expanded.insert(key, value);
    }
    expanded
}

/// Returns the environment variable name if `s` is a `$`-prefixed
/// identifier, e.g. `"$PBS_NODEFILE"` -> `Some("PBS_NODEFILE")`.
fn env_name(s: &str) -> Option<&str> {
    let name = s.strip_prefix('$')?;
    (!name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')).then_some(name)
}

fn supervisor_config_from_params(params: &Map<String, Value>) -> Result<SupervisorConfig, SpecError> {
    let mut config = SupervisorConfig::default();

    if let Some(value) = params.get("max_errors") {
        config.max_errors = as_u32("max_errors", value)?;
    }
    if let Some(value) = params.get("max_errors_per_job") {
        config.max_errors_per_job = Some(as_u32("max_errors_per_job", value)?);
    }
    if let Some(value) = params.get("max_errors_per_handler") {
        config.max_errors_per_handler = Some(as_u32("max_errors_per_handler", value)?);
    }
    if let Some(value) = params.get("polling_time_step") {
        config.polling_time_step = Duration::from_secs(as_u32("polling_time_step", value)? as u64);
    }
    if let Some(value) = params.get("monitor_freq") {
        config.monitor_freq = as_u32("monitor_freq", value)?;
    }
    if let Some(value) = params.get("skip_over_errors") {
        config.skip_over_errors = as_bool("skip_over_errors", value)?;
    }
    if let Some(value) = params.get("terminate_on_nonzero_returncode") {
        config.terminate_on_nonzero_returncode = as_bool("terminate_on_nonzero_returncode", value)?;
    }
    if let Some(value) = params.get("gzipped_output") {
        config.gzipped_output = as_bool("gzipped_output", value)?;
    }
    if let Some(value) = params.get("checkpoint") {
        config.checkpoint = as_bool("checkpoint", value)?;
    }
    if let Some(value) = params.get("scratch_dir") {
        config.scratch_dir = Some(PathBuf::from(as_str("scratch_dir", value)?));
    }

    Ok(config)
}

fn as_u32(key: &str, value: &Value) -> Result<u32, SpecError> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| SpecError::BadParam {
            key: key.to_string(),
            message: format!("expected a non-negative integer, got {value}"),
        })
}

fn as_bool(key: &str, value: &Value) -> Result<bool, SpecError> {
    value.as_bool().ok_or_else(|| SpecError::BadParam {
        key: key.to_string(),
        message: format!("expected a boolean, got {value}"),
    })
}

fn as_str<'a>(key: &str, value: &'a Value) -> Result<&'a str, SpecError> {
    value.as_str().ok_or_else(|| SpecError::BadParam {
        key: key.to_string(),
        message: format!("expected a string, got {value}"),
    })
}

#[cfg(test)]
#[path = "specfile_tests.rs"]
mod tests;
