// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gzips every file in a directory individually, then removes the
//! original. Runs at the very end of a successful `Supervisor::run` when
//! `SupervisorConfig::gzipped_output` is set.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::path::Path;

pub fn gzip_dir(path: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with("gz") {
            continue;
        }

        let src_path = entry.path();
        let dest_path = path.join(format!("{name}.gz"));
        {
            let mut input = std::fs::File::open(&src_path)?;
            let output = std::fs::File::create(&dest_path)?;
            let mut encoder = GzEncoder::new(output, Compression::default());
            std::io::copy(&mut input, &mut encoder)?;
            encoder.finish()?;
        }
        std::fs::remove_file(&src_path)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "gzip_dir_tests.rs"]
mod tests;
