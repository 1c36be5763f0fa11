// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::fs;

fn list_archive_entries(path: &Path) -> Vec<String> {
    let file = fs::File::open(path).unwrap();
    let decoder = GzDecoder::new(file);
    let mut archive = tar::Archive::new(decoder);
    archive
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn backup_single_file_creates_error_1_tar_gz() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("INCAR"), "data").unwrap();

    let archive = backup(&["INCAR".to_string()], "error", dir.path()).unwrap();
    assert_eq!(archive.file_name().unwrap(), "error.1.tar.gz");

    let entries = list_archive_entries(&archive);
    assert_eq!(entries, vec!["error.1/INCAR".to_string()]);
}

#[test]
fn backup_glob_matches_multiple_files_only() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("INCAR"), "a").unwrap();
    fs::write(dir.path().join("POSCAR"), "b").unwrap();
    fs::write(dir.path().join("garbage"), "c").unwrap();

    let archive = backup(&["*CAR".to_string()], "error", dir.path()).unwrap();
    let mut entries = list_archive_entries(&archive);
    entries.sort();
    assert_eq!(entries, vec!["error.1/INCAR".to_string(), "error.1/POSCAR".to_string()]);
}

#[test]
fn backup_increments_the_numbering() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("INCAR"), "data").unwrap();

    let first = backup(&["INCAR".to_string()], "error", dir.path()).unwrap();
    let second = backup(&["INCAR".to_string()], "error", dir.path()).unwrap();

    assert_eq!(first.file_name().unwrap(), "error.1.tar.gz");
    assert_eq!(second.file_name().unwrap(), "error.2.tar.gz");
}

#[test]
fn extract_tarball_restores_original_file() {
    let src = tempfile::tempdir().unwrap();
    fs::write(src.path().join("INCAR"), "contents").unwrap();
    let archive = backup(&["INCAR".to_string()], "error", src.path()).unwrap();

    let dest = tempfile::tempdir().unwrap();
    extract_tarball(&archive, dest.path()).unwrap();
    assert_eq!(
        fs::read_to_string(dest.path().join("error.1/INCAR")).unwrap(),
        "contents"
    );
}
