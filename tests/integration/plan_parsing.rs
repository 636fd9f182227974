//! Manifest loading and plan resolution.

use std::fs;

use eerestore::error::RestoreError;
use eerestore::plan::RestorePlan;
use eerestore::restore::{self, RestoreOptions};

use crate::common::fixtures::BackupFixture;
use crate::common::init_test_logging;

#[test]
fn manifest_written_by_fixture_loads_back_identically() {
    init_test_logging();
    let fixture = BackupFixture::new();
    let manifest = fixture.write_manifest();

    let loaded = RestorePlan::load(&manifest).unwrap();
    assert_eq!(loaded, fixture.plan);
}

#[test]
fn manifest_driven_restore_matches_default_plan() {
    init_test_logging();
    let fixture = BackupFixture::new();
    let manifest = fixture.write_manifest();

    let plan = RestorePlan::load(&manifest).unwrap();
    let report = restore::run(&plan, &RestoreOptions::default()).unwrap();

    assert!(report.summary.is_success());
    assert_eq!(
        fixture.read_dest("/storage/.emulationstation", "es_input.cfg"),
        "<inputList />\n"
    );
}

#[test]
fn malformed_manifest_is_a_parse_error() {
    init_test_logging();
    let fixture = BackupFixture::new();
    let manifest = fixture.root.path().join("broken.toml");
    fs::write(&manifest, "archive = [this is not toml").unwrap();

    let result = RestorePlan::load(&manifest);
    assert!(matches!(result, Err(RestoreError::ManifestParse(_))));
}

#[test]
fn manifest_without_steps_is_invalid() {
    init_test_logging();
    let fixture = BackupFixture::new();
    let manifest = fixture.root.path().join("empty.toml");
    fs::write(
        &manifest,
        "archive = \"/data/backup.zip\"\nworkdir = \"/data\"\n",
    )
    .unwrap();

    let result = RestorePlan::load(&manifest);
    assert!(matches!(result, Err(RestoreError::ManifestInvalid(_))));
}
