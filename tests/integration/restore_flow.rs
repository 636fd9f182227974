//! End-to-end restore behavior against a temporary filesystem root.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use eerestore::error::RestoreError;
use eerestore::restore::{self, RestoreOptions};

use crate::common::fixtures::{BackupFixture, ARCHIVE_ENTRIES};
use crate::common::init_test_logging;

/// The (destination, file) targets the default plan populates from the
/// standard archive.
const EXPECTED_TARGETS: &[(&str, &str)] = &[
    ("/storage/joypads", "joy_p1.cfg"),
    ("/storage/joypads", "joy_p2.cfg"),
    ("/tmp/joypads", "joy_p1.cfg"),
    ("/tmp/joypads", "joy_p2.cfg"),
    ("/storage/.emulationstation", "es_input.cfg"),
    ("/storage/.config/emulationstation", "es_systems.cfg"),
    ("/storage/.config/emulationstation", "es_settings.cfg"),
    ("/storage/.config/retroarch", "retroarch.cfg"),
    ("/storage/.config/emuelec/configs/advmame", "advmame.rc"),
];

fn archive_content(name: &str) -> &'static str {
    ARCHIVE_ENTRIES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
        .expect("unknown archive entry")
}

/// Snapshot every expected destination file's content.
fn destination_snapshot(fixture: &BackupFixture) -> BTreeMap<PathBuf, String> {
    EXPECTED_TARGETS
        .iter()
        .map(|(dest, file)| {
            let path = fixture.dest_dir(dest).join(file);
            let content = fs::read_to_string(&path).unwrap_or_default();
            (path, content)
        })
        .collect()
}

#[test]
fn restore_populates_every_destination() {
    init_test_logging();
    let fixture = BackupFixture::new();

    let report = restore::run(&fixture.plan, &RestoreOptions::default()).unwrap();

    assert!(report.summary.is_success());
    assert_eq!(report.summary.total, 7);
    assert_eq!(report.summary.files_copied, EXPECTED_TARGETS.len());
    assert_eq!(report.expanded, ARCHIVE_ENTRIES.len());

    for (dest, file) in EXPECTED_TARGETS {
        assert_eq!(
            fixture.read_dest(dest, file),
            archive_content(file),
            "{dest}/{file} content mismatch"
        );
    }
}

#[test]
fn restore_is_idempotent() {
    init_test_logging();
    let fixture = BackupFixture::new();
    let options = RestoreOptions::default();

    restore::run(&fixture.plan, &options).unwrap();
    let first = destination_snapshot(&fixture);

    let report = restore::run(&fixture.plan, &options).unwrap();
    let second = destination_snapshot(&fixture);

    assert!(report.summary.is_success());
    assert_eq!(first, second);
}

#[test]
fn restore_overwrites_existing_destination_files() {
    init_test_logging();
    let fixture = BackupFixture::new();

    let sentinel_path = fixture.dest_dir("/storage/joypads").join("joy_p1.cfg");
    fs::write(&sentinel_path, "SENTINEL").unwrap();

    restore::run(&fixture.plan, &RestoreOptions::default()).unwrap();

    let restored = fs::read_to_string(&sentinel_path).unwrap();
    assert_ne!(restored, "SENTINEL");
    assert_eq!(restored, archive_content("joy_p1.cfg"));
}

#[test]
fn missing_destination_fails_only_its_step() {
    init_test_logging();
    let fixture = BackupFixture::new();

    let advmame_dir = fixture.dest_dir("/storage/.config/emuelec/configs/advmame");
    fs::remove_dir_all(&advmame_dir).unwrap();

    let report = restore::run(&fixture.plan, &RestoreOptions::default()).unwrap();

    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.success, 6);

    let failed: Vec<_> = report.steps.iter().filter(|s| !s.ok).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].target, "advmame.rc");
    assert!(failed[0].error.is_some());

    // The remaining destinations are still fully populated.
    for (dest, file) in EXPECTED_TARGETS
        .iter()
        .filter(|(_, f)| *f != "advmame.rc")
    {
        assert_eq!(fixture.read_dest(dest, file), archive_content(file));
    }
}

#[test]
fn unrelated_destination_files_are_left_alone() {
    init_test_logging();
    let fixture = BackupFixture::new();

    let custom = fixture.dest_dir("/storage/joypads").join("custom_layout.cfg");
    fs::write(&custom, "hand-tuned").unwrap();

    restore::run(&fixture.plan, &RestoreOptions::default()).unwrap();

    assert_eq!(fs::read_to_string(&custom).unwrap(), "hand-tuned");
}

#[test]
fn missing_archive_touches_nothing() {
    init_test_logging();
    let fixture = BackupFixture::new();

    let sentinel = fixture.dest_dir("/storage/.config/retroarch").join("retroarch.cfg");
    fs::write(&sentinel, "SENTINEL").unwrap();
    fs::remove_file(&fixture.plan.archive).unwrap();

    let result = restore::run(&fixture.plan, &RestoreOptions::default());

    assert!(matches!(result, Err(RestoreError::ArchiveNotFound { .. })));
    assert_eq!(fs::read_to_string(&sentinel).unwrap(), "SENTINEL");
    // No other destination file appeared either.
    for (dest, file) in EXPECTED_TARGETS.iter().filter(|(_, f)| *f != "retroarch.cfg") {
        assert!(!fixture.dest_dir(dest).join(file).exists());
    }
}

#[test]
fn corrupt_archive_is_fatal() {
    init_test_logging();
    let fixture = BackupFixture::new();
    fs::write(&fixture.plan.archive, "definitely not a zip").unwrap();

    let result = restore::run(&fixture.plan, &RestoreOptions::default());
    assert!(matches!(result, Err(RestoreError::ArchiveInvalid(_))));
}

#[test]
fn dry_run_reports_without_writing() {
    init_test_logging();
    let fixture = BackupFixture::new();

    let options = RestoreOptions {
        dry_run: true,
        ..Default::default()
    };
    let report = restore::run(&fixture.plan, &options).unwrap();

    assert!(report.dry_run);
    assert!(report.summary.is_success());
    assert_eq!(report.summary.files_copied, EXPECTED_TARGETS.len());

    // Nothing was extracted or copied.
    for (dest, file) in EXPECTED_TARGETS {
        assert!(!fixture.dest_dir(dest).join(file).exists());
    }
    assert!(!fixture.plan.workdir.join("es_input.cfg").exists());
}

#[test]
fn skip_unchanged_second_run_copies_nothing() {
    init_test_logging();
    let fixture = BackupFixture::new();

    restore::run(&fixture.plan, &RestoreOptions::default()).unwrap();
    let before = destination_snapshot(&fixture);

    let options = RestoreOptions {
        skip_unchanged: true,
        ..Default::default()
    };
    let report = restore::run(&fixture.plan, &options).unwrap();

    assert!(report.summary.is_success());
    assert_eq!(report.summary.files_copied, 0);
    assert_eq!(report.summary.files_skipped, EXPECTED_TARGETS.len());
    assert_eq!(destination_snapshot(&fixture), before);
}

#[test]
fn extra_archive_entries_are_expanded_but_not_distributed() {
    init_test_logging();
    let mut entries = ARCHIVE_ENTRIES.to_vec();
    entries.push(("notes.txt", "do not distribute\n"));
    let fixture = BackupFixture::with_entries(&entries);

    let report = restore::run(&fixture.plan, &RestoreOptions::default()).unwrap();

    assert_eq!(report.expanded, entries.len());
    assert!(fixture.plan.workdir.join("notes.txt").exists());
    for dest in fixture.plan.destinations() {
        assert!(!dest.join("notes.txt").exists());
    }
}

#[test]
fn prefix_steps_pick_up_any_matching_workdir_file() {
    init_test_logging();
    let fixture = BackupFixture::new();

    // A stray file in the workdir sharing the joypad prefix is copied too;
    // the original script's `cp joy_*` breadth is kept deliberately.
    fs::write(fixture.plan.workdir.join("joy_stray.cfg"), "stray").unwrap();

    restore::run(&fixture.plan, &RestoreOptions::default()).unwrap();

    assert_eq!(fixture.read_dest("/storage/joypads", "joy_stray.cfg"), "stray");
}
