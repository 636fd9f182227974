//! Test fixture helpers for creating temporary backup trees.
//!
//! Builds a throwaway filesystem root holding a backup archive plus the full
//! EmuELEC destination tree, with the default plan re-based under it.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use eerestore::plan::RestorePlan;

/// The well-formed archive contents used by most tests: two joypad profiles
/// plus every named config file of the default plan.
pub const ARCHIVE_ENTRIES: &[(&str, &str)] = &[
    ("joy_p1.cfg", "input_device = \"pad one\"\n"),
    ("joy_p2.cfg", "input_device = \"pad two\"\n"),
    ("es_input.cfg", "<inputList />\n"),
    ("es_systems.cfg", "<systemList />\n"),
    ("es_settings.cfg", "<settings />\n"),
    ("retroarch.cfg", "video_driver = gl\n"),
    ("advmame.rc", "display_mode auto\n"),
];

/// Write a ZIP archive with the given (name, contents) entries.
///
/// # Panics
///
/// Panics if the archive cannot be written.
pub fn write_archive(path: &Path, entries: &[(&str, &str)]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create archive directory");
    }
    let file = File::create(path).expect("Failed to create archive file");
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    for (name, contents) in entries {
        zip.start_file(*name, options).expect("Failed to start entry");
        zip.write_all(contents.as_bytes())
            .expect("Failed to write entry");
    }
    zip.finish().expect("Failed to finish archive");
}

/// A temporary backup tree with automatic cleanup.
pub struct BackupFixture {
    /// The temporary root everything is re-based under.
    pub root: TempDir,
    /// The default EmuELEC plan rooted at `root`.
    pub plan: RestorePlan,
}

impl BackupFixture {
    /// Create a tree with the standard archive and all destinations present.
    #[must_use]
    pub fn new() -> Self {
        Self::with_entries(ARCHIVE_ENTRIES)
    }

    /// Create a tree with a custom archive content set.
    ///
    /// # Panics
    ///
    /// Panics if the tree cannot be created.
    #[must_use]
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let root = TempDir::new().expect("Failed to create temp root");
        let plan = RestorePlan::emuelec_default().rooted_at(root.path());

        fs::create_dir_all(&plan.workdir).expect("Failed to create workdir");
        write_archive(&plan.archive, entries);
        for dest in plan.destinations() {
            fs::create_dir_all(dest).expect("Failed to create destination");
        }

        Self { root, plan }
    }

    /// Absolute path of a destination directory given its original (un-rooted)
    /// path, e.g. `/storage/joypads`.
    #[must_use]
    pub fn dest_dir(&self, original: &str) -> PathBuf {
        let rel = original.strip_prefix('/').unwrap_or(original);
        self.root.path().join(rel)
    }

    /// Read a restored file out of a destination directory.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be read.
    #[must_use]
    pub fn read_dest(&self, original: &str, file: &str) -> String {
        let path = self.dest_dir(original).join(file);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()))
    }

    /// Serialize the rooted plan to a TOML manifest inside the tree and
    /// return its path.
    ///
    /// # Panics
    ///
    /// Panics if the manifest cannot be written.
    #[must_use]
    pub fn write_manifest(&self) -> PathBuf {
        let path = self.root.path().join("restore.toml");
        let text = toml::to_string(&self.plan).expect("Failed to serialize plan");
        fs::write(&path, text).expect("Failed to write manifest");
        path
    }
}

impl Default for BackupFixture {
    fn default() -> Self {
        Self::new()
    }
}
