//! Restore plan: the mapping from archive entry patterns to destination
//! directories.
//!
//! The built-in default mirrors the EmuELEC filesystem layout. A plan can also
//! be loaded from a TOML manifest, which makes the whole destination set
//! substitutable in tests (see [`RestorePlan::rooted_at`]).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Result, RestoreError};

/// Default location of the backup archive produced by the backup step.
pub const DEFAULT_ARCHIVE: &str = "/storage/roms/backup/ee_backup_config.zip";

/// Directory the archive is expanded into. Expanded files are left in place
/// after a run.
pub const DEFAULT_WORKDIR: &str = "/storage/roms/backup";

/// Common name prefix shared by all joypad profile files in the archive.
pub const JOYPAD_PREFIX: &str = "joy_";

const JOYPAD_DIR: &str = "/storage/joypads";
const JOYPAD_RUNTIME_DIR: &str = "/tmp/joypads";
const ES_INPUT_DIR: &str = "/storage/.emulationstation";
const ES_CONFIG_DIR: &str = "/storage/.config/emulationstation";
const RETROARCH_CONFIG_DIR: &str = "/storage/.config/retroarch";
const ADVMAME_CONFIG_DIR: &str = "/storage/.config/emuelec/configs/advmame";

/// How a copy step selects files in the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryMatch {
    /// A single file with exactly this name.
    Exact(String),
    /// Every regular file whose name starts with this prefix.
    Prefix(String),
}

impl EntryMatch {
    /// Short display form used in reports (`es_input.cfg`, `joy_*`).
    pub fn target(&self) -> String {
        match self {
            Self::Exact(name) => name.clone(),
            Self::Prefix(prefix) => format!("{prefix}*"),
        }
    }

    /// Returns true if `name` is selected by this matcher.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(exact) => name == exact,
            Self::Prefix(prefix) => name.starts_with(prefix.as_str()),
        }
    }
}

/// One (pattern, destination directory) pair of the destination set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStep", into = "RawStep")]
pub struct CopyStep {
    pub matcher: EntryMatch,
    pub dest: PathBuf,
}

impl CopyStep {
    pub fn exact(name: &str, dest: &str) -> Self {
        Self {
            matcher: EntryMatch::Exact(name.to_string()),
            dest: PathBuf::from(dest),
        }
    }

    pub fn prefix(prefix: &str, dest: &str) -> Self {
        Self {
            matcher: EntryMatch::Prefix(prefix.to_string()),
            dest: PathBuf::from(dest),
        }
    }

    /// Regular files in `workdir` selected by this step, sorted by name for
    /// deterministic copy order.
    pub fn matches_in(&self, workdir: &Path) -> io::Result<Vec<PathBuf>> {
        match &self.matcher {
            EntryMatch::Exact(name) => {
                let path = workdir.join(name);
                if path.is_file() {
                    Ok(vec![path])
                } else {
                    trace!(name = %name, "No exact match in working directory");
                    Ok(Vec::new())
                }
            }
            EntryMatch::Prefix(prefix) => {
                let mut matched: Vec<PathBuf> = fs::read_dir(workdir)?
                    .collect::<io::Result<Vec<_>>>()?
                    .into_iter()
                    .map(|e| e.path())
                    .filter(|p| p.is_file())
                    .filter(|p| {
                        p.file_name()
                            .and_then(|n| n.to_str())
                            .is_some_and(|n| n.starts_with(prefix.as_str()))
                    })
                    .collect();
                matched.sort();
                Ok(matched)
            }
        }
    }
}

/// TOML-facing shape of a step: exactly one of `file` or `prefix`, plus `dest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prefix: Option<String>,
    dest: PathBuf,
}

impl TryFrom<RawStep> for CopyStep {
    type Error = String;

    fn try_from(raw: RawStep) -> std::result::Result<Self, Self::Error> {
        let matcher = match (raw.file, raw.prefix) {
            (Some(file), None) => EntryMatch::Exact(file),
            (None, Some(prefix)) => EntryMatch::Prefix(prefix),
            (Some(_), Some(_)) => {
                return Err("step must set either 'file' or 'prefix', not both".to_string());
            }
            (None, None) => {
                return Err("step must set one of 'file' or 'prefix'".to_string());
            }
        };
        Ok(Self {
            matcher,
            dest: raw.dest,
        })
    }
}

impl From<CopyStep> for RawStep {
    fn from(step: CopyStep) -> Self {
        match step.matcher {
            EntryMatch::Exact(file) => Self {
                file: Some(file),
                prefix: None,
                dest: step.dest,
            },
            EntryMatch::Prefix(prefix) => Self {
                file: None,
                prefix: Some(prefix),
                dest: step.dest,
            },
        }
    }
}

/// The full destination set: archive location, working directory, and the
/// ordered copy steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestorePlan {
    pub archive: PathBuf,
    pub workdir: PathBuf,
    #[serde(rename = "step", default)]
    pub steps: Vec<CopyStep>,
}

impl RestorePlan {
    /// The built-in EmuELEC destination set.
    ///
    /// Joypad profiles land in both the persistent joypad directory and the
    /// runtime one under /tmp; EmulationStation and RetroArch configs go to
    /// their fixed config directories.
    pub fn emuelec_default() -> Self {
        Self {
            archive: PathBuf::from(DEFAULT_ARCHIVE),
            workdir: PathBuf::from(DEFAULT_WORKDIR),
            steps: vec![
                CopyStep::prefix(JOYPAD_PREFIX, JOYPAD_DIR),
                CopyStep::prefix(JOYPAD_PREFIX, JOYPAD_RUNTIME_DIR),
                CopyStep::exact("es_input.cfg", ES_INPUT_DIR),
                CopyStep::exact("es_systems.cfg", ES_CONFIG_DIR),
                CopyStep::exact("es_settings.cfg", ES_CONFIG_DIR),
                CopyStep::exact("retroarch.cfg", RETROARCH_CONFIG_DIR),
                CopyStep::exact("advmame.rc", ADVMAME_CONFIG_DIR),
            ],
        }
    }

    /// Load a plan from a TOML manifest file.
    ///
    /// `~`-prefixed paths are expanded to the home directory, matching the
    /// resolution rules used for other config files.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                RestoreError::ManifestNotFound {
                    path: path.display().to_string(),
                }
            } else {
                RestoreError::Io(e)
            }
        })?;

        let mut plan: Self = toml::from_str(&contents)
            .map_err(|e| RestoreError::ManifestParse(e.to_string()))?;

        plan.archive = expand_home(&plan.archive)?;
        plan.workdir = expand_home(&plan.workdir)?;
        for step in &mut plan.steps {
            step.dest = expand_home(&step.dest)?;
        }

        plan.validate()?;
        debug!(
            manifest = %path.display(),
            steps = plan.steps.len(),
            "Loaded restore manifest"
        );
        Ok(plan)
    }

    /// Basic shape checks shared by manifest loading and callers that build
    /// plans programmatically.
    pub fn validate(&self) -> Result<()> {
        if self.archive.as_os_str().is_empty() {
            return Err(RestoreError::ManifestInvalid(
                "archive path is empty".to_string(),
            ));
        }
        if self.workdir.as_os_str().is_empty() {
            return Err(RestoreError::ManifestInvalid(
                "workdir path is empty".to_string(),
            ));
        }
        if self.steps.is_empty() {
            return Err(RestoreError::ManifestInvalid(
                "plan has no copy steps".to_string(),
            ));
        }
        for step in &self.steps {
            if step.dest.as_os_str().is_empty() {
                return Err(RestoreError::ManifestInvalid(format!(
                    "step '{}' has an empty destination",
                    step.matcher.target()
                )));
            }
            match &step.matcher {
                EntryMatch::Exact(name) if name.is_empty() => {
                    return Err(RestoreError::ManifestInvalid(
                        "step has an empty file name".to_string(),
                    ));
                }
                EntryMatch::Prefix(prefix) if prefix.is_empty() => {
                    return Err(RestoreError::ManifestInvalid(
                        "step has an empty prefix".to_string(),
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Re-base every absolute path in the plan under `root`.
    ///
    /// `/storage/joypads` rooted at `/tmp/xyz` becomes
    /// `/tmp/xyz/storage/joypads`. Tests use this to run the fixed EmuELEC
    /// destination set against a throwaway tree.
    pub fn rooted_at(&self, root: &Path) -> Self {
        let rebase = |p: &Path| -> PathBuf {
            match p.strip_prefix("/") {
                Ok(rel) => root.join(rel),
                Err(_) => root.join(p),
            }
        };

        Self {
            archive: rebase(&self.archive),
            workdir: rebase(&self.workdir),
            steps: self
                .steps
                .iter()
                .map(|s| Self::rebase_step(s, &rebase))
                .collect(),
        }
    }

    fn rebase_step(step: &CopyStep, rebase: &impl Fn(&Path) -> PathBuf) -> CopyStep {
        CopyStep {
            matcher: step.matcher.clone(),
            dest: rebase(&step.dest),
        }
    }

    /// Distinct destination directories, in first-seen order.
    pub fn destinations(&self) -> Vec<&Path> {
        let mut seen: Vec<&Path> = Vec::new();
        for step in &self.steps {
            if !seen.contains(&step.dest.as_path()) {
                seen.push(step.dest.as_path());
            }
        }
        seen
    }
}

/// Expand a leading `~` to the user's home directory.
fn expand_home(path: &Path) -> Result<PathBuf> {
    let text = path.to_string_lossy();
    if text == "~" || text.starts_with("~/") {
        let home = dirs::home_dir().ok_or_else(|| {
            RestoreError::ManifestInvalid("could not determine home directory".to_string())
        })?;
        let rest = text.strip_prefix("~/").unwrap_or("");
        return Ok(if rest.is_empty() { home } else { home.join(rest) });
    }
    Ok(path.to_path_buf())
}
