//! JSON input/output for the command-line tool
//!
//! Scene batches are accepted in two layouts:
//! - a list of scene records (`[{"local": [...], "stashapp": [...], "stashdb": [...]}]`)
//! - three positionally aligned collections
//!   (`{"local": [[...]], "stashapp": [[...]], "stashdb": [[...]]}`)

use crate::reconciler::zip_scenes;
use crate::types::{LocalPerformer, SceneInput, StashappPerformer, StashdbPerformer};
use ce_common::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Positionally aligned per-source collections
#[derive(Debug, Deserialize)]
pub struct AlignedScenes {
    pub local: Vec<Vec<LocalPerformer>>,
    #[serde(default)]
    pub stashapp: Vec<Vec<StashappPerformer>>,
    #[serde(default)]
    pub stashdb: Vec<Vec<StashdbPerformer>>,
}

/// Scene batch file in either supported layout
#[derive(Debug)]
pub enum ScenesFile {
    Scenes(Vec<SceneInput>),
    Aligned(AlignedScenes),
}

impl ScenesFile {
    /// Pick the layout from the top-level JSON shape
    ///
    /// An array is read as scene records and an object as aligned
    /// collections, so a malformed file reports the error of its own layout.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        if value.is_array() {
            Ok(Self::Scenes(serde_json::from_value(value)?))
        } else {
            Ok(Self::Aligned(serde_json::from_value(value)?))
        }
    }

    /// Normalize to scene records
    ///
    /// An aligned layout may omit a source entirely; otherwise every
    /// collection must have one entry per scene.
    pub fn into_scenes(self) -> Result<Vec<SceneInput>> {
        match self {
            Self::Scenes(scenes) => Ok(scenes),
            Self::Aligned(AlignedScenes {
                local,
                mut stashapp,
                mut stashdb,
            }) => {
                if stashapp.is_empty() {
                    stashapp = vec![Vec::new(); local.len()];
                }
                if stashdb.is_empty() {
                    stashdb = vec![Vec::new(); local.len()];
                }
                zip_scenes(local, stashapp, stashdb)
            }
        }
    }
}

/// Read and deserialize a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        _ => Error::Io(e),
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Load a scene batch file in either layout
pub fn read_scenes(path: &Path) -> Result<Vec<SceneInput>> {
    ScenesFile::from_value(read_json(path)?)?.into_scenes()
}

/// Pretty-print JSON to a file, or stdout when no path is given
pub fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}
