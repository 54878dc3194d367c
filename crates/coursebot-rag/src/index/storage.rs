//! On-disk format of a persisted index

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use coursebot_core::{Error, Result};

use super::IndexHandle;

pub(crate) const INDEX_FILE: &str = "index.json";

/// What gets written to `<index dir>/index.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredIndex {
    pub collection: String,
    pub built_at: DateTime<Utc>,
    pub index: IndexHandle,
}

/// Write `stored` into `dir`.
///
/// The file is written next to its final location and renamed into place, so
/// a crash never leaves a half-written index behind.
pub(crate) fn persist(dir: &Path, stored: &StoredIndex) -> Result<()> {
    fs::create_dir_all(dir)?;

    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer(&mut writer, stored)?;
        writer.flush()?;
    }
    tmp.persist(dir.join(INDEX_FILE)).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

pub(crate) fn load(dir: &Path) -> Result<StoredIndex> {
    let path = dir.join(INDEX_FILE);
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NotFound(path.display().to_string()));
        }
        Err(e) => return Err(Error::Io(e)),
    };

    let stored = serde_json::from_reader(BufReader::new(file))?;
    Ok(stored)
}
