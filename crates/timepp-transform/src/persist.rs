//! JSON persistence for fitted state.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, TransformError};

pub(crate) fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let persist = |source: std::io::Error| TransformError::Persist {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(persist)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| persist(e.into()))?;
    writer.flush().map_err(persist)?;
    tracing::debug!(path = %path.display(), "saved fitted state");
    Ok(())
}

pub(crate) fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|source| TransformError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| TransformError::Deserialize {
        path: path.to_path_buf(),
        source,
    })
}
