use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

pub const FLOOD_EXPORT_FILE: &str = "flood_predictions.json";
pub const ROUTE_EXPORT_FILE: &str = "route_optimizations.json";
pub const SCENARIO_EXPORT_FILE: &str = "combined_scenarios.json";

/// Write `items` as a pretty JSON array to `<dir>/<file_name>`.
/// Creates the directory if needed and returns the written path.
pub fn write_json_array<T: Serialize>(
    dir: &Path,
    file_name: &str,
    items: &[T],
) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);

    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, items)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    log::info!("Exported {} records to {}", items.len(), path.display());
    Ok(path)
}
