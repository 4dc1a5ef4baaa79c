use anyhow::Context;
use chrono::NaiveDateTime;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Result of attempting to write one output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    /// Target exists and overwriting was not allowed.
    Skipped(PathBuf),
}

/// `YYYY_MM_DD_HHMM_<site>.kml` for a flight starting at `start`.
pub fn default_file_name(start: NaiveDateTime, launch_site: &str) -> String {
    format!("{}_{}.kml", start.format("%Y_%m_%d_%H%M"), launch_site)
}

/// Writes `contents` to `path` unless it exists and `force` is off.
///
/// The document goes to a temporary file next to the target first and is
/// renamed into place once complete.
pub fn write_guarded(path: &Path, contents: &str, force: bool) -> anyhow::Result<WriteOutcome> {
    if path.exists() && !force {
        return Ok(WriteOutcome::Skipped(path.to_path_buf()));
    }

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(directory)
        .with_context(|| format!("creating temporary file in {}", directory.display()))?;
    temp.write_all(contents.as_bytes())
        .with_context(|| format!("writing {}", path.display()))?;
    temp.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("moving document into place at {}", path.display()))?;
    Ok(WriteOutcome::Written(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn default_name_uses_start_time_and_site() {
        let start = NaiveDate::from_ymd_opt(2021, 7, 15)
            .unwrap()
            .and_hms_opt(9, 5, 30)
            .unwrap();
        assert_eq!(
            default_file_name(start, "Sonnwendstein"),
            "2021_07_15_0905_Sonnwendstein.kml"
        );
    }

    #[test]
    fn existing_file_is_skipped_without_force() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flight.kml");
        fs::write(&path, "old").unwrap();

        let outcome = write_guarded(&path, "new", false).unwrap();
        assert_eq!(outcome, WriteOutcome::Skipped(path.clone()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
    }

    #[test]
    fn force_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flight.kml");
        fs::write(&path, "old").unwrap();

        let outcome = write_guarded(&path, "new", true).unwrap();
        assert_eq!(outcome, WriteOutcome::Written(path.clone()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn new_file_leaves_no_temporary_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flight.kml");
        write_guarded(&path, "<kml/>", false).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "<kml/>");
    }
}
