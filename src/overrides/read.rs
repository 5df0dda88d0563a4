use super::{Override, Overrides, RawOverride};
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load every `<name>.yaml` file under `dir`, recursively.
///
/// Every bad file is reported; the returned error aggregates all of them.
pub fn read_from_dir(dir: impl AsRef<Path>) -> Result<Overrides> {
    let dir = dir.as_ref();
    let metadata = fs::metadata(dir).map_err(|e| {
        Error::InvalidConfig(format!("stat overrides location {:?}: {}", dir, e))
    })?;
    if !metadata.is_dir() {
        return Err(Error::InvalidConfig(format!(
            "overrides location {:?} is not a directory",
            dir
        )));
    }

    let mut files = Vec::new();
    let mut errors = Vec::new();
    collect_files(dir, &mut files, &mut errors);

    let mut overrides = Overrides::new();
    for path in files {
        match load_file(&path) {
            Ok((name, o)) => {
                if overrides.overrides.contains_key(&name) {
                    errors.push(Error::DuplicateOverride(name));
                    continue;
                }
                debug!("Loaded override {} from {}", name, path.display());
                overrides.overrides.insert(name, o);
            }
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        return Err(Error::OverridesAggregate(errors));
    }
    Ok(overrides)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>, errors: &mut Vec<Error>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            errors.push(Error::Io(e));
            return;
        }
    };
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => paths.push(entry.path()),
            Err(e) => errors.push(Error::Io(e)),
        }
    }
    // walk in lexical order so duplicate detection is deterministic
    paths.sort();
    for path in paths {
        if path.is_dir() {
            collect_files(&path, files, errors);
        } else {
            files.push(path);
        }
    }
}

fn override_name(path: &Path) -> Result<String> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parts: Vec<&str> = file_name.split('.').collect();
    match parts.as_slice() {
        [name, "yaml"] if !name.is_empty() => Ok(name.to_string()),
        _ => Err(Error::MalformedOverride {
            path: path.to_path_buf(),
            reason: format!(
                "inferring override name from yaml file name {:?}, override yaml name must be in the form of <name>.yaml",
                file_name
            ),
        }),
    }
}

fn load_file(path: &Path) -> Result<(String, Override)> {
    let name = override_name(path)?;
    let data = fs::read_to_string(path).map_err(|e| Error::MalformedOverride {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let raw: RawOverride = if data.trim().is_empty() {
        RawOverride::default()
    } else {
        serde_yaml::from_str(&data).map_err(|e| Error::MalformedOverride {
            path: path.to_path_buf(),
            reason: format!("unmarshaling override yaml: {}", e),
        })?
    };
    Ok((name, Override::try_from(raw)?))
}
