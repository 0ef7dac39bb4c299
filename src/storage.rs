use std::{
    env,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    calendar::parse_date,
    constants::{ENV_VARS, FILE_PATHS},
    domain::ActivitiesData,
};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_activities(path: &Path) -> Result<ActivitiesData, LoadError> {
    read_json(path)
}

/// Never fails: a missing, unreadable or malformed file yields no
/// activities.
pub fn load_activities_or_default(path: &Path) -> ActivitiesData {
    match read_activities(path) {
        Ok(data) => {
            let malformed = malformed_dates(&data);
            if malformed > 0 {
                warn!(
                    path = %path.display(),
                    malformed,
                    "dates not in YYYY-MM-DD form never match a grid cell"
                );
            }
            debug!(
                path = %path.display(),
                activities = data.activities.len(),
                "loaded activities"
            );
            data
        }
        Err(e) => {
            warn!(error = %e, "falling back to an empty activity set");
            ActivitiesData::default()
        }
    }
}

fn malformed_dates(data: &ActivitiesData) -> usize {
    data.activities
        .iter()
        .flat_map(|(_, activity)| activity.dates.iter())
        .filter(|date| parse_date(date).is_err())
        .count()
}

pub fn resolve_data_path(explicit: Option<PathBuf>) -> PathBuf {
    let from_env = env::var_os(ENV_VARS.data_file)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    let platform = ProjectDirs::from("com", "tessera", "tessera")
        .map(|dirs| dirs.data_dir().join(FILE_PATHS.data_file_name));

    let local = PathBuf::from(FILE_PATHS.default_data_file);
    let path = pick_data_path(explicit, from_env, local, platform);
    debug!(path = %path.display(), "resolved data file");
    path
}

fn pick_data_path(
    explicit: Option<PathBuf>,
    from_env: Option<PathBuf>,
    local: PathBuf,
    platform: Option<PathBuf>,
) -> PathBuf {
    if let Some(path) = explicit.or(from_env) {
        return path;
    }

    if local.exists() {
        return local;
    }

    match platform {
        Some(path) if path.exists() => path,
        _ => local,
    }
}

pub fn write_text_file(path: &Path, content: &str) -> Result<(), io::Error> {
    atomic_write(path, content)
}

pub fn atomic_write(path: &Path, content: &str) -> Result<(), io::Error> {
    let tmp_path = path.with_extension("tmp");
    let mut tmp_file = File::create(&tmp_path)?;
    tmp_file.write_all(content.as_bytes())?;
    tmp_file.sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf, time::SystemTime};

    use super::*;

    fn unique_path(prefix: &str, extension: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        PathBuf::from(format!("/tmp/{}_{}.{}", prefix, now, extension))
    }

    #[test]
    fn test_read_activities_keeps_order_and_fields() {
        let path = unique_path("tessera_activities", "json");
        let content = r#"{
  "activities": {
    "run": {"name": "Run", "color": "green", "dates": ["2024-01-01", "2024-01-01"]},
    "read": {"name": "Read", "dates": []}
  }
}"#;
        fs::write(&path, content).unwrap();

        let data = read_activities(&path).unwrap();
        assert_eq!(data.activities.len(), 2);
        assert_eq!(data.activities[0].0, "run");
        assert_eq!(data.activities[0].1.color.as_deref(), Some("green"));
        assert_eq!(data.activities[0].1.dates.len(), 2);
        assert_eq!(data.activities[1].0, "read");
        assert_eq!(data.activities[1].1.color, None);

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file_falls_back_to_empty() {
        let path = unique_path("tessera_missing", "json");
        assert!(matches!(read_activities(&path), Err(LoadError::Io { .. })));
        assert!(load_activities_or_default(&path).activities.is_empty());
    }

    #[test]
    fn test_malformed_file_falls_back_to_empty() {
        let path = unique_path("tessera_malformed", "json");
        fs::write(&path, "{\"activities\": [").unwrap();

        assert!(matches!(read_activities(&path), Err(LoadError::Parse { .. })));
        assert_eq!(load_activities_or_default(&path), ActivitiesData::default());

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_activities_key_is_empty() {
        let path = unique_path("tessera_no_key", "json");
        fs::write(&path, "{}").unwrap();

        let data = read_activities(&path).unwrap();
        assert!(data.activities.is_empty());

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_explicit_path_wins() {
        let explicit = PathBuf::from("/tmp/explicit.json");
        let from_env = PathBuf::from("/tmp/env.json");

        let local = unique_path("tessera_local_unused", "json");

        assert_eq!(
            pick_data_path(
                Some(explicit.clone()),
                Some(from_env.clone()),
                local.clone(),
                None
            ),
            explicit
        );
        assert_eq!(
            pick_data_path(None, Some(from_env.clone()), local, None),
            from_env
        );
    }

    #[test]
    fn test_platform_path_used_only_when_present() {
        let local = unique_path("tessera_local_absent", "json");
        let absent = unique_path("tessera_platform_absent", "json");
        assert_eq!(
            pick_data_path(None, None, local.clone(), Some(absent)),
            local
        );
        assert_eq!(pick_data_path(None, None, local.clone(), None), local);

        let present = unique_path("tessera_platform_present", "json");
        fs::write(&present, "{}").unwrap();
        assert_eq!(
            pick_data_path(None, None, local.clone(), Some(present.clone())),
            present
        );

        fs::write(&local, "{}").unwrap();
        assert_eq!(
            pick_data_path(None, None, local.clone(), Some(present.clone())),
            local
        );

        fs::remove_file(present).ok();
        fs::remove_file(local).ok();
    }

    #[test]
    fn test_malformed_dates_are_counted() {
        let data = ActivitiesData {
            activities: vec![(
                "run".to_string(),
                crate::domain::Activity {
                    name: "Run".to_string(),
                    dates: vec![
                        "2024-06-12".to_string(),
                        "12/06/2024".to_string(),
                        "2024-13-01".to_string(),
                    ],
                    ..Default::default()
                },
            )],
        };
        assert_eq!(malformed_dates(&data), 2);
    }

    #[test]
    fn test_write_text_file_replaces_content() {
        let path = unique_path("tessera_export", "csv");
        write_text_file(&path, "first").unwrap();
        write_text_file(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!path.with_extension("tmp").exists());

        fs::remove_file(path).ok();
    }
}
