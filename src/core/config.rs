/*
 * Persists application configuration between sessions: the tool settings the
 * user can edit in the settings dialog, and the path of the last opened
 * project so the next launch can restore it.
 *
 * A trait-based approach (`ConfigManagerOperations`) allows different storage
 * backends or mock implementations for testing. The concrete implementation
 * (`CoreConfigManager`) stores both pieces under the platform's per-user
 * configuration directory: settings as JSON, the last project path as a
 * one-line text file.
 */
use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

const SETTINGS_FILENAME: &str = "settings.json";
const LAST_PROJECT_PATH_FILENAME: &str = "last_project_path.txt";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Serde(serde_json::Error),
    NoConfigDirectory,
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serde(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {e}"),
            ConfigError::Serde(e) => write!(f, "Configuration (de)serialization error: {e}"),
            ConfigError::NoConfigDirectory => {
                write!(f, "Could not determine configuration directory")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Serde(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/*
 * The user-editable tool settings. Serialized as JSON with per-field
 * defaults, so settings files from older versions load cleanly after new
 * fields are added.
 */
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Default user name for new packs.
    pub user_name: String,
    /// Starting directory for file selection dialogs.
    pub working_directory: PathBuf,
    /// Number of rows shown in the LST preview area.
    pub preview_num_rows: usize,
    /// Character width of the LST preview area.
    pub preview_char_width: usize,
    /// Whether entry removal asks for confirmation first.
    pub ask_before_entry_removal: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            user_name: "UserName".to_string(),
            working_directory: default_working_directory(),
            preview_num_rows: 15,
            preview_char_width: 30,
            ask_before_entry_removal: true,
        }
    }
}

fn default_working_directory() -> PathBuf {
    match UserDirs::new() {
        Some(dirs) => dirs.home_dir().to_path_buf(),
        None => PathBuf::from("."),
    }
}

pub trait ConfigManagerOperations: Send + Sync {
    fn load_settings(&self, app_name: &str) -> Result<AppSettings>;
    fn save_settings(&self, app_name: &str, settings: &AppSettings) -> Result<()>;
    fn load_last_project_path(&self, app_name: &str) -> Result<Option<PathBuf>>;
    fn save_last_project_path(&self, app_name: &str, project_path: Option<&Path>) -> Result<()>;
}

/// The application's per-user configuration directory, created on first use.
fn app_config_dir(app_name: &str) -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", app_name)?;
    let dir = dirs.config_local_dir().to_path_buf();
    if let Err(e) = fs::create_dir_all(&dir) {
        log::error!("CoreConfigManager: failed to create config dir {dir:?}: {e}");
        return None;
    }
    Some(dir)
}

pub struct CoreConfigManager {}

impl CoreConfigManager {
    pub fn new() -> Self {
        CoreConfigManager {}
    }

    fn config_file(&self, app_name: &str, filename: &str) -> Result<PathBuf> {
        let dir = app_config_dir(app_name).ok_or(ConfigError::NoConfigDirectory)?;
        Ok(dir.join(filename))
    }
}

impl Default for CoreConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManagerOperations for CoreConfigManager {
    /*
     * Loads the tool settings from `settings.json` in the application's
     * configuration directory. A missing file is not an error: first launch
     * simply gets the defaults.
     */
    fn load_settings(&self, app_name: &str) -> Result<AppSettings> {
        let file_path = self.config_file(app_name, SETTINGS_FILENAME)?;
        if !file_path.exists() {
            log::debug!("CoreConfigManager: {file_path:?} does not exist, using default settings");
            return Ok(AppSettings::default());
        }
        let json = fs::read_to_string(&file_path)?;
        let settings = serde_json::from_str(&json)?;
        log::debug!("CoreConfigManager: Loaded settings from {file_path:?}");
        Ok(settings)
    }

    fn save_settings(&self, app_name: &str, settings: &AppSettings) -> Result<()> {
        let file_path = self.config_file(app_name, SETTINGS_FILENAME)?;
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&file_path, json)?;
        log::debug!("CoreConfigManager: Saved settings to {file_path:?}");
        Ok(())
    }

    /*
     * Loads the path of the last used project. The path is stored as the
     * single line of `last_project_path.txt`; a missing or empty file means
     * there is no project to restore.
     */
    fn load_last_project_path(&self, app_name: &str) -> Result<Option<PathBuf>> {
        log::trace!("CoreConfigManager: Loading last project path for app '{app_name}'");
        let file_path = self.config_file(app_name, LAST_PROJECT_PATH_FILENAME)?;

        if !file_path.exists() {
            log::debug!("CoreConfigManager: Last project file {file_path:?} does not exist.");
            return Ok(None);
        }

        let mut file = File::open(&file_path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        if contents.trim().is_empty() {
            log::debug!("CoreConfigManager: Last project file {file_path:?} is empty.");
            Ok(None)
        } else {
            let path_text = contents.trim();
            log::debug!(
                "CoreConfigManager: Loaded last project path '{path_text}' from {file_path:?}."
            );
            Ok(Some(PathBuf::from(path_text)))
        }
    }

    /// Saves the path of the last used project. Passing `None` clears the
    /// stored value.
    fn save_last_project_path(&self, app_name: &str, project_path: Option<&Path>) -> Result<()> {
        log::trace!(
            "CoreConfigManager: Saving last project path '{project_path:?}' for app '{app_name}'"
        );
        let file_path = self.config_file(app_name, LAST_PROJECT_PATH_FILENAME)?;

        let mut file = File::create(&file_path)?;
        if let Some(path) = project_path {
            file.write_all(path.to_string_lossy().as_bytes())?;
        } else {
            file.write_all(b"")?;
        }
        log::debug!(
            "CoreConfigManager: Saved last project path '{project_path:?}' to {file_path:?}."
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // Trait implementation backed by a test-controlled directory, so tests
    // never touch the real per-user configuration.
    struct TestConfigManager {
        mock_config_dir: PathBuf,
    }

    impl TestConfigManager {
        fn new(mock_config_dir: PathBuf) -> Self {
            if !mock_config_dir.exists() {
                fs::create_dir_all(&mock_config_dir)
                    .expect("Failed to create mock config dir for test");
            }
            TestConfigManager { mock_config_dir }
        }
    }

    impl ConfigManagerOperations for TestConfigManager {
        fn load_settings(&self, _app_name: &str) -> Result<AppSettings> {
            let file_path = self.mock_config_dir.join(SETTINGS_FILENAME);
            if !file_path.exists() {
                return Ok(AppSettings::default());
            }
            Ok(serde_json::from_str(&fs::read_to_string(file_path)?)?)
        }

        fn save_settings(&self, _app_name: &str, settings: &AppSettings) -> Result<()> {
            let file_path = self.mock_config_dir.join(SETTINGS_FILENAME);
            fs::write(file_path, serde_json::to_string_pretty(settings)?)?;
            Ok(())
        }

        fn load_last_project_path(&self, _app_name: &str) -> Result<Option<PathBuf>> {
            let file_path = self.mock_config_dir.join(LAST_PROJECT_PATH_FILENAME);
            if !file_path.exists() {
                return Ok(None);
            }
            let contents = fs::read_to_string(file_path)?;
            if contents.trim().is_empty() {
                Ok(None)
            } else {
                Ok(Some(PathBuf::from(contents.trim())))
            }
        }

        fn save_last_project_path(
            &self,
            _app_name: &str,
            project_path: Option<&Path>,
        ) -> Result<()> {
            let file_path = self.mock_config_dir.join(LAST_PROJECT_PATH_FILENAME);
            let mut file = File::create(file_path)?;
            if let Some(path) = project_path {
                file.write_all(path.to_string_lossy().as_bytes())?;
            }
            Ok(())
        }
    }

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.user_name, "UserName");
        assert_eq!(settings.preview_num_rows, 15);
        assert_eq!(settings.preview_char_width, 30);
        assert!(settings.ask_before_entry_removal);
    }

    #[test]
    fn test_settings_round_trip() {
        let dir = tempdir().unwrap();
        let manager = TestConfigManager::new(dir.path().to_path_buf());

        let mut settings = AppSettings::default();
        settings.user_name = "Bob".to_string();
        settings.preview_num_rows = 25;
        settings.ask_before_entry_removal = false;

        manager.save_settings("AnyApp", &settings).unwrap();
        let loaded = manager.load_settings("AnyApp").unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_settings_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let manager = TestConfigManager::new(dir.path().to_path_buf());
        let loaded = manager.load_settings("AnyApp").unwrap();
        assert_eq!(loaded, AppSettings::default());
    }

    #[test]
    fn test_load_settings_tolerates_missing_and_unknown_fields() {
        let dir = tempdir().unwrap();
        let manager = TestConfigManager::new(dir.path().to_path_buf());

        // A file written by a different version: one known field, one unknown.
        let json = r#"{ "user_name": "Ann", "some_future_option": 42 }"#;
        fs::write(dir.path().join(SETTINGS_FILENAME), json).unwrap();

        let loaded = manager.load_settings("AnyApp").unwrap();
        assert_eq!(loaded.user_name, "Ann");
        assert_eq!(loaded.preview_num_rows, AppSettings::default().preview_num_rows);
    }

    #[test]
    fn test_save_and_load_last_project_path() {
        let dir = tempdir().unwrap();
        let manager = TestConfigManager::new(dir.path().to_path_buf());
        let project_path = PathBuf::from("/tmp/my_pack.cfg");

        manager
            .save_last_project_path("AnyApp", Some(project_path.as_path()))
            .unwrap();
        let loaded = manager.load_last_project_path("AnyApp").unwrap();
        assert_eq!(loaded, Some(project_path));
    }

    #[test]
    fn test_load_last_project_path_not_exists_or_empty() {
        let dir = tempdir().unwrap();
        let manager = TestConfigManager::new(dir.path().to_path_buf());

        assert_eq!(manager.load_last_project_path("AnyApp").unwrap(), None);

        File::create(dir.path().join(LAST_PROJECT_PATH_FILENAME)).unwrap();
        assert_eq!(manager.load_last_project_path("AnyApp").unwrap(), None);
    }

    #[test]
    fn test_save_last_project_path_none_clears_value() {
        let dir = tempdir().unwrap();
        let manager = TestConfigManager::new(dir.path().to_path_buf());

        manager
            .save_last_project_path("AnyApp", Some(Path::new("/tmp/old.cfg")))
            .unwrap();
        manager.save_last_project_path("AnyApp", None).unwrap();
        assert_eq!(manager.load_last_project_path("AnyApp").unwrap(), None);
    }

    #[test]
    fn test_core_config_manager_settings_round_trip() {
        // Uses the real per-user directory under a throwaway app name.
        let unique_app_name = format!("TestApp_PackBuilder_{}", rand::random::<u64>());
        let manager = CoreConfigManager::new();

        let mut settings = AppSettings::default();
        settings.user_name = "RoundTrip".to_string();

        manager.save_settings(&unique_app_name, &settings).unwrap();
        let loaded = manager.load_settings(&unique_app_name).unwrap();
        assert_eq!(loaded, settings);

        if let Some(dir) = app_config_dir(&unique_app_name) {
            if let Err(e) = fs::remove_dir_all(&dir) {
                eprintln!("Test cleanup failed for {dir:?}: {e}");
            }
        }
    }
}
