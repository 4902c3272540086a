use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
};

use config::{Config, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use tracing::debug;

use crate::{
    Cli,
    error::{ApplicationError, ApplicationResult},
};

const DEFAULT_CONFIG: &str = include_str!("../config.toml");
const DEFAULT_STATE_FILE: &str = "airport.json";

pub(crate) fn airport_desk_project_dir() -> ApplicationResult<ProjectDirs> {
    ProjectDirs::from("", "meltinglava", "airport_desk")
        .ok_or(ApplicationError::NoProjectDirectory("configuration"))
}

#[derive(Debug)]
pub(crate) struct DeskConfig {
    settings: Settings,
    config_file_path: PathBuf,
    data_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Settings {
    runways: u32,
    restore_on_start: bool,
    autosave_on_exit: bool,
    state_file: Option<PathBuf>,
    log_directory: Option<PathBuf>,
}

/// Settings that survive `--clean-config`.
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize)]
struct PreservedSettings {
    state_file: Option<PathBuf>,
    log_directory: Option<PathBuf>,
}

fn desk_environment() -> Environment {
    Environment::with_prefix("AIRPORT_DESK")
}

impl DeskConfig {
    pub fn load(cli: &Cli) -> ApplicationResult<Self> {
        let project_dirs = airport_desk_project_dir()?;
        let config_file_path = match &cli.config {
            Some(path) => path.clone(),
            None => project_dirs.config_dir().join("config.toml"),
        };
        let mut desk_config = Self::from_file(
            config_file_path,
            project_dirs.data_dir().to_path_buf(),
            cli.clean_config,
            desk_environment(),
        )?;
        desk_config.apply_cli(cli);
        Ok(desk_config)
    }

    fn from_file(
        config_file_path: PathBuf,
        data_dir: PathBuf,
        clean_config: bool,
        environment: Environment,
    ) -> ApplicationResult<Self> {
        let settings = setup_configuration(&config_file_path, clean_config, environment)?;
        debug!(?config_file_path, ?settings, "configuration loaded");
        Ok(Self {
            settings,
            config_file_path,
            data_dir,
        })
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(runways) = cli.runways {
            self.settings.runways = runways;
        }
        if let Some(state_file) = &cli.state_file {
            self.settings.state_file = Some(state_file.clone());
        }
        if cli.restore {
            self.settings.restore_on_start = true;
        }
        if cli.no_autosave {
            self.settings.autosave_on_exit = false;
        }
    }

    pub fn config_file_path(&self) -> &Path {
        &self.config_file_path
    }

    pub fn runway_count(&self) -> u32 {
        self.settings.runways
    }

    pub fn restore_on_start(&self) -> bool {
        self.settings.restore_on_start
    }

    pub fn autosave_on_exit(&self) -> bool {
        self.settings.autosave_on_exit
    }

    pub fn state_file_path(&self) -> PathBuf {
        self.settings
            .state_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DEFAULT_STATE_FILE))
    }

    pub fn log_directory(&self) -> PathBuf {
        self.settings
            .log_directory
            .clone()
            .unwrap_or_else(|| self.data_dir.clone())
    }
}

fn setup_configuration(
    config_file: &Path,
    clean_config: bool,
    environment: Environment,
) -> ApplicationResult<Settings> {
    let mut raw_config_file = Cow::Borrowed(DEFAULT_CONFIG);
    if !config_file.exists() {
        if let Some(config_dir) = config_file.parent() {
            fs::create_dir_all(config_dir)?;
        }
        fs::write(config_file, raw_config_file.as_bytes())?;
    }
    if clean_config {
        // only what the file itself says, environment overrides stay out of it
        let preserved = Config::builder()
            .add_source(config::File::from(config_file).required(true))
            .build()?
            .try_deserialize::<PreservedSettings>()?;
        let preserved = toml::to_string(&preserved)?;
        if !preserved.is_empty() {
            raw_config_file = format!("{preserved}\n{raw_config_file}").into();
        }
        fs::write(config_file, raw_config_file.as_bytes())?;
    }
    let settings = Config::builder()
        .add_source(config::File::from(config_file).required(true))
        .add_source(environment)
        .build()?
        .try_deserialize::<Settings>()?;
    Ok(settings)
}
