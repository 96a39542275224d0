/// `load_config` module: loads the optional YAML configuration file into a [`CliConfig`].
///
/// This is the only place where user-supplied YAML is parsed. The `conversion`
/// section maps directly onto [`ConversionSettings`]; every key is optional and
/// falls back to the built-in defaults.
///
/// ```yaml
/// output_dir: ./output
/// converter: libreoffice
/// conversion:
///   copy_non_convertible_files: true
///   convertible_extensions: [".ppt", ".pptx", ".docx"]
///   max_workers: 4
/// ```
///
/// # Errors
/// Read and parse failures are returned as `anyhow::Error` with the file path
/// attached and surface at the CLI boundary.
use anyhow::Result;
use doc2pdf_core::config::ConversionSettings;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub output_dir: Option<PathBuf>,
    pub converter: Option<String>,
    pub conversion: ConversionSettings,
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        return Ok(CliConfig::default());
    }

    match serde_yaml::from_str::<CliConfig>(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}
