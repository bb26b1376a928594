//! `sdvgen.toml` parsing and validation

use anyhow::{Context, Result};
use sdvgen_codegen::{BridgeOptions, DEFAULT_JNI_VERSION, JNI_VERSIONS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "sdvgen.toml";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// sdvgen.toml structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub idl: IdlSection,
    pub bridge: BridgeSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdlSection {
    /// Dotted package replacing the one declared in the ARXML
    pub package: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeSection {
    pub java_package: Option<String>,
    pub jni_version: Option<String>,
    /// `System.loadLibrary` name
    pub library: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub dir: PathBuf,
    pub log_level: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("outputs"),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load config from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config: {:?}", path.as_ref()))?;

        Self::from_str(&content)
    }

    /// Parse config from string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config")
    }

    /// Load the explicit config, or `sdvgen.toml` in `dir` when present, or
    /// the defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let candidate = dir.join(DEFAULT_CONFIG_FILE);
                if candidate.is_file() {
                    Self::from_file(&candidate)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the config
    pub fn validate(&self) -> Result<()> {
        if let Some(package) = &self.idl.package {
            validate_package("idl.package", package)?;
        }
        if let Some(package) = &self.bridge.java_package {
            validate_package("bridge.java_package", package)?;
        }
        if let Some(version) = &self.bridge.jni_version {
            validate_jni_version(version)?;
        }
        if let Some(library) = &self.bridge.library
            && library.trim().is_empty()
        {
            anyhow::bail!("bridge.library cannot be empty");
        }
        if !LOG_LEVELS.contains(&self.output.log_level.as_str()) {
            anyhow::bail!(
                "Invalid output.log_level '{}' (expected one of {})",
                self.output.log_level,
                LOG_LEVELS.join(", ")
            );
        }
        Ok(())
    }

    /// Bridge options with `java_package` taken from the flag when given
    pub fn bridge_options(&self, java_package: Option<&str>) -> Result<BridgeOptions> {
        let package = java_package
            .map(str::to_string)
            .or_else(|| self.bridge.java_package.clone())
            .context("No Java package: pass --java-package or set bridge.java_package")?;
        validate_package("--java-package", &package)?;

        let mut options = BridgeOptions::new(package);
        options.jni_version = self
            .bridge
            .jni_version
            .clone()
            .unwrap_or_else(|| DEFAULT_JNI_VERSION.to_string());
        options.library = self.bridge.library.clone();
        Ok(options)
    }

    /// IDL package, flag first
    pub fn package(&self, flag: Option<&str>) -> Result<Option<String>> {
        let package = flag.map(str::to_string).or_else(|| self.idl.package.clone());
        if let Some(package) = &package {
            validate_package("--package", package)?;
        }
        Ok(package)
    }

    /// Output root, flag first
    pub fn output_dir(&self, flag: Option<&Path>) -> PathBuf {
        flag.map_or_else(|| self.output.dir.clone(), Path::to_path_buf)
    }
}

/// Check a dotted package name: ASCII letters, digits, and dots, not ending
/// in a dot.
pub fn validate_package(what: &str, package: &str) -> Result<()> {
    if package.is_empty() {
        anyhow::bail!("{what} cannot be empty");
    }
    if !package.chars().all(|c| c.is_ascii_alphanumeric() || c == '.') {
        anyhow::bail!("{what} '{package}' may only contain letters, digits, and dots");
    }
    if package.starts_with('.') || package.ends_with('.') || package.contains("..") {
        anyhow::bail!("{what} '{package}' has an empty segment");
    }
    Ok(())
}

fn validate_jni_version(version: &str) -> Result<()> {
    if !JNI_VERSIONS.contains(&version) {
        anyhow::bail!(
            "Invalid bridge.jni_version '{version}' (expected one of {})",
            JNI_VERSIONS.join(", ")
        );
    }
    Ok(())
}
