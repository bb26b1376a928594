//! Bridge generation options

use crate::naming::to_snake_case;
use serde::{Deserialize, Serialize};

/// JNI version used when none is configured
pub const DEFAULT_JNI_VERSION: &str = "JNI_VERSION_1_6";

/// JNI version constants accepted in configuration
pub const JNI_VERSIONS: &[&str] = &[
    "JNI_VERSION_1_1",
    "JNI_VERSION_1_2",
    "JNI_VERSION_1_4",
    "JNI_VERSION_1_6",
    "JNI_VERSION_1_8",
    "JNI_VERSION_9",
    "JNI_VERSION_10",
    "JNI_VERSION_19",
    "JNI_VERSION_20",
    "JNI_VERSION_21",
];

/// Settings shared by every generated bridge file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeOptions {
    /// Package of the generated Java classes
    pub java_package: String,
    /// JNI version constant requested in `JNI_OnLoad`
    #[serde(default = "default_jni_version")]
    pub jni_version: String,
    /// Native library name passed to `System.loadLibrary`; derived from the
    /// interface name when absent
    #[serde(default)]
    pub library: Option<String>,
}

fn default_jni_version() -> String {
    DEFAULT_JNI_VERSION.to_string()
}

impl BridgeOptions {
    pub fn new(java_package: impl Into<String>) -> Self {
        Self {
            java_package: java_package.into(),
            jni_version: default_jni_version(),
            library: None,
        }
    }

    /// Library loaded by the generated native class for `interface`
    pub fn library_for(&self, interface: &str) -> String {
        match &self.library {
            Some(library) => library.clone(),
            None => format!("{}_bridge", to_snake_case(interface)),
        }
    }
}
