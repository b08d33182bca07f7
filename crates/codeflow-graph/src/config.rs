//! Scan configuration.
//!
//! Every well-known name the engine looks for lives here, so a codebase
//! built on a different framework only needs a different config file.
//! Defaults follow Spring conventions.

use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Directory holding project-local settings.
pub const CONFIG_DIR: &str = ".codeflow";

/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.json";

/// Names and switches that drive a graph build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Root marker annotation; its closure defines "component".
    pub root_marker: String,

    /// Annotation on factory methods whose return types are components.
    pub factory_marker: String,

    /// Marker interface every repository extends.
    pub repository_interface: String,

    /// Interface whose methods publish messages.
    pub publish_operations: String,

    /// Channel type whose users take part in messaging.
    pub message_channel: String,

    /// Annotation on inbound messaging handler methods.
    pub endpoint_marker: String,

    /// Attribute of [`endpoint_marker`](Self::endpoint_marker) naming the inbound channel.
    pub input_channel_attribute: String,

    /// Simple-name suffixes that identify test classes.
    pub test_suffixes: Vec<String>,

    /// Path segments that put a source file under test code.
    pub test_path_segments: Vec<String>,

    pub controller_suffix: String,
    pub config_suffix: String,
    pub repository_suffix: String,

    /// Keep test nodes in the rendered output (muted).
    pub show_tests: bool,

    /// Keep configuration nodes in the rendered output (muted).
    pub show_config: bool,

    /// Classify message publishers as repositories instead of pub/sub
    /// participants, reproducing the historical styling.
    pub publishers_as_repositories: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root_marker: "org.springframework.stereotype.Component".into(),
            factory_marker: "org.springframework.context.annotation.Bean".into(),
            repository_interface: "org.springframework.data.repository.Repository".into(),
            publish_operations: "com.google.cloud.spring.pubsub.core.PubSubOperations".into(),
            message_channel: "org.springframework.messaging.MessageChannel".into(),
            endpoint_marker: "org.springframework.integration.annotation.ServiceActivator".into(),
            input_channel_attribute: "inputChannel".into(),
            test_suffixes: [
                "Test",
                "Tests",
                "TestCase",
                "IT",
                "ITCase",
                "IntegrationTest",
                "AT",
                "AcceptanceTest",
                "E2E",
                "E2ETest",
                "EndToEndTest",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            test_path_segments: vec!["test".into(), "it".into(), "at".into()],
            controller_suffix: "Controller".into(),
            config_suffix: "Configuration".into(),
            repository_suffix: "Repository".into(),
            show_tests: false,
            show_config: false,
            publishers_as_repositories: false,
        }
    }
}

impl ScanConfig {
    /// Loads a config file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| GraphError::config_io(path, e))?;
        serde_json::from_str(&json).map_err(|source| GraphError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `<root>/.codeflow/config.json` if it exists, else defaults.
    pub fn discover<P: AsRef<Path>>(root: P) -> Result<Self> {
        let path = root.as_ref().join(CONFIG_DIR).join(CONFIG_FILE);
        if path.exists() {
            debug!("Using config {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Writes the config as pretty JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// True when a simple class name looks like a test.
    pub fn is_test_name(&self, simple_name: &str) -> bool {
        self.test_suffixes
            .iter()
            .any(|suffix| simple_name.len() > suffix.len() && simple_name.ends_with(suffix.as_str()))
    }

    /// True when a source path lies under a test directory.
    pub fn is_test_path(&self, path: &str) -> bool {
        let normalized = format!("/{}", path.replace('\\', "/"));
        self.test_path_segments
            .iter()
            .any(|segment| normalized.contains(&format!("/{}/", segment)))
    }
}
