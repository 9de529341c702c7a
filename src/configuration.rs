use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{error::ContextError, fonts::CjkFontSource};

/// The settings of a generation run, read from an optional JSON file. Every field has a
/// default so that a partial file is enough.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfiguration {
    /// Where the PDF files are written, created if missing.
    pub output_directory: PathBuf,
    /// The face used for the Chinese guides.
    pub cjk_font: CjkFontSource,
    pub document_author: String,
}

impl Default for GeneratorConfiguration {
    fn default() -> Self {
        GeneratorConfiguration {
            output_directory: PathBuf::from("output"),
            cjk_font: CjkFontSource::default(),
            document_author: "Driveby Africa".to_string(),
        }
    }
}

impl GeneratorConfiguration {
    pub fn from_path(configuration_file_path: &Path) -> Result<Self, ContextError> {
        let configuration_file_contents = std::fs::read_to_string(configuration_file_path)
            .map_err(|error| ContextError::io("Failed to read the configuration file", &error))?;
        let configuration: GeneratorConfiguration =
            serde_json::from_str(&configuration_file_contents).map_err(|error| {
                ContextError::with_error("Failed to parse the configuration file", &error)
                    .of_kind(crate::error::ErrorKind::Content)
            })?;

        log::debug!("Loaded the configuration {:?}", configuration);
        Ok(configuration)
    }

    /// The path of a generated file.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_directory.join(file_name)
    }
}
