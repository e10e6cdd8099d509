use std::path::PathBuf;

use thiserror::Error;

use crate::host::{Action, TriggerError};

/// The primary error type that can be produced by mergetag.
#[derive(Debug, Error)]
pub enum Error {
    #[error("object property names must be strings")]
    ObjectKeysMustBeStrings,
    #[error("I/O error {0}: {1}")]
    Io(String, std::io::Error),
    #[error("failed to load data from file {0}: {1}")]
    LoadFromFile(PathBuf, Box<Error>),
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("cannot determine file type of file: {0}")]
    CannotDetermineFileType(PathBuf),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),
    #[error("expected {0} to contain an object or an array of objects")]
    NotRows(String),
    #[error("path has no parent directory: {0}")]
    PathMissingParent(PathBuf),
    #[error("failed to compile variable pattern: {0}")]
    VariablePattern(#[from] regex::Error),
    #[error("invalid output pattern \"{0}\": {1}")]
    OutputPattern(String, Box<handlebars::TemplateError>),
    #[error("failed to render output pattern \"{0}\": {1}")]
    TemplateRender(String, Box<handlebars::RenderError>),
    #[error("variable \"{0}\" has no default value")]
    MissingDefaultValue(String),
    #[error("{0} failed: {1}")]
    Trigger(Action, TriggerError),
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("no file selected")]
    NoFileSelected,
    #[error("unsupported image file: {0}")]
    UnsupportedImage(String),
}
