//! Loading of rows, variable tables and templates from the file system.

use std::{fs, path::Path};

use eyre::{Result, WrapErr};
use log::debug;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

use crate::host::TemplateEditor;
use crate::overlay::{VariableMap, VariableTable};
use crate::{Error, Row, Value};

/// Interprets a loaded value as rows: either an array of objects or a single
/// object.
pub fn rows_from_value<S: AsRef<str>>(origin: S, value: Value) -> Result<Vec<Row>, Error> {
    match value {
        Value::Map(m) => Ok(vec![m]),
        Value::Array(arr) => arr
            .into_iter()
            .map(|v| {
                v.into_map()
                    .ok_or_else(|| Error::NotRows(origin.as_ref().to_string()))
            })
            .collect(),
        _ => Err(Error::NotRows(origin.as_ref().to_string())),
    }
}

/// Loads rows from every file matching the given glob pattern, in path order.
pub fn load_rows(pattern: &str) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    for entry_result in glob::glob(pattern)? {
        let entry = entry_result?;
        if entry.is_file() {
            let value = Value::load_from_file(&entry)?;
            let loaded = rows_from_value(entry.display().to_string(), value)?;
            debug!("Loaded {} row(s) from {}", loaded.len(), entry.display());
            rows.extend(loaded);
        }
    }
    Ok(rows)
}

fn load_as<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let value = Value::load_from_file(path)?;
    serde_json::from_value(JsonValue::from(value))
        .wrap_err_with(|| format!("unexpected data layout in {}", path.display()))
}

/// Loads a variables grid snapshot (`tableData` and `updatedRows`).
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<VariableTable> {
    load_as(path)
}

/// Loads a flat name-to-value map.
pub fn load_variables<P: AsRef<Path>>(path: P) -> Result<VariableMap> {
    load_as(path)
}

fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    for delim in ["---\n", "---\r\n"] {
        if let Some(rest) = content.strip_prefix(delim) {
            if let Some(end) = rest.find(delim) {
                return (Some(&rest[..end]), &rest[end + delim.len()..]);
            }
        }
    }
    (None, content)
}

// Given a template file that looks as follows:
//
// ```
// ---
// name: Welcome
// subject: Hi {{ first_name || 'there' }}
// ---
// <p>Welcome aboard, {{ first_name }}!</p>
// ```
//
// produces an editor snapshot with the front matter's name and subject and
// everything after the front matter as the body.
pub fn parse_template(content: &str) -> Result<TemplateEditor> {
    let (maybe_front_matter, body) = split_front_matter(content);
    let mut editor = match maybe_front_matter {
        Some(front_matter) => {
            let yaml = serde_yaml::from_str::<YamlValue>(front_matter)?;
            let value = Value::try_from(yaml)?;
            serde_json::from_value::<TemplateEditor>(JsonValue::from(value))
                .wrap_err("template front matter must be an object")?
        }
        None => TemplateEditor::default(),
    };
    editor.body = body.to_string();
    Ok(editor)
}

pub fn load_template<P: AsRef<Path>>(path: P) -> Result<TemplateEditor> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Io(format!("while trying to read from {}", path.display()), e))?;
    parse_template(&content).wrap_err_with(|| format!("failed to parse template {}", path.display()))
}
