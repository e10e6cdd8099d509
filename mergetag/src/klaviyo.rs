//! Conversion of placeholder templates into Klaviyo merge tags.

use log::debug;
use regex::{Captures, Regex};

use crate::{overlay::VariableMap, Error, Value};

/// The Klaviyo expression that looks `name` up on the recipient's profile,
/// falling back to `default`.
pub fn merge_tag(name: &str, default: &Value) -> String {
    let escaped = default.to_string().replace('\'', "\\'");
    format!(
        "{{{{ person|lookup:\"{}\"|default:'{}' }}}}",
        name, escaped
    )
}

/// Rewrites every exact `{{name}}` token whose name is a key of `values` into
/// a Klaviyo merge tag carrying that variable's default value.
///
/// An empty template or an empty variable map leaves the template untouched.
/// Every variable the template references must have a default value; a null
/// one is reported before anything is converted. Variables the template never
/// references are not checked. Tokens for unknown names, or written with
/// inner whitespace, are left as they are.
pub fn convert_to_klaviyo(template: &str, values: &VariableMap) -> Result<String, Error> {
    if template.is_empty() || values.is_empty() {
        debug!("Nothing to convert, returning the template unchanged");
        return Ok(template.to_string());
    }
    let names = values
        .keys()
        .map(|name| regex::escape(name))
        .collect::<Vec<String>>()
        .join("|");
    let tokens = Regex::new(&format!(r"\{{\{{({})\}}\}}", names))?;
    if let Some(name) = tokens
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .find(|name| values.get(name).map_or(false, Value::is_null))
    {
        return Err(Error::MissingDefaultValue(name));
    }
    let converted = tokens.replace_all(template, |caps: &Captures| {
        let name = &caps[1];
        debug!("Converting variable {}", name);
        // Only names from `values` can match.
        match values.get(name) {
            Some(default) => merge_tag(name, default),
            None => caps[0].to_string(),
        }
    });
    Ok(converted.into_owned())
}
