//! Rendering of templates against sample recipient profiles.

use std::fs;
use std::path::Path;

use eyre::Result;
use handlebars::Handlebars;
use log::{debug, info};
use serde_json::Value as JsonValue;

use crate::fs::ensure_parent_path_exists;
use crate::overlay::VariableMap;
use crate::settings::TestFields;
use crate::template::fill_template;
use crate::{Error, Row, Value};

/// The field identifying a sample profile within its list.
pub const LIST_PROFILE_ID: &str = "list_profile_id";

/// A template rendered for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRender {
    pub subject: String,
    pub body: String,
}

/// Finds the sample profile whose identifier equals `selected` once both
/// are compared as text. If several match, the last one wins.
pub fn find_profile<'a>(samples: &'a [Row], selected: &str) -> Option<&'a Row> {
    samples
        .iter()
        .rev()
        .find(|profile| {
            profile
                .get(LIST_PROFILE_ID)
                .map(|id| !id.is_null() && id.to_string() == selected)
                .unwrap_or(false)
        })
}

/// The variables available when rendering for `profile`: its own fields plus
/// the synthetic campaign fields.
pub fn profile_variables(profile: &Row, fields: &TestFields) -> VariableMap {
    let mut vars = profile.clone();
    fields.apply(&mut vars);
    vars
}

/// Renders `subject` and `body` for the selected sample profile.
///
/// Returns `None` when nothing is selected or no profile matches.
pub fn test_render(
    subject: &str,
    body: &str,
    selected: &str,
    samples: &[Row],
    fields: &TestFields,
) -> Option<TestRender> {
    if selected.is_empty() {
        return None;
    }
    let profile = match find_profile(samples, selected) {
        Some(profile) => profile,
        None => {
            info!("No sample profile found for {}", selected);
            return None;
        }
    };
    let vars = profile_variables(profile, fields);
    let rendered = TestRender {
        subject: fill_template(subject, &vars),
        body: fill_template(body, &vars),
    };
    debug!("Test subject for {}: {}", selected, rendered.subject);
    Some(rendered)
}

/// Renders a preview file for every sample profile.
///
/// Output paths come from `output_pattern`, a
/// [Handlebars](https://handlebarsjs.com/) template evaluated against the
/// profile's variables; relative paths are resolved against
/// `output_base_path`. Each file holds the rendered subject line followed by
/// the rendered body. Returns the number of files written.
pub fn render_previews(
    subject: &str,
    body: &str,
    samples: &[Row],
    fields: &TestFields,
    output_pattern: &str,
    output_base_path: &Path,
) -> Result<u64> {
    let mut hb = Handlebars::new();
    hb.register_escape_fn(handlebars::no_escape);
    hb.set_strict_mode(true);
    hb.register_template_string("output-pattern", output_pattern)
        .map_err(|e| Error::OutputPattern(output_pattern.to_string(), Box::new(e)))?;

    let mut output_count = 0_u64;
    for profile in samples {
        let vars = profile_variables(profile, fields);
        let data = JsonValue::from(Value::Map(vars.clone()));
        let output_path = hb
            .render("output-pattern", &data)
            .map_err(|e| Error::TemplateRender(output_pattern.to_string(), Box::new(e)))?;
        let output_path = output_base_path.join(output_path);
        ensure_parent_path_exists(&output_path)?;
        let rendered = format!(
            "Subject: {}\n\n{}",
            fill_template(subject, &vars),
            fill_template(body, &vars)
        );
        fs::write(&output_path, rendered)
            .map_err(|e| Error::Io(format!("while writing {}", output_path.display()), e))?;
        debug!("Generated preview {}", output_path.display());
        output_count += 1;
    }
    Ok(output_count)
}
