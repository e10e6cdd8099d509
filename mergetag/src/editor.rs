//! Handlers for the template editor screen.

use log::{error, info};
use serde_json::Value as JsonValue;

use crate::hash::content_hash;
use crate::host::{Action, FilePicker, Modal, Severity, TemplateEditor, Triggers, Ui, Widget};
use crate::klaviyo::convert_to_klaviyo;
use crate::overlay::VariableTable;
use crate::preview::{test_render, TestRender};
use crate::{Context, Error, Row};

const GENERIC_FAILURE: &str = "Generation failed, please try again later.";

impl<T: Triggers, U: Ui> Context<T, U> {
    /// Converts the editor's subject and body into Klaviyo syntax, using the
    /// variables table's (edited) default values, and stores the results.
    pub fn generate_klaviyo(
        &mut self,
        table: &VariableTable,
        editor: &TemplateEditor,
    ) -> Result<(), Error> {
        let defaults = table.default_values();
        let converted = convert_to_klaviyo(&editor.body, &defaults).and_then(|body| {
            convert_to_klaviyo(&editor.subject, &defaults).map(|subject| (body, subject))
        });
        let (body, subject) = match converted {
            Ok(converted) => converted,
            Err(e) => {
                error!("generate_klaviyo: {}", e);
                self.alert(&e.to_string(), Severity::Error);
                return Err(e);
            }
        };
        self.store_value("klaviyo_template", body)?;
        self.store_value("klaviyo_subject", subject)?;
        Ok(())
    }

    pub async fn generate_result(&mut self) -> Result<(), Error> {
        let result = self.run(Action::GenerateEmail).await;
        let full = self.surface(Action::GenerateEmail.name(), GENERIC_FAILURE, result)?;
        self.store_value("prompt_full_result", full)
    }

    /// Asks the host to extract the template's variables and publishes them.
    pub async fn extract_keyword(&mut self) -> Result<(), Error> {
        let result = self.run(Action::ExtractTemplateVariables).await;
        let response = self.surface(
            Action::ExtractTemplateVariables.name(),
            GENERIC_FAILURE,
            result,
        )?;
        // Reset first so widgets bound to the list see it change even when
        // the new list is equal to the old one.
        self.store_value("variables", JsonValue::Array(Vec::new()))?;
        let variables = response.get("variables").cloned().unwrap_or(JsonValue::Null);
        self.store_value("variables", variables)
    }

    /// Renders the editor's template for the selected sample profile and
    /// shows the result.
    pub fn test_template(
        &mut self,
        editor: &TemplateEditor,
        selected: &str,
        samples: &[Row],
    ) -> Result<Option<TestRender>, Error> {
        let rendered = test_render(
            &editor.subject,
            &editor.body,
            selected,
            samples,
            &self.settings().test_fields,
        );
        if let Some(rendered) = &rendered {
            self.ui_mut()
                .set_text(Widget::TemplateTestSubject, &rendered.subject);
            self.store_value("RichTextEditorTemplateResult", &rendered.body)?;
        }
        Ok(rendered)
    }

    /// Uploads the first picked image and returns its URL, if the backend
    /// supplied one.
    pub async fn upload_image(&mut self, picker: &FilePicker) -> Result<Option<String>, Error> {
        let file = match picker.files.first() {
            Some(file) => file,
            None => {
                self.alert("Please choose an image first.", Severity::Warning);
                return Err(Error::NoFileSelected);
            }
        };
        if !self.settings().is_allowed_image(&file.name) {
            self.alert("Unsupported file format.", Severity::Error);
            return Err(Error::UnsupportedImage(file.name.clone()));
        }

        let response = match self.run(Action::UploadImage).await {
            Ok(response) => response,
            Err(e) => {
                error!("{}: {}", Action::UploadImage, e);
                let message = match &e {
                    Error::Trigger(_, trigger_err) => trigger_err
                        .detail
                        .as_ref()
                        .map(|detail| format!("Upload failed: {}", detail)),
                    _ => None,
                }
                .unwrap_or_else(|| {
                    "Upload failed, please check your network or the console.".to_string()
                });
                self.alert(&message, Severity::Error);
                return Err(e);
            }
        };

        match response.get("url").and_then(JsonValue::as_str) {
            Some(url) if !url.is_empty() => {
                info!("Uploaded image to {}", url);
                self.alert("Upload succeeded!", Severity::Success);
                self.store_value("upload_image", url)?;
                Ok(Some(url.to_string()))
            }
            _ => {
                self.store_value("upload_image", JsonValue::Null)?;
                self.alert("Upload succeeded, but no URL was returned.", Severity::Info);
                Ok(None)
            }
        }
    }

    pub async fn create_template(&mut self) -> Result<(), Error> {
        self.run(Action::TemplatesCreate).await?;
        self.run(Action::Templates).await?;
        Ok(())
    }

    /// Loads the selected template so it can be saved as a new one.
    pub async fn clone_template(&mut self) -> Result<(), Error> {
        self.run(Action::TemplatesLoad).await?;
        self.run(Action::Templates).await?;
        Ok(())
    }

    pub async fn delete_template_confirmed(&mut self) -> Result<(), Error> {
        self.submit(
            Action::TemplatesDelete,
            Some(Modal::DeleteTemplate),
            Action::Templates,
        )
        .await?;
        Ok(())
    }

    /// Loads the selected template into the editor.
    pub async fn load_template(&mut self) -> Result<(), Error> {
        let template = self.run(Action::TemplatesLoad).await?;
        let subject = template
            .get("subject")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();
        let content = template
            .get("content")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();
        self.ui_mut().set_text(Widget::TemplateSubject, &subject);
        self.set_loaded_template_hash(content_hash(&content));
        self.store_value("RichTextEditorTemplate", content)?;
        self.store_value("TemplateChanged", false)
    }

    /// Saves edits made inline in the templates table.
    pub async fn table_save_template(&mut self) -> Result<(), Error> {
        self.run(Action::TemplatesUpdateTable).await?;
        self.run(Action::Templates).await?;
        Ok(())
    }

    /// Saves the editor's content.
    pub async fn save_template(&mut self) -> Result<(), Error> {
        self.run(Action::TemplatesUpdateButton).await?;
        self.run(Action::Templates).await?;
        Ok(())
    }

    /// Records whether the editor's body differs from the loaded template.
    /// Returns the stored flag.
    pub fn template_changed(&mut self, body: &str) -> Result<bool, Error> {
        let changed = match self.loaded_template_hash() {
            Some(loaded) => loaded != content_hash(body),
            None => true,
        };
        self.store_value("TemplateChanged", changed)?;
        Ok(changed)
    }
}
