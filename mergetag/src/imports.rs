//! Handlers for the import-list screen.

use log::warn;
use serde_json::Value as JsonValue;

use crate::host::{Action, ImportForm, Modal, Severity, Triggers, Ui};
use crate::{Context, Error};

impl<T: Triggers, U: Ui> Context<T, U> {
    /// Creates a user list, then starts an import task into it.
    pub async fn create_list(&mut self) -> Result<(), Error> {
        let result = self.try_create_list().await;
        self.surface(
            Action::ListsCreate.name(),
            "Failed to create the list, please try again later.",
            result,
        )
    }

    async fn try_create_list(&mut self) -> Result<(), Error> {
        let response = self.run(Action::ListsCreate).await?;
        let list_id = response.get("list_id").cloned().unwrap_or(JsonValue::Null);
        self.store_value("import_list_id", list_id)?;
        self.run(Action::ImportsCreateTask).await?;
        self.run(Action::Lists).await?;
        self.ui_mut().close_modal(Modal::NewUserList);
        Ok(())
    }

    /// Previews an import and checks that it yields every required column.
    ///
    /// Returns whether all required columns were present. Failures of the
    /// preview action itself are returned without notifying the user.
    pub async fn preview_import(&mut self, form: &ImportForm) -> Result<bool, Error> {
        self.store_value("import_columns_is_good", true)?;
        self.store_value("TestSQL", &form.sql)?;
        let prompt = if form.extract_enabled {
            Some(form.extract_prompt.as_str())
        } else {
            None
        };
        self.store_value("InputExtractPrompt", prompt)?;

        let response = self.run(Action::ImportsPreview).await?;
        let columns = response
            .get("columns")
            .and_then(JsonValue::as_array)
            .map(|columns| {
                columns
                    .iter()
                    .filter_map(|c| c.as_str().map(ToString::to_string))
                    .collect::<Vec<String>>()
            })
            .unwrap_or_default();
        let missing = self.settings().missing_columns(&columns);
        if missing.is_empty() {
            return Ok(true);
        }
        warn!("{}", Error::MissingColumns(missing));
        let message = format!(
            "{} are must-have columns. Some are missing",
            self.settings().required_columns.join(",")
        );
        self.alert(&message, Severity::Error);
        self.store_value("import_columns_is_good", false)?;
        Ok(false)
    }
}
