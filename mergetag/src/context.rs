use log::{debug, error};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::host::{Action, Modal, Severity, Triggers, Ui};
use crate::{Error, Settings, Store};

/// Execution context for the builder's event handlers.
///
/// Owns the host capabilities and the named state store. Each handler runs
/// to completion, awaiting host actions one after another, and never
/// retries: a failure ends the current user action.
pub struct Context<T, U> {
    triggers: T,
    ui: U,
    store: Store,
    settings: Settings,
    // Hash of the template content last loaded into the editor.
    loaded_template_hash: Option<String>,
}

impl<T: Triggers, U: Ui> Context<T, U> {
    /// Constructor.
    pub fn new(triggers: T, ui: U, settings: Settings) -> Self {
        Self {
            triggers,
            ui,
            store: Store::default(),
            settings,
            loaded_template_hash: None,
        }
    }

    /// Replaces the store, e.g. to resume from state the host persisted.
    pub fn with_store(mut self, store: Store) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn triggers(&self) -> &T {
        &self.triggers
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub(crate) fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    pub(crate) fn loaded_template_hash(&self) -> Option<&str> {
        self.loaded_template_hash.as_deref()
    }

    pub(crate) fn set_loaded_template_hash(&mut self, hash: String) {
        self.loaded_template_hash = Some(hash);
    }

    /// Runs a remote action.
    pub(crate) async fn run(&mut self, action: Action) -> Result<JsonValue, Error> {
        debug!("Running {}", action);
        self.triggers
            .run(action)
            .await
            .map_err(|e| Error::Trigger(action, e))
    }

    /// Runs `action`, closes `modal` once it succeeded, then re-runs
    /// `refresh` so the affected listing picks up the change.
    pub(crate) async fn submit(
        &mut self,
        action: Action,
        modal: Option<Modal>,
        refresh: Action,
    ) -> Result<JsonValue, Error> {
        let response = self.run(action).await?;
        if let Some(modal) = modal {
            self.ui.close_modal(modal);
        }
        self.run(refresh).await?;
        Ok(response)
    }

    pub(crate) fn store_value<K, V>(&mut self, key: K, value: V) -> Result<(), Error>
    where
        K: AsRef<str>,
        V: Serialize,
    {
        debug!("Storing {}", key.as_ref());
        self.store.set(key, value)?;
        Ok(())
    }

    pub(crate) fn alert(&mut self, message: &str, severity: Severity) {
        self.ui.show_alert(message, severity);
    }

    /// Logs a failed handler under `tag` and tells the user about it.
    pub(crate) fn surface<R>(
        &mut self,
        tag: &str,
        message: &str,
        result: Result<R, Error>,
    ) -> Result<R, Error> {
        result.map_err(|e| {
            error!("{}: {}", tag, e);
            self.ui.show_alert(message, Severity::Error);
            e
        })
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;

    use serde_json::Value as JsonValue;

    use crate::host::{Action, Modal, Severity, TriggerError, Triggers, Ui, Widget};

    /// Replies to actions with canned responses and records every call.
    #[derive(Debug, Default)]
    pub struct FakeTriggers {
        pub responses: HashMap<Action, Result<JsonValue, TriggerError>>,
        pub calls: Vec<Action>,
    }

    impl FakeTriggers {
        pub fn respond(mut self, action: Action, response: JsonValue) -> Self {
            self.responses.insert(action, Ok(response));
            self
        }

        pub fn fail(mut self, action: Action, err: TriggerError) -> Self {
            self.responses.insert(action, Err(err));
            self
        }
    }

    impl Triggers for FakeTriggers {
        async fn run(&mut self, action: Action) -> Result<JsonValue, TriggerError> {
            self.calls.push(action);
            self.responses
                .get(&action)
                .cloned()
                .unwrap_or(Ok(JsonValue::Null))
        }
    }

    #[derive(Debug, Default)]
    pub struct FakeUi {
        pub closed: Vec<Modal>,
        pub alerts: Vec<(String, Severity)>,
        pub texts: Vec<(Widget, String)>,
    }

    impl Ui for FakeUi {
        fn close_modal(&mut self, modal: Modal) {
            self.closed.push(modal);
        }

        fn show_alert(&mut self, message: &str, severity: Severity) {
            self.alerts.push((message.to_string(), severity));
        }

        fn set_text(&mut self, widget: Widget, text: &str) {
            self.texts.push((widget, text.to_string()));
        }
    }
}

#[cfg(test)]
mod test {
    use super::fake::{FakeTriggers, FakeUi};
    use super::*;
    use crate::host::TriggerError;
    use serde_json::json;

    fn context(triggers: FakeTriggers) -> Context<FakeTriggers, FakeUi> {
        Context::new(triggers, FakeUi::default(), Settings::default())
    }

    #[tokio::test]
    async fn submit_closes_modal_and_refreshes() {
        let mut ctx = context(FakeTriggers::default().respond(Action::ListsCreate, json!({ "list_id": 3 })));
        let response = ctx
            .submit(Action::ListsCreate, Some(Modal::NewUserList), Action::Lists)
            .await
            .unwrap();
        assert_eq!(response, json!({ "list_id": 3 }));
        assert_eq!(ctx.triggers().calls, vec![Action::ListsCreate, Action::Lists]);
        assert_eq!(ctx.ui().closed, vec![Modal::NewUserList]);
    }

    #[tokio::test]
    async fn failed_submit_leaves_modal_open() {
        let mut ctx = context(
            FakeTriggers::default().fail(Action::CampaignsCreate, TriggerError::new("timeout")),
        );
        let result = ctx
            .submit(Action::CampaignsCreate, Some(Modal::NewCampaign), Action::Campaigns)
            .await;
        assert!(matches!(result, Err(Error::Trigger(Action::CampaignsCreate, _))));
        assert!(ctx.ui().closed.is_empty());
        assert_eq!(ctx.triggers().calls, vec![Action::CampaignsCreate]);
    }

    #[test]
    fn surface_alerts_on_error_only() {
        let mut ctx = context(FakeTriggers::default());
        assert_eq!(ctx.surface("tag", "boom", Ok::<_, Error>(1)).unwrap(), 1);
        assert!(ctx.ui().alerts.is_empty());
        let result: Result<(), Error> = ctx.surface("tag", "boom", Err(Error::NoFileSelected));
        assert!(result.is_err());
        assert_eq!(ctx.ui().alerts, vec![("boom".to_string(), Severity::Error)]);
    }

    #[test]
    fn resumed_store_is_kept_and_overwritten() {
        let store = Store::default()
            .with("import_list_id", 7)
            .unwrap()
            .with("TemplateChanged", true)
            .unwrap();
        let mut ctx = context(FakeTriggers::default()).with_store(store);
        assert_eq!(ctx.store().get("import_list_id"), Some(&json!(7)));
        ctx.store_value("TemplateChanged", false).unwrap();
        assert_eq!(ctx.store().get("TemplateChanged"), Some(&json!(false)));
    }
}
