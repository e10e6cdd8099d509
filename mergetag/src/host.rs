//! The interface between mergetag and the low-code host it runs inside.
//!
//! The host owns network access, modal dialogs, notifications and widget
//! state. Handlers only ever reach these through the traits and snapshot
//! types defined here, so they can be driven by fakes in tests.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::Value;

/// Every named remote action the handlers may trigger on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    Lists,
    ListsCreate,
    ImportsCreateTask,
    ImportsPreview,
    Campaigns,
    CampaignsCreate,
    CampaignsSchedule,
    CampaignVariants,
    CampaignVariantsCreate,
    CampaignVariantUpdate,
    CampaignVariantDelete,
    GenerateTestEmails,
    GenerateEmail,
    ExtractTemplateVariables,
    UploadImage,
    Templates,
    TemplatesCreate,
    TemplatesLoad,
    TemplatesDelete,
    TemplatesUpdateTable,
    TemplatesUpdateButton,
}

impl Action {
    /// The name under which the host knows this action. Also used to tag log
    /// lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lists => "lists",
            Self::ListsCreate => "lists_create",
            Self::ImportsCreateTask => "imports_create_task",
            Self::ImportsPreview => "imports_preview",
            Self::Campaigns => "campaigns",
            Self::CampaignsCreate => "campaigns_create",
            Self::CampaignsSchedule => "campaigns_schedule",
            Self::CampaignVariants => "campaign_variants",
            Self::CampaignVariantsCreate => "campaign_variants_create",
            Self::CampaignVariantUpdate => "campaign_variant_update",
            Self::CampaignVariantDelete => "campaign_variant_delete",
            Self::GenerateTestEmails => "generate_test_emails",
            Self::GenerateEmail => "generate_email",
            Self::ExtractTemplateVariables => "extract_template_variables",
            Self::UploadImage => "upload_image",
            Self::Templates => "templates",
            Self::TemplatesCreate => "templates_create",
            Self::TemplatesLoad => "templates_load",
            Self::TemplatesDelete => "templates_delete",
            Self::TemplatesUpdateTable => "templates_update_table",
            Self::TemplatesUpdateButton => "templates_update_button",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Modal dialogs the handlers close once their action has gone through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modal {
    NewUserList,
    NewCampaign,
    AbTestVariant,
    AbTestVariantUpdate,
    DeleteVariant,
    CampaignSchedule,
    CampaignTestEmail,
    DeleteTemplate,
}

impl Modal {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewUserList => "ModalNewUserList",
            Self::NewCampaign => "ModalNewCampaign",
            Self::AbTestVariant => "ModalABTestVariant",
            Self::AbTestVariantUpdate => "ModalABTestVariantUpdate",
            Self::DeleteVariant => "ModalDeleteVariant",
            Self::CampaignSchedule => "ModalCampaignSchedule",
            Self::CampaignTestEmail => "ModalCampaignTestEmail",
            Self::DeleteTemplate => "ModalDeleteTemplate",
        }
    }
}

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Success,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Success => "success",
            Self::Info => "info",
        }
    }
}

/// Text widgets whose value the handlers write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Widget {
    TemplateSubject,
    TemplateTestSubject,
}

impl Widget {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TemplateSubject => "InputTemplateSubject",
            Self::TemplateTestSubject => "InputTemplateTestSubject",
        }
    }
}

/// A rejected remote action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TriggerError {
    pub message: String,
    /// Backend-supplied explanation, when the response body carried one.
    pub detail: Option<String>,
}

impl TriggerError {
    pub fn new<M: Into<String>>(message: M) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail<D: Into<String>>(mut self, detail: D) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Runs the host's named remote actions.
///
/// Each call resolves with the action's JSON response or rejects with a
/// [`TriggerError`]. Retries and timeouts, if any, are the host's business.
#[allow(async_fn_in_trait)]
pub trait Triggers {
    async fn run(&mut self, action: Action) -> Result<JsonValue, TriggerError>;
}

/// Fire-and-forget user interface operations.
pub trait Ui {
    fn close_modal(&mut self, modal: Modal);

    fn show_alert(&mut self, message: &str, severity: Severity);

    fn set_text(&mut self, widget: Widget, text: &str);
}

/// A file chosen in a file-picker widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickedFile {
    #[serde(default)]
    pub name: String,
}

/// Snapshot of a file-picker widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePicker {
    #[serde(default)]
    pub files: Vec<PickedFile>,
}

/// Snapshot of the import form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportForm {
    pub sql: String,
    pub extract_enabled: bool,
    pub extract_prompt: String,
}

/// Snapshot of the template editor: the template's name, its subject line
/// and its (HTML) body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEditor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

/// One row of the campaign's A/B test variant table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub variant_id: Value,
    #[serde(default)]
    pub user_percentage: f64,
}
