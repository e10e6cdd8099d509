//! Handlers for the campaign screen.

use time::{macros::format_description, Date};

use crate::host::{Action, Modal, Triggers, Ui, Variant};
use crate::{Context, Error, Value};

impl<T: Triggers, U: Ui> Context<T, U> {
    pub async fn create_campaign(&mut self) -> Result<(), Error> {
        let result = self
            .submit(Action::CampaignsCreate, Some(Modal::NewCampaign), Action::Campaigns)
            .await;
        self.surface(
            Action::CampaignsCreate.name(),
            "Failed to create the campaign, please try again later.",
            result,
        )?;
        Ok(())
    }

    pub async fn create_variant(&mut self) -> Result<(), Error> {
        let result = self
            .submit(
                Action::CampaignVariantsCreate,
                Some(Modal::AbTestVariant),
                Action::CampaignVariants,
            )
            .await;
        self.surface(
            Action::CampaignVariantsCreate.name(),
            "Failed to create the A/B test variant, please try again later.",
            result,
        )?;
        Ok(())
    }

    pub async fn update_variant(&mut self) -> Result<(), Error> {
        let result = self
            .submit(
                Action::CampaignVariantUpdate,
                Some(Modal::AbTestVariantUpdate),
                Action::CampaignVariants,
            )
            .await;
        self.surface(
            Action::CampaignVariantUpdate.name(),
            "Failed to update the A/B test variant, please try again later.",
            result,
        )?;
        Ok(())
    }

    pub async fn delete_variant(&mut self) -> Result<(), Error> {
        let result = self
            .submit(
                Action::CampaignVariantDelete,
                Some(Modal::DeleteVariant),
                Action::CampaignVariants,
            )
            .await;
        self.surface(
            Action::CampaignVariantDelete.name(),
            "Failed to delete the A/B test variant, please try again later.",
            result,
        )?;
        Ok(())
    }

    /// Schedules the campaign. Failures are returned to the caller without
    /// notifying the user.
    pub async fn schedule_email(&mut self) -> Result<(), Error> {
        self.run(Action::CampaignsSchedule).await?;
        self.ui_mut().close_modal(Modal::CampaignSchedule);
        Ok(())
    }

    pub async fn test_email(&mut self) -> Result<(), Error> {
        let result = self.run(Action::GenerateTestEmails).await;
        self.surface(
            Action::GenerateTestEmails.name(),
            "Something went wrong, please try again later.",
            result,
        )?;
        self.ui_mut().close_modal(Modal::CampaignTestEmail);
        Ok(())
    }
}

/// The share of recipients (in percent) still available to the variant
/// `current` once every other variant's share is taken out.
pub fn left_percentage(current: &Value, variants: &[Variant]) -> f64 {
    let current = current.to_string();
    variants
        .iter()
        .filter(|variant| variant.variant_id.to_string() != current)
        .fold(100.0, |left, variant| left - variant.user_percentage)
}

/// The day after `today`, formatted as `YYYY-MM-DD`.
pub fn tomorrow(today: Date) -> Option<String> {
    let next = today.next_day()?;
    next.format(format_description!("[year]-[month]-[day]")).ok()
}
