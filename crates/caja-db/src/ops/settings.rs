//! # Settings Operation
//!
//! Business profile edits. Settings have no queue entry: the push protocol
//! uploads the singleton row unconditionally at the end of every cycle.

use chrono::Utc;

use crate::notify::ReplicationNotifier;
use crate::ops::OpResult;
use crate::pool::Database;
use crate::repository::{audit, settings};
use caja_core::validation::{validate_phone, validate_required};
use caja_core::{AuditAction, BusinessContext, BusinessSettings, BusinessStatus, CoreError, SyncStatus};

/// Editable settings fields.
#[derive(Debug, Clone)]
pub struct SettingsEdit {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub receipt_message: Option<String>,
}

/// Updates the business settings singleton.
pub async fn update_settings(
    db: &Database,
    notifier: &ReplicationNotifier,
    ctx: &BusinessContext,
    edit: SettingsEdit,
) -> OpResult<BusinessSettings> {
    validate_required("name", &edit.name).map_err(CoreError::from)?;
    if let Some(phone) = &edit.phone {
        validate_phone(phone).map_err(CoreError::from)?;
    }

    let now = Utc::now();
    let mut tx = db.begin().await?;

    // Preserve the remote-owned status field if a row already exists.
    let status = settings::get_settings(&mut tx, &ctx.business_id)
        .await?
        .map(|s| s.status)
        .unwrap_or(BusinessStatus::Active);

    let updated = BusinessSettings {
        business_id: ctx.business_id.clone(),
        name: edit.name,
        address: edit.address,
        phone: edit.phone,
        receipt_message: edit.receipt_message,
        status,
        sync_status: SyncStatus::PendingUpdate,
        updated_at: now,
    };

    settings::upsert_settings(&mut tx, &updated).await?;

    audit::log_action(
        &mut tx,
        ctx,
        AuditAction::UpdateSettings,
        serde_json::json!({ "name": updated.name }),
    )
    .await?;

    tx.commit().await?;

    notifier.notify();
    Ok(updated)
}
