use shared::{
    domain::{Control, ControlPatch},
    error::{ApiError, ApiException, ErrorCode},
    protocol::{deleted_item_message, no_updates_message, put_item_message, updated_item_message},
};
use storage::{InsertOutcome, Storage, UpdateOutcome};
use tracing::{debug, info};

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_controls(ctx: &ApiContext) -> Result<Vec<Control>, ApiError> {
    ctx.storage.list_controls().await.map_err(internal)
}

pub async fn get_control(ctx: &ApiContext, main_id: &str) -> Result<Option<Control>, ApiError> {
    ctx.storage.get_control(main_id).await.map_err(internal)
}

pub async fn create_control(ctx: &ApiContext, control: Control) -> Result<String, ApiError> {
    let missing = control.missing_fields();
    if !missing.is_empty() {
        return Err(ApiException::missing_fields(&missing).into());
    }

    match ctx
        .storage
        .insert_control(&control)
        .await
        .map_err(internal)?
    {
        InsertOutcome::Inserted => {
            info!(main_id = %control.main_id, "control created");
            Ok(put_item_message(&control.main_id))
        }
        InsertOutcome::Duplicate => Err(ApiException::duplicate(&control.main_id).into()),
    }
}

/// Applies the provided fields. A `mainID` in the body that differs from the
/// addressed id (ignoring case) renames the control.
pub async fn update_control(
    ctx: &ApiContext,
    main_id: &str,
    mut patch: ControlPatch,
) -> Result<String, ApiError> {
    let rename_to = patch
        .main_id
        .take()
        .filter(|new_id| !new_id.eq_ignore_ascii_case(main_id));

    if rename_to.as_deref().is_some_and(str::is_empty) {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "mainID must not be empty",
        ));
    }
    if rename_to.is_none() && patch.is_empty() {
        debug!(%main_id, "update without attribute changes");
        return Ok(no_updates_message(main_id));
    }
    patch.main_id = rename_to.clone();

    match ctx
        .storage
        .update_control(main_id, &patch)
        .await
        .map_err(internal)?
    {
        UpdateOutcome::Updated => {
            info!(%main_id, renamed_to = ?rename_to, "control updated");
            Ok(updated_item_message(main_id))
        }
        UpdateOutcome::NotFound => Err(ApiException::not_found(main_id).into()),
        UpdateOutcome::Conflict => {
            let target = rename_to.as_deref().unwrap_or(main_id);
            Err(ApiException::duplicate(target).into())
        }
    }
}

pub async fn delete_control(ctx: &ApiContext, main_id: &str) -> Result<String, ApiError> {
    let removed = ctx
        .storage
        .delete_control(main_id)
        .await
        .map_err(internal)?;
    info!(%main_id, removed, "control deleted");
    Ok(deleted_item_message(main_id))
}

fn internal(e: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, format!("An error occurred: {e:#}"))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
