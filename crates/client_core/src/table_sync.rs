use std::path::PathBuf;

use shared::domain::{sort_by_main_id, Control};
use tracing::{debug, error, info, warn};

use crate::{
    error::ClientError,
    export::{render_csv, write_csv},
    prompt::Prompt,
    transport::ControlsApi,
    types::{render_table, ControlForm, ControlTable, EditSession},
};

pub const FETCH_FAILED_ALERT: &str = "Error fetching controls. Please check server logs.";
pub const ADD_SUCCEEDED_ALERT: &str = "Control added successfully!";
pub const ADD_UNREACHABLE_ALERT: &str = "Error adding control. Please check server logs.";
pub const CONFIRM_EDIT_PROMPT: &str = "Are you sure you want to update this data?";
pub const LOOKUP_FAILED_ALERT: &str = "Error fetching control. Please check server logs.";
pub const EDIT_LOAD_FAILED_ALERT: &str = "Error fetching control data. Please check server logs.";
pub const FILL_ALL_FIELDS_ALERT: &str = "Please fill in all fields.";
pub const DUPLICATE_ID_ALERT: &str = "Duplicate main ID. Please choose a different one.";
pub const UPDATE_FAILED_ALERT: &str = "Failed to update control";
pub const UPDATE_SUCCEEDED_ALERT: &str = "Control updated successfully.";
pub const NO_ACTIVE_EDIT_ALERT: &str = "No control is being edited.";
pub const CONFIRM_DELETE_PROMPT: &str = "Are you sure you want to delete this control?";
pub const DELETE_SUCCEEDED_ALERT: &str = "Control deleted successfully!";
pub const DELETE_UNREACHABLE_ALERT: &str = "Error deleting control. Please check server logs.";
pub const EDIT_IN_PROGRESS_ALERT: &str = "Finish or cancel the current edit first.";

/// Result of an operation gated by a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Declined,
}

/// Keeps a rendered control table in sync with the `/items` API.
///
/// Every mutation is followed by a full re-fetch of the collection. Failures are
/// reported through the [`Prompt`] and returned; none leaves the table half
/// updated.
pub struct TableSyncClient<A, P> {
    api: A,
    prompt: P,
    controls: Vec<Control>,
    form: ControlForm,
    session: EditSession,
    download_dir: PathBuf,
}

impl<A: ControlsApi, P: Prompt> TableSyncClient<A, P> {
    pub fn new(api: A, prompt: P) -> Self {
        Self {
            api,
            prompt,
            controls: Vec::new(),
            form: ControlForm::default(),
            session: EditSession::Idle,
            download_dir: PathBuf::from("."),
        }
    }

    pub fn with_download_dir(mut self, download_dir: impl Into<PathBuf>) -> Self {
        self.download_dir = download_dir.into();
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Last fetched collection, in display order.
    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn form(&self) -> &ControlForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ControlForm {
        &mut self.form
    }

    pub fn table(&self) -> ControlTable {
        render_table(&self.controls, &self.session)
    }

    pub async fn fetch_and_render(&mut self) -> Result<(), ClientError> {
        match self.api.list_controls().await {
            Ok(mut controls) => {
                sort_by_main_id(&mut controls);
                debug!(count = controls.len(), "rendered controls");
                self.controls = controls;
                Ok(())
            }
            Err(error) => {
                error!(%error, "error fetching controls");
                self.prompt.alert(FETCH_FAILED_ALERT);
                Err(error)
            }
        }
    }

    /// Submits the form as a new control. `mainID` is lowercased first.
    pub async fn create(&mut self) -> Result<(), ClientError> {
        self.ensure_no_active_edit()?;

        let mut control = self.form.to_control();
        control.main_id = control.main_id.to_lowercase();

        if let Err(error) = self.api.create_control(&control).await {
            error!(main_id = %control.main_id, %error, "error adding control");
            let alert = match error.server_message() {
                Some(message) => format!("Error adding control: {message}"),
                None => ADD_UNREACHABLE_ALERT.to_string(),
            };
            self.prompt.alert(&alert);
            return Err(error);
        }

        info!(main_id = %control.main_id, "control added");
        self.prompt.alert(ADD_SUCCEEDED_ALERT);
        self.form.clear();
        self.refresh_after_mutation().await;
        Ok(())
    }

    /// Loads `main_id` into the form and starts an edit session, replacing any
    /// active one. On failure the previous session is kept.
    pub async fn enter_edit(&mut self, main_id: &str) -> Result<Outcome, ClientError> {
        if !self.prompt.confirm(CONFIRM_EDIT_PROMPT) {
            return Ok(Outcome::Declined);
        }

        let previous = std::mem::replace(
            &mut self.session,
            EditSession::Loading {
                main_id: main_id.to_string(),
            },
        );

        let loaded = match self.api.list_controls().await {
            Ok(mut controls) => match controls.iter().find(|c| c.main_id == main_id).cloned() {
                Some(control) => {
                    sort_by_main_id(&mut controls);
                    Ok((controls, control))
                }
                None => Err(ClientError::NotFound(main_id.to_string())),
            },
            Err(error) => Err(error),
        };

        match loaded {
            Ok((controls, control)) => {
                if let Some(replaced) = previous.active_id().filter(|id| *id != main_id) {
                    debug!(%replaced, %main_id, "replacing active edit");
                }
                self.controls = controls;
                self.form.populate(&control);
                self.session = EditSession::Editing {
                    main_id: main_id.to_string(),
                };
                info!(%main_id, "editing control");
                Ok(Outcome::Completed)
            }
            Err(error) => {
                self.session = previous;
                error!(%main_id, %error, "error fetching control data");
                self.prompt.alert(EDIT_LOAD_FAILED_ALERT);
                Err(error)
            }
        }
    }

    /// Sends the form as an update of the control being edited.
    pub async fn submit_edit(&mut self) -> Result<(), ClientError> {
        let EditSession::Editing { main_id } = &self.session else {
            self.prompt.alert(NO_ACTIVE_EDIT_ALERT);
            return Err(ClientError::NoActiveEdit);
        };
        let main_id = main_id.clone();

        let control = self.form.to_control();
        let missing = control.missing_fields();
        if !missing.is_empty() {
            warn!(%main_id, ?missing, "update blocked by empty fields");
            self.prompt.alert(FILL_ALL_FIELDS_ALERT);
            return Err(ClientError::Validation(missing));
        }

        self.session = EditSession::Submitting {
            main_id: main_id.clone(),
        };

        if let Err(error) = self.api.update_control(&control.main_id, &control).await {
            self.session = EditSession::Editing { main_id };
            error!(main_id = %control.main_id, %error, "error updating control");
            let error = if error.is_conflict() {
                ClientError::DuplicateId
            } else {
                error
            };
            let alert = match error {
                ClientError::DuplicateId => DUPLICATE_ID_ALERT,
                _ => UPDATE_FAILED_ALERT,
            };
            self.prompt.alert(alert);
            return Err(error);
        }

        info!(%main_id, "control updated");
        self.prompt.alert(UPDATE_SUCCEEDED_ALERT);
        self.refresh_after_mutation().await;
        self.form.clear();
        self.session = EditSession::Idle;
        Ok(())
    }

    /// Abandons the active edit without a request. Returns whether one existed.
    pub fn cancel_edit(&mut self) -> bool {
        let Some(main_id) = self.session.active_id() else {
            return false;
        };
        info!(%main_id, "edit cancelled");
        self.form.clear();
        self.session = EditSession::Idle;
        true
    }

    pub async fn delete(&mut self, main_id: &str) -> Result<Outcome, ClientError> {
        self.ensure_no_active_edit()?;
        if !self.prompt.confirm(CONFIRM_DELETE_PROMPT) {
            return Ok(Outcome::Declined);
        }

        if let Err(error) = self.api.delete_control(main_id).await {
            error!(%main_id, %error, "error deleting control");
            let alert = match error.server_message() {
                Some(message) => format!("Error deleting control: {message}"),
                None => DELETE_UNREACHABLE_ALERT.to_string(),
            };
            self.prompt.alert(&alert);
            return Err(error);
        }

        info!(%main_id, "control deleted");
        self.prompt.alert(DELETE_SUCCEEDED_ALERT);
        self.refresh_after_mutation().await;
        Ok(Outcome::Completed)
    }

    /// CSV of the table as currently rendered.
    pub fn render_csv(&self) -> String {
        render_csv(&self.table())
    }

    /// Writes the rendered table into the download directory.
    pub fn export_csv(&self) -> Result<PathBuf, ClientError> {
        let path = write_csv(&self.download_dir, &self.render_csv())?;
        info!(path = %path.display(), rows = self.controls.len(), "exported controls");
        Ok(path)
    }

    /// Reads one control without touching the table. `None` when unknown.
    pub async fn fetch_control(&mut self, main_id: &str) -> Result<Option<Control>, ClientError> {
        self.api.get_control(main_id).await.map_err(|error| {
            error!(%main_id, %error, "error fetching control");
            self.prompt.alert(LOOKUP_FAILED_ALERT);
            error
        })
    }

    fn ensure_no_active_edit(&mut self) -> Result<(), ClientError> {
        if let Some(main_id) = self.session.active_id() {
            self.prompt.alert(EDIT_IN_PROGRESS_ALERT);
            return Err(ClientError::EditInProgress(main_id.to_string()));
        }
        Ok(())
    }

    /// A failed refresh has already been alerted by the lister.
    async fn refresh_after_mutation(&mut self) {
        if let Err(error) = self.fetch_and_render().await {
            debug!(%error, "table left as before the refresh");
        }
    }
}

#[cfg(test)]
#[path = "tests/table_sync_tests.rs"]
mod tests;
