//! View model of the inventory table: edit session, form and rendered rows.

use std::{fmt, str::FromStr};

use shared::domain::Control;

use crate::error::ClientError;

pub const TABLE_HEADERS: [&str; 4] = ["Control ID", "Description", "Domain", "Scope"];

/// The single optional active edit.
///
/// `Loading` and `Submitting` only exist while the corresponding request is in
/// flight; callers observe `Idle` or `Editing` between operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditSession {
    #[default]
    Idle,
    Loading { main_id: String },
    Editing { main_id: String },
    Submitting { main_id: String },
}

impl EditSession {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn active_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Loading { main_id }
            | Self::Editing { main_id }
            | Self::Submitting { main_id } => Some(main_id),
        }
    }

    /// Id of the row shown as being edited.
    pub fn highlighted_id(&self) -> Option<&str> {
        match self {
            Self::Editing { main_id } | Self::Submitting { main_id } => Some(main_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    MainId,
    MainDescription,
    Domain,
    Scope,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::MainId,
        FormField::MainDescription,
        FormField::Domain,
        FormField::Scope,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            FormField::MainId => "mainID",
            FormField::MainDescription => "mainDescription",
            FormField::Domain => "domain",
            FormField::Scope => "scope",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainid" | "main_id" | "id" => Ok(FormField::MainId),
            "maindescription" | "main_description" | "description" => {
                Ok(FormField::MainDescription)
            }
            "domain" => Ok(FormField::Domain),
            "scope" => Ok(FormField::Scope),
            other => Err(format!(
                "unknown field '{other}' (expected one of: mainID, mainDescription, domain, scope)"
            )),
        }
    }
}

/// Input fields for a control. `mainID` is locked while an edit is active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlForm {
    main_id: String,
    main_description: String,
    domain: String,
    scope: String,
    main_id_locked: bool,
}

impl ControlForm {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::MainId => &self.main_id,
            FormField::MainDescription => &self.main_description,
            FormField::Domain => &self.domain,
            FormField::Scope => &self.scope,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) -> Result<(), ClientError> {
        let slot = match field {
            FormField::MainId if self.main_id_locked => {
                return Err(ClientError::MainIdLocked(self.main_id.clone()));
            }
            FormField::MainId => &mut self.main_id,
            FormField::MainDescription => &mut self.main_description,
            FormField::Domain => &mut self.domain,
            FormField::Scope => &mut self.scope,
        };
        *slot = value.into();
        Ok(())
    }

    pub fn is_main_id_locked(&self) -> bool {
        self.main_id_locked
    }

    pub fn to_control(&self) -> Control {
        Control::new(
            self.main_id.clone(),
            self.main_description.clone(),
            self.domain.clone(),
            self.scope.clone(),
        )
    }

    /// Loads a control for editing and locks `mainID`.
    pub(crate) fn populate(&mut self, control: &Control) {
        self.main_id = control.main_id.clone();
        self.main_description = control.main_description.clone();
        self.domain = control.domain.clone();
        self.scope = control.scope.clone();
        self.main_id_locked = true;
    }

    /// Empties every field and unlocks `mainID`.
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Which submit control the form currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Add,
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub main_id: String,
    pub cells: Vec<String>,
    pub highlighted: bool,
    pub edit_enabled: bool,
    pub delete_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlTable {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
    pub form_action: FormAction,
}

/// Renders the table for `controls` (already in display order) under `session`.
pub fn render_table(controls: &[Control], session: &EditSession) -> ControlTable {
    let highlighted_id = session.highlighted_id();
    let idle = session.is_idle();
    let submitting = matches!(session, EditSession::Submitting { .. });

    let rows = controls
        .iter()
        .map(|control| TableRow {
            main_id: control.main_id.clone(),
            cells: vec![
                control.main_id.clone(),
                control.main_description.clone(),
                control.domain.clone(),
                control.scope.clone(),
            ],
            highlighted: highlighted_id == Some(control.main_id.as_str()),
            edit_enabled: !submitting,
            delete_enabled: idle,
        })
        .collect();

    ControlTable {
        headers: TABLE_HEADERS.iter().map(|h| h.to_string()).collect(),
        rows,
        form_action: if idle {
            FormAction::Add
        } else {
            FormAction::Update
        },
    }
}
