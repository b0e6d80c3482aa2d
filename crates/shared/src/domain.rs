use serde::{Deserialize, Serialize};

/// One row of the security control inventory.
///
/// Field names on the wire are fixed by the `/items` API. Fields missing from a
/// payload decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    #[serde(rename = "mainID", default)]
    pub main_id: String,
    #[serde(rename = "mainDescription", default)]
    pub main_description: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub scope: String,
}

impl Control {
    pub const FIELD_NAMES: [&'static str; 4] = ["mainID", "mainDescription", "domain", "scope"];

    pub fn new(
        main_id: impl Into<String>,
        main_description: impl Into<String>,
        domain: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            main_id: main_id.into(),
            main_description: main_description.into(),
            domain: domain.into(),
            scope: scope.into(),
        }
    }

    /// Wire names of the fields that are empty, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        Self::FIELD_NAMES
            .into_iter()
            .zip([
                &self.main_id,
                &self.main_description,
                &self.domain,
                &self.scope,
            ])
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| name)
            .collect()
    }

    pub fn sort_key(&self) -> Option<i64> {
        numeric_sort_key(&self.main_id)
    }
}

/// Partial update body for `POST /items/{mainID}`. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPatch {
    #[serde(rename = "mainID", default, skip_serializing_if = "Option::is_none")]
    pub main_id: Option<String>,
    #[serde(
        rename = "mainDescription",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub main_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl ControlPatch {
    /// True when no attribute besides `mainID` is set.
    pub fn is_empty(&self) -> bool {
        self.main_description.is_none() && self.domain.is_none() && self.scope.is_none()
    }
}

impl From<Control> for ControlPatch {
    fn from(value: Control) -> Self {
        Self {
            main_id: Some(value.main_id),
            main_description: Some(value.main_description),
            domain: Some(value.domain),
            scope: Some(value.scope),
        }
    }
}

/// Integer-prefix value of a `mainID`: leading whitespace, an optional sign,
/// then the longest run of ASCII digits. `None` when no digit follows.
pub fn numeric_sort_key(main_id: &str) -> Option<i64> {
    let trimmed = main_id.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit);
    let mut seen = false;
    let mut value: i64 = 0;
    for digit in digits {
        seen = true;
        let digit = i64::from(digit - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }

    seen.then_some(value)
}

/// Sorts ascending by numeric `mainID`; ids without a numeric prefix go last.
pub fn sort_by_main_id(controls: &mut [Control]) {
    controls.sort_by_key(|control| match control.sort_key() {
        Some(key) => (false, key),
        None => (true, 0),
    });
}
