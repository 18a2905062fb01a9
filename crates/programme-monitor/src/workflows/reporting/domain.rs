use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for catalogued programmes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProgrammeId(pub u32);

impl fmt::Display for ProgrammeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only reference record describing a programme and its quarterly target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Programme {
    pub id: ProgrammeId,
    pub name: String,
    pub department: String,
    pub indicator: String,
    pub quarter: String,
    pub target: f64,
    /// Display only; never used in arithmetic.
    pub unit: String,
}

/// In-progress report entry for one programme and quarter.
///
/// Drafts are values: every edit produces a new draft, so validation stays a
/// pure function of the draft and the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDraft {
    #[serde(default)]
    pub programme_id: Option<ProgrammeId>,
    /// Raw text as typed; parsed on demand. JSON numbers are kept as their text.
    #[serde(default, deserialize_with = "deserialize_actual_value")]
    pub actual_value: String,
    #[serde(default)]
    pub deviation_explanation: String,
}

impl ReportDraft {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Selecting a programme starts the entry over for that programme.
    pub fn with_programme(self, programme_id: ProgrammeId) -> Self {
        Self {
            programme_id: Some(programme_id),
            ..Self::default()
        }
    }

    pub fn with_actual_value(self, raw: impl Into<String>) -> Self {
        Self {
            actual_value: raw.into(),
            ..self
        }
    }

    pub fn with_explanation(self, text: impl Into<String>) -> Self {
        Self {
            deviation_explanation: text.into(),
            ..self
        }
    }

    /// The actual value when it parses to a finite number.
    pub fn parsed_actual(&self) -> Option<f64> {
        let trimmed = self.actual_value.trim();
        if trimmed.is_empty() {
            return None;
        }

        trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
    }

    pub fn has_explanation(&self) -> bool {
        !self.deviation_explanation.trim().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn deserialize_actual_value<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawActual {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<RawActual>::deserialize(deserializer)? {
        Some(RawActual::Text(text)) => text,
        Some(RawActual::Number(number)) => number.to_string(),
        None => String::new(),
    })
}

/// Persistence actions gated by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportAction {
    SaveDraft,
    Submit,
}

impl ReportAction {
    pub const fn label(self) -> &'static str {
        match self {
            ReportAction::SaveDraft => "save_draft",
            ReportAction::Submit => "submit",
        }
    }
}

impl fmt::Display for ReportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_actual_rejects_blank_and_non_finite_input() {
        let draft = ReportDraft::empty().with_programme(ProgrammeId(1));
        assert_eq!(draft.parsed_actual(), None);
        assert_eq!(draft.clone().with_actual_value("   ").parsed_actual(), None);
        assert_eq!(draft.clone().with_actual_value("abc").parsed_actual(), None);
        assert_eq!(draft.clone().with_actual_value("NaN").parsed_actual(), None);
        assert_eq!(draft.clone().with_actual_value("inf").parsed_actual(), None);
        assert_eq!(draft.clone().with_actual_value(" 950 ").parsed_actual(), Some(950.0));
        assert_eq!(draft.with_actual_value("-12.5").parsed_actual(), Some(-12.5));
    }

    #[test]
    fn selecting_a_programme_clears_entered_values() {
        let draft = ReportDraft::empty()
            .with_programme(ProgrammeId(1))
            .with_actual_value("700")
            .with_explanation("Flooding closed two sites");

        let switched = draft.with_programme(ProgrammeId(2));

        assert_eq!(switched.programme_id, Some(ProgrammeId(2)));
        assert!(switched.actual_value.is_empty());
        assert!(!switched.has_explanation());
    }

    #[test]
    fn json_actual_value_accepts_text_numbers_and_null() {
        let draft: ReportDraft =
            serde_json::from_str(r#"{"programme_id": 1, "actual_value": 950}"#).expect("number");
        assert_eq!(draft.actual_value, "950");
        assert_eq!(draft.parsed_actual(), Some(950.0));

        let draft: ReportDraft =
            serde_json::from_str(r#"{"actual_value": -12.5}"#).expect("fractional number");
        assert_eq!(draft.parsed_actual(), Some(-12.5));

        let draft: ReportDraft =
            serde_json::from_str(r#"{"actual_value": " 980 "}"#).expect("text");
        assert_eq!(draft.actual_value, " 980 ");

        let draft: ReportDraft =
            serde_json::from_str(r#"{"actual_value": null}"#).expect("null");
        assert!(draft.actual_value.is_empty());

        let draft: ReportDraft = serde_json::from_str("{}").expect("missing");
        assert!(draft.is_empty());
    }

    #[test]
    fn whitespace_only_explanation_is_not_an_explanation() {
        let draft = ReportDraft::empty().with_explanation(" \n\t ");
        assert!(!draft.has_explanation());
        assert!(draft.with_explanation("x").has_explanation());
    }
}
