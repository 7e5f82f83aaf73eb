//! Recognized CSV columns and how optional flag columns are interpreted.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSchema {
    /// Identifying column; one record is produced per distinct value.
    pub entity_key: String,
    pub source_make: String,
    pub source_model: String,
    pub target_make_name: String,
    pub target_trim_name: String,

    pub target_make_code: String,
    pub target_model_name: String,
    pub target_model_code: String,
    pub target_series_name: String,
    pub target_series_code: String,
    pub target_trim_code: String,
    pub target_body_style_name: String,
    pub target_body_style_code: String,
    pub target_fuel_type_code: String,
    pub target_fuel_type_name: String,

    pub flags: FlagColumns,
    /// Cell values (compared trimmed, case-insensitively) that switch a flag on.
    pub affirmative_markers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagColumns {
    pub needs_body_style: String,
    pub needs_fuel_type: String,
    pub multiple_target_models: String,
    pub multiple_target_trims: String,
}

impl Default for FlagColumns {
    fn default() -> Self {
        Self {
            needs_body_style: "Needs Bodystyle".to_string(),
            needs_fuel_type: "Needs Fuel Type".to_string(),
            multiple_target_models: "Map to Multiple Cox Models".to_string(),
            multiple_target_trims: "Map to Multiple Cox Trims".to_string(),
        }
    }
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            entity_key: "vdatModelId".to_string(),
            source_make: "vdatMakeName".to_string(),
            source_model: "vdatModelName".to_string(),
            target_make_name: "coxMakeName".to_string(),
            target_trim_name: "coxTrimName".to_string(),
            target_make_code: "coxMakeCode".to_string(),
            target_model_name: "coxModelName".to_string(),
            target_model_code: "coxModelCode".to_string(),
            target_series_name: "coxSeriesName".to_string(),
            target_series_code: "coxSeriesCode".to_string(),
            target_trim_code: "coxTrimCode".to_string(),
            target_body_style_name: "coxBodyStyleName".to_string(),
            target_body_style_code: "coxBodyStyleCode".to_string(),
            target_fuel_type_code: "coxFuelTypeCode".to_string(),
            target_fuel_type_name: "coxFuelTypeName".to_string(),
            flags: FlagColumns::default(),
            affirmative_markers: vec!["yes".to_string()],
        }
    }
}

impl ColumnSchema {
    /// Columns whose absence makes the whole dataset unusable.
    pub fn required_columns(&self) -> [&str; 5] {
        [
            self.entity_key.as_str(),
            self.source_make.as_str(),
            self.source_model.as_str(),
            self.target_make_name.as_str(),
            self.target_trim_name.as_str(),
        ]
    }

    pub fn is_affirmative(&self, value: &str) -> bool {
        let value = value.trim();
        self.affirmative_markers
            .iter()
            .any(|marker| marker.trim().eq_ignore_ascii_case(value))
    }
}
