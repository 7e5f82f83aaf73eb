//! One normalized record per source-catalog model, plus the metadata snapshot
//! every fragment of that record carries into the index.

use serde::{Deserialize, Serialize};

/// Display name of the target catalog used in rendered text and enrichments.
pub const TARGET_CATALOG: &str = "Cox";

/// Entity key reserved for the stand-in record of an empty dataset.
pub const PLACEHOLDER_KEY: &str = "placeholder";

const PLACEHOLDER_TEXT: &str =
    "This is a placeholder document for an empty vehicle mapping knowledge base.";

/// Insertion-ordered set of strings with exact-match de-duplication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderedSet(Vec<String>);

impl OrderedSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns false when the value was already present.
    pub fn insert(&mut self, value: &str) -> bool {
        if self.0.iter().any(|existing| existing == value) {
            return false;
        }
        self.0.push(value.to_string());
        true
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

impl<'a> FromIterator<&'a str> for OrderedSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = OrderedSet::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingFlags {
    pub needs_body_style_mapping: bool,
    pub needs_fuel_type_mapping: bool,
    pub maps_to_multiple_target_models: bool,
    pub maps_to_multiple_target_trims: bool,
}

impl MappingFlags {
    pub fn any(&self) -> bool {
        self.needs_body_style_mapping
            || self.needs_fuel_type_mapping
            || self.maps_to_multiple_target_models
            || self.maps_to_multiple_target_trims
    }

    fn requirement_phrases(&self) -> Vec<String> {
        let mut phrases = Vec::new();
        if self.needs_body_style_mapping {
            phrases.push("Requires Body Style mapping".to_string());
        }
        if self.needs_fuel_type_mapping {
            phrases.push("Requires Fuel Type mapping".to_string());
        }
        if self.maps_to_multiple_target_models {
            phrases.push(format!("Maps to multiple {} models", TARGET_CATALOG));
        }
        if self.maps_to_multiple_target_trims {
            phrases.push(format!("Maps to multiple {} trims", TARGET_CATALOG));
        }
        phrases
    }
}

/// Everything known about the target-catalog side of one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetAttributes {
    pub make_name: String,
    pub make_code: String,
    pub model_names: OrderedSet,
    pub model_codes: OrderedSet,
    pub series_names: OrderedSet,
    pub series_codes: OrderedSet,
    pub trim_names: OrderedSet,
    pub trim_codes: OrderedSet,
    pub body_style_names: OrderedSet,
    pub body_style_codes: OrderedSet,
    pub fuel_type_codes: OrderedSet,
    pub fuel_type_names: OrderedSet,
}

/// Immutable, aggregated view of every raw row sharing one entity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRecord {
    entity_key: String,
    source_make: String,
    source_model: String,
    target: TargetAttributes,
    flags: MappingFlags,
    source_row_count: usize,
    rendered_text: String,
}

impl EntityRecord {
    pub fn new(
        entity_key: String,
        source_make: String,
        source_model: String,
        target: TargetAttributes,
        flags: MappingFlags,
        source_row_count: usize,
    ) -> Self {
        let rendered_text = render_text(&entity_key, &source_make, &source_model, &target, &flags);
        Self {
            entity_key,
            source_make,
            source_model,
            target,
            flags,
            source_row_count,
            rendered_text,
        }
    }

    /// Stand-in record so an empty dataset still yields a non-empty corpus.
    pub fn placeholder() -> Self {
        Self {
            entity_key: PLACEHOLDER_KEY.to_string(),
            source_make: String::new(),
            source_model: String::new(),
            target: TargetAttributes::default(),
            flags: MappingFlags::default(),
            source_row_count: 0,
            rendered_text: PLACEHOLDER_TEXT.to_string(),
        }
    }

    pub fn entity_key(&self) -> &str {
        &self.entity_key
    }

    pub fn source_make(&self) -> &str {
        &self.source_make
    }

    pub fn source_model(&self) -> &str {
        &self.source_model
    }

    pub fn target(&self) -> &TargetAttributes {
        &self.target
    }

    pub fn flags(&self) -> MappingFlags {
        self.flags
    }

    pub fn trim_count(&self) -> usize {
        self.target.trim_names.len()
    }

    pub fn source_row_count(&self) -> usize {
        self.source_row_count
    }

    pub fn rendered_text(&self) -> &str {
        &self.rendered_text
    }

    pub fn is_placeholder(&self) -> bool {
        self.entity_key == PLACEHOLDER_KEY && self.source_row_count == 0
    }

    /// Snapshot copied by value onto every fragment of this record.
    pub fn metadata(&self) -> FragmentMetadata {
        FragmentMetadata {
            entity_key: self.entity_key.clone(),
            source_make_name: self.source_make.clone(),
            source_model_name: self.source_model.clone(),
            target_make_name: self.target.make_name.clone(),
            target_models: self.target.model_names.join(", "),
            target_trims: self.target.trim_names.join(", "),
            target_trim_codes: self.target.trim_codes.join(", "),
            fuel_types: self.target.fuel_type_names.join(", "),
            flags: self.flags,
            trim_count: self.trim_count(),
        }
    }
}

fn render_text(
    entity_key: &str,
    source_make: &str,
    source_model: &str,
    target: &TargetAttributes,
    flags: &MappingFlags,
) -> String {
    let label = TARGET_CATALOG;
    let mut lines = vec![
        format!("Model ID: {}", entity_key),
        format!("Vehicle: {} {}", source_make, source_model),
    ];

    // Fuel type sits near the top so it weighs more in the embedding.
    if !target.fuel_type_codes.is_empty() {
        let mut fuel = format!("FUEL TYPE: {}", target.fuel_type_codes.join(", "));
        if !target.fuel_type_names.is_empty() {
            fuel.push_str(&format!(" ({})", target.fuel_type_names.join(", ")));
        }
        lines.push(fuel);
    }

    let fields: [(&str, String); 10] = [
        ("Make", target.make_name.clone()),
        ("Make Code", target.make_code.clone()),
        ("Series", target.series_names.join(", ")),
        ("Series Codes", target.series_codes.join(", ")),
        ("Models", target.model_names.join(", ")),
        ("Model Codes", target.model_codes.join(", ")),
        ("Trims", target.trim_names.join(", ")),
        ("Trim Codes", target.trim_codes.join(", ")),
        ("Body Styles", target.body_style_names.join(", ")),
        ("Body Style Codes", target.body_style_codes.join(", ")),
    ];
    for (name, value) in fields {
        lines.push(format!("{} {}: {}", label, name, value).trim_end().to_string());
    }

    let phrases = flags.requirement_phrases();
    if !phrases.is_empty() {
        lines.push(format!("Special Requirements: {}.", phrases.join(", ")));
    }

    lines.join("\n")
}

/// Typed value used by metadata equality filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    Text(String),
    Flag(bool),
    Count(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentMetadata {
    pub entity_key: String,
    pub source_make_name: String,
    pub source_model_name: String,
    pub target_make_name: String,
    pub target_models: String,
    pub target_trims: String,
    pub target_trim_codes: String,
    pub fuel_types: String,
    #[serde(flatten)]
    pub flags: MappingFlags,
    pub trim_count: usize,
}

impl FragmentMetadata {
    /// Looks a field up by its serialized name.
    pub fn field(&self, name: &str) -> Option<MetadataValue> {
        let text = |value: &String| Some(MetadataValue::Text(value.clone()));
        match name {
            "entity_key" => text(&self.entity_key),
            "source_make_name" => text(&self.source_make_name),
            "source_model_name" => text(&self.source_model_name),
            "target_make_name" => text(&self.target_make_name),
            "target_models" => text(&self.target_models),
            "target_trims" => text(&self.target_trims),
            "target_trim_codes" => text(&self.target_trim_codes),
            "fuel_types" => text(&self.fuel_types),
            "needs_body_style_mapping" => Some(MetadataValue::Flag(self.flags.needs_body_style_mapping)),
            "needs_fuel_type_mapping" => Some(MetadataValue::Flag(self.flags.needs_fuel_type_mapping)),
            "maps_to_multiple_target_models" => {
                Some(MetadataValue::Flag(self.flags.maps_to_multiple_target_models))
            }
            "maps_to_multiple_target_trims" => {
                Some(MetadataValue::Flag(self.flags.maps_to_multiple_target_trims))
            }
            "trim_count" => Some(MetadataValue::Count(self.trim_count)),
            _ => None,
        }
    }
}
