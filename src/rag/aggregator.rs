//! Record Aggregator.
//!
//! Collapses many raw rows per entity into one normalized `EntityRecord`:
//! 1. Validates that the required columns exist
//! 2. Groups rows by the identifying column (exact match)
//! 3. Unions the per-row attribute values into ordered sets
//! 4. Renders the searchable text for each record

use std::collections::BTreeMap;

use super::error::RagError;
use super::record::{EntityRecord, MappingFlags, OrderedSet, TargetAttributes};
use super::schema::ColumnSchema;
use super::table::{cell, RawTable};

/// Result of aggregating one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregation {
    /// One record per distinct entity key, in ascending key order.
    Populated(Vec<EntityRecord>),
    /// The table had a valid header but no data rows.
    Placeholder(EntityRecord),
}

impl Aggregation {
    pub fn records(&self) -> &[EntityRecord] {
        match self {
            Aggregation::Populated(records) => records,
            Aggregation::Placeholder(record) => std::slice::from_ref(record),
        }
    }

    pub fn into_records(self) -> Vec<EntityRecord> {
        match self {
            Aggregation::Populated(records) => records,
            Aggregation::Placeholder(record) => vec![record],
        }
    }

    /// Number of real entities; the placeholder does not count.
    pub fn entity_count(&self) -> usize {
        match self {
            Aggregation::Populated(records) => records.len(),
            Aggregation::Placeholder(_) => 0,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Aggregation::Placeholder(_))
    }
}

/// Column positions resolved once against the table header.
struct ResolvedColumns {
    key: usize,
    source_make: usize,
    source_model: usize,
    target_make_name: usize,
    target_trim_name: usize,
    target_make_code: Option<usize>,
    target_model_name: Option<usize>,
    target_model_code: Option<usize>,
    target_series_name: Option<usize>,
    target_series_code: Option<usize>,
    target_trim_code: Option<usize>,
    target_body_style_name: Option<usize>,
    target_body_style_code: Option<usize>,
    target_fuel_type_code: Option<usize>,
    target_fuel_type_name: Option<usize>,
    needs_body_style: Option<usize>,
    needs_fuel_type: Option<usize>,
    multiple_target_models: Option<usize>,
    multiple_target_trims: Option<usize>,
}

impl ResolvedColumns {
    fn resolve(table: &RawTable, schema: &ColumnSchema) -> Result<Self, RagError> {
        let mut positions = [0usize; 5];
        let mut missing = Vec::new();
        for (slot, name) in positions.iter_mut().zip(schema.required_columns()) {
            match table.column(name) {
                Some(index) => *slot = index,
                None => missing.push(name),
            }
        }
        if !missing.is_empty() {
            return Err(RagError::malformed(format!(
                "CSV is missing required columns: {}",
                missing.join(", ")
            )));
        }
        let [key, source_make, source_model, target_make_name, target_trim_name] = positions;

        Ok(Self {
            key,
            source_make,
            source_model,
            target_make_name,
            target_trim_name,
            target_make_code: table.column(&schema.target_make_code),
            target_model_name: table.column(&schema.target_model_name),
            target_model_code: table.column(&schema.target_model_code),
            target_series_name: table.column(&schema.target_series_name),
            target_series_code: table.column(&schema.target_series_code),
            target_trim_code: table.column(&schema.target_trim_code),
            target_body_style_name: table.column(&schema.target_body_style_name),
            target_body_style_code: table.column(&schema.target_body_style_code),
            target_fuel_type_code: table.column(&schema.target_fuel_type_code),
            target_fuel_type_name: table.column(&schema.target_fuel_type_name),
            needs_body_style: table.column(&schema.flags.needs_body_style),
            needs_fuel_type: table.column(&schema.flags.needs_fuel_type),
            multiple_target_models: table.column(&schema.flags.multiple_target_models),
            multiple_target_trims: table.column(&schema.flags.multiple_target_trims),
        })
    }
}

/// Rows folded so far for one entity key.
struct GroupState<'a> {
    first_row: &'a [String],
    target: TargetAttributes,
    flags: MappingFlags,
    row_count: usize,
}

impl<'a> GroupState<'a> {
    fn new(first_row: &'a [String]) -> Self {
        Self {
            first_row,
            target: TargetAttributes::default(),
            flags: MappingFlags::default(),
            row_count: 0,
        }
    }

    fn absorb(&mut self, row: &[String], columns: &ResolvedColumns, schema: &ColumnSchema) {
        self.row_count += 1;

        let mut union = |set: &mut OrderedSet, column: Option<usize>| {
            if let Some(value) = cell(row, column) {
                set.insert(value);
            }
        };
        union(&mut self.target.trim_names, Some(columns.target_trim_name));
        union(&mut self.target.trim_codes, columns.target_trim_code);
        union(&mut self.target.model_names, columns.target_model_name);
        union(&mut self.target.model_codes, columns.target_model_code);
        union(&mut self.target.series_names, columns.target_series_name);
        union(&mut self.target.series_codes, columns.target_series_code);
        union(&mut self.target.body_style_names, columns.target_body_style_name);
        union(&mut self.target.body_style_codes, columns.target_body_style_code);
        union(&mut self.target.fuel_type_codes, columns.target_fuel_type_code);
        union(&mut self.target.fuel_type_names, columns.target_fuel_type_name);

        let affirmative =
            |column: Option<usize>| cell(row, column).is_some_and(|value| schema.is_affirmative(value));
        self.flags.needs_body_style_mapping |= affirmative(columns.needs_body_style);
        self.flags.needs_fuel_type_mapping |= affirmative(columns.needs_fuel_type);
        self.flags.maps_to_multiple_target_models |= affirmative(columns.multiple_target_models);
        self.flags.maps_to_multiple_target_trims |= affirmative(columns.multiple_target_trims);
    }

    fn finish(self, key: &str, columns: &ResolvedColumns) -> EntityRecord {
        let first = |column: Option<usize>| cell(self.first_row, column).unwrap_or_default().to_string();

        let mut target = self.target;
        target.make_name = first(Some(columns.target_make_name));
        target.make_code = first(columns.target_make_code);

        EntityRecord::new(
            key.to_string(),
            first(Some(columns.source_make)),
            first(Some(columns.source_model)),
            target,
            self.flags,
            self.row_count,
        )
    }
}

/// Groups raw rows into normalized entity records.
pub struct RecordAggregator {
    schema: ColumnSchema,
}

impl RecordAggregator {
    pub fn new(schema: ColumnSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// Aggregate a table.
    ///
    /// Fails with `RagError::MalformedInput` if a required column is missing
    /// or a data row has an empty identifying cell. A header-only table yields
    /// `Aggregation::Placeholder`.
    pub fn aggregate(&self, table: &RawTable) -> Result<Aggregation, RagError> {
        let columns = ResolvedColumns::resolve(table, &self.schema)?;

        if table.is_empty() {
            tracing::info!("Vehicle mapping table is empty; using placeholder record");
            return Ok(Aggregation::Placeholder(EntityRecord::placeholder()));
        }

        let mut groups: BTreeMap<&str, GroupState<'_>> = BTreeMap::new();
        for (index, row) in table.rows().iter().enumerate() {
            let key = cell(row, Some(columns.key)).ok_or_else(|| {
                RagError::malformed(format!(
                    "row {} has an empty '{}' value",
                    index + 1,
                    self.schema.entity_key
                ))
            })?;
            groups
                .entry(key)
                .or_insert_with(|| GroupState::new(row))
                .absorb(row, &columns, &self.schema);
        }

        let records: Vec<EntityRecord> = groups
            .into_iter()
            .map(|(key, group)| group.finish(key, &columns))
            .collect();

        tracing::info!(
            "Aggregated {} rows into {} vehicle records",
            table.len(),
            records.len()
        );
        Ok(Aggregation::Populated(records))
    }
}

/// Aggregate `table` with the given column schema.
pub fn aggregate(table: &RawTable, schema: &ColumnSchema) -> Result<Aggregation, RagError> {
    RecordAggregator::new(schema.clone()).aggregate(table)
}
