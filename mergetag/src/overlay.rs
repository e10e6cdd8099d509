//! Reconciliation of a grid widget's base rows with the rows the user has
//! edited in place.

use std::collections::HashMap;

use log::trace;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Map, Row, Value};

/// The column holding a template variable's name.
pub const VARIABLE_NAME: &str = "variable_name";

/// Name-to-value lookup built from a variables table.
pub type VariableMap = Map<String, Value>;

/// Which column of the variables table to use as a variable's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableField {
    Description,
    DefaultValue,
}

impl VariableField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::DefaultValue => "default_value",
        }
    }
}

/// A user-edited replacement for one row of the base table.
///
/// `all_fields` is the complete record, not a patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowOverride {
    pub index: usize,
    #[serde(rename = "allFields")]
    pub all_fields: Row,
}

/// Snapshot of the variables grid widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableTable {
    #[serde(rename = "tableData", default, deserialize_with = "null_as_empty")]
    pub table_data: Vec<Row>,
    #[serde(rename = "updatedRows", default, deserialize_with = "null_as_empty")]
    pub updated_rows: Vec<RowOverride>,
}

impl VariableTable {
    /// Every row as it currently appears in the grid, edits included.
    pub fn latest_rows(&self) -> Vec<Row> {
        merge_rows(&self.table_data, &self.updated_rows)
    }

    pub fn descriptions(&self) -> VariableMap {
        build_variable_map(
            &self.table_data,
            &self.updated_rows,
            VariableField::Description,
        )
    }

    pub fn default_values(&self) -> VariableMap {
        build_variable_map(
            &self.table_data,
            &self.updated_rows,
            VariableField::DefaultValue,
        )
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Produces the effective rows: each base row, or its override when one
/// exists for that position. Overrides pointing past the end of `base` are
/// ignored, and for duplicated indices the last override wins.
pub fn merge_rows(base: &[Row], overrides: &[RowOverride]) -> Vec<Row> {
    let by_index = overrides
        .iter()
        .map(|o| (o.index, &o.all_fields))
        .collect::<HashMap<usize, &Row>>();
    base.iter()
        .enumerate()
        .map(|(i, row)| by_index.get(&i).copied().unwrap_or(row).clone())
        .collect()
}

/// Builds a variable lookup from the base rows, then folds the overrides on
/// top so that edited values win.
pub fn build_variable_map(
    base: &[Row],
    overrides: &[RowOverride],
    field: VariableField,
) -> VariableMap {
    let mut vars = VariableMap::new();
    let rows = base
        .iter()
        .chain(overrides.iter().map(|o| &o.all_fields));
    for row in rows {
        let name = match row.get(VARIABLE_NAME) {
            Some(name) if name.is_truthy() => name.to_string(),
            _ => {
                trace!("Skipping row without a variable name: {:?}", row);
                continue;
            }
        };
        let value = row.get(field.column()).cloned().unwrap_or(Value::Null);
        vars.insert(name, value);
    }
    vars
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn row(v: serde_json::Value) -> Row {
        Value::from(v).into_map().unwrap()
    }

    fn base() -> Vec<Row> {
        vec![
            row(json!({ "variable_name": "first_name", "description": "Given name", "default_value": "there" })),
            row(json!({ "variable_name": "city", "description": "Home city", "default_value": "your city" })),
            row(json!({ "variable_name": "discount", "description": "Offer", "default_value": 0 })),
        ]
    }

    fn edit(index: usize, v: serde_json::Value) -> RowOverride {
        RowOverride {
            index,
            all_fields: row(v),
        }
    }

    #[test]
    fn no_overrides_is_identity() {
        assert_eq!(merge_rows(&base(), &[]), base());
    }

    #[test]
    fn override_replaces_only_its_position() {
        let replacement = json!({ "variable_name": "town", "description": "Town", "default_value": "home" });
        let merged = merge_rows(&base(), &[edit(1, replacement.clone())]);
        let original = base();
        assert_eq!(merged.len(), original.len());
        assert_eq!(merged[0], original[0]);
        assert_eq!(merged[1], row(replacement));
        assert_eq!(merged[2], original[2]);
    }

    #[test]
    fn later_duplicate_override_wins() {
        let merged = merge_rows(
            &base(),
            &[
                edit(0, json!({ "variable_name": "a" })),
                edit(0, json!({ "variable_name": "b" })),
            ],
        );
        assert_eq!(merged[0], row(json!({ "variable_name": "b" })));
    }

    #[test]
    fn out_of_range_override_is_inert() {
        let merged = merge_rows(&base(), &[edit(7, json!({ "variable_name": "ghost" }))]);
        assert_eq!(merged, base());
    }

    #[test]
    fn overrides_win_in_variable_map() {
        let overrides = vec![edit(
            1,
            json!({ "variable_name": "city", "description": "City of residence", "default_value": "nowhere" }),
        )];
        let descriptions = build_variable_map(&base(), &overrides, VariableField::Description);
        assert_eq!(descriptions.get("city"), Some(&Value::from("City of residence")));
        assert_eq!(descriptions.get("first_name"), Some(&Value::from("Given name")));

        let defaults = build_variable_map(&base(), &overrides, VariableField::DefaultValue);
        assert_eq!(defaults.get("city"), Some(&Value::from("nowhere")));
        assert_eq!(defaults.get("discount"), Some(&Value::Unsigned(0)));
    }

    #[test]
    fn renamed_variable_keeps_old_entry() {
        // The base fold still contributes the original name.
        let overrides = vec![edit(0, json!({ "variable_name": "given_name", "default_value": "friend" }))];
        let defaults = build_variable_map(&base(), &overrides, VariableField::DefaultValue);
        assert_eq!(defaults.get("first_name"), Some(&Value::from("there")));
        assert_eq!(defaults.get("given_name"), Some(&Value::from("friend")));
    }

    #[test]
    fn rows_without_names_are_skipped() {
        let rows = vec![
            row(json!({ "description": "orphan" })),
            row(json!({ "variable_name": "", "description": "empty" })),
        ];
        let overrides = vec![edit(0, json!({ "variable_name": null, "description": "null" }))];
        assert!(build_variable_map(&rows, &overrides, VariableField::Description).is_empty());
    }

    #[test]
    fn missing_field_maps_to_null() {
        let rows = vec![row(json!({ "variable_name": "plan" }))];
        let defaults = build_variable_map(&rows, &[], VariableField::DefaultValue);
        assert_eq!(defaults.get("plan"), Some(&Value::Null));
    }

    #[test]
    fn building_twice_is_idempotent() {
        let overrides = vec![edit(2, json!({ "variable_name": "discount", "default_value": 10 }))];
        let first = build_variable_map(&base(), &overrides, VariableField::DefaultValue);
        let second = build_variable_map(&base(), &overrides, VariableField::DefaultValue);
        assert_eq!(first, second);
    }

    #[test]
    fn table_snapshot_from_host_json() {
        let table: VariableTable = serde_json::from_value(json!({
            "tableData": [
                { "variable_name": "first_name", "default_value": "there" }
            ],
            "updatedRows": null
        }))
        .unwrap();
        assert!(table.updated_rows.is_empty());
        assert_eq!(table.latest_rows(), table.table_data);

        let table: VariableTable = serde_json::from_value(json!({
            "tableData": [
                { "variable_name": "first_name", "default_value": "there" }
            ],
            "updatedRows": [
                { "index": 0, "allFields": { "variable_name": "first_name", "default_value": "friend" } }
            ]
        }))
        .unwrap();
        assert_eq!(table.default_values().get("first_name"), Some(&Value::from("friend")));
        assert_eq!(table.descriptions().get("first_name"), Some(&Value::Null));
    }
}
