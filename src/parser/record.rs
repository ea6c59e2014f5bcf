use serde_json::{Map, Value};

use crate::error::LoadError;
use crate::schema::{ColumnType, TableSchema};

/// One record as decoded from the dataset: field name to JSON value
pub type RawRecord = Map<String, Value>;

/// A parsed row ready for insertion, values in column order
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub values: Vec<SqlValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            SqlValue::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            SqlValue::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            SqlValue::Real(f) => stmt.raw_bind_parameter(idx, f)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
        }
        Ok(())
    }
}

/// Normalize a decoded record into a row for the given table schema.
///
/// `index` is the record's position in the input and only used for error
/// reporting. A required column that is absent, null or not coercible to its
/// type fails the whole record; it is never defaulted.
pub fn parse_record(record: &RawRecord, index: usize, schema: &TableSchema) -> Result<ParsedRow, LoadError> {
    let mut values = Vec::with_capacity(schema.columns.len());

    for col in schema.columns {
        let raw = record.get(col.source_key());
        let value = match col.col_type {
            ColumnType::Integer => {
                let value = extract_integer(raw, index, col.name)?;
                if value == SqlValue::Null && !col.nullable {
                    return Err(LoadError::MissingKey {
                        index,
                        field: col.name,
                    });
                }
                value
            }
            _ => extract_value(raw, &col.col_type),
        };
        values.push(value);
    }

    Ok(ParsedRow { values })
}

fn extract_integer(val: Option<&Value>, index: usize, field: &'static str) -> Result<SqlValue, LoadError> {
    let invalid = |v: &Value| LoadError::InvalidKey {
        index,
        field,
        value: v.to_string(),
    };

    match val {
        None | Some(Value::Null) => Ok(SqlValue::Null),
        Some(v) => match v {
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Ok(SqlValue::Integer(i)),
                (None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                    Ok(SqlValue::Integer(f as i64))
                }
                _ => Err(invalid(v)),
            },
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(SqlValue::Integer)
                .map_err(|_| invalid(v)),
            _ => Err(invalid(v)),
        },
    }
}

fn extract_value(val: Option<&Value>, col_type: &ColumnType) -> SqlValue {
    match val {
        None | Some(Value::Null) => SqlValue::Null,
        Some(v) => match col_type {
            ColumnType::Real => match v {
                Value::Number(n) => n.as_f64().map(SqlValue::Real).unwrap_or(SqlValue::Null),
                // The dataset ships coordinates as strings; keep anything
                // non-numeric as text so it simply never matches a region
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(SqlValue::Real)
                    .unwrap_or_else(|| SqlValue::Text(s.clone())),
                other => SqlValue::Text(other.to_string()),
            },
            ColumnType::Code => match v {
                Value::String(s) => SqlValue::Text(s.clone()),
                other => SqlValue::Text(other.to_string()),
            },
            ColumnType::Json => SqlValue::Text(v.to_string()),
            ColumnType::Text | ColumnType::Integer => passthrough(v),
        },
    }
}

/// Keep a scalar's JSON type; nested values are stored as JSON text
fn passthrough(v: &Value) -> SqlValue {
    match v {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => n.as_f64().map(SqlValue::Real).unwrap_or(SqlValue::Null),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(v.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::METEORITE_DATA;
    use serde_json::json;

    fn record(v: Value) -> RawRecord {
        match v {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn column(row: &ParsedRow, name: &str) -> SqlValue {
        let idx = METEORITE_DATA
            .columns
            .iter()
            .position(|c| c.name == name)
            .unwrap();
        row.values[idx].clone()
    }

    #[test]
    fn test_parse_dataset_record() {
        let rec = record(json!({
            "name": "Aachen",
            "id": "1",
            "nametype": "Valid",
            "recclass": "L5",
            "mass": "21",
            "fall": "Fell",
            "year": "1880-01-01T00:00:00.000",
            "reclat": "50.775000",
            "reclong": "6.083330",
            "geolocation": {"type": "Point", "coordinates": [6.08333, 50.775]},
            ":@computed_region_cbhk_fwbd": "37",
            ":@computed_region_nnqa_25f4": "1234"
        }));

        let row = parse_record(&rec, 0, &METEORITE_DATA).unwrap();
        assert_eq!(row.values.len(), METEORITE_DATA.columns.len());
        assert_eq!(column(&row, "name"), SqlValue::Text("Aachen".into()));
        assert_eq!(column(&row, "id"), SqlValue::Integer(1));
        assert_eq!(column(&row, "mass"), SqlValue::Text("21".into()));
        assert_eq!(column(&row, "reclat"), SqlValue::Real(50.775));
        assert_eq!(column(&row, "reclong"), SqlValue::Real(6.08333));
        assert_eq!(
            column(&row, "geolocation"),
            SqlValue::Text(r#"{"type":"Point","coordinates":[6.08333,50.775]}"#.into())
        );
        assert_eq!(column(&row, "states"), SqlValue::Text("37".into()));
        assert_eq!(column(&row, "counties"), SqlValue::Text("1234".into()));
    }

    #[test]
    fn test_absent_fields_are_null() {
        let row = parse_record(&record(json!({"id": 7})), 0, &METEORITE_DATA).unwrap();
        assert_eq!(column(&row, "id"), SqlValue::Integer(7));
        for name in ["name", "reclat", "reclong", "geolocation", "states", "counties"] {
            assert_eq!(column(&row, name), SqlValue::Null, "{}", name);
        }
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let err = parse_record(&record(json!({"name": "x"})), 4, &METEORITE_DATA).unwrap_err();
        assert!(matches!(err, LoadError::MissingKey { index: 4, field: "id" }));

        let err = parse_record(&record(json!({"id": null})), 0, &METEORITE_DATA).unwrap_err();
        assert!(matches!(err, LoadError::MissingKey { .. }));
    }

    #[test]
    fn test_invalid_id_is_rejected() {
        for bad in [json!("abc"), json!(1.5), json!({"n": 1}), json!(true)] {
            let err = parse_record(&record(json!({ "id": bad })), 0, &METEORITE_DATA).unwrap_err();
            assert!(matches!(err, LoadError::InvalidKey { .. }), "{:?}", err);
            assert!(err.is_fatal());
        }
    }

    #[test]
    fn test_id_coercion() {
        let row = parse_record(&record(json!({"id": " 42 "})), 0, &METEORITE_DATA).unwrap();
        assert_eq!(column(&row, "id"), SqlValue::Integer(42));
        let row = parse_record(&record(json!({"id": 3.0})), 0, &METEORITE_DATA).unwrap();
        assert_eq!(column(&row, "id"), SqlValue::Integer(3));
    }

    #[test]
    fn test_non_numeric_coordinate_kept_as_text() {
        let row = parse_record(&record(json!({"id": 1, "reclat": "n/a", "reclong": 12})), 0, &METEORITE_DATA)
            .unwrap();
        assert_eq!(column(&row, "reclat"), SqlValue::Text("n/a".into()));
        assert_eq!(column(&row, "reclong"), SqlValue::Real(12.0));
    }

    #[test]
    fn test_numeric_code_rendered_as_text() {
        let row = parse_record(
            &record(json!({"id": 1, ":@computed_region_cbhk_fwbd": 12, "mass": 5})),
            0,
            &METEORITE_DATA,
        )
        .unwrap();
        assert_eq!(column(&row, "states"), SqlValue::Text("12".into()));
        assert_eq!(column(&row, "mass"), SqlValue::Integer(5));
    }
}
