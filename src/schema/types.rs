/// Column data type
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
    /// Required integer key, rejected when absent
    Integer,
    /// Floating point; numeric strings are coerced
    Real,
    /// Scalar passed through with its JSON type
    Text,
    /// Opaque code, always stored as text
    Code,
    /// JSON blob stored as text
    Json,
}

impl ColumnType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text | ColumnType::Code | ColumnType::Json => "TEXT",
        }
    }
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
    /// Override JSON field name (default: the column name)
    pub json_field: Option<&'static str>,
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
            json_field: None,
        }
    }

    /// Create a required (non-nullable) column
    pub const fn required(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: false,
            json_field: None,
        }
    }

    /// Set the JSON field name (for when it differs from the column name)
    pub const fn json(self, field: &'static str) -> Self {
        Self {
            json_field: Some(field),
            ..self
        }
    }

    /// Key to look up in a source record
    pub fn source_key(&self) -> &'static str {
        self.json_field.unwrap_or(self.name)
    }
}

/// Table schema definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
    /// Column holding the record key, if any
    pub primary_key: Option<&'static str>,
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }
}

/// Closed latitude/longitude rectangle. Both ends of each interval are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    pub const fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        }
    }

    /// Same predicate the region query applies in SQL. NaN never matches.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "lat [{}, {}] lon [{}, {}]",
            self.lat_min, self.lat_max, self.lon_min, self.lon_max
        )
    }
}

/// A table derived from the master table by a bounding box
#[derive(Debug, Clone)]
pub struct RegionTable {
    /// Short name used on the command line
    pub key: &'static str,
    pub label: &'static str,
    pub schema: TableSchema,
    pub bounds: BoundingBox,
}

impl RegionTable {
    pub fn table_name(&self) -> &'static str {
        self.schema.name
    }

    pub fn contains(&self, lat: Option<f64>, lon: Option<f64>) -> bool {
        match (lat, lon) {
            (Some(lat), Some(lon)) => self.bounds.contains(lat, lon),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        let b = BoundingBox::new(-10.0, 10.0, 20.0, 30.0);
        assert!(b.contains(-10.0, 20.0));
        assert!(b.contains(10.0, 30.0));
        assert!(!b.contains(10.000001, 25.0));
        assert!(!b.contains(0.0, 19.999));
    }

    #[test]
    fn test_nan_never_matches() {
        let b = BoundingBox::new(-90.0, 90.0, -180.0, 180.0);
        assert!(!b.contains(f64::NAN, 0.0));
        assert!(!b.contains(0.0, f64::NAN));
    }
}
