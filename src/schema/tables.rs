//! Table definitions for the master table and the continental region tables

use super::types::*;

pub static METEORITE_DATA: TableSchema = TableSchema {
    name: "Meteorite_Data",
    columns: &[
        Column::new("name", ColumnType::Text),
        Column::required("id", ColumnType::Integer),
        Column::new("nametype", ColumnType::Text),
        Column::new("recclass", ColumnType::Text),
        Column::new("mass", ColumnType::Text),
        Column::new("fall", ColumnType::Text),
        Column::new("year", ColumnType::Text),
        Column::new("reclat", ColumnType::Real),
        Column::new("reclong", ColumnType::Real),
        Column::new("geolocation", ColumnType::Json),
        Column::new("states", ColumnType::Code).json(":@computed_region_cbhk_fwbd"),
        Column::new("counties", ColumnType::Code).json(":@computed_region_nnqa_25f4"),
    ],
    primary_key: Some("id"),
};

/// Columns copied from the master table into every region table
pub const REGION_COLUMNS: &[Column] = &[
    Column::new("name", ColumnType::Text),
    Column::new("mass", ColumnType::Text),
    Column::new("reclat", ColumnType::Real),
    Column::new("reclong", ColumnType::Real),
];

const fn region(
    key: &'static str,
    label: &'static str,
    table: &'static str,
    bounds: BoundingBox,
) -> RegionTable {
    RegionTable {
        key,
        label,
        schema: TableSchema {
            name: table,
            columns: REGION_COLUMNS,
            primary_key: None,
        },
        bounds,
    }
}

// Boxes overlap in places (Upper and Lower Asia, Europe and Africa/Middle East).
// A record lands in every box that contains it.

pub static AFRICA_MIDDLE_EAST: RegionTable = region(
    "africa_middle_east",
    "Africa/Middle East",
    "Africa_MiddleEast_Meteorites",
    BoundingBox::new(-35.2, 37.6, -17.8, 62.2),
);

pub static EUROPE: RegionTable = region(
    "europe",
    "Europe",
    "Europe_Meteorites",
    BoundingBox::new(36.0, 71.1, -24.1, 32.0),
);

pub static UPPER_ASIA: RegionTable = region(
    "upper_asia",
    "Upper Asia",
    "Upper_Asia_Meteorites",
    BoundingBox::new(35.8, 72.7, 32.2, 190.4),
);

pub static LOWER_ASIA: RegionTable = region(
    "lower_asia",
    "Lower Asia",
    "Lower_Asia_Meteorites",
    BoundingBox::new(-9.9, 38.6, 58.2, 154.0),
);

pub static AUSTRALIA: RegionTable = region(
    "australia",
    "Australia",
    "Australia_Meteorites",
    BoundingBox::new(-43.8, -11.1, 112.9, 154.3),
);

pub static NORTH_AMERICA: RegionTable = region(
    "north_america",
    "North America",
    "North_America_Meteorites",
    BoundingBox::new(12.8, 71.5, -168.2, -52.0),
);

pub static SOUTH_AMERICA: RegionTable = region(
    "south_america",
    "South America",
    "South_America_Meteorites",
    BoundingBox::new(-55.8, 12.6, -81.2, -34.4),
);

/// All regions, in refresh order
pub static ALL_REGIONS: &[&RegionTable] = &[
    &AFRICA_MIDDLE_EAST,
    &EUROPE,
    &UPPER_ASIA,
    &LOWER_ASIA,
    &AUSTRALIA,
    &NORTH_AMERICA,
    &SOUTH_AMERICA,
];

/// Look up a region by key or table name, ignoring case
pub fn get_region(name: &str) -> Option<&'static RegionTable> {
    ALL_REGIONS.iter().copied().find(|r| {
        r.key.eq_ignore_ascii_case(name) || r.table_name().eq_ignore_ascii_case(name)
    })
}

/// Get all region keys
pub fn region_keys() -> Vec<&'static str> {
    ALL_REGIONS.iter().map(|r| r.key).collect()
}

/// Regions whose box contains the point. Missing coordinates match nothing.
pub fn regions_containing(lat: Option<f64>, lon: Option<f64>) -> Vec<&'static RegionTable> {
    ALL_REGIONS
        .iter()
        .copied()
        .filter(|r| r.contains(lat, lon))
        .collect()
}
