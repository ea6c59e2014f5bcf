use crate::schema::{RegionTable, TableSchema};

/// Generate CREATE TABLE SQL for a table schema. Existing tables are kept.
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n", schema.name);

    let columns: Vec<String> = schema
        .columns
        .iter()
        .map(|col| {
            let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
            let pk = if schema.primary_key == Some(col.name) {
                " PRIMARY KEY"
            } else {
                ""
            };
            format!(
                "    {} {}{}{}",
                col.name,
                col.col_type.sql_type(),
                pk,
                null_constraint
            )
        })
        .collect();

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

pub fn generate_delete(schema: &TableSchema) -> String {
    format!("DELETE FROM {}", schema.name)
}

/// Parameterized INSERT for every column of the schema, in column order
pub fn generate_insert(schema: &TableSchema) -> String {
    let columns = schema.column_names();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.name,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// INSERT ... SELECT filling a region table from the master table.
///
/// Bounds are bound as `?1..?4` (lat_min, lat_max, lon_min, lon_max). NULL
/// coordinates fail every comparison and are never selected.
pub fn generate_region_insert(region: &RegionTable, master: &TableSchema) -> String {
    let columns = region.schema.column_names().join(", ");
    format!(
        "INSERT INTO {table} ({columns}) SELECT {columns} FROM {master} \
         WHERE (reclat >= ?1 AND reclat <= ?2) AND (reclong >= ?3 AND reclong <= ?4)",
        table = region.table_name(),
        columns = columns,
        master = master.name,
    )
}
