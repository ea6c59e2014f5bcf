use rusqlite::{params, Connection, Transaction};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::report::{RunReport, StepOutcome};
use super::schema_gen::{generate_create_table, generate_delete, generate_insert, generate_region_insert};
use crate::error::LoadError;
use crate::parser::{parse_record, RawRecord};
use crate::schema::{RegionTable, TableSchema, METEORITE_DATA};
use crate::ui::{Phase, Ui};

pub const DEFAULT_DB_FILE: &str = "continental_region_meteorites.db";

/// Report master-load progress every this many rows
const PROGRESS_INTERVAL: u64 = 1000;

/// Single-owner handle on the output database
pub struct RegionStore {
    conn: Connection,
    path: PathBuf,
}

impl RegionStore {
    /// Open (or create) the database. Existing tables and rows are kept; each
    /// step replaces the contents of its own table.
    pub fn open(db_path: &Path) -> Result<Self, LoadError> {
        let open_err = |source| LoadError::Open {
            path: db_path.to_path_buf(),
            source,
        };

        let conn = Connection::open(db_path).map_err(open_err)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(open_err)?;

        Ok(Self {
            conn,
            path: db_path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rebuild the master table from the records, in input order.
    ///
    /// A missing or invalid key rolls the step back and is returned as a fatal
    /// error. A storage error keeps the rows inserted before it.
    pub fn load_master(&mut self, records: &[RawRecord], ui: &mut impl Ui) -> Result<u64, LoadError> {
        let schema = &METEORITE_DATA;
        let tx = self
            .conn
            .transaction()
            .map_err(LoadError::storage(schema.name))?;
        let result = fill_master(&tx, schema, records, ui);
        finish_step(tx, schema.name, result)
    }

    /// Rebuild one region table from the current master table contents
    pub fn refresh_region(&mut self, region: &RegionTable) -> Result<u64, LoadError> {
        let table = region.table_name();
        let tx = self.conn.transaction().map_err(LoadError::storage(table))?;
        let result = fill_region(&tx, region);
        finish_step(tx, table, result)
    }

    /// Number of rows currently in a table
    pub fn count_rows(&self, schema: &TableSchema) -> Result<u64, LoadError> {
        let sql = format!("SELECT COUNT(*) FROM {}", schema.name);
        let count: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(LoadError::storage(schema.name))?;
        Ok(count as u64)
    }

    /// Release the database handle
    pub fn close(self) -> Result<(), LoadError> {
        if let Err(err) = self.conn.execute_batch("PRAGMA optimize;") {
            debug!(error = %err, "PRAGMA optimize failed");
        }
        self.conn
            .close()
            .map_err(|(_, source)| LoadError::storage(METEORITE_DATA.name)(source))
    }
}

fn fill_master(
    tx: &Transaction,
    schema: &TableSchema,
    records: &[RawRecord],
    ui: &mut impl Ui,
) -> Result<u64, LoadError> {
    let storage = LoadError::storage(schema.name);
    tx.execute(&generate_create_table(schema), [])
        .map_err(storage)?;
    let deleted = tx.execute(&generate_delete(schema), []).map_err(storage)?;
    debug!(table = schema.name, deleted, "cleared table");

    let mut stmt = tx.prepare_cached(&generate_insert(schema)).map_err(storage)?;
    let total = records.len() as u64;
    let mut count: u64 = 0;

    for (index, record) in records.iter().enumerate() {
        let row = parse_record(record, index, schema)?;
        for (idx, value) in row.values.iter().enumerate() {
            value.bind_to(idx + 1, &mut stmt).map_err(storage)?;
        }
        stmt.raw_execute().map_err(storage)?;

        count += 1;
        if count % PROGRESS_INTERVAL == 0 {
            ui.set_progress(count, total, schema.name);
        }
    }

    ui.set_progress(count, total, schema.name);
    Ok(count)
}

fn fill_region(tx: &Transaction, region: &RegionTable) -> Result<u64, LoadError> {
    let storage = LoadError::storage(region.table_name());
    let bounds = &region.bounds;

    tx.execute(&generate_create_table(&region.schema), [])
        .map_err(storage)?;
    tx.execute(&generate_delete(&region.schema), [])
        .map_err(storage)?;
    let inserted = tx
        .execute(
            &generate_region_insert(region, &METEORITE_DATA),
            params![bounds.lat_min, bounds.lat_max, bounds.lon_min, bounds.lon_max],
        )
        .map_err(storage)?;

    Ok(inserted as u64)
}

/// Commit a step's transaction.
///
/// Storage failures still commit whatever the step wrote before failing; only
/// fatal errors drop the transaction, which rolls it back.
fn finish_step(tx: Transaction, table: &'static str, result: Result<u64, LoadError>) -> Result<u64, LoadError> {
    match result {
        Ok(count) => {
            tx.commit().map_err(LoadError::storage(table))?;
            Ok(count)
        }
        Err(err) if err.is_fatal() => Err(err),
        Err(err) => {
            if let Err(commit_err) = tx.commit() {
                warn!(table, error = %commit_err, "commit after failed step also failed");
            }
            Err(err)
        }
    }
}

/// Run the master step then every region step against `db_path`.
///
/// Per-table storage failures are reported and recorded in the [`RunReport`];
/// the next table is still refreshed. Fatal errors are returned. The database
/// is closed on every path.
pub fn load_regions(
    records: &[RawRecord],
    db_path: &Path,
    regions: &[&RegionTable],
    ui: &mut impl Ui,
) -> Result<RunReport, LoadError> {
    let mut store = RegionStore::open(db_path)?;
    ui.log(format!("Opened database {:?}", store.path()));

    let outcome = refresh_all(&mut store, records, regions, ui);

    match store.close() {
        Ok(()) => ui.log("Database closed"),
        Err(err) => {
            warn!(error = %err, "failed to close database");
            ui.log(format!("Failed to close database: {}", err));
        }
    }

    outcome
}

fn refresh_all(
    store: &mut RegionStore,
    records: &[RawRecord],
    regions: &[&RegionTable],
    ui: &mut impl Ui,
) -> Result<RunReport, LoadError> {
    let start = Instant::now();

    ui.set_phase(Phase::LoadingMaster);
    ui.set_info(format!("{} records", records.len()));
    let master = match store.load_master(records, ui) {
        Ok(rows) => StepOutcome::loaded(METEORITE_DATA.name, rows),
        Err(err) if err.is_fatal() => {
            ui.log(format!("{}: {}", METEORITE_DATA.name, err));
            return Err(err);
        }
        Err(err) => StepOutcome::failed(METEORITE_DATA.name, &err),
    };
    ui.clear_progress();
    ui.step_finished(&master);
    info!(
        table = master.table,
        ok = master.is_ok(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "master step finished"
    );

    ui.set_phase(Phase::DerivingRegions);
    let total = regions.len() as u64;
    let mut outcomes = Vec::with_capacity(regions.len());

    for (i, region) in regions.iter().enumerate() {
        ui.set_info(format!("{} ({})", region.label, region.bounds));
        ui.set_progress(i as u64, total, region.table_name());

        let step_start = Instant::now();
        let outcome = match store.refresh_region(region) {
            Ok(rows) => StepOutcome::loaded(region.table_name(), rows),
            Err(err) => StepOutcome::failed(region.table_name(), &err),
        };
        info!(
            table = outcome.table,
            ok = outcome.is_ok(),
            elapsed_ms = step_start.elapsed().as_millis() as u64,
            "region step finished"
        );

        ui.step_finished(&outcome);
        outcomes.push(outcome);
    }
    ui.clear_progress();

    Ok(RunReport {
        master,
        regions: outcomes,
        elapsed: start.elapsed(),
    })
}
