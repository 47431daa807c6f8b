//! SQLite-backed sample store.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection, Row};

use crate::error::StorageError;
use crate::location::fix::Reading;

use super::models::LocationSample;
use super::queries::{
    build_count, build_create_table, build_delete, build_sample_insert, build_select_all,
    build_select_latest,
};
use super::store::SampleStore;

/// Store over a single SQLite connection.
pub struct SqliteSampleStore {
    conn: Mutex<Connection>,
}

impl SqliteSampleStore {
    /// Open (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        log::info!("SAMPLE_STORE_OPENED path={}", path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(&build_create_table())?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn query(&self, sql: &str, limit: Option<i64>) -> Result<Vec<LocationSample>, StorageError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(sql)?;
        let rows = match limit {
            Some(n) => stmt.query_map(params![n], sample_from_row)?,
            None => stmt.query_map([], sample_from_row)?,
        };
        let mut samples = Vec::new();
        for row in rows {
            samples.push(row?);
        }
        Ok(samples)
    }
}

/// Float column; NULL is how SQLite stored a NaN.
fn real(row: &Row<'_>, column: &str) -> rusqlite::Result<f64> {
    Ok(row.get::<_, Option<f64>>(column)?.unwrap_or(f64::NAN))
}

fn sample_from_row(row: &Row<'_>) -> rusqlite::Result<LocationSample> {
    Ok(LocationSample {
        id: Some(row.get("location_id")?),
        latitude: real(row, "latitude")?,
        longitude: real(row, "longitude")?,
        altitude: Reading::from_parts(real(row, "altitude")?, row.get("has_altitude")?),
        accuracy: Reading::from_parts(real(row, "accuracy")? as f32, row.get("has_accuracy")?),
        vertical_accuracy_meters: real(row, "vertical_accuracy_meters")? as f32,
        speed: Reading::from_parts(real(row, "speed")? as f32, row.get("has_speed")?),
        speed_accuracy_meters_per_second: real(row, "speed_accuracy_meters_per_second")? as f32,
        bearing: real(row, "bearing")? as f32,
        bearing_accuracy_degrees: Reading::from_parts(
            real(row, "bearing_accuracy_degrees")? as f32,
            row.get("has_bearing_accuracy")?,
        ),
        time: row.get("time")?,
        elapsed_realtime_nanos: row.get("elapsed_realtime_nanos")?,
        provider: row.get("provider")?,
        distance_meters: real(row, "distance")? as f32,
    })
}

impl SampleStore for SqliteSampleStore {
    fn append(&self, samples: &[LocationSample]) -> Result<(), StorageError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(&build_sample_insert())?;
            for s in samples {
                stmt.execute(params![
                    s.latitude,
                    s.longitude,
                    s.altitude.raw(),
                    s.accuracy.raw() as f64,
                    s.vertical_accuracy_meters as f64,
                    s.speed.raw() as f64,
                    s.speed_accuracy_meters_per_second as f64,
                    s.bearing as f64,
                    s.bearing_accuracy_degrees.raw() as f64,
                    s.time,
                    s.elapsed_realtime_nanos,
                    s.provider,
                    s.accuracy.is_reported(),
                    s.speed.is_reported(),
                    s.altitude.is_reported(),
                    s.bearing_accuracy_degrees.is_reported(),
                    s.distance_meters as f64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn query_all(&self) -> Result<Vec<LocationSample>, StorageError> {
        self.query(&build_select_all(), None)
    }

    fn query_latest(&self, n: usize) -> Result<Vec<LocationSample>, StorageError> {
        let limit = i64::try_from(n).unwrap_or(i64::MAX);
        self.query(&build_select_latest(), Some(limit))
    }

    fn count(&self) -> Result<u64, StorageError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(&build_count(), [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let conn = self.conn.lock();
        let removed = conn.execute(&build_delete(), params![id])?;
        Ok(removed > 0)
    }
}
