//! SQL for the `location_entity` table.

pub const LOCATION_TABLE: &str = "location_entity";

/// Column names in insert/select order. `location_id` is assigned by SQLite.
pub fn get_sample_columns() -> Vec<&'static str> {
    vec![
        "latitude",
        "longitude",
        "altitude",
        "accuracy",
        "vertical_accuracy_meters",
        "speed",
        "speed_accuracy_meters_per_second",
        "bearing",
        "bearing_accuracy_degrees",
        "time",
        "elapsed_realtime_nanos",
        "provider",
        "has_accuracy",
        "has_speed",
        "has_altitude",
        "has_bearing_accuracy",
        "distance",
    ]
}

/// Float columns are nullable: SQLite binds NaN as NULL.
pub fn build_create_table() -> String {
    format!(
        r#"
    CREATE TABLE IF NOT EXISTS {LOCATION_TABLE} (
        location_id INTEGER PRIMARY KEY AUTOINCREMENT,
        latitude REAL,
        longitude REAL,
        altitude REAL,
        accuracy REAL,
        vertical_accuracy_meters REAL,
        speed REAL,
        speed_accuracy_meters_per_second REAL,
        bearing REAL,
        bearing_accuracy_degrees REAL,
        time INTEGER NOT NULL,
        elapsed_realtime_nanos INTEGER NOT NULL,
        provider TEXT NOT NULL,
        has_accuracy INTEGER NOT NULL,
        has_speed INTEGER NOT NULL,
        has_altitude INTEGER NOT NULL,
        has_bearing_accuracy INTEGER NOT NULL,
        distance REAL
    );
    CREATE INDEX IF NOT EXISTS idx_{LOCATION_TABLE}_time ON {LOCATION_TABLE} (time);
    "#
    )
}

pub fn build_sample_insert() -> String {
    let columns = get_sample_columns();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        LOCATION_TABLE,
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn select_prefix() -> String {
    format!(
        "SELECT location_id, {} FROM {}",
        get_sample_columns().join(", "),
        LOCATION_TABLE
    )
}

/// Every sample, oldest capture first; insertion order breaks ties.
pub fn build_select_all() -> String {
    format!("{} ORDER BY time ASC, location_id ASC", select_prefix())
}

/// Newest `?1` samples, newest first.
pub fn build_select_latest() -> String {
    format!(
        "{} ORDER BY time DESC, location_id DESC LIMIT ?1",
        select_prefix()
    )
}

pub fn build_count() -> String {
    format!("SELECT COUNT(*) FROM {}", LOCATION_TABLE)
}

pub fn build_delete() -> String {
    format!("DELETE FROM {} WHERE location_id = ?1", LOCATION_TABLE)
}
