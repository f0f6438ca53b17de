//! SQL schema definitions for the SnowFinder database.
//!
//! The schema is applied as a single batch whenever a database is opened,
//! so every statement uses `IF NOT EXISTS`.

/// Returns the full SQL schema as a single batch string.
///
/// **Reference tables:**
/// - `resorts` - Resort metadata (id, name, prefecture, elevations)
/// - `courses` - Named runs per resort with optional length in km
/// - `peak_periods` - Recurring high-season windows per resort (`MM-DD` bounds)
///
/// **Observation tables:**
/// - `snowfall_observations` - Daily or weekly snowfall readings in cm,
///   keyed by resort and `YYYY-MM-DD` date. A NULL reading means the
///   resort reported but gave no figure.
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS resorts (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        prefecture TEXT NOT NULL,
        top_elevation_m INTEGER,
        base_elevation_m INTEGER,
        vertical_m INTEGER
    );
    CREATE INDEX IF NOT EXISTS idx_resorts_prefecture ON resorts(prefecture);

    CREATE TABLE IF NOT EXISTS courses (
        resort_id TEXT NOT NULL,
        name TEXT NOT NULL,
        length_km REAL,
        PRIMARY KEY (resort_id, name)
    );

    CREATE TABLE IF NOT EXISTS peak_periods (
        resort_id TEXT NOT NULL,
        start_md TEXT NOT NULL,
        end_md TEXT NOT NULL,
        avg_snowfall_cm INTEGER,
        PRIMARY KEY (resort_id, start_md)
    );
    CREATE INDEX IF NOT EXISTS idx_peaks_resort ON peak_periods(resort_id);

    CREATE TABLE IF NOT EXISTS snowfall_observations (
        resort_id TEXT NOT NULL,
        date TEXT NOT NULL,
        snowfall_cm INTEGER,
        PRIMARY KEY (resort_id, date)
    );
    CREATE INDEX IF NOT EXISTS idx_snowfall_resort ON snowfall_observations(resort_id);
    CREATE INDEX IF NOT EXISTS idx_snowfall_date ON snowfall_observations(date);
    "#
}
