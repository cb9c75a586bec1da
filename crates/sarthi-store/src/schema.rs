//! Knowledge base schema SQL.

/// Advisory tables: crop facts, soil characteristics, pest advisories,
/// government schemes.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS crop_info (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    crop TEXT NOT NULL,
    location TEXT NOT NULL,
    season TEXT,
    sowing_period TEXT,
    harvesting_period TEXT,
    irrigation_schedule TEXT,
    fertilizer TEXT,
    pests TEXT
);

CREATE TABLE IF NOT EXISTS soil_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    location TEXT NOT NULL,
    soil_type TEXT,
    ph_min REAL,
    ph_max REAL,
    n_status TEXT,
    p_status TEXT,
    k_status TEXT
);

CREATE TABLE IF NOT EXISTS pest_info (
    pest_name TEXT,
    affected_crop TEXT,
    symptoms TEXT,
    management_advice TEXT
);

CREATE TABLE IF NOT EXISTS govt_schemes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    scheme_name TEXT NOT NULL,
    purpose TEXT,
    eligibility TEXT,
    benefits TEXT,
    how_to_apply TEXT
);
"#;
