//! SQLite access layer for the knowledge base.
//!
//! Lookups fail softly: a missing row or a missing table is an empty
//! result, not an error. The connection sits behind a mutex; each
//! request's work runs to completion, so contention is negligible.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::schema::SCHEMA_SQL;
use crate::types::*;
use sarthi_core::{Error, Result};

/// A full dump of one table, used when building the vector index.
#[derive(Debug, Clone)]
pub struct TableDump {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// SQLite knowledge store for the advisory tables.
pub struct KnowledgeStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl KnowledgeStore {
    /// Open or create the knowledge database at the given file path.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| Error::Storage(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;

        info!("KnowledgeStore opened: {}", db_path.display());

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    // ---------------------------------------------------------------
    // Lookups
    // ---------------------------------------------------------------

    /// Find the crop row matching the crop name exactly (case-insensitive)
    /// and the location by substring. At most one row is returned.
    pub fn lookup_crop(&self, crop: &str, location: &str) -> Result<Option<CropRecord>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached(
                "SELECT crop, location, season, sowing_period, harvesting_period, \
                 irrigation_schedule, fertilizer, pests \
                 FROM crop_info \
                 WHERE LOWER(crop) = LOWER(?1) AND LOWER(location) LIKE LOWER(?2) \
                 LIMIT 1",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![crop, format!("%{}%", location)], |row| {
                Ok(CropRecord {
                    crop: row.get(0)?,
                    location: row.get(1)?,
                    season: row.get(2)?,
                    sowing_period: row.get(3)?,
                    harvesting_period: row.get(4)?,
                    irrigation_schedule: row.get(5)?,
                    fertilizer: row.get(6)?,
                    pests: row.get(7)?,
                })
            })
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    /// All pest advisories for a crop, ordered by pest name ascending.
    /// Returns an empty list when the table does not exist yet.
    pub fn lookup_pests(&self, crop: &str) -> Result<Vec<PestRecord>> {
        let conn = self.conn.lock();
        let mut stmt = match conn.prepare_cached(
            "SELECT pest_name, affected_crop, symptoms, management_advice \
             FROM pest_info \
             WHERE LOWER(affected_crop) = LOWER(?1) \
             ORDER BY pest_name ASC",
        ) {
            Ok(stmt) => stmt,
            // Table may not exist if ETL hasn't been run yet
            Err(e) if e.to_string().contains("no such table") => return Ok(Vec::new()),
            Err(e) => return Err(Error::Database(e.to_string())),
        };
        let rows = stmt
            .query_map(params![crop], |row| {
                Ok(PestRecord {
                    pest_name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    affected_crop: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    symptoms: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    management_advice: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                })
            })
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    // ---------------------------------------------------------------
    // ETL writes (replace-wholesale semantics)
    // ---------------------------------------------------------------

    /// Replace the entire crop_info table with the given rows.
    pub fn replace_crops(&self, rows: &[CropRecord]) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(e.to_string()))?;
        tx.execute("DELETE FROM crop_info", [])
            .map_err(|e| Error::Database(e.to_string()))?;
        for r in rows {
            tx.execute(
                "INSERT INTO crop_info (crop, location, season, sowing_period, \
                 harvesting_period, irrigation_schedule, fertilizer, pests) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    r.crop,
                    r.location,
                    r.season,
                    r.sowing_period,
                    r.harvesting_period,
                    r.irrigation_schedule,
                    r.fertilizer,
                    r.pests,
                ],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        }
        tx.commit().map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.len())
    }

    /// Replace the entire soil_data table with the given rows.
    pub fn replace_soil(&self, rows: &[SoilRecord]) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(e.to_string()))?;
        tx.execute("DELETE FROM soil_data", [])
            .map_err(|e| Error::Database(e.to_string()))?;
        for r in rows {
            tx.execute(
                "INSERT INTO soil_data (location, soil_type, ph_min, ph_max, \
                 n_status, p_status, k_status) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    r.location,
                    r.soil_type,
                    r.ph_min,
                    r.ph_max,
                    r.n_status,
                    r.p_status,
                    r.k_status,
                ],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        }
        tx.commit().map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.len())
    }

    /// Replace the entire pest_info table with the given rows.
    pub fn replace_pests(&self, rows: &[PestRecord]) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(e.to_string()))?;
        tx.execute("DELETE FROM pest_info", [])
            .map_err(|e| Error::Database(e.to_string()))?;
        for r in rows {
            tx.execute(
                "INSERT INTO pest_info (pest_name, affected_crop, symptoms, management_advice) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![r.pest_name, r.affected_crop, r.symptoms, r.management_advice],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        }
        tx.commit().map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.len())
    }

    /// Replace the entire govt_schemes table with the given rows.
    pub fn replace_schemes(&self, rows: &[SchemeRecord]) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(e.to_string()))?;
        tx.execute("DELETE FROM govt_schemes", [])
            .map_err(|e| Error::Database(e.to_string()))?;
        for r in rows {
            tx.execute(
                "INSERT INTO govt_schemes (scheme_name, purpose, eligibility, benefits, how_to_apply) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![r.scheme_name, r.purpose, r.eligibility, r.benefits, r.how_to_apply],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        }
        tx.commit().map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.len())
    }

    // ---------------------------------------------------------------
    // Dynamic table discovery (index build)
    // ---------------------------------------------------------------

    /// Names of all user tables, in sqlite_master order.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Dump every row of a table with its column names, values stringified.
    /// NULLs and blobs come back as None so the formatter can skip them.
    pub fn dump_table(&self, table: &str) -> Result<TableDump> {
        let conn = self.conn.lock();
        // Table names come from sqlite_master, never from user input.
        let mut stmt = conn
            .prepare(&format!("SELECT * FROM {}", table))
            .map_err(|e| Error::Database(e.to_string()))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let n_cols = columns.len();

        let rows = stmt
            .query_map([], |row| {
                let mut values = Vec::with_capacity(n_cols);
                for i in 0..n_cols {
                    let value = match row.get_ref(i)? {
                        rusqlite::types::ValueRef::Null => None,
                        rusqlite::types::ValueRef::Integer(v) => Some(v.to_string()),
                        rusqlite::types::ValueRef::Real(v) => Some(v.to_string()),
                        rusqlite::types::ValueRef::Text(t) => {
                            Some(String::from_utf8_lossy(t).to_string())
                        }
                        rusqlite::types::ValueRef::Blob(_) => None,
                    };
                    values.push(value);
                }
                Ok(values)
            })
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(TableDump {
            table: table.to_string(),
            columns,
            rows: rows.filter_map(|r| r.ok()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etl::run_etl;
    use tempfile::TempDir;

    fn seeded_store() -> (KnowledgeStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = KnowledgeStore::open(dir.path().join("knowledge.db")).unwrap();
        run_etl(&store).unwrap();
        (store, dir)
    }

    #[test]
    fn test_lookup_crop_case_insensitive() {
        let (store, _dir) = seeded_store();

        let hit = store.lookup_crop("wheat", "jaipur").unwrap().unwrap();
        assert_eq!(hit.crop, "Wheat");
        assert!(hit.irrigation_schedule.is_some());

        let hit = store.lookup_crop("MUSTARD", "Rajasthan").unwrap().unwrap();
        assert_eq!(hit.crop, "Mustard");
    }

    #[test]
    fn test_lookup_crop_absent_is_empty() {
        let (store, _dir) = seeded_store();
        assert!(store.lookup_crop("Barley", "Jaipur").unwrap().is_none());
        assert!(store.lookup_crop("Wheat", "Mumbai").unwrap().is_none());
    }

    #[test]
    fn test_lookup_pests_sorted() {
        let (store, _dir) = seeded_store();
        store
            .replace_pests(&[
                PestRecord {
                    pest_name: "Termites".into(),
                    affected_crop: "Wheat".into(),
                    symptoms: "Damaged roots".into(),
                    management_advice: "Soil treatment".into(),
                },
                PestRecord {
                    pest_name: "Aphids".into(),
                    affected_crop: "Wheat".into(),
                    symptoms: "Yellowing leaves".into(),
                    management_advice: "Spray".into(),
                },
            ])
            .unwrap();

        let pests = store.lookup_pests("wheat").unwrap();
        assert_eq!(pests.len(), 2);
        assert_eq!(pests[0].pest_name, "Aphids");
        assert_eq!(pests[1].pest_name, "Termites");
    }

    #[test]
    fn test_lookup_pests_missing_table_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = KnowledgeStore::open(dir.path().join("knowledge.db")).unwrap();
        {
            let conn = store.conn.lock();
            conn.execute("DROP TABLE pest_info", []).unwrap();
        }
        let pests = store.lookup_pests("Wheat").unwrap();
        assert!(pests.is_empty());
    }

    #[test]
    fn test_dump_table_skips_nulls() {
        let (store, _dir) = seeded_store();
        store
            .replace_crops(&[CropRecord {
                crop: "Bajra".into(),
                location: "Jaipur, Rajasthan".into(),
                season: Some("Kharif".into()),
                sowing_period: None,
                harvesting_period: None,
                irrigation_schedule: None,
                fertilizer: None,
                pests: None,
            }])
            .unwrap();

        let dump = store.dump_table("crop_info").unwrap();
        assert_eq!(dump.rows.len(), 1);
        let row = &dump.rows[0];
        // id, crop, location, season populated; the rest NULL
        assert!(row[1].is_some());
        assert!(row[3].is_some());
        assert!(row[4].is_none());
    }

    #[test]
    fn test_list_tables() {
        let (store, _dir) = seeded_store();
        let tables = store.list_tables().unwrap();
        for t in ["crop_info", "soil_data", "pest_info", "govt_schemes"] {
            assert!(tables.iter().any(|name| name == t), "missing {}", t);
        }
    }
}
