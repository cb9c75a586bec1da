//! Agri-Sarthi Store — structured agronomy knowledge in SQLite.
//!
//! Holds the four advisory tables (`crop_info`, `soil_data`, `pest_info`,
//! `govt_schemes`), the lookups used by the keyword retriever, and the
//! one-shot ETL that seeds them. Absence of data is always an empty
//! result, never an error surfaced to the caller.

pub mod etl;
pub mod schema;
pub mod sqlite;
pub mod types;

pub use etl::{run_etl, EtlReport};
pub use sqlite::{KnowledgeStore, TableDump};
pub use types::{CropRecord, PestRecord, SchemeRecord, SoilRecord};
