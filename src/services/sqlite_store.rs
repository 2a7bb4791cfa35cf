//! SQLite persistence for signal performance records.
//!
//! Records survive restarts so accuracy can be measured over months. Every
//! statement runs behind a single mutex-guarded connection.

use crate::error::{AnalysisError, Result};
use crate::services::signals::SignalRecordStore;
use crate::types::{RecordFilter, SignalEvaluation, SignalPerformanceRecord, SignalStrength, SignalType};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, Row};
use serde::Serialize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

const RECORD_COLUMNS: &str = "id, symbol, signal_type, strength, master_score,
    technical_score, sentiment_score, activity_score, price_at_generation, generated_at,
    pending, evaluated_at, timeframe_days, return_percent, benchmark_return_percent,
    excess_return, is_profitable";

/// Row counts over the whole table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordStats {
    pub total: usize,
    pub pending: usize,
    pub evaluated: usize,
    pub profitable: usize,
}

/// SQLite store for signal performance records.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        info!("SQLite store initialized");
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        debug!("In-memory SQLite store initialized");
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AnalysisError::Computation("sqlite connection lock poisoned".to_string()))
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS signal_performance (
                id TEXT PRIMARY KEY,
                symbol TEXT NOT NULL,
                signal_type TEXT NOT NULL,
                strength TEXT NOT NULL,
                master_score REAL NOT NULL,
                technical_score REAL,
                sentiment_score REAL,
                activity_score REAL,
                price_at_generation REAL NOT NULL,
                generated_at INTEGER NOT NULL,
                pending INTEGER NOT NULL DEFAULT 1,
                evaluated_at INTEGER,
                timeframe_days INTEGER,
                return_percent REAL,
                benchmark_return_percent REAL,
                excess_return REAL,
                is_profitable INTEGER
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_signal_performance_symbol_pending
             ON signal_performance(symbol, pending)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_signal_performance_symbol_timeframe
             ON signal_performance(symbol, timeframe_days)",
            [],
        )?;

        debug!("SQLite schema initialized");
        Ok(())
    }

    /// Count records by state.
    pub fn stats(&self) -> Result<RecordStats> {
        let conn = self.conn()?;

        let stats = conn.query_row(
            "SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN pending = 1 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN pending = 0 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN is_profitable = 1 THEN 1 ELSE 0 END), 0)
             FROM signal_performance",
            [],
            |row| {
                Ok(RecordStats {
                    total: row.get::<_, i64>(0)? as usize,
                    pending: row.get::<_, i64>(1)? as usize,
                    evaluated: row.get::<_, i64>(2)? as usize,
                    profitable: row.get::<_, i64>(3)? as usize,
                })
            },
        )?;

        Ok(stats)
    }
}

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<SignalPerformanceRecord> {
    let id: String = row.get(0)?;
    let signal_type: String = row.get(2)?;
    let strength: String = row.get(3)?;

    Ok(SignalPerformanceRecord {
        id: Uuid::parse_str(&id).map_err(|e| conversion_error(0, e.to_string()))?,
        symbol: row.get(1)?,
        signal_type: SignalType::parse(&signal_type)
            .ok_or_else(|| conversion_error(2, format!("unknown signal type {}", signal_type)))?,
        strength: SignalStrength::parse(&strength)
            .ok_or_else(|| conversion_error(3, format!("unknown strength {}", strength)))?,
        master_score: row.get(4)?,
        technical_score: row.get(5)?,
        sentiment_score: row.get(6)?,
        activity_score: row.get(7)?,
        price_at_generation: row.get(8)?,
        generated_at: row.get(9)?,
        pending: row.get(10)?,
        evaluated_at: row.get(11)?,
        timeframe_days: row.get(12)?,
        return_percent: row.get(13)?,
        benchmark_return_percent: row.get(14)?,
        excess_return: row.get(15)?,
        is_profitable: row.get(16)?,
    })
}

impl SignalRecordStore for SqliteStore {
    fn create(&self, record: &SignalPerformanceRecord) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            &format!(
                "INSERT INTO signal_performance ({})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                RECORD_COLUMNS
            ),
            params![
                record.id.to_string(),
                record.symbol,
                record.signal_type.as_str(),
                record.strength.as_str(),
                record.master_score,
                record.technical_score,
                record.sentiment_score,
                record.activity_score,
                record.price_at_generation,
                record.generated_at,
                record.pending,
                record.evaluated_at,
                record.timeframe_days,
                record.return_percent,
                record.benchmark_return_percent,
                record.excess_return,
                record.is_profitable,
            ],
        )?;

        debug!("Stored signal record {} for {}", record.id, record.symbol);
        Ok(())
    }

    fn query(&self, filter: &RecordFilter) -> Result<Vec<SignalPerformanceRecord>> {
        let mut sql = format!("SELECT {} FROM signal_performance WHERE 1 = 1", RECORD_COLUMNS);
        let mut values: Vec<Value> = Vec::new();

        if let Some(symbol) = &filter.symbol {
            sql.push_str(" AND symbol = ?");
            values.push(Value::Text(symbol.to_uppercase()));
        }
        if let Some(signal_type) = filter.signal_type {
            sql.push_str(" AND signal_type = ?");
            values.push(Value::Text(signal_type.as_str().to_string()));
        }
        if let Some(days) = filter.timeframe_days {
            sql.push_str(" AND timeframe_days = ?");
            values.push(Value::Integer(i64::from(days)));
        }
        if let Some(pending) = filter.pending {
            sql.push_str(" AND pending = ?");
            values.push(Value::Integer(i64::from(pending)));
        }
        if let Some(ts) = filter.generated_before {
            sql.push_str(" AND generated_at < ?");
            values.push(Value::Integer(ts));
        }
        sql.push_str(" ORDER BY generated_at ASC");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(values.iter()), row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    fn update(&self, id: Uuid, evaluation: &SignalEvaluation) -> Result<bool> {
        let conn = self.conn()?;

        let changed = conn.execute(
            "UPDATE signal_performance SET
                pending = 0,
                evaluated_at = ?2,
                timeframe_days = ?3,
                return_percent = ?4,
                benchmark_return_percent = ?5,
                excess_return = ?6,
                is_profitable = ?7
             WHERE id = ?1 AND pending = 1",
            params![
                id.to_string(),
                evaluation.evaluated_at,
                evaluation.timeframe_days,
                evaluation.return_percent,
                evaluation.benchmark_return_percent,
                evaluation.excess_return,
                evaluation.is_profitable,
            ],
        )?;

        Ok(changed > 0)
    }

    fn delete_evaluated_before(&self, cutoff: i64) -> Result<usize> {
        let conn = self.conn()?;

        let deleted = conn.execute(
            "DELETE FROM signal_performance WHERE pending = 0 AND generated_at < ?1",
            params![cutoff],
        )?;

        if deleted > 0 {
            info!("Deleted {} evaluated signal records", deleted);
        }
        Ok(deleted)
    }
}
