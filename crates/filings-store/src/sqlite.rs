//! SQLite-based store implementation.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use filings_core::{
    AnalysisRecord, Cik, Company, FilingStore, FilingsError, FinancialMetric, FormType, NewFiling,
    Result, StoredFiling,
};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, instrument};

fn storage_error(e: impl ToString) -> FilingsError {
    FilingsError::Storage(e.to_string())
}

fn parse_cik(s: &str) -> Result<Cik> {
    Cik::parse(s).map_err(|e| storage_error(format!("Corrupt CIK '{s}': {e}")))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    s.parse::<NaiveDate>()
        .map_err(|e| storage_error(format!("Corrupt date '{s}': {e}")))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| storage_error(format!("Corrupt timestamp '{s}': {e}")))
}

/// SQLite-based store for companies, filings, metrics and analyses.
///
/// Data lives in a SQLite database file (or in memory), providing
/// persistence across application restarts. The connection is guarded by a
/// mutex; statements are short and run on the calling task.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at the given path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(storage_error)?;
        Self::with_connection(conn)
    }

    /// Create an in-memory SQLite store.
    ///
    /// Useful for testing; data is lost when the store is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage_error)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(storage_error)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS companies (
                cik TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                sic TEXT,
                industry TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS filings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                company_cik TEXT NOT NULL,
                form_type TEXT NOT NULL,
                filing_date TEXT NOT NULL,
                document_url TEXT NOT NULL,
                processed_content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_filings_company_date
                ON filings(company_cik, filing_date);

            CREATE TABLE IF NOT EXISTS financial_metrics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                company_cik TEXT NOT NULL,
                metric_name TEXT NOT NULL,
                metric_value REAL NOT NULL,
                as_of_date TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_metrics_company_date
                ON financial_metrics(company_cik, as_of_date);

            CREATE TABLE IF NOT EXISTS analysis_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                company_cik TEXT NOT NULL,
                analysis_type TEXT NOT NULL,
                analysis_result TEXT NOT NULL,
                analysis_date TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_analysis_company_date
                ON analysis_results(company_cik, analysis_date);",
        )
        .map_err(storage_error)?;

        debug!("SQLite store schema initialized");
        Ok(())
    }
}

#[async_trait]
impl FilingStore for SqliteStore {
    #[instrument(skip(self, company), fields(cik = %company.cik))]
    async fn upsert_company(&self, company: &Company) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO companies (cik, name, sic, industry, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT(cik) DO UPDATE SET
                name = excluded.name,
                sic = excluded.sic,
                industry = excluded.industry,
                updated_at = excluded.updated_at",
            params![
                company.cik.padded(),
                company.name,
                company.sic,
                company.industry,
                now
            ],
        )
        .map_err(storage_error)?;

        debug!("Upserted company");
        Ok(())
    }

    #[instrument(skip(self), fields(cik = %cik))]
    async fn company(&self, cik: Cik) -> Result<Option<Company>> {
        let conn = self.lock()?;

        let row = conn
            .query_row(
                "SELECT cik, name, sic, industry FROM companies WHERE cik = ?1",
                params![cik.padded()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(storage_error)?;

        match row {
            Some((cik, name, sic, industry)) => {
                Ok(Some(Company::new(parse_cik(&cik)?, name, sic, industry)))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn companies(&self) -> Result<Vec<Company>> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare("SELECT cik, name, sic, industry FROM companies ORDER BY name")
            .map_err(storage_error)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(storage_error)?;

        let mut companies = Vec::new();
        for row in rows {
            let (cik, name, sic, industry) = row.map_err(storage_error)?;
            companies.push(Company::new(parse_cik(&cik)?, name, sic, industry));
        }
        Ok(companies)
    }

    #[instrument(skip(self, filing), fields(cik = %filing.company_cik, form = %filing.form_type))]
    async fn store_filing(&self, filing: &NewFiling) -> Result<i64> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO filings
                (company_cik, form_type, filing_date, document_url, processed_content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                filing.company_cik.padded(),
                filing.form_type.as_str(),
                filing.filing_date.to_string(),
                filing.document_url,
                filing.processed_content,
                Utc::now().to_rfc3339()
            ],
        )
        .map_err(storage_error)?;

        let id = conn.last_insert_rowid();
        debug!(id, "Stored filing");
        Ok(id)
    }

    #[instrument(skip(self), fields(cik = %cik))]
    async fn recent_filings(&self, cik: Cik, limit: usize) -> Result<Vec<StoredFiling>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, company_cik, form_type, filing_date, document_url, processed_content, created_at
                 FROM filings
                 WHERE company_cik = ?1
                 ORDER BY filing_date DESC, id DESC
                 LIMIT ?2",
            )
            .map_err(storage_error)?;
        let rows = stmt
            .query_map(params![cik.padded(), limit], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })
            .map_err(storage_error)?;

        let mut filings = Vec::new();
        for row in rows {
            let (id, company_cik, form_type, filing_date, document_url, processed_content, created_at) =
                row.map_err(storage_error)?;
            filings.push(StoredFiling {
                id,
                company_cik: parse_cik(&company_cik)?,
                form_type: FormType::new(form_type),
                filing_date: parse_date(&filing_date)?,
                document_url,
                processed_content,
                created_at: parse_timestamp(&created_at)?,
            });
        }

        debug!(count = filings.len(), "Loaded recent filings");
        Ok(filings)
    }

    #[instrument(skip(self), fields(cik = %cik))]
    async fn store_metric(
        &self,
        cik: Cik,
        metric_name: &str,
        metric_value: f64,
        as_of_date: NaiveDate,
    ) -> Result<i64> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO financial_metrics (company_cik, metric_name, metric_value, as_of_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                cik.padded(),
                metric_name,
                metric_value,
                as_of_date.to_string(),
                Utc::now().to_rfc3339()
            ],
        )
        .map_err(storage_error)?;

        Ok(conn.last_insert_rowid())
    }

    #[instrument(skip(self), fields(cik = %cik))]
    async fn metrics(&self, cik: Cik) -> Result<Vec<FinancialMetric>> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, company_cik, metric_name, metric_value, as_of_date, created_at
                 FROM financial_metrics
                 WHERE company_cik = ?1
                 ORDER BY as_of_date DESC, id DESC",
            )
            .map_err(storage_error)?;
        let rows = stmt
            .query_map(params![cik.padded()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })
            .map_err(storage_error)?;

        let mut metrics = Vec::new();
        for row in rows {
            let (id, company_cik, metric_name, metric_value, as_of_date, created_at) =
                row.map_err(storage_error)?;
            metrics.push(FinancialMetric {
                id,
                company_cik: parse_cik(&company_cik)?,
                metric_name,
                metric_value,
                as_of_date: parse_date(&as_of_date)?,
                created_at: parse_timestamp(&created_at)?,
            });
        }
        Ok(metrics)
    }

    #[instrument(skip(self, analysis_result), fields(cik = %cik))]
    async fn store_analysis(
        &self,
        cik: Cik,
        analysis_type: &str,
        analysis_result: &str,
        analysis_date: NaiveDate,
    ) -> Result<i64> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO analysis_results
                (company_cik, analysis_type, analysis_result, analysis_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                cik.padded(),
                analysis_type,
                analysis_result,
                analysis_date.to_string(),
                Utc::now().to_rfc3339()
            ],
        )
        .map_err(storage_error)?;

        Ok(conn.last_insert_rowid())
    }

    #[instrument(skip(self), fields(cik = %cik))]
    async fn analyses(&self, cik: Cik) -> Result<Vec<AnalysisRecord>> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, company_cik, analysis_type, analysis_result, analysis_date, created_at
                 FROM analysis_results
                 WHERE company_cik = ?1
                 ORDER BY analysis_date DESC, id DESC",
            )
            .map_err(storage_error)?;
        let rows = stmt
            .query_map(params![cik.padded()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })
            .map_err(storage_error)?;

        let mut analyses = Vec::new();
        for row in rows {
            let (id, company_cik, analysis_type, analysis_result, analysis_date, created_at) =
                row.map_err(storage_error)?;
            analyses.push(AnalysisRecord {
                id,
                company_cik: parse_cik(&company_cik)?,
                analysis_type,
                analysis_result,
                analysis_date: parse_date(&analysis_date)?,
                created_at: parse_timestamp(&created_at)?,
            });
        }
        Ok(analyses)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            "DELETE FROM filings;
             DELETE FROM financial_metrics;
             DELETE FROM analysis_results;
             DELETE FROM companies;",
        )
        .map_err(storage_error)?;

        debug!("Cleared all stored data");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cik(s: &str) -> Cik {
        Cik::parse(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn filing(cik: Cik, form: &str, filing_date: NaiveDate) -> NewFiling {
        NewFiling {
            company_cik: cik,
            form_type: FormType::new(form),
            filing_date,
            document_url: format!("https://www.sec.gov/Archives/edgar/data/{}/doc.htm", cik.unpadded()),
            processed_content: format!("{form} filed {filing_date}"),
        }
    }

    #[tokio::test]
    async fn test_sqlite_store_initialization() {
        let store = SqliteStore::in_memory();
        assert!(store.is_ok());
    }

    #[tokio::test]
    async fn test_company_upsert() {
        let store = SqliteStore::in_memory().unwrap();
        let apple = cik("320193");

        assert!(store.company(apple).await.unwrap().is_none());

        store
            .upsert_company(&Company::new(apple, "Apple Computer", None, "Other"))
            .await
            .unwrap();
        store
            .upsert_company(&Company::new(
                apple,
                "Apple Inc.",
                Some("3571".to_string()),
                "Technology - Hardware",
            ))
            .await
            .unwrap();
        store
            .upsert_company(&Company::new(cik("789019"), "Microsoft Corp", None, "Other"))
            .await
            .unwrap();

        let stored = store.company(apple).await.unwrap().unwrap();
        assert_eq!(stored.name, "Apple Inc.");
        assert_eq!(stored.sic.as_deref(), Some("3571"));

        let names: Vec<String> = store
            .companies()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Apple Inc.", "Microsoft Corp"]);
    }

    #[tokio::test]
    async fn test_recent_filings_newest_first() {
        let store = SqliteStore::in_memory().unwrap();
        let apple = cik("320193");

        let first = store
            .store_filing(&filing(apple, "10-Q", date(2024, 5, 3)))
            .await
            .unwrap();
        let second = store
            .store_filing(&filing(apple, "10-K", date(2024, 11, 1)))
            .await
            .unwrap();
        store
            .store_filing(&filing(apple, "8-K", date(2024, 8, 1)))
            .await
            .unwrap();
        store
            .store_filing(&filing(cik("789019"), "10-K", date(2024, 7, 30)))
            .await
            .unwrap();
        assert!(second > first);

        let recent = store.recent_filings(apple, 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].form_type.as_str(), "10-K");
        assert_eq!(recent[0].id, second);
        assert_eq!(recent[1].filing_date, date(2024, 8, 1));
        assert_eq!(recent[0].company_cik, apple);
    }

    #[tokio::test]
    async fn test_metrics_and_analyses() {
        let store = SqliteStore::in_memory().unwrap();
        let apple = cik("320193");

        store
            .store_metric(apple, "pe_ratio", 28.5, date(2024, 3, 31))
            .await
            .unwrap();
        store
            .store_metric(apple, "current_ratio", 0.87, date(2024, 9, 30))
            .await
            .unwrap();

        let metrics = store.metrics(apple).await.unwrap();
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].metric_name, "current_ratio");
        assert!((metrics[1].metric_value - 28.5).abs() < 1e-12);

        let id = store
            .store_analysis(apple, "filing", "Revenue grew.", date(2024, 11, 2))
            .await
            .unwrap();
        let analyses = store.analyses(apple).await.unwrap();
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].id, id);
        assert_eq!(analyses[0].analysis_result, "Revenue grew.");
        assert!(store.analyses(cik("789019")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let store = SqliteStore::in_memory().unwrap();
        let apple = cik("320193");

        store
            .upsert_company(&Company::new(apple, "Apple Inc.", None, "Other"))
            .await
            .unwrap();
        store
            .store_filing(&filing(apple, "10-K", date(2024, 11, 1)))
            .await
            .unwrap();

        store.clear().await.unwrap();

        assert!(store.companies().await.unwrap().is_empty());
        assert!(store.recent_filings(apple, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let path = std::env::temp_dir().join(format!("filings-store-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let apple = cik("320193");

        {
            let store = SqliteStore::new(&path).unwrap();
            store
                .upsert_company(&Company::new(apple, "Apple Inc.", None, "Other"))
                .await
                .unwrap();
        }

        let reopened = SqliteStore::new(&path).unwrap();
        assert!(reopened.company(apple).await.unwrap().is_some());
        let _ = std::fs::remove_file(&path);
    }
}
