//! Submissions manifest decoding and cutoff filtering.
//!
//! The submissions endpoint publishes a company's recent filings as parallel
//! arrays (`form[i]`, `filingDate[i]`, `accessionNumber[i]` and
//! `primaryDocument[i]` describe one filing). Every field is optional in the
//! decoded shape; the arrays are checked for alignment before any indexed
//! access.

use chrono::{Days, NaiveDate};
use filings_core::{
    AccessionNumber, Cik, CompanyProfile, FilingEntry, FilingManifest, FilingsError, FormType,
    RecentFiling, Result,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::company::industry_from_sic;

/// Date format used by the submissions endpoint.
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionsResponse {
    name: Option<String>,
    sic: Option<String>,
    sic_description: Option<String>,
    #[serde(default)]
    tickers: Vec<Option<String>>,
    #[serde(default)]
    exchanges: Vec<Option<String>>,
    filings: Option<FilingsSection>,
}

#[derive(Debug, Default, Deserialize)]
struct FilingsSection {
    recent: Option<RecentArrays>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentArrays {
    form: Option<Vec<Option<String>>>,
    filing_date: Option<Vec<Option<String>>>,
    accession_number: Option<Vec<Option<String>>>,
    primary_document: Option<Vec<Option<String>>>,
}

impl RecentArrays {
    /// Zips the parallel arrays into entries after checking their lengths.
    fn into_entries(self) -> Result<Vec<FilingEntry>> {
        let forms = self.form.unwrap_or_default();
        let dates = self.filing_date.unwrap_or_default();
        let accessions = self.accession_number.unwrap_or_default();

        if forms.len() != dates.len() || forms.len() != accessions.len() {
            return Err(FilingsError::MalformedManifest(format!(
                "misaligned arrays: form={}, filingDate={}, accessionNumber={}",
                forms.len(),
                dates.len(),
                accessions.len()
            )));
        }

        let documents = match self.primary_document {
            Some(documents) if documents.len() != forms.len() => {
                return Err(FilingsError::MalformedManifest(format!(
                    "misaligned arrays: form={}, primaryDocument={}",
                    forms.len(),
                    documents.len()
                )));
            }
            Some(documents) => documents,
            None => vec![None; forms.len()],
        };

        Ok(forms
            .into_iter()
            .zip(dates)
            .zip(accessions)
            .zip(documents)
            .map(|(((form, date), accession), document)| FilingEntry {
                form: form.unwrap_or_default(),
                filing_date: date.unwrap_or_default(),
                accession_number: accession.unwrap_or_default(),
                primary_document: document.filter(|d| !d.trim().is_empty()),
            })
            .collect())
    }
}

/// A decoded submissions document: company metadata plus filing history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submissions {
    /// Company metadata.
    pub profile: CompanyProfile,
    /// Recent filings.
    pub manifest: FilingManifest,
}

/// Builds the submissions URL for a company.
#[must_use]
pub fn submissions_url(base_url: &str, cik: Cik) -> String {
    format!("{}/CIK{}.json", base_url.trim_end_matches('/'), cik.padded())
}

/// Decodes a submissions document.
///
/// A document without a `filings.recent` section yields an empty manifest.
///
/// # Errors
/// Returns [`FilingsError::Parse`] if the body is not JSON of the expected
/// shape, or [`FilingsError::MalformedManifest`] if the parallel arrays have
/// different lengths.
pub fn parse_submissions(cik: Cik, body: &str) -> Result<Submissions> {
    let response: SubmissionsResponse = serde_json::from_str(body)
        .map_err(|e| FilingsError::Parse(format!("Failed to parse submissions for {cik}: {e}")))?;

    let entries = match response.filings.and_then(|f| f.recent) {
        Some(recent) => recent.into_entries()?,
        None => {
            debug!(%cik, "Submissions document has no recent filings");
            Vec::new()
        }
    };

    let sic = response.sic.filter(|s| !s.trim().is_empty());
    let industry = industry_from_sic(sic.as_deref().unwrap_or_default()).to_string();
    let profile = CompanyProfile {
        cik,
        name: response.name.unwrap_or_default(),
        sic,
        sic_description: response.sic_description,
        industry,
        tickers: response.tickers.into_iter().flatten().collect(),
        exchanges: response.exchanges.into_iter().flatten().collect(),
    };

    Ok(Submissions {
        profile,
        manifest: FilingManifest::new(cik, entries),
    })
}

/// Returns the entries filed on or after `as_of - days_back` whose form type
/// is in `form_types`.
///
/// The cutoff is inclusive. Entries with a missing or malformed date or
/// accession number are skipped with a warning.
#[must_use]
pub fn filter_recent(
    manifest: &FilingManifest,
    form_types: &[FormType],
    days_back: u32,
    as_of: NaiveDate,
) -> Vec<RecentFiling> {
    let cutoff = as_of
        .checked_sub_days(Days::new(u64::from(days_back)))
        .unwrap_or(NaiveDate::MIN);

    manifest
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let form = FormType::new(entry.form.as_str());
            if !form_types.contains(&form) {
                return None;
            }

            let filing_date = match NaiveDate::parse_from_str(entry.filing_date.trim(), DATE_FORMAT) {
                Ok(date) => date,
                Err(e) => {
                    warn!(
                        cik = %manifest.cik,
                        index,
                        filing_date = %entry.filing_date,
                        error = %e,
                        "Skipping manifest entry with bad filing date"
                    );
                    return None;
                }
            };
            if filing_date < cutoff {
                return None;
            }

            let accession = match AccessionNumber::parse(&entry.accession_number) {
                Ok(accession) => accession,
                Err(e) => {
                    warn!(
                        cik = %manifest.cik,
                        index,
                        error = %e,
                        "Skipping manifest entry with bad accession number"
                    );
                    return None;
                }
            };

            Some(RecentFiling {
                form,
                filing_date,
                accession,
                primary_document: entry.primary_document.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cik() -> Cik {
        Cik::parse("320193").unwrap()
    }

    fn entry(form: &str, date: &str, accession: &str) -> FilingEntry {
        FilingEntry {
            form: form.to_string(),
            filing_date: date.to_string(),
            accession_number: accession.to_string(),
            primary_document: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    const SUBMISSIONS: &str = r#"{
        "cik": "320193",
        "name": "Apple Inc.",
        "sic": "3571",
        "sicDescription": "Electronic Computers",
        "tickers": ["AAPL"],
        "exchanges": ["Nasdaq", null],
        "filings": {
            "recent": {
                "accessionNumber": ["0000320193-24-000123", "0000320193-24-000101"],
                "filingDate": ["2024-11-01", "2024-08-02"],
                "form": ["10-K", "4"],
                "primaryDocument": ["aapl-20240928.htm", "xslF345X05/wk-form4_1722.xml"]
            }
        }
    }"#;

    #[test]
    fn test_submissions_url() {
        assert_eq!(
            submissions_url("https://data.sec.gov/submissions/", cik()),
            "https://data.sec.gov/submissions/CIK0000320193.json"
        );
    }

    #[test]
    fn test_parse_submissions() {
        let submissions = parse_submissions(cik(), SUBMISSIONS).unwrap();

        assert_eq!(submissions.profile.name, "Apple Inc.");
        assert_eq!(submissions.profile.industry, "Technology - Hardware");
        assert_eq!(submissions.profile.tickers, vec!["AAPL"]);
        assert_eq!(submissions.profile.exchanges, vec!["Nasdaq"]);

        let manifest = submissions.manifest;
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.entries[0].form, "10-K");
        assert_eq!(manifest.entries[1].filing_date, "2024-08-02");
        assert_eq!(
            manifest.entries[0].primary_document.as_deref(),
            Some("aapl-20240928.htm")
        );
    }

    #[test]
    fn test_parse_rejects_misaligned_arrays() {
        let body = r#"{"filings": {"recent": {
            "accessionNumber": ["0000320193-24-000123"],
            "filingDate": ["2024-11-01", "2024-08-02"],
            "form": ["10-K", "4"]
        }}}"#;
        let err = parse_submissions(cik(), body).unwrap_err();
        assert!(matches!(err, FilingsError::MalformedManifest(_)));
    }

    #[test]
    fn test_parse_without_primary_documents() {
        let body = r#"{"filings": {"recent": {
            "accessionNumber": ["0000320193-24-000123"],
            "filingDate": ["2024-11-01"],
            "form": ["10-K"]
        }}}"#;
        let submissions = parse_submissions(cik(), body).unwrap();
        assert_eq!(submissions.manifest.len(), 1);
        assert!(submissions.manifest.entries[0].primary_document.is_none());
        assert_eq!(submissions.profile.industry, "Other");
    }

    #[test]
    fn test_parse_without_filings_section() {
        let submissions = parse_submissions(cik(), r#"{"name": "Shell Co"}"#).unwrap();
        assert!(submissions.manifest.is_empty());
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = parse_submissions(cik(), "<html>").unwrap_err();
        assert!(matches!(err, FilingsError::Parse(_)));
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let manifest = FilingManifest::new(
            cik(),
            vec![
                entry("10-K", "2024-01-01", "0000320193-24-000001"),
                entry("10-K", "2023-12-31", "0000320193-23-000002"),
            ],
        );
        let forms = [FormType::new("10-K")];

        let recent = filter_recent(&manifest, &forms, 30, date("2024-01-31"));

        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].filing_date, date("2024-01-01"));
        assert_eq!(recent[0].accession.dashed(), "0000320193-24-000001");
    }

    #[test]
    fn test_filter_by_form_type() {
        let manifest = FilingManifest::new(
            cik(),
            vec![
                entry("10-K", "2024-01-10", "0000320193-24-000001"),
                entry("8-K", "2024-01-11", "0000320193-24-000002"),
                entry("4", "2024-01-12", "0000320193-24-000003"),
            ],
        );
        let forms = [FormType::new("10-K"), FormType::new("4")];

        let recent = filter_recent(&manifest, &forms, 90, date("2024-02-01"));
        let kept: Vec<&str> = recent.iter().map(|f| f.form.as_str()).collect();
        assert_eq!(kept, vec!["10-K", "4"]);
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let manifest = FilingManifest::new(
            cik(),
            vec![
                entry("10-K", "", "0000320193-24-000001"),
                entry("10-K", "01/15/2024", "0000320193-24-000002"),
                entry("10-K", "2024-01-15", "not-an-accession"),
                entry("10-K", "2024-01-16", "000032019324000004"),
            ],
        );
        let forms = [FormType::new("10-K")];

        let recent = filter_recent(&manifest, &forms, 365, date("2024-02-01"));
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].accession.dashed(), "0000320193-24-000004");
    }

    #[test]
    fn test_zero_day_window_keeps_as_of_date() {
        let manifest = FilingManifest::new(
            cik(),
            vec![entry("8-K", "2024-02-01", "0000320193-24-000009")],
        );
        let recent = filter_recent(&manifest, &[FormType::new("8-K")], 0, date("2024-02-01"));
        assert_eq!(recent.len(), 1);
    }
}
