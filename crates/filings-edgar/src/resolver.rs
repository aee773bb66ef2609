//! Filing document resolution.
//!
//! EDGAR stores a filing's documents under
//! `{archives}/{cik}/{accession}/`, but the file name of the document that
//! matters depends on the form type and on the era the filing was made in.
//! The resolver turns an [`AccessionReference`] into an ordered list of
//! candidate URLs and walks that list through the [`DocumentFetcher`],
//! stopping at the first success.
//!
//! Candidate order for insider-transaction forms (3, 4, 5 and amendments):
//!
//! 1. The `index.json` listing entry whose name contains `form<N>` or
//!    `doc<N>` and ends in `.xml`
//! 2. `{cik}/{acc}/form<N>.xml`
//! 3. `{cik}/{acc}/doc<N>.xml`
//! 4. `{cik}/{acc}/primary_doc.xml`
//! 5. `{cik_padded}/{acc}/{acc-dashed}.txt` (full submission text)
//!
//! For other forms: the listing entry whose declared type equals the form,
//! else the first `.htm`/`.html` entry, then `{cik}/{acc}/{acc-dashed}.txt`.
//!
//! The attempt sequence depends only on the inputs and the remote responses.

use filings_core::{AccessionReference, AttemptFailure, FilingsError, FormType, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, instrument, warn};

use crate::fetcher::DocumentFetcher;

/// Where a candidate URL came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CandidateSource {
    /// An entry of the accession's directory listing.
    Listing,
    /// A fixed, historically valid URL template.
    Template,
    /// The full submission text file.
    FullSubmission,
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listing => write!(f, "listing"),
            Self::Template => write!(f, "template"),
            Self::FullSubmission => write!(f, "full submission"),
        }
    }
}

/// A document URL to try.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// Absolute document URL.
    pub url: String,
    /// Where the URL came from.
    pub source: CandidateSource,
}

impl Candidate {
    fn new(url: String, source: CandidateSource) -> Self {
        Self { url, source }
    }
}

/// Ordered candidates for one filing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Candidate URLs, de-duplicated, in the order they must be tried.
    pub candidates: Vec<Candidate>,
    /// Why the directory listing produced no candidate, if it did not.
    pub listing_failure: Option<AttemptFailure>,
}

/// A successfully fetched filing document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedDocument {
    /// Raw document body.
    pub content: String,
    /// URL that answered.
    pub url: String,
    /// Where that URL came from.
    pub source: CandidateSource,
    /// Failures that preceded the success.
    pub failed_attempts: Vec<AttemptFailure>,
}

#[derive(Debug, Default, Deserialize)]
struct IndexListing {
    directory: Option<IndexDirectory>,
}

#[derive(Debug, Default, Deserialize)]
struct IndexDirectory {
    #[serde(default)]
    item: Vec<IndexItem>,
}

#[derive(Debug, Default, Deserialize)]
struct IndexItem {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    kind: String,
}

/// Resolves filing documents through an ordered fallback chain.
#[derive(Clone, Debug)]
pub struct FilingIndexResolver {
    fetcher: DocumentFetcher,
    archives_base_url: String,
}

impl FilingIndexResolver {
    /// Creates a resolver that fetches through `fetcher`.
    #[must_use]
    pub fn new(fetcher: DocumentFetcher, archives_base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            archives_base_url: archives_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Returns the fetcher used for listings and documents.
    #[must_use]
    pub const fn fetcher(&self) -> &DocumentFetcher {
        &self.fetcher
    }

    fn folder_url(&self, reference: &AccessionReference) -> String {
        format!(
            "{}/{}/{}",
            self.archives_base_url,
            reference.cik.unpadded(),
            reference.accession.stripped()
        )
    }

    /// Returns the URL of the accession's `index.json` directory listing.
    #[must_use]
    pub fn index_url(&self, reference: &AccessionReference) -> String {
        format!("{}/index.json", self.folder_url(reference))
    }

    /// Returns the URL of the full submission text file, under the padded CIK.
    #[must_use]
    pub fn full_submission_url(&self, reference: &AccessionReference) -> String {
        format!(
            "{}/{}/{}/{}.txt",
            self.archives_base_url,
            reference.cik.padded(),
            reference.accession.stripped(),
            reference.accession.dashed()
        )
    }

    /// Returns the fixed candidates that follow the listing lookup.
    #[must_use]
    pub fn template_candidates(
        &self,
        reference: &AccessionReference,
        form_type: &FormType,
    ) -> Vec<Candidate> {
        let folder = self.folder_url(reference);

        if form_type.is_insider_transaction() {
            let n = form_type.base();
            vec![
                Candidate::new(format!("{folder}/form{n}.xml"), CandidateSource::Template),
                Candidate::new(format!("{folder}/doc{n}.xml"), CandidateSource::Template),
                Candidate::new(format!("{folder}/primary_doc.xml"), CandidateSource::Template),
                Candidate::new(self.full_submission_url(reference), CandidateSource::FullSubmission),
            ]
        } else {
            vec![Candidate::new(
                format!("{folder}/{}.txt", reference.accession.dashed()),
                CandidateSource::FullSubmission,
            )]
        }
    }

    /// Builds the ordered candidate list for a filing.
    ///
    /// Fetches the directory listing (one rate-limited request). A listing
    /// that cannot be fetched, decoded or matched is recorded in
    /// [`Resolution::listing_failure`] and the template candidates are used
    /// on their own.
    #[instrument(skip(self), fields(cik = %reference.cik, accession = %reference.accession, form = %form_type))]
    pub async fn resolve(&self, reference: &AccessionReference, form_type: &FormType) -> Resolution {
        let index_url = self.index_url(reference);

        let (listed, listing_failure) = match self.lookup_listing(&index_url, form_type).await {
            Ok(name) => {
                debug!(name = %name, "Directory listing matched");
                (
                    Some(Candidate::new(
                        format!("{}/{name}", self.folder_url(reference)),
                        CandidateSource::Listing,
                    )),
                    None,
                )
            }
            Err(reason) => {
                debug!(reason = %reason, "Directory listing produced no candidate");
                (None, Some(AttemptFailure::new(index_url, reason)))
            }
        };

        let mut seen = HashSet::new();
        let candidates = listed
            .into_iter()
            .chain(self.template_candidates(reference, form_type))
            .filter(|c| seen.insert(c.url.clone()))
            .collect();

        Resolution {
            candidates,
            listing_failure,
        }
    }

    /// Fetches and matches the directory listing, returning the file name.
    async fn lookup_listing(
        &self,
        index_url: &str,
        form_type: &FormType,
    ) -> std::result::Result<String, String> {
        let body = self.fetcher.fetch(index_url).await.map_err(|e| e.to_string())?;
        let listing: IndexListing = serde_json::from_str(&body)
            .map_err(|e| format!("malformed directory listing: {e}"))?;
        let items = listing.directory.map(|d| d.item).unwrap_or_default();

        match_listing(&items, form_type)
            .map(ToString::to_string)
            .ok_or_else(|| format!("no listed document matches form {form_type}"))
    }

    /// Resolves a filing and fetches the first candidate that answers.
    ///
    /// # Errors
    /// Returns [`FilingsError::ResolutionExhausted`] carrying every attempt,
    /// the listing lookup included, when no candidate succeeds.
    pub async fn get_document(
        &self,
        reference: &AccessionReference,
        form_type: &FormType,
    ) -> Result<ResolvedDocument> {
        let resolution = self.resolve(reference, form_type).await;
        let mut attempts: Vec<AttemptFailure> = resolution.listing_failure.into_iter().collect();

        for candidate in resolution.candidates {
            match self.fetcher.fetch(&candidate.url).await {
                Ok(content) => {
                    debug!(url = %candidate.url, source = %candidate.source, "Resolved filing document");
                    return Ok(ResolvedDocument {
                        content,
                        url: candidate.url,
                        source: candidate.source,
                        failed_attempts: attempts,
                    });
                }
                Err(e) => {
                    warn!(url = %candidate.url, error = %e, "Candidate document failed");
                    attempts.push(AttemptFailure::new(candidate.url, e.to_string()));
                }
            }
        }

        Err(FilingsError::ResolutionExhausted {
            accession: reference.accession.dashed(),
            attempts,
        })
    }
}

/// Picks the listed document for `form_type`.
fn match_listing<'a>(items: &'a [IndexItem], form_type: &FormType) -> Option<&'a str> {
    if form_type.is_insider_transaction() {
        let n = form_type.base();
        let keywords = [format!("form{n}"), format!("doc{n}")];
        return items
            .iter()
            .map(|item| item.name.as_str())
            .find(|name| {
                let lower = name.to_lowercase();
                lower.ends_with(".xml") && keywords.iter().any(|k| lower.contains(k.as_str()))
            });
    }

    items
        .iter()
        .find(|item| !item.kind.is_empty() && FormType::new(item.kind.as_str()) == *form_type)
        .or_else(|| {
            items.iter().find(|item| {
                let lower = item.name.to_lowercase();
                (lower.ends_with(".htm") || lower.ends_with(".html")) && !lower.contains("-index")
            })
        })
        .map(|item| item.name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limiter::RateLimiter;
    use crate::testing::ScriptedTransport;
    use filings_core::{AccessionNumber, Cik};
    use std::sync::Arc;
    use std::time::Duration;

    const ARCHIVES: &str = "https://sec.test/Archives/edgar/data";
    const FOLDER: &str = "https://sec.test/Archives/edgar/data/320193/000032019324000101";

    fn reference() -> AccessionReference {
        AccessionReference::new(
            Cik::parse("0000320193").unwrap(),
            AccessionNumber::parse("0000320193-24-000101").unwrap(),
        )
    }

    fn resolver(transport: ScriptedTransport) -> (FilingIndexResolver, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        let fetcher = DocumentFetcher::new(
            transport.clone(),
            Arc::new(RateLimiter::new(Duration::ZERO)),
        );
        (FilingIndexResolver::new(fetcher, ARCHIVES), transport)
    }

    fn urls(resolution: &Resolution) -> Vec<&str> {
        resolution.candidates.iter().map(|c| c.url.as_str()).collect()
    }

    #[test]
    fn test_insider_templates() {
        let (resolver, _) = resolver(ScriptedTransport::new());
        let candidates = resolver.template_candidates(&reference(), &FormType::new("4/A"));
        let urls: Vec<&str> = candidates.iter().map(|c| c.url.as_str()).collect();

        assert_eq!(
            urls,
            vec![
                format!("{FOLDER}/form4.xml"),
                format!("{FOLDER}/doc4.xml"),
                format!("{FOLDER}/primary_doc.xml"),
                format!("{ARCHIVES}/0000320193/000032019324000101/0000320193-24-000101.txt"),
            ]
        );
        assert_eq!(candidates[3].source, CandidateSource::FullSubmission);
    }

    #[tokio::test]
    async fn test_insider_listing_match_comes_first() {
        let listing = r#"{"directory": {"item": [
            {"name": "0000320193-24-000101-index.htm", "type": "text/html"},
            {"name": "xslF345X05", "type": "folder.gif"},
            {"name": "wk-form4_1722.xml", "type": "text/xml"}
        ]}}"#;
        let (resolver, _) = resolver(
            ScriptedTransport::new().with_body(&format!("{FOLDER}/index.json"), listing),
        );

        let resolution = resolver.resolve(&reference(), &FormType::new("4")).await;

        assert!(resolution.listing_failure.is_none());
        assert_eq!(resolution.candidates.len(), 5);
        assert_eq!(resolution.candidates[0].url, format!("{FOLDER}/wk-form4_1722.xml"));
        assert_eq!(resolution.candidates[0].source, CandidateSource::Listing);
        assert_eq!(resolution.candidates[1].url, format!("{FOLDER}/form4.xml"));
    }

    #[tokio::test]
    async fn test_listing_duplicate_of_template_is_dropped() {
        let listing = r#"{"directory": {"item": [{"name": "form4.xml", "type": ""}]}}"#;
        let (resolver, _) = resolver(
            ScriptedTransport::new().with_body(&format!("{FOLDER}/index.json"), listing),
        );

        let resolution = resolver.resolve(&reference(), &FormType::new("4")).await;

        assert_eq!(resolution.candidates.len(), 4);
        assert_eq!(resolution.candidates[0].source, CandidateSource::Listing);
        assert_eq!(urls(&resolution)[1], format!("{FOLDER}/doc4.xml"));
    }

    #[tokio::test]
    async fn test_listing_without_match_is_a_failure() {
        let listing = r#"{"directory": {"item": [{"name": "notes.txt", "type": ""}]}}"#;
        let (resolver, _) = resolver(
            ScriptedTransport::new().with_body(&format!("{FOLDER}/index.json"), listing),
        );

        let resolution = resolver.resolve(&reference(), &FormType::new("4")).await;

        let failure = resolution.listing_failure.unwrap();
        assert_eq!(failure.url, format!("{FOLDER}/index.json"));
        assert!(failure.reason.contains("no listed document"));
        assert_eq!(resolution.candidates.len(), 4);
    }

    #[tokio::test]
    async fn test_malformed_listing_falls_back() {
        let (resolver, _) = resolver(
            ScriptedTransport::new().with_body(&format!("{FOLDER}/index.json"), "<html>busy</html>"),
        );

        let resolution = resolver.resolve(&reference(), &FormType::new("4")).await;

        assert!(resolution.listing_failure.unwrap().reason.contains("malformed"));
        assert_eq!(resolution.candidates[0].url, format!("{FOLDER}/form4.xml"));
    }

    #[tokio::test]
    async fn test_generic_form_prefers_declared_type() {
        let listing = r#"{"directory": {"item": [
            {"name": "0000320193-24-000101-index.htm", "type": ""},
            {"name": "R1.htm", "type": ""},
            {"name": "aapl-20240928.htm", "type": "10-K"}
        ]}}"#;
        let (resolver, _) = resolver(
            ScriptedTransport::new().with_body(&format!("{FOLDER}/index.json"), listing),
        );

        let resolution = resolver.resolve(&reference(), &FormType::new("10-K")).await;

        assert_eq!(
            urls(&resolution),
            vec![
                format!("{FOLDER}/aapl-20240928.htm"),
                format!("{FOLDER}/0000320193-24-000101.txt"),
            ]
        );
    }

    #[tokio::test]
    async fn test_generic_form_falls_back_to_markup() {
        let listing = r#"{"directory": {"item": [
            {"name": "0000320193-24-000101-index.htm", "type": ""},
            {"name": "exhibit.jpg", "type": ""},
            {"name": "d8k.HTML", "type": ""}
        ]}}"#;
        let (resolver, _) = resolver(
            ScriptedTransport::new().with_body(&format!("{FOLDER}/index.json"), listing),
        );

        let resolution = resolver.resolve(&reference(), &FormType::new("8-K")).await;

        assert_eq!(resolution.candidates[0].url, format!("{FOLDER}/d8k.HTML"));
    }

    #[tokio::test]
    async fn test_get_document_stops_at_first_success() {
        let (resolver, transport) = resolver(
            ScriptedTransport::new()
                .with_network_error(&format!("{FOLDER}/index.json"))
                .with_body(&format!("{FOLDER}/doc4.xml"), "<ownershipDocument/>"),
        );

        let document = resolver
            .get_document(&reference(), &FormType::new("4"))
            .await
            .unwrap();

        assert_eq!(document.content, "<ownershipDocument/>");
        assert_eq!(document.url, format!("{FOLDER}/doc4.xml"));
        assert_eq!(document.source, CandidateSource::Template);
        assert_eq!(document.failed_attempts.len(), 2);
        assert_eq!(
            transport.requests(),
            vec![
                format!("{FOLDER}/index.json"),
                format!("{FOLDER}/form4.xml"),
                format!("{FOLDER}/doc4.xml"),
            ]
        );
    }

    #[tokio::test]
    async fn test_exhaustion_reports_every_attempt() {
        let (resolver, _) = resolver(
            ScriptedTransport::new().with_status(&format!("{FOLDER}/index.json"), 503),
        );

        let err = resolver
            .get_document(&reference(), &FormType::new("4"))
            .await
            .unwrap_err();

        match err {
            FilingsError::ResolutionExhausted {
                accession,
                attempts,
            } => {
                assert_eq!(accession, "0000320193-24-000101");
                assert_eq!(attempts.len(), 5);
                assert!(attempts[0].reason.contains("503"));
                assert!(attempts[4].url.ends_with(".txt"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_attempt_sequence_is_deterministic() {
        let (resolver, transport) = resolver(
            ScriptedTransport::new()
                .with_status(&format!("{FOLDER}/index.json"), 500)
                .with_network_error(&format!("{FOLDER}/doc4.xml")),
        );

        let first = resolver.get_document(&reference(), &FormType::new("4")).await;
        let second = resolver.get_document(&reference(), &FormType::new("4")).await;
        assert!(first.is_err() && second.is_err());

        let requests = transport.requests();
        assert_eq!(requests.len(), 10);
        assert_eq!(requests[..5], requests[5..]);
    }
}
