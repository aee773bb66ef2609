//! Parser for insider-transaction ownership documents (Forms 3, 4 and 5).
//!
//! Accepts either the XML document itself or a full submission text file
//! wrapping it; in the latter case the `<ownershipDocument>` span is cut out
//! before parsing.

use chrono::NaiveDate;
use filings_core::{
    InsiderTransaction, InsiderTransactionSummary, StructuredFilingError, TransactionKind,
};
use roxmltree::{Document, Node};
use tracing::{debug, warn};

const ROOT_OPEN: &str = "<ownershipDocument";
const ROOT_CLOSE: &str = "</ownershipDocument>";

/// Returns the `<ownershipDocument>` element span, or the whole input when
/// there is none.
fn ownership_span(raw: &str) -> &str {
    match (raw.find(ROOT_OPEN), raw.rfind(ROOT_CLOSE)) {
        (Some(start), Some(end)) if end > start => &raw[start..end + ROOT_CLOSE.len()],
        _ => raw.trim(),
    }
}

/// First child element named `name`.
fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

/// Trimmed, non-empty text found by walking `path` down from `node`.
fn text_at<'a>(node: Node<'a, '_>, path: &[&str]) -> Option<&'a str> {
    let mut current = node;
    for name in path {
        current = child(current, name)?;
    }
    current.text().map(str::trim).filter(|t| !t.is_empty())
}

/// Finite number at `path`; `NaN` and infinities count as missing.
fn number_at(node: Node<'_, '_>, path: &[&str]) -> Option<f64> {
    text_at(node, path)
        .and_then(|t| t.replace(',', "").parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn flag_at(node: Node<'_, '_>, path: &[&str]) -> bool {
    matches!(text_at(node, path), Some("1" | "true" | "TRUE" | "True"))
}

/// Owner title from the relationship block.
///
/// The officer title wins; otherwise the director and ten-percent-owner
/// flags, then the free-text relationship.
fn owner_title(owner: Node<'_, '_>) -> Option<String> {
    let relationship = child(owner, "reportingOwnerRelationship")?;

    if let Some(title) = text_at(relationship, &["officerTitle"]) {
        return Some(title.to_string());
    }
    if flag_at(relationship, &["isDirector"]) {
        return Some("Director".to_string());
    }
    if flag_at(relationship, &["isTenPercentOwner"]) {
        return Some("10% Owner".to_string());
    }
    text_at(relationship, &["otherText"]).map(ToString::to_string)
}

fn parse_transaction(
    node: Node<'_, '_>,
    kind: TransactionKind,
    index: usize,
) -> Option<InsiderTransaction> {
    let shares = number_at(node, &["transactionAmounts", "transactionShares", "value"]);
    let price = number_at(node, &["transactionAmounts", "transactionPricePerShare", "value"]);

    let (Some(shares), Some(price)) = (shares, price) else {
        warn!(
            %kind,
            index,
            has_shares = shares.is_some(),
            has_price = price.is_some(),
            "Skipping transaction without numeric shares and price"
        );
        return None;
    };

    let code = text_at(node, &["transactionCoding", "transactionCode"]).unwrap_or_default();
    let mut transaction = InsiderTransaction::new(kind, shares, price, code);

    if let Some(date) = text_at(node, &["transactionDate", "value"])
        .and_then(|d| d.get(..10))
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    {
        transaction = transaction.with_date(date);
    }
    transaction.security_title =
        text_at(node, &["securityTitle", "value"]).map(ToString::to_string);
    transaction.acquired_disposed = text_at(
        node,
        &["transactionAmounts", "transactionAcquiredDisposedCode", "value"],
    )
    .map(ToString::to_string);

    Some(transaction)
}

/// Parses an ownership document into a transaction summary.
///
/// Transactions lacking a numeric share count or price per share are
/// skipped with a warning.
///
/// # Errors
/// - [`StructuredFilingError::MalformedXml`] if the document is not
///   well-formed
/// - [`StructuredFilingError::NoReportingOwner`] if there is no
///   `reportingOwner` element
/// - [`StructuredFilingError::NoTransactionData`] if the owner is present but
///   no transaction survives
///
/// # Example
/// ```
/// use filings_edgar::parse_ownership_document;
///
/// let xml = r#"<ownershipDocument>
///   <reportingOwner>
///     <reportingOwnerId><rptOwnerName>Jane Doe</rptOwnerName></reportingOwnerId>
///   </reportingOwner>
///   <nonDerivativeTable>
///     <nonDerivativeTransaction>
///       <transactionCoding><transactionCode>P</transactionCode></transactionCoding>
///       <transactionAmounts>
///         <transactionShares><value>100</value></transactionShares>
///         <transactionPricePerShare><value>20.5</value></transactionPricePerShare>
///       </transactionAmounts>
///     </nonDerivativeTransaction>
///   </nonDerivativeTable>
/// </ownershipDocument>"#;
///
/// let summary = parse_ownership_document(xml).unwrap();
/// assert_eq!(summary.owner_name, "Jane Doe");
/// assert_eq!(summary.total_shares, 100.0);
/// ```
pub fn parse_ownership_document(
    raw: &str,
) -> Result<InsiderTransactionSummary, StructuredFilingError> {
    let document = Document::parse(ownership_span(raw))
        .map_err(|e| StructuredFilingError::MalformedXml(e.to_string()))?;
    let root = document.root_element();

    let owner = root
        .descendants()
        .find(|n| n.has_tag_name("reportingOwner"))
        .ok_or(StructuredFilingError::NoReportingOwner)?;
    let owner_name = text_at(owner, &["reportingOwnerId", "rptOwnerName"]).unwrap_or_default();

    let mut transactions = Vec::new();
    for (tag, kind) in [
        ("nonDerivativeTransaction", TransactionKind::NonDerivative),
        ("derivativeTransaction", TransactionKind::Derivative),
    ] {
        transactions.extend(
            root.descendants()
                .filter(|n| n.has_tag_name(tag))
                .enumerate()
                .filter_map(|(index, node)| parse_transaction(node, kind, index)),
        );
    }
    debug!(owner = owner_name, count = transactions.len(), "Parsed ownership document");

    let issuer = root.descendants().find(|n| n.has_tag_name("issuer"));
    let issuer_name = issuer
        .and_then(|n| text_at(n, &["issuerName"]))
        .map(ToString::to_string);
    let issuer_ticker = issuer
        .and_then(|n| text_at(n, &["issuerTradingSymbol"]))
        .map(ToString::to_string);

    InsiderTransactionSummary::from_transactions(owner_name, owner_title(owner), transactions)
        .map(|summary| summary.with_issuer(issuer_name, issuer_ticker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use filings_core::TransactionClass;

    fn transaction(tag: &str, code: &str, shares: &str, price: &str) -> String {
        format!(
            "<{tag}>
               <securityTitle><value>Common Stock</value></securityTitle>
               <transactionDate><value>2024-04-01</value></transactionDate>
               <transactionCoding><transactionCode>{code}</transactionCode></transactionCoding>
               <transactionAmounts>
                 <transactionShares><value>{shares}</value></transactionShares>
                 <transactionPricePerShare><value>{price}</value></transactionPricePerShare>
                 <transactionAcquiredDisposedCode><value>D</value></transactionAcquiredDisposedCode>
               </transactionAmounts>
             </{tag}>"
        )
    }

    fn document(relationship: &str, body: &str) -> String {
        format!(
            r#"<?xml version="1.0"?>
            <ownershipDocument>
              <issuer>
                <issuerCik>0000320193</issuerCik>
                <issuerName>Apple Inc.</issuerName>
                <issuerTradingSymbol>AAPL</issuerTradingSymbol>
              </issuer>
              <reportingOwner>
                <reportingOwnerId><rptOwnerName>COOK TIMOTHY D</rptOwnerName></reportingOwnerId>
                <reportingOwnerRelationship>{relationship}</reportingOwnerRelationship>
              </reportingOwner>
              {body}
            </ownershipDocument>"#
        )
    }

    #[test]
    fn test_weighted_average_across_tables() {
        let body = format!(
            "<nonDerivativeTable>{}</nonDerivativeTable><derivativeTable>{}</derivativeTable>",
            transaction("nonDerivativeTransaction", "S", "10", "5"),
            transaction("derivativeTransaction", "S", "30", "15"),
        );
        let xml = document("<officerTitle>CEO</officerTitle>", &body);

        let summary = parse_ownership_document(&xml).unwrap();

        assert_eq!(summary.owner_name, "COOK TIMOTHY D");
        assert_eq!(summary.owner_title.as_deref(), Some("CEO"));
        assert_eq!(summary.issuer_name.as_deref(), Some("Apple Inc."));
        assert_eq!(summary.issuer_ticker.as_deref(), Some("AAPL"));
        assert_eq!(summary.transactions.len(), 2);
        assert_eq!(summary.transactions[1].kind, TransactionKind::Derivative);
        assert_eq!(summary.total_shares, 40.0);
        assert!((summary.weighted_average_price - 12.5).abs() < 1e-9);
        assert_eq!(summary.classification, TransactionClass::Sale);

        let first = &summary.transactions[0];
        assert_eq!(first.security_title.as_deref(), Some("Common Stock"));
        assert_eq!(first.acquired_disposed.as_deref(), Some("D"));
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 4, 1));
    }

    #[test]
    fn test_sale_and_purchase_classify_as_purchase() {
        let body = format!(
            "<nonDerivativeTable>{}{}</nonDerivativeTable>",
            transaction("nonDerivativeTransaction", "S", "100", "170"),
            transaction("nonDerivativeTransaction", "P", "5", "171"),
        );
        let summary = parse_ownership_document(&document("", &body)).unwrap();
        assert_eq!(summary.classification, TransactionClass::Purchase);
    }

    #[test]
    fn test_missing_owner() {
        let xml = "<ownershipDocument><issuer><issuerName>Apple Inc.</issuerName></issuer></ownershipDocument>";
        assert_eq!(
            parse_ownership_document(xml).unwrap_err(),
            StructuredFilingError::NoReportingOwner
        );
    }

    #[test]
    fn test_owner_without_transactions() {
        let xml = document("<isDirector>1</isDirector>", "<nonDerivativeTable/>");
        assert_eq!(
            parse_ownership_document(&xml).unwrap_err(),
            StructuredFilingError::NoTransactionData
        );
    }

    #[test]
    fn test_incomplete_transactions_are_skipped() {
        let body = format!(
            "<nonDerivativeTable>{}{}{}</nonDerivativeTable>",
            transaction("nonDerivativeTransaction", "G", "500", ""),
            transaction("nonDerivativeTransaction", "S", "n/a", "10"),
            transaction("nonDerivativeTransaction", "S", "1,000", "10"),
        );
        let summary = parse_ownership_document(&document("", &body)).unwrap();

        assert_eq!(summary.transactions.len(), 1);
        assert_eq!(summary.total_shares, 1000.0);
    }

    #[test]
    fn test_non_finite_amounts_are_skipped() {
        let body = format!(
            "<nonDerivativeTable>{}{}{}</nonDerivativeTable>",
            transaction("nonDerivativeTransaction", "S", "NaN", "10"),
            transaction("nonDerivativeTransaction", "S", "100", "inf"),
            transaction("nonDerivativeTransaction", "S", "40", "12.5"),
        );
        let summary = parse_ownership_document(&document("", &body)).unwrap();

        assert_eq!(summary.transactions.len(), 1);
        assert_eq!(summary.total_shares, 40.0);
        assert!((summary.weighted_average_price - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_all_transactions_incomplete() {
        let body = format!(
            "<nonDerivativeTable>{}</nonDerivativeTable>",
            transaction("nonDerivativeTransaction", "G", "500", ""),
        );
        assert_eq!(
            parse_ownership_document(&document("", &body)).unwrap_err(),
            StructuredFilingError::NoTransactionData
        );
    }

    #[test]
    fn test_owner_title_fallbacks() {
        let body = format!(
            "<nonDerivativeTable>{}</nonDerivativeTable>",
            transaction("nonDerivativeTransaction", "P", "1", "1"),
        );

        let director = document("<isDirector>1</isDirector><officerTitle> </officerTitle>", &body);
        assert_eq!(
            parse_ownership_document(&director).unwrap().owner_title.as_deref(),
            Some("Director")
        );

        let holder = document("<isDirector>0</isDirector><isTenPercentOwner>true</isTenPercentOwner>", &body);
        assert_eq!(
            parse_ownership_document(&holder).unwrap().owner_title.as_deref(),
            Some("10% Owner")
        );

        let other = document("<isOther>1</isOther><otherText>Trustee</otherText>", &body);
        assert_eq!(
            parse_ownership_document(&other).unwrap().owner_title.as_deref(),
            Some("Trustee")
        );

        assert!(parse_ownership_document(&document("", &body)).unwrap().owner_title.is_none());
    }

    #[test]
    fn test_full_submission_wrapper() {
        let body = format!(
            "<nonDerivativeTable>{}</nonDerivativeTable>",
            transaction("nonDerivativeTransaction", "S", "250", "180.25"),
        );
        let inner = document("<officerTitle>CFO</officerTitle>", &body);
        let inner = inner.trim_start().trim_start_matches(r#"<?xml version="1.0"?>"#);
        let wrapped = format!(
            "<SEC-DOCUMENT>0000320193-24-000101.txt : 20240402\n<DOCUMENT>\n<TYPE>4\n<TEXT>\n<XML>\n{inner}\n</XML>\n</TEXT>\n</DOCUMENT>\n</SEC-DOCUMENT>"
        );

        let summary = parse_ownership_document(&wrapped).unwrap();
        assert_eq!(summary.owner_title.as_deref(), Some("CFO"));
        assert_eq!(summary.total_shares, 250.0);
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse_ownership_document("<ownershipDocument><reportingOwner></ownershipDocument>")
            .unwrap_err();
        assert!(matches!(err, StructuredFilingError::MalformedXml(_)));
    }
}
