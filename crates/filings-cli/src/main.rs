//! Command line front end for SEC EDGAR filings.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use filings::{
    AccessionNumber, Cik, EdgarClient, FilingPipeline, FormType, InsiderActivity,
    NarrativeAnalyzer, OpenAiChatModel, OpenAiConfig, SqliteStore,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod format;

use cli::{Cli, Commands};
use format::{format_currency, format_large_number, format_percentage};

/// Accepts a CIK or a ticker symbol.
async fn resolve_company(client: &EdgarClient, company: &str) -> Result<Cik> {
    let company = company.trim();
    if !company.is_empty() && company.chars().all(|c| c.is_ascii_digit()) {
        return Ok(Cik::parse(company)?);
    }
    client
        .lookup_ticker(company)
        .await
        .with_context(|| format!("Could not resolve company {company}"))
}

fn form_types(forms: &[String]) -> Vec<FormType> {
    forms
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .map(FormType::new)
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = EdgarClient::from_env().context("Failed to configure EDGAR client")?;

    match cli.command {
        Commands::Filings { company, limit } => {
            let cik = resolve_company(&client, &company).await?;
            let manifest = client.get_company_filings(cik).await?;
            println!("{} filings for CIK {cik}:", manifest.len());
            for entry in manifest.iter().take(limit) {
                println!(
                    "{:<10} {:<8} {} {}",
                    entry.filing_date,
                    entry.form,
                    entry.accession_number,
                    entry.primary_document.as_deref().unwrap_or("-")
                );
            }
        }

        Commands::Recent { company, window } => {
            let cik = resolve_company(&client, &company).await?;
            let recent = client
                .get_recent_filings(cik, &form_types(&window.forms), window.days)
                .await?;
            println!("{} filings in the last {} days:", recent.len(), window.days);
            for filing in recent {
                println!("{} {:<8} {}", filing.filing_date, filing.form, filing.accession);
            }
        }

        Commands::Document {
            company,
            accession,
            form,
            max_chars,
        } => {
            let cik = resolve_company(&client, &company).await?;
            let accession = AccessionNumber::parse(&accession)?;
            let document = client
                .get_filing_document(&accession, cik, &FormType::new(form))
                .await?;
            info!(url = %document.url, source = %document.source, "Fetched document");

            let text = client.extract_text_content(&document.content);
            let shown: String = text.text_or_placeholder().chars().take(max_chars).collect();
            println!("{shown}");
        }

        Commands::Insider {
            company,
            accession,
            form,
        } => {
            let cik = resolve_company(&client, &company).await?;
            let accession = AccessionNumber::parse(&accession)?;
            let summary = client
                .get_insider_summary(&accession, cik, &FormType::new(form))
                .await?;
            let activity = InsiderActivity::from_transactions(&summary.transactions);

            println!(
                "{} ({})",
                summary.owner_name,
                summary.owner_title.as_deref().unwrap_or("no title")
            );
            if let Some(issuer) = &summary.issuer_name {
                println!("Issuer: {issuer} {}", summary.issuer_ticker.as_deref().unwrap_or(""));
            }
            println!("Classification: {}", summary.classification);
            println!("Shares: {}", format_large_number(summary.total_shares));
            println!("Average price: {}", format_currency(summary.weighted_average_price));
            println!("Total value: {}", format_currency(summary.total_value()));
            println!(
                "Transactions: {} ({} buys, {} sells)",
                activity.total_transactions, activity.buy_count, activity.sell_count
            );
            for transaction in &summary.transactions {
                println!(
                    "  {} {} {} @ {}",
                    transaction.date.map_or_else(|| "-".to_string(), |d| d.to_string()),
                    transaction.code,
                    format_large_number(transaction.shares),
                    format_currency(transaction.price_per_share)
                );
            }
        }

        Commands::Search { query, limit } => {
            let matches = client.search_company(&query).await?;
            for company in matches.into_iter().take(limit) {
                println!("{:<8} {:>10} {}", company.ticker, company.cik, company.name);
            }
        }

        Commands::Ingest {
            company,
            window,
            database,
            analyze,
        } => {
            let cik = resolve_company(&client, &company).await?;
            let store = SqliteStore::new(&database)
                .with_context(|| format!("Failed to open database {database}"))?;
            let mut pipeline = FilingPipeline::new(Arc::new(client), Arc::new(store));
            if analyze {
                let model = OpenAiChatModel::new(OpenAiConfig::from_env()?)?;
                pipeline = pipeline.with_analyzer(NarrativeAnalyzer::new(Arc::new(model)));
            }

            let company = pipeline.sync_company(cik).await?;
            let report = pipeline
                .ingest_recent_filings(cik, &form_types(&window.forms), window.days)
                .await?;
            println!(
                "{}: stored {} filings, skipped {}",
                company.name,
                report.stored.len(),
                report.skipped.len()
            );
            for skipped in &report.skipped {
                println!("  skipped {} {}: {}", skipped.form, skipped.accession, skipped.reason);
            }

            if analyze {
                let analyses = pipeline
                    .analyze_recent_filings(cik, report.stored.len())
                    .await?;
                for analysis in analyses {
                    println!(
                        "\n[{} confidence]\n{}",
                        format_percentage(analysis.confidence),
                        analysis.analysis
                    );
                    for point in analysis.key_points {
                        println!("  - {point}");
                    }
                }
            }
        }
    }

    Ok(())
}
