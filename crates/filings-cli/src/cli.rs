use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "filings-cli")]
#[command(about = "Retrieve, store and analyze SEC EDGAR filings")]
#[command(version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Debug, Args)]
pub(crate) struct FormWindow {
    /// Comma separated form types
    #[arg(short, long, value_delimiter = ',', default_value = "10-K,10-Q,8-K")]
    pub(crate) forms: Vec<String>,

    /// How many days back to look
    #[arg(short, long, default_value = "90")]
    pub(crate) days: u32,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// List a company's filing history
    Filings {
        /// Ticker symbol or CIK
        company: String,

        /// Maximum number of rows to print
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// List recent filings of the given forms
    Recent {
        /// Ticker symbol or CIK
        company: String,

        #[command(flatten)]
        window: FormWindow,
    },

    /// Fetch a filing document and print its text
    Document {
        /// Ticker symbol or CIK
        company: String,

        /// Accession number
        accession: String,

        /// Form type of the filing
        #[arg(short, long, default_value = "10-K")]
        form: String,

        /// Maximum number of characters to print
        #[arg(long, default_value = "4000")]
        max_chars: usize,
    },

    /// Summarize an insider-transaction filing
    Insider {
        /// Ticker symbol or CIK
        company: String,

        /// Accession number
        accession: String,

        /// Ownership form type (3, 4 or 5)
        #[arg(short, long, default_value = "4")]
        form: String,
    },

    /// Search companies by ticker or name
    Search {
        /// Ticker or name fragment
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Store a company and its recent filings in a database
    Ingest {
        /// Ticker symbol or CIK
        company: String,

        #[command(flatten)]
        window: FormWindow,

        /// SQLite database file
        #[arg(long, default_value = "filings.db")]
        database: String,

        /// Run narrative analysis over the stored filings
        #[arg(long)]
        analyze: bool,
    },
}
