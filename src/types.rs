use serde::{Deserialize, Serialize};
use std::fmt;

// Types listed here are either shared across multiple files and/or exposed via the library.

/// Represents the stable identifier of a known organization. Names may change over time;
/// the identifier does not.
pub type OrganizationId = String;

/// Represents the name of a company as an owned `String`.
pub type CompanyName = String;

/// Represents an alternate name for a company as an owned `String`. These are used to match
/// variations in naming conventions or aliases for companies.
pub type AlternateCompanyName = String;

/// Represents a ticker symbol (e.g., stock ticker) as an owned `String`.
pub type TickerSymbol = String;

/// A byte offset into the sanitized text span.
pub type ByteOffset = usize;

/// A confidence or similarity value. Always within `[0, 1]` once it leaves a component.
pub type Score = f64;

/// Seed rows for the knowledge base. Each entry includes:
/// - `OrganizationId`: Stable identifier.
/// - `CompanyName`: The company's canonical name.
/// - `Option<TickerSymbol>`: The company's stock ticker, if listed.
/// - `Option<String>`: Exchange the ticker trades on.
/// - `Option<String>`: Industry.
/// - `Vec<AlternateCompanyName>`: A list of alternate names or aliases for the company.
/// - `Vec<CompanyName>`: Names the company was previously known by.
pub type OrganizationSeedList = Vec<(
    OrganizationId,
    CompanyName,
    Option<TickerSymbol>,
    Option<String>,
    Option<String>,
    Vec<AlternateCompanyName>,
    Vec<CompanyName>,
)>;

/// The semantic type declared by the pattern rule that produced an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Company,
    CompanyAbbrev,
    CompanyIntl,
    CompanyContext,
    Ticker,
}

impl EntityType {
    /// Tie-break priority used when ranking (lower sorts first):
    /// ticker > company > company_intl > company_abbrev > company_context.
    pub fn priority(self) -> u8 {
        match self {
            EntityType::Ticker => 0,
            EntityType::Company => 1,
            EntityType::CompanyIntl => 2,
            EntityType::CompanyAbbrev => 3,
            EntityType::CompanyContext => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Company => "company",
            EntityType::CompanyAbbrev => "company_abbrev",
            EntityType::CompanyIntl => "company_intl",
            EntityType::CompanyContext => "company_context",
            EntityType::Ticker => "ticker",
        }
    }

    pub fn is_ticker(self) -> bool {
        self == EntityType::Ticker
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
