use crate::models::CompanyType;

/// Legal-entity suffixes across jurisdictions: (canonical form, legal form, country hints).
///
/// Keys are compared case-insensitively with dots removed, so "S.A." also matches "SA" and
/// "Inc." matches "Inc".
pub const LEGAL_SUFFIXES: &[(&str, CompanyType, &[&str])] = &[
    ("Incorporated", CompanyType::Corporation, &["US"]),
    ("Inc", CompanyType::Corporation, &["US", "CA"]),
    ("Corporation", CompanyType::Corporation, &["US"]),
    ("Corp", CompanyType::Corporation, &["US"]),
    ("Company", CompanyType::Company, &["US", "GB"]),
    ("Co", CompanyType::Company, &["US", "GB"]),
    ("Limited", CompanyType::Limited, &["GB", "IE", "HK", "IN"]),
    ("Ltd", CompanyType::Limited, &["GB", "IE", "HK", "IN"]),
    ("Pty Ltd", CompanyType::Limited, &["AU"]),
    ("LLC", CompanyType::LimitedLiabilityCompany, &["US"]),
    ("LLP", CompanyType::Partnership, &["US", "GB"]),
    ("LP", CompanyType::Partnership, &["US"]),
    ("PLC", CompanyType::PublicLimitedCompany, &["GB", "IE"]),
    ("GmbH", CompanyType::Limited, &["DE", "AT", "CH"]),
    ("AG", CompanyType::StockCorporation, &["DE", "AT", "CH"]),
    (
        "S.A.",
        CompanyType::StockCorporation,
        &["FR", "ES", "BE", "LU", "CH", "BR", "MX", "AR"],
    ),
    ("N.V.", CompanyType::PublicLimitedCompany, &["NL", "BE"]),
    ("B.V.", CompanyType::Limited, &["NL"]),
    ("S.p.A.", CompanyType::StockCorporation, &["IT"]),
    ("S.r.l.", CompanyType::Limited, &["IT"]),
    ("SARL", CompanyType::Limited, &["FR", "LU"]),
    ("AB", CompanyType::StockCorporation, &["SE"]),
    ("ASA", CompanyType::PublicLimitedCompany, &["NO"]),
    ("Oyj", CompanyType::PublicLimitedCompany, &["FI"]),
    ("K.K.", CompanyType::StockCorporation, &["JP"]),
    ("SE", CompanyType::EuropeanCompany, &["EU"]),
];

/// Informal abbreviations as they appear in text, and the name they expand to.
pub const COMPANY_ABBREVIATIONS: &[(&str, &str)] = &[
    ("IBM", "International Business Machines"),
    ("GE", "General Electric"),
    ("HP", "Hewlett-Packard"),
    ("GM", "General Motors"),
    ("P&G", "Procter & Gamble"),
    ("J&J", "Johnson & Johnson"),
    ("AmEx", "American Express"),
    ("BofA", "Bank of America"),
    ("VW", "Volkswagen"),
    ("BMS", "Bristol-Myers Squibb"),
];

/// Tokens dropped before computing the token-set ratio.
pub const COMPANY_STOP_WORDS: &[&str] = &[
    "inc",
    "incorporated",
    "corp",
    "corporation",
    "co",
    "company",
    "ltd",
    "limited",
    "llc",
    "plc",
    "sa",
    "ag",
    "gmbh",
    "nv",
    "the",
    "and",
    "&",
    "of",
    "group",
    "holdings",
];

/// Abbreviation/expansion token pairs that earn the enhanced-ratio bonus.
pub const FUZZY_ABBREVIATION_PAIRS: &[(&str, &str)] = &[
    ("corp", "corporation"),
    ("inc", "incorporated"),
    ("co", "company"),
    ("ltd", "limited"),
    ("intl", "international"),
    ("mfg", "manufacturing"),
    ("natl", "national"),
    ("bros", "brothers"),
    ("tech", "technology"),
    ("svcs", "services"),
    ("grp", "group"),
    ("hldgs", "holdings"),
    ("assn", "association"),
    ("mgmt", "management"),
    ("fin", "financial"),
    ("&", "and"),
];

/// Words that are both company names and common nouns, with the industry keywords that
/// vouch for the company reading.
pub const AMBIGUOUS_COMPANY_WORDS: &[(&str, &str)] = &[
    ("Apple", r"(?i)\b(?:iphone|ipad|mac(?:book)?|ios|app store|cupertino|tim cook)\b"),
    ("Target", r"(?i)\b(?:retail(?:er)?|stores?|shoppers?|minneapolis)\b"),
    ("Amazon", r"(?i)\b(?:aws|prime|e-commerce|bezos|jassy|alexa)\b"),
    ("Shell", r"(?i)\b(?:oil|gas|energy|petroleum|refiner(?:y|ies)|lng)\b"),
    ("Meta", r"(?i)\b(?:facebook|instagram|whatsapp|zuckerberg|metaverse)\b"),
    ("Ford", r"(?i)\b(?:vehicles?|cars?|trucks?|f-150|automaker|mustang)\b"),
    ("Visa", r"(?i)\b(?:payments?|cards?|card network|transactions?)\b"),
    ("Oracle", r"(?i)\b(?:database|cloud|software|ellison)\b"),
    ("Delta", r"(?i)\b(?:airlines?|flights?|carrier|atlanta)\b"),
    ("Gap", r"(?i)\b(?:apparel|clothing|old navy|retail(?:er)?)\b"),
    ("Square", r"(?i)\b(?:payments?|point-of-sale|dorsey|cash app)\b"),
    ("Block", r"(?i)\b(?:payments?|cash app|dorsey|bitcoin)\b"),
    ("Alphabet", r"(?i)\b(?:google|youtube|waymo|pichai)\b"),
    ("Discovery", r"(?i)\b(?:network|channel|warner|streaming)\b"),
    ("Corning", r"(?i)\b(?:glass|gorilla glass|fiber|optical)\b"),
];

/// Financial or ticker markers that support keeping an ambiguous company word.
pub const SUPPORTING_CONTEXT_PATTERN: &str = r"(?i)(?:\$[a-z]{1,5}\b|\b(?:nyse|nasdaq)\b|\b(?:shares?|stocks?|earnings|revenue|quarter(?:ly)?|fiscal|investors?|market cap(?:italization)?|dividends?|ipo|ceo|cfo|acquisitions?|merger|guidance|analysts?|valuation)\b|\d+(?:\.\d+)?%)";

/// All-caps words that look like tickers but almost never are.
pub const NON_TICKER_WORDS: &[&str] = &[
    "A", "I", "AI", "CEO", "CFO", "COO", "CTO", "USA", "US", "UK", "EU", "UN", "IPO", "ETF",
    "GDP", "EPS", "SEC", "FDA", "FTC", "DOJ", "NYSE", "LLC", "INC", "LTD", "PLC", "USD", "EUR",
    "GBP", "JPY", "API", "FAQ", "PDF", "TV", "PM", "AM", "OK", "Q1", "Q2", "Q3", "Q4", "YOY",
];

/// Capitalized sentence-opening words trimmed from the front of company-name captures.
pub const SENTENCE_LEAD_WORDS: &[&str] = &[
    "The", "A", "An", "In", "On", "At", "As", "By", "For", "From", "With", "After", "Before",
    "Shares", "Stock", "According", "Analysts", "Investors", "Meanwhile", "Later", "Today",
    "Yesterday", "Rival", "Rivals", "Both", "While", "When", "If", "But", "And", "Also",
];

/// Structural position tags and their weights. Unrecognized tags are ignored.
pub const POSITION_WEIGHTS: &[(&str, f64)] = &[
    ("headline", 1.0),
    ("title", 1.0),
    ("subheadline", 0.9),
    ("first_paragraph", 0.85),
    ("lede", 0.85),
    ("table_cell", 0.75),
    ("body", 0.7),
    ("list_item", 0.65),
    ("caption", 0.6),
    ("quote", 0.6),
    ("sidebar", 0.4),
    ("comment", 0.35),
    ("footer", 0.3),
    ("navigation", 0.2),
    ("advertisement", 0.1),
];

/// Substrings of a link target that point at a financial quote or filing page.
pub const FINANCIAL_LINK_MARKERS: &[&str] = &[
    "/quote/",
    "/quotes/",
    "/stock/",
    "/stocks/",
    "finance.yahoo.",
    "google.com/finance",
    "sec.gov",
    "nasdaq.com/market-activity",
    "marketwatch.com/investing",
    "bloomberg.com/quote",
    "reuters.com/markets/companies",
];

/// Document sections that indicate business/financial reporting.
pub const FINANCIAL_SECTIONS: &[&str] = &[
    "business", "markets", "finance", "economy", "earnings", "money", "investing", "tech",
];

/// Site-specific structural micro-patterns, per site id, with their confidence.
pub const SITE_MICRO_PATTERNS: &[(&str, &[(&str, f64)])] = &[
    (
        "bloomberg",
        &[("ticker_badge", 0.95), ("company_profile_link", 0.85)],
    ),
    ("reuters", &[("company_chip", 0.9), ("quote_link", 0.85)]),
    ("wsj", &[("ticker_tag", 0.9), ("company_card", 0.8)]),
    ("yahoo_finance", &[("quote_header", 0.95), ("ticker_tag", 0.9)]),
];

/// Anaphoric phrases that refer back to the most recent organization.
pub const ANAPHOR_PATTERN: &str = r"(?i)\b(?:the (?:company|firm|corporation|group|business|retailer|bank|automaker|manufacturer|conglomerate|lender|insurer)|it|its)\b";

/// Embedded seed data for the default knowledge base.
pub const SEED_ORGANIZATIONS_CSV: &str =
    include_str!("../embedded_storage/seed_organizations.csv");
