use crate::config::{
    ALIAS_MATCH_WEIGHT, DEFAULT_FUZZY_MATCH_THRESHOLD, DEFAULT_KNOWLEDGE_BASE_QUERY_CACHE_CONFIG,
    DEFAULT_SEARCH_LIMIT, NAME_MATCH_WEIGHT, TICKER_MATCH_WEIGHT,
};
use crate::constants::SEED_ORGANIZATIONS_CSV;
use crate::models::{
    CacheConfig, FuzzyMatcher, KnowledgeBaseError, Normalizer, OrganizationListPreprocessor,
    TtlCache,
};
use crate::types::{
    AlternateCompanyName, CompanyName, OrganizationId, OrganizationSeedList, Score, TickerSymbol,
};
use crate::Error;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;

const SNAPSHOT_VERSION: u32 = 1;

/// A curated organization record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownOrganization {
    pub id: OrganizationId,
    pub canonical_name: CompanyName,
    #[serde(default)]
    pub aliases: Vec<AlternateCompanyName>,
    #[serde(default)]
    pub ticker: Option<TickerSymbol>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub prior_names: Vec<CompanyName>,
}

impl KnownOrganization {
    pub fn new(id: &str, canonical_name: &str) -> Self {
        Self {
            id: id.to_string(),
            canonical_name: canonical_name.to_string(),
            aliases: Vec::new(),
            ticker: None,
            industry: None,
            exchange: None,
            prior_names: Vec::new(),
        }
    }

    pub fn with_ticker(mut self, ticker: &str) -> Self {
        self.ticker = Some(ticker.to_string());
        self
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn with_industry(mut self, industry: &str) -> Self {
        self.industry = Some(industry.to_string());
        self
    }

    pub fn with_exchange(mut self, exchange: &str) -> Self {
        self.exchange = Some(exchange.to_string());
        self
    }

    pub fn with_prior_name(mut self, prior_name: &str) -> Self {
        self.prior_names.push(prior_name.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub limit: usize,
    pub threshold: Score,
    pub include_aliases: bool,
    pub include_tickers: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
            threshold: DEFAULT_FUZZY_MATCH_THRESHOLD,
            include_aliases: true,
            include_tickers: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedField {
    Name,
    Alias,
    Ticker,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub organization: KnownOrganization,
    pub score: Score,
    pub matched_field: MatchedField,
    /// The name, alias or ticker that produced the score.
    pub matched_value: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct KnowledgeBaseSnapshot {
    version: u32,
    organizations: Vec<KnownOrganization>,
}

/// Precomputed normalized keys for one record, used by fuzzy search.
#[derive(Debug, Clone, Default)]
struct SearchKeys {
    name_key: String,
    // (display value, normalized key); prior names included
    alias_keys: Vec<(String, String)>,
    ticker_key: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct KnowledgeBaseIndexes {
    records: BTreeMap<OrganizationId, KnownOrganization>,
    search_keys: BTreeMap<OrganizationId, SearchKeys>,
    name_index: KeyOwners,
    alias_index: KeyOwners,
    ticker_index: KeyOwners,
}

/// Every record that claims a key, oldest first. The most recently indexed owner answers
/// exact lookups; removing it hands the key back to the previous one.
type KeyOwners = HashMap<String, Vec<OrganizationId>>;

impl KnowledgeBaseIndexes {
    fn insert(&mut self, record: KnownOrganization, normalizer: &Normalizer) {
        let name_key = normalizer.normalize_key(&record.canonical_name);

        let alias_keys: Vec<(String, String)> = record
            .aliases
            .iter()
            .chain(record.prior_names.iter())
            .map(|alias| (alias.clone(), normalizer.normalize_key(alias)))
            .filter(|(_, key)| !key.is_empty())
            .collect();

        let ticker_key = record
            .ticker
            .as_deref()
            .map(ticker_key)
            .filter(|key| !key.is_empty());

        claim(&mut self.name_index, &name_key, &record.id);

        for (_, alias_key) in &alias_keys {
            claim(&mut self.alias_index, alias_key, &record.id);
        }

        if let Some(ticker_key) = &ticker_key {
            claim(&mut self.ticker_index, ticker_key, &record.id);
        }

        self.search_keys.insert(
            record.id.clone(),
            SearchKeys {
                name_key,
                alias_keys,
                ticker_key,
            },
        );
        self.records.insert(record.id.clone(), record);
    }

    fn remove(&mut self, id: &str) -> Option<KnownOrganization> {
        let record = self.records.remove(id)?;

        if let Some(keys) = self.search_keys.remove(id) {
            release(&mut self.name_index, &keys.name_key, id);

            for (_, alias_key) in &keys.alias_keys {
                release(&mut self.alias_index, alias_key, id);
            }

            if let Some(ticker_key) = &keys.ticker_key {
                release(&mut self.ticker_index, ticker_key, id);
            }
        }

        Some(record)
    }
}

type BestMatches<'a> = HashMap<&'a str, (Score, MatchedField, &'a str)>;

/// Keeps the best scoring field per organization. Ties keep the earlier field, so a name
/// outranks an alias with the same score.
fn keep_best<'a>(
    best: &mut BestMatches<'a>,
    id: &'a str,
    score: Score,
    field: MatchedField,
    value: &'a str,
) {
    let entry = best.entry(id).or_insert((score, field, value));

    if score > entry.0 {
        *entry = (score, field, value);
    }
}

fn claim(index: &mut KeyOwners, key: &str, id: &str) {
    let owners = index.entry(key.to_string()).or_default();

    if !owners.iter().any(|owner| owner == id) {
        owners.push(id.to_string());
    }
}

fn release(index: &mut KeyOwners, key: &str, id: &str) {
    if let Some(owners) = index.get_mut(key) {
        owners.retain(|owner| owner != id);

        if owners.is_empty() {
            index.remove(key);
        }
    }
}

/// Uppercased ticker with surrounding whitespace and any `$` prefix removed.
pub fn ticker_key(ticker: &str) -> String {
    ticker.trim().trim_start_matches('$').trim().to_uppercase()
}

/// In-memory registry of known organizations with exact and fuzzy lookup.
///
/// Records are owned by the knowledge base and identified by id. Three indexes (canonical
/// name, alias, ticker) are kept consistent across every mutation, and a bounded TTL cache
/// memoizes search results until the next mutation.
#[derive(Debug)]
pub struct KnowledgeBase {
    normalizer: Normalizer,
    fuzzy_matcher: FuzzyMatcher,
    indexes: KnowledgeBaseIndexes,
    query_cache: TtlCache<String, Vec<SearchMatch>>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new(
            Normalizer::default(),
            FuzzyMatcher::default(),
            DEFAULT_KNOWLEDGE_BASE_QUERY_CACHE_CONFIG,
        )
    }
}

impl KnowledgeBase {
    pub fn new(
        normalizer: Normalizer,
        fuzzy_matcher: FuzzyMatcher,
        query_cache_config: CacheConfig,
    ) -> Self {
        Self {
            normalizer,
            fuzzy_matcher,
            indexes: KnowledgeBaseIndexes::default(),
            query_cache: TtlCache::new(query_cache_config),
        }
    }

    /// A knowledge base populated from the embedded seed list.
    pub fn with_seed_data() -> Result<Self, Error> {
        Self::seeded(
            Normalizer::default(),
            FuzzyMatcher::default(),
            DEFAULT_KNOWLEDGE_BASE_QUERY_CACHE_CONFIG,
        )
    }

    /// Same as [`KnowledgeBase::with_seed_data`], with explicit collaborators.
    pub fn seeded(
        normalizer: Normalizer,
        fuzzy_matcher: FuzzyMatcher,
        query_cache_config: CacheConfig,
    ) -> Result<Self, Error> {
        let seed_list =
            OrganizationListPreprocessor::read_organization_list_from_string(SEED_ORGANIZATIONS_CSV)?;

        let mut knowledge_base = Self::new(normalizer, fuzzy_matcher, query_cache_config);
        knowledge_base.load_seed_list(seed_list)?;

        Ok(knowledge_base)
    }

    /// A knowledge base populated from caller-supplied seed CSV.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let seed_list = OrganizationListPreprocessor::read_organization_list(reader)?;

        let mut knowledge_base = Self::default();
        knowledge_base.load_seed_list(seed_list)?;

        Ok(knowledge_base)
    }

    /// Adds every seed row. Stops at the first invalid or duplicate record.
    pub fn load_seed_list(&mut self, seed_list: OrganizationSeedList) -> Result<usize, Error> {
        let mut loaded = 0;

        for (id, name, ticker, exchange, industry, aliases, prior_names) in seed_list {
            self.add_organization(KnownOrganization {
                id,
                canonical_name: name,
                aliases,
                ticker,
                industry,
                exchange,
                prior_names,
            })?;
            loaded += 1;
        }

        info!("Loaded {} seed organizations", loaded);

        Ok(loaded)
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn fuzzy_matcher(&self) -> &FuzzyMatcher {
        &self.fuzzy_matcher
    }

    pub fn len(&self) -> usize {
        self.indexes.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&KnownOrganization> {
        self.indexes.records.get(id)
    }

    /// All records, ordered by id.
    pub fn organizations(&self) -> impl Iterator<Item = &KnownOrganization> {
        self.indexes.records.values()
    }

    pub fn add_organization(&mut self, record: KnownOrganization) -> Result<(), KnowledgeBaseError> {
        self.validate_record(&record)?;

        if self.indexes.records.contains_key(&record.id) {
            return Err(KnowledgeBaseError::DuplicateId(record.id));
        }

        debug!("Adding organization `{}`", record.id);

        self.indexes.insert(record, &self.normalizer);
        self.clear_query_cache();

        Ok(())
    }

    /// Replaces the record with the same id and rebuilds its index entries.
    pub fn update_organization(
        &mut self,
        record: KnownOrganization,
    ) -> Result<(), KnowledgeBaseError> {
        self.validate_record(&record)?;

        if self.indexes.remove(&record.id).is_none() {
            return Err(KnowledgeBaseError::NotFound(record.id));
        }

        debug!("Updating organization `{}`", record.id);

        self.indexes.insert(record, &self.normalizer);
        self.clear_query_cache();

        Ok(())
    }

    pub fn remove_organization(&mut self, id: &str) -> Option<KnownOrganization> {
        let removed = self.indexes.remove(id);

        if removed.is_some() {
            debug!("Removed organization `{}`", id);
            self.clear_query_cache();
        }

        removed
    }

    pub fn find_by_name(&self, name: &str) -> Option<&KnownOrganization> {
        self.lookup(&self.indexes.name_index, &self.normalizer.normalize_key(name))
    }

    pub fn find_by_alias(&self, alias: &str) -> Option<&KnownOrganization> {
        self.lookup(&self.indexes.alias_index, &self.normalizer.normalize_key(alias))
    }

    pub fn find_by_ticker(&self, ticker: &str) -> Option<&KnownOrganization> {
        self.lookup(&self.indexes.ticker_index, &ticker_key(ticker))
    }

    /// Exact lookup by canonical name first, then by alias.
    pub fn find_exact(&self, name: &str) -> Option<&KnownOrganization> {
        let key = self.normalizer.normalize_key(name);

        self.lookup(&self.indexes.name_index, &key)
            .or_else(|| self.lookup(&self.indexes.alias_index, &key))
    }

    /// Fuzzy search over names, aliases and tickers.
    ///
    /// Every candidate field is scored with the enhanced company ratio (an exact key match
    /// scores `1.0`) and multiplied by its field weight. Results below the threshold are
    /// dropped, each organization appears once with its best field, and the list is sorted by
    /// score (descending) then canonical name.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchMatch> {
        let query_key = self.normalizer.normalize_key(query);
        let query_ticker = ticker_key(query);

        if query_key.is_empty() && query_ticker.is_empty() {
            return Vec::new();
        }

        let cache_key = format!(
            "{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}",
            query_key,
            query_ticker,
            options.limit,
            options.threshold,
            options.include_aliases,
            options.include_tickers
        );

        if let Some(cached) = self.query_cache.get(&cache_key) {
            return cached;
        }

        let mut best_by_id: BestMatches = HashMap::new();

        for (id, keys) in &self.indexes.search_keys {
            let Some(record) = self.indexes.records.get(id) else {
                continue;
            };

            let name_score = self.field_score(&query_key, &keys.name_key) * NAME_MATCH_WEIGHT;
            keep_best(
                &mut best_by_id,
                id,
                name_score,
                MatchedField::Name,
                &record.canonical_name,
            );

            if options.include_aliases {
                for (alias, alias_key) in &keys.alias_keys {
                    let alias_score =
                        self.field_score(&query_key, alias_key) * ALIAS_MATCH_WEIGHT;
                    keep_best(
                        &mut best_by_id,
                        id,
                        alias_score,
                        MatchedField::Alias,
                        alias,
                    );
                }
            }

            if options.include_tickers {
                if let (Some(ticker), Some(key)) = (record.ticker.as_deref(), &keys.ticker_key) {
                    let raw_score = if *key == query_ticker {
                        1.0
                    } else {
                        self.field_score(&query_key, &key.to_lowercase())
                    };
                    keep_best(
                        &mut best_by_id,
                        id,
                        raw_score * TICKER_MATCH_WEIGHT,
                        MatchedField::Ticker,
                        ticker,
                    );
                }
            }
        }

        let mut matches: Vec<SearchMatch> = best_by_id
            .into_iter()
            .filter(|(_, (score, _, _))| *score >= options.threshold)
            .filter_map(|(id, (score, matched_field, matched_value))| {
                self.indexes.records.get(id).map(|record| SearchMatch {
                    organization: record.clone(),
                    score: score.clamp(0.0, 1.0),
                    matched_field,
                    matched_value: matched_value.to_string(),
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    a.organization
                        .canonical_name
                        .cmp(&b.organization.canonical_name)
                })
                .then_with(|| a.organization.id.cmp(&b.organization.id))
        });
        matches.truncate(options.limit);

        self.query_cache.insert(cache_key, matches.clone());

        matches
    }

    /// Whether two names refer to the same organization.
    ///
    /// When both names resolve through the knowledge base the ids are compared; otherwise the
    /// fuzzy matcher decides.
    pub fn is_same_company(&self, a: &str, b: &str) -> bool {
        let options = SearchOptions {
            limit: 1,
            ..SearchOptions::default()
        };

        let resolved_a = self.search(a, &options).into_iter().next();
        let resolved_b = self.search(b, &options).into_iter().next();

        match (resolved_a, resolved_b) {
            (Some(a), Some(b)) => a.organization.id == b.organization.id,
            _ => self.fuzzy_matcher.is_match(a, b),
        }
    }

    /// Serializes every record as versioned JSON, ordered by id.
    pub fn export_state(&self) -> Result<String, KnowledgeBaseError> {
        let snapshot = KnowledgeBaseSnapshot {
            version: SNAPSHOT_VERSION,
            organizations: self.indexes.records.values().cloned().collect(),
        };

        serde_json::to_string(&snapshot).map_err(|e| KnowledgeBaseError::ExportError(e.to_string()))
    }

    /// Replaces the whole knowledge base with the records in `payload`.
    ///
    /// The payload is fully validated and indexed before anything is swapped in; on any
    /// failure the prior state is left untouched.
    pub fn import_state(&mut self, payload: &str) -> Result<usize, KnowledgeBaseError> {
        let fresh = self.build_indexes(payload).map_err(|e| {
            warn!("Rejected knowledge base import: {}", e);
            e
        })?;

        let count = fresh.records.len();
        self.indexes = fresh;
        self.clear_query_cache();

        info!("Imported {} organizations", count);

        Ok(count)
    }

    fn build_indexes(&self, payload: &str) -> Result<KnowledgeBaseIndexes, KnowledgeBaseError> {
        let snapshot: KnowledgeBaseSnapshot = serde_json::from_str(payload)
            .map_err(|e| KnowledgeBaseError::ImportError(e.to_string()))?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(KnowledgeBaseError::ImportError(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        let mut fresh = KnowledgeBaseIndexes::default();

        for record in snapshot.organizations {
            self.validate_record(&record)
                .map_err(|e| KnowledgeBaseError::ImportError(e.to_string()))?;

            if fresh.records.contains_key(&record.id) {
                return Err(KnowledgeBaseError::ImportError(format!(
                    "duplicate id `{}`",
                    record.id
                )));
            }

            fresh.insert(record, &self.normalizer);
        }

        Ok(fresh)
    }

    fn validate_record(&self, record: &KnownOrganization) -> Result<(), KnowledgeBaseError> {
        if record.id.trim().is_empty() {
            return Err(KnowledgeBaseError::InvalidRecord(
                "organization id is empty".to_string(),
            ));
        }

        if self.normalizer.normalize(&record.canonical_name).is_empty() {
            return Err(KnowledgeBaseError::InvalidRecord(format!(
                "organization `{}` has an empty canonical name",
                record.id
            )));
        }

        Ok(())
    }

    fn field_score(&self, query_key: &str, field_key: &str) -> Score {
        if query_key.is_empty() || field_key.is_empty() {
            return 0.0;
        }

        if query_key == field_key {
            return 1.0;
        }

        self.fuzzy_matcher.enhanced_company_ratio(query_key, field_key)
    }

    fn lookup(&self, index: &KeyOwners, key: &str) -> Option<&KnownOrganization> {
        if key.is_empty() {
            return None;
        }

        index
            .get(key)
            .and_then(|owners| owners.last())
            .and_then(|id| self.indexes.records.get(id))
    }

    fn clear_query_cache(&self) {
        self.query_cache.clear();
    }
}
