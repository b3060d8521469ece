use crate::models::{CompanyType, Confidence, HintMetadata, KnownOrganization};
use crate::types::{ByteOffset, EntityType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Another pattern match naming the same organization ("Goldman" after "Goldman Sachs").
    Mention,
    /// A pronoun or determiner phrase ("the company", "it").
    Anaphor,
}

/// A secondary reference merged into a top-level entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityReference {
    pub text: String,
    pub offset: ByteOffset,
    pub kind: ReferenceKind,
}

/// A ranked, scored organization entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEntity {
    pub text: String,
    pub normalized: String,
    pub entity_type: EntityType,
    pub offset: ByteOffset,
    pub confidence: Confidence,
    pub known_organization: Option<KnownOrganization>,
    pub variations: Vec<EntityReference>,
    pub context_metadata: Option<HintMetadata>,
    pub legal_suffixes: Vec<String>,
    pub company_types: Vec<CompanyType>,
    pub jurisdictions: Vec<String>,
}

/// Non-fatal conditions observed while resolving a text span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    InputTruncated { max_chars: usize },
    ExtractionTimedOut { candidates_collected: usize },
    PatternRuleFailed { rule: String, message: String },
    CandidateDropped { text: String, reason: String },
    ScoringFailed { text: String, message: String },
    PipelineFailure { message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub entities: Vec<ResolvedEntity>,
    pub diagnostics: Vec<Diagnostic>,
    pub timed_out: bool,
}

impl ResolutionResult {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
