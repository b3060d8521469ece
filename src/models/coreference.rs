use crate::constants::ANAPHOR_PATTERN;
use crate::types::{ByteOffset, EntityType, OrganizationId};
use crate::utils::tokenize;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

static ANAPHOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ANAPHOR_PATTERN).expect("invalid anaphor pattern"));

/// A resolved candidate as seen by coreference.
#[derive(Debug, Clone, PartialEq)]
pub struct Mention {
    pub text: String,
    pub normalized: String,
    pub entity_type: EntityType,
    pub offset: ByteOffset,
    pub end: ByteOffset,
    pub organization_id: Option<OrganizationId>,
}

/// An anaphoric phrase ("the company", "it") attached to a mention.
#[derive(Debug, Clone, PartialEq)]
pub struct AnaphorLink {
    pub text: String,
    pub offset: ByteOffset,
    /// Index of the root mention it refers to.
    pub antecedent: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreferenceLinks {
    /// For each mention: `None` if it starts a new entity, otherwise the index of the root
    /// mention it merges into. Roots always precede the mentions linked to them.
    pub antecedents: Vec<Option<usize>>,
    pub anaphors: Vec<AnaphorLink>,
}

/// Groups mentions of the same organization within one text span.
///
/// `mentions` are ordered by offset.
pub trait CoreferenceResolver: Send + Sync + fmt::Debug {
    fn resolve(&self, text: &str, mentions: &[Mention]) -> CoreferenceLinks;
}

/// Links a mention to the nearest earlier entity it is contained in (by tokens) or that
/// resolves to the same knowledge-base record with the same type, and attaches anaphors to
/// the nearest preceding entity.
///
/// Known precision limit: "it" after two companies always refers to the second one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestAntecedentResolver;

impl CoreferenceResolver for NearestAntecedentResolver {
    fn resolve(&self, text: &str, mentions: &[Mention]) -> CoreferenceLinks {
        let mut antecedents: Vec<Option<usize>> = Vec::with_capacity(mentions.len());

        for (index, mention) in mentions.iter().enumerate() {
            let antecedent = (0..index)
                .rev()
                .filter(|candidate| antecedents[*candidate].is_none())
                .find(|candidate| refers_to(mention, &mentions[*candidate]));

            antecedents.push(antecedent);
        }

        let anaphors = ANAPHOR_REGEX
            .find_iter(text)
            .filter(|anaphor| {
                !mentions.iter().any(|mention| {
                    anaphor.start() < mention.end && mention.offset < anaphor.end()
                })
            })
            .filter_map(|anaphor| {
                let nearest = mentions
                    .iter()
                    .rposition(|mention| mention.end <= anaphor.start())?;

                Some(AnaphorLink {
                    text: anaphor.as_str().to_string(),
                    offset: anaphor.start(),
                    antecedent: antecedents[nearest].unwrap_or(nearest),
                })
            })
            .collect();

        CoreferenceLinks {
            antecedents,
            anaphors,
        }
    }
}

fn refers_to(mention: &Mention, antecedent: &Mention) -> bool {
    if let (Some(a), Some(b)) = (&mention.organization_id, &antecedent.organization_id) {
        if a != b {
            return false;
        }

        if mention.entity_type == antecedent.entity_type {
            return true;
        }
    }

    // A ticker never merges into a company name by text alone.
    if mention.entity_type.is_ticker() != antecedent.entity_type.is_ticker() {
        return false;
    }

    let mention_tokens: HashSet<String> = tokenize(&mention.normalized).into_iter().collect();
    let antecedent_tokens: HashSet<String> =
        tokenize(&antecedent.normalized).into_iter().collect();

    !mention_tokens.is_empty() && mention_tokens.is_subset(&antecedent_tokens)
}
