use serde::{Deserialize, Serialize};

/// A single attribute observed on or near the element holding the text span.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeHint {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct HintMetadata {
    pub author: Option<String>,
    pub published: Option<String>,
    pub section: Option<String>,
    /// Industry the surrounding document declares, if any.
    pub industry: Option<String>,
}

impl HintMetadata {
    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.published.is_none()
            && self.section.is_none()
            && self.industry.is_none()
    }
}

/// Host-supplied description of where a text span sits in its document.
///
/// Every field is optional, so `{}` deserializes to the empty descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuralHints {
    /// Stable identity of the enclosing element. Hints without one are never cached.
    pub element_id: Option<String>,
    /// Position tags such as `headline`, `first_paragraph` or `sidebar`.
    pub positions: Vec<String>,
    pub attributes: Vec<AttributeHint>,
    pub link_target: Option<String>,
    /// Site-specific micro-patterns the host matched around the element.
    pub site_patterns: Vec<String>,
    pub metadata: HintMetadata,
}

impl StructuralHints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element_id(mut self, element_id: &str) -> Self {
        self.element_id = Some(element_id.to_string());
        self
    }

    pub fn with_position(mut self, position: &str) -> Self {
        self.positions.push(position.to_string());
        self
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(AttributeHint {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn with_link_target(mut self, link_target: &str) -> Self {
        self.link_target = Some(link_target.to_string());
        self
    }

    pub fn with_site_pattern(mut self, site_pattern: &str) -> Self {
        self.site_patterns.push(site_pattern.to_string());
        self
    }

    pub fn with_section(mut self, section: &str) -> Self {
        self.metadata.section = Some(section.to_string());
        self
    }

    pub fn with_industry(mut self, industry: &str) -> Self {
        self.metadata.industry = Some(industry.to_string());
        self
    }

    /// First non-empty value of the named attribute (case-insensitive name match).
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| {
                attribute.name.eq_ignore_ascii_case(name) && !attribute.value.trim().is_empty()
            })
            .map(|attribute| attribute.value.trim())
    }
}
