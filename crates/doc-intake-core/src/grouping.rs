//! Filename-rule grouping.
//!
//! Partitions the collection into named classification groups. The rule
//! list and its order are configuration; the algorithm is always the same:
//!
//! 1. For each rule, in list order, select every document whose filename
//!    the rule matches.
//! 2. Drop rules whose selection is empty. They do not become steps.
//! 3. Pick one member of each surviving group as its display sample.
//!
//! Groups are recomputed from scratch on every call and carry no identity
//! of their own. Nothing is deduplicated across groups: a filename that two
//! rules match lands in both, and list order decides which step sees it
//! first.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GroupingError;
use crate::models::{Document, DocumentId};
use crate::sample::{pick, SampleChooser};

/// How a rule matches a filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilenameMatch {
    /// `<digits>.png|jpg|jpeg` (any case) with the number in `min..=max`.
    Numbered { min: u64, max: u64 },
    /// Case-insensitive substring.
    Contains { value: String },
    /// Regular expression over the whole filename.
    Regex { pattern: String },
}

/// One named entry of the grouping configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRule {
    pub name: String,
    /// Human step title; falls back to `name`.
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "match")]
    pub matcher: FilenameMatch,
}

impl GroupRule {
    pub fn new(name: impl Into<String>, matcher: FilenameMatch) -> Self {
        Self {
            name: name.into(),
            label: None,
            matcher,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// The rule set the product ships with: numbered scans 1–14, then the
/// Musaddiq documents.
pub fn default_rules() -> Vec<GroupRule> {
    vec![
        GroupRule::new("numbered", FilenameMatch::Numbered { min: 1, max: 14 })
            .with_label("Numbered documents (1-14)"),
        GroupRule::new(
            "musaddiq",
            FilenameMatch::Contains {
                value: "musaddiq".to_string(),
            },
        )
        .with_label("Musaddiq documents"),
    ]
}

fn numbered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(\d+)\.(png|jpg|jpeg)$").expect("numbered filename pattern is valid")
    })
}

/// The number of a `<digits>.png|jpg|jpeg` filename, if it is one.
pub fn numbered_index(name: &str) -> Option<u64> {
    numbered_re()
        .captures(name)
        .and_then(|caps| caps[1].parse().ok())
}

#[derive(Debug)]
enum Predicate {
    Numbered { min: u64, max: u64 },
    Contains(String),
    Regex(Regex),
}

impl Predicate {
    fn matches(&self, name: &str) -> bool {
        match self {
            Predicate::Numbered { min, max } => {
                numbered_index(name).is_some_and(|n| (*min..=*max).contains(&n))
            }
            Predicate::Contains(needle) => name.to_lowercase().contains(needle.as_str()),
            Predicate::Regex(re) => re.is_match(name),
        }
    }
}

#[derive(Debug)]
struct CompiledRule {
    name: String,
    label: String,
    predicate: Predicate,
}

/// A validated, ready-to-run rule list.
#[derive(Debug)]
pub struct GroupingRules {
    rules: Vec<CompiledRule>,
}

impl GroupingRules {
    /// Validate and compile `rules`, keeping their order.
    pub fn compile(rules: &[GroupRule]) -> Result<Self, GroupingError> {
        if rules.is_empty() {
            return Err(GroupingError::NoRules);
        }

        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let name = rule.name.trim();
            if name.is_empty() {
                return Err(GroupingError::EmptyName);
            }
            if !seen.insert(name.to_string()) {
                return Err(GroupingError::DuplicateName(name.to_string()));
            }

            let predicate = match &rule.matcher {
                FilenameMatch::Numbered { min, max } => {
                    if min > max {
                        return Err(GroupingError::EmptyRange {
                            rule: name.to_string(),
                            min: *min,
                            max: *max,
                        });
                    }
                    Predicate::Numbered {
                        min: *min,
                        max: *max,
                    }
                }
                FilenameMatch::Contains { value } => {
                    if value.is_empty() {
                        return Err(GroupingError::EmptySubstring {
                            rule: name.to_string(),
                        });
                    }
                    Predicate::Contains(value.to_lowercase())
                }
                FilenameMatch::Regex { pattern } => {
                    let re = RegexBuilder::new(pattern).build().map_err(|source| {
                        GroupingError::InvalidPattern {
                            rule: name.to_string(),
                            source,
                        }
                    })?;
                    Predicate::Regex(re)
                }
            };

            compiled.push(CompiledRule {
                name: name.to_string(),
                label: rule
                    .label
                    .clone()
                    .unwrap_or_else(|| name.to_string()),
                predicate,
            });
        }

        Ok(Self { rules: compiled })
    }

    /// Compiled [`default_rules`].
    pub fn original() -> Self {
        Self::compile(&default_rules()).expect("default grouping rules are valid")
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule names in precedence order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    /// True if any rule claims `name`.
    pub fn matches_any(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.predicate.matches(name))
    }
}

/// A named subset of the collection, consumed as one classification step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationGroup {
    /// Rule name.
    pub name: String,
    /// Human step title.
    pub label: String,
    /// Matching documents, in collection order.
    pub member_ids: Vec<DocumentId>,
    /// Representative shown to the user. Has no effect on labeling.
    pub sample_id: DocumentId,
}

impl ClassificationGroup {
    pub fn len(&self) -> usize {
        self.member_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_ids.is_empty()
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.member_ids.contains(id)
    }
}

/// Partition `documents` into the ordered list of non-empty groups.
pub fn compute_groups(
    documents: &[Document],
    rules: &GroupingRules,
    chooser: &mut dyn SampleChooser,
) -> Vec<ClassificationGroup> {
    let mut groups = Vec::new();

    for rule in &rules.rules {
        let member_ids: Vec<DocumentId> = documents
            .iter()
            .filter(|doc| rule.predicate.matches(doc.name()))
            .map(|doc| doc.id().clone())
            .collect();

        let Some(sample_id) = pick(&member_ids, chooser).cloned() else {
            debug!(rule = %rule.name, "grouping rule matched nothing");
            continue;
        };

        debug!(rule = %rule.name, members = member_ids.len(), "group formed");
        groups.push(ClassificationGroup {
            name: rule.name.clone(),
            label: rule.label.clone(),
            member_ids,
            sample_id,
        });
    }

    groups
}

/// Documents that no rule claims. They are never labeled by the sequencer.
pub fn unmatched<'a>(documents: &'a [Document], rules: &GroupingRules) -> Vec<&'a Document> {
    documents
        .iter()
        .filter(|doc| !rules.matches_any(doc.name()))
        .collect()
}
