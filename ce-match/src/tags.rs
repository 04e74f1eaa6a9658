//! Tag analysis between the local catalog and Stashapp
//!
//! Classifies each catalog tag by how it maps onto Stashapp's tag list:
//! exact name, alias, fuzzy suggestion, or missing. Missing tags are the ones
//! an importer must create before it can link scenes.

use crate::similarity::similarity_with;
use ce_common::MatchThresholds;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Tag as named in the local catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CeTag {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// Tag as stored in Stashapp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashappTag {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagMatchKind {
    /// Same name, ignoring case and surrounding whitespace
    Exact,
    /// Same as one of the Stashapp tag's aliases
    Alias,
    /// Similar enough to suggest, needs review
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagMatch {
    pub ce_name: String,
    pub stashapp_id: String,
    pub stashapp_name: String,
    pub kind: TagMatchKind,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagAnalysis {
    pub matched: Vec<TagMatch>,
    /// Catalog tags with no Stashapp counterpart
    pub missing: Vec<String>,
}

impl TagAnalysis {
    pub fn count(&self, kind: TagMatchKind) -> usize {
        self.matched.iter().filter(|m| m.kind == kind).count()
    }
}

pub struct TagAnalyzer {
    tags: Vec<StashappTag>,
    by_name: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
    thresholds: MatchThresholds,
}

impl TagAnalyzer {
    pub fn new(tags: Vec<StashappTag>, thresholds: MatchThresholds) -> Self {
        let mut by_name = HashMap::new();
        let mut by_alias = HashMap::new();
        for (idx, tag) in tags.iter().enumerate() {
            by_name.entry(normalize(&tag.name)).or_insert(idx);
            for alias in &tag.aliases {
                by_alias.entry(normalize(alias)).or_insert(idx);
            }
        }

        Self {
            tags,
            by_name,
            by_alias,
            thresholds,
        }
    }

    /// Classify every catalog tag
    ///
    /// Duplicate catalog names (ignoring case) are reported once.
    pub fn analyze(&self, ce_tags: &[CeTag]) -> TagAnalysis {
        let mut analysis = TagAnalysis::default();
        let mut seen = std::collections::HashSet::new();

        for ce_tag in ce_tags {
            let key = normalize(&ce_tag.name);
            if key.is_empty() || !seen.insert(key.clone()) {
                continue;
            }

            match self.classify(&ce_tag.name, &key) {
                Some(found) => analysis.matched.push(found),
                None => analysis.missing.push(ce_tag.name.clone()),
            }
        }

        info!(
            exact = analysis.count(TagMatchKind::Exact),
            alias = analysis.count(TagMatchKind::Alias),
            fuzzy = analysis.count(TagMatchKind::Fuzzy),
            missing = analysis.missing.len(),
            "Tag analysis complete"
        );

        analysis
    }

    fn classify(&self, name: &str, key: &str) -> Option<TagMatch> {
        if let Some(&idx) = self.by_name.get(key) {
            return Some(self.tag_match(name, idx, TagMatchKind::Exact, 1.0));
        }
        if let Some(&idx) = self.by_alias.get(key) {
            return Some(self.tag_match(name, idx, TagMatchKind::Alias, 1.0));
        }

        let short = self.thresholds.short_name_max_len;
        let mut best: Option<(usize, f64)> = None;
        for (idx, tag) in self.tags.iter().enumerate() {
            let score = std::iter::once(tag.name.as_str())
                .chain(tag.aliases.iter().map(String::as_str))
                .map(|candidate| similarity_with(name, candidate, short))
                .fold(0.0, f64::max);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((idx, score));
            }
        }

        best.filter(|&(_, score)| score >= self.thresholds.high_confidence)
            .map(|(idx, score)| self.tag_match(name, idx, TagMatchKind::Fuzzy, score))
    }

    fn tag_match(&self, name: &str, idx: usize, kind: TagMatchKind, score: f64) -> TagMatch {
        let tag = &self.tags[idx];
        TagMatch {
            ce_name: name.to_string(),
            stashapp_id: tag.id.clone(),
            stashapp_name: tag.name.clone(),
            kind,
            score,
        }
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(id: &str, name: &str, aliases: &[&str]) -> StashappTag {
        StashappTag {
            id: id.to_string(),
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn ce(name: &str) -> CeTag {
        CeTag {
            id: None,
            name: name.to_string(),
        }
    }

    fn analyzer() -> TagAnalyzer {
        TagAnalyzer::new(
            vec![
                tag("1", "Outdoors", &["Outdoor"]),
                tag("2", "Blonde", &[]),
                tag("3", "Point of View", &["POV"]),
            ],
            MatchThresholds::default(),
        )
    }

    #[test]
    fn test_classifies_each_kind() {
        let analysis = analyzer().analyze(&[
            ce("blonde"),
            ce("POV"),
            ce("Blondes"),
            ce("Anal"),
        ]);

        assert_eq!(analysis.matched.len(), 3);
        assert_eq!(analysis.matched[0].kind, TagMatchKind::Exact);
        assert_eq!(analysis.matched[0].stashapp_id, "2");
        assert_eq!(analysis.matched[1].kind, TagMatchKind::Alias);
        assert_eq!(analysis.matched[1].stashapp_id, "3");
        assert_eq!(analysis.matched[2].kind, TagMatchKind::Fuzzy);
        assert_eq!(analysis.matched[2].stashapp_id, "2");
        assert!(analysis.matched[2].score < 1.0);
        assert_eq!(analysis.missing, vec!["Anal".to_string()]);
    }

    #[test]
    fn test_duplicate_catalog_tags_reported_once() {
        let analysis = analyzer().analyze(&[ce("Blonde"), ce(" blonde "), ce("Unknown Tag")]);
        assert_eq!(analysis.matched.len(), 1);
        assert_eq!(analysis.missing.len(), 1);
    }
}
