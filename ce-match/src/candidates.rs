//! Candidate pools for matching
//!
//! Every source exposes its performers in one common shape, a [`Candidate`]
//! with a primary name, aliases and a typed identity. The matcher scores
//! candidates without knowing where they came from; a [`CandidateSource`]
//! knows its round tag and how to turn a winning candidate into Stashapp and
//! StashDB identifiers.
//!
//! Two sources exist:
//! - [`SceneScopedSource`]: the cast credited on one scene (Stashapp or StashDB)
//! - [`GlobalRosterSource`]: every Stashapp performer

use crate::types::{MatchSource, StashappPerformer, StashdbPerformer, UNMATCHED_STASHAPP_ID};
use std::collections::HashMap;
use tracing::debug;

/// Where a candidate record came from
#[derive(Debug, Clone, Copy)]
pub enum CandidateIdentity<'a> {
    Stashapp(&'a StashappPerformer),
    Stashdb(&'a StashdbPerformer),
}

/// Performer record in the common matching shape
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    /// Primary display name
    pub name: &'a str,
    /// Alternate names
    pub aliases: Vec<&'a str>,
    pub identity: CandidateIdentity<'a>,
}

impl<'a> Candidate<'a> {
    pub fn from_stashapp(performer: &'a StashappPerformer) -> Self {
        Self {
            name: &performer.name,
            aliases: performer.aliases.iter().map(String::as_str).collect(),
            identity: CandidateIdentity::Stashapp(performer),
        }
    }

    /// StashDB credit as a candidate
    ///
    /// The scene's "credited as" name joins the alias list.
    pub fn from_stashdb(performer: &'a StashdbPerformer) -> Self {
        let mut aliases: Vec<&str> = performer.aliases.iter().map(String::as_str).collect();
        if let Some(credited) = performer.credited_as.as_deref() {
            let credited = credited.trim();
            if !credited.is_empty() && !aliases.contains(&credited) {
                aliases.push(credited);
            }
        }

        Self {
            name: &performer.name,
            aliases,
            identity: CandidateIdentity::Stashdb(performer),
        }
    }
}

/// Stashapp and StashDB identifiers resolved for a winning candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub stashapp_id: i64,
    pub stashapp_name: String,
    pub stashdb_id: String,
    pub stashdb_name: String,
}

/// Global Stashapp roster with a StashDB cross-reference index
///
/// Read-only once built; safe to share across threads.
#[derive(Debug, Clone)]
pub struct Roster {
    performers: Vec<StashappPerformer>,
    external_endpoint: String,
    by_stashdb_id: HashMap<String, usize>,
}

impl Roster {
    /// Build the roster and index StashDB cross-references
    ///
    /// # Arguments
    /// * `performers` - Every known Stashapp performer
    /// * `external_endpoint` - Substring identifying StashDB endpoints in
    ///   `stash_ids` (e.g. `"stashdb"`)
    pub fn new(performers: Vec<StashappPerformer>, external_endpoint: impl Into<String>) -> Self {
        let external_endpoint = external_endpoint.into();
        let mut by_stashdb_id = HashMap::new();

        for (idx, performer) in performers.iter().enumerate() {
            for stash_id in &performer.stash_ids {
                if stash_id.endpoint.contains(external_endpoint.as_str()) {
                    // First roster entry claiming an id keeps it
                    by_stashdb_id.entry(stash_id.stash_id.clone()).or_insert(idx);
                }
            }
        }

        debug!(
            performers = performers.len(),
            stashdb_links = by_stashdb_id.len(),
            "Built Stashapp roster index"
        );

        Self {
            performers,
            external_endpoint,
            by_stashdb_id,
        }
    }

    /// Roster with no performers (disables the global round)
    pub fn empty(external_endpoint: impl Into<String>) -> Self {
        Self::new(Vec::new(), external_endpoint)
    }

    pub fn performers(&self) -> &[StashappPerformer] {
        &self.performers
    }

    pub fn len(&self) -> usize {
        self.performers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.performers.is_empty()
    }

    /// Stashapp performer linked to a StashDB id
    pub fn find_by_stashdb_id(&self, stashdb_id: &str) -> Option<&StashappPerformer> {
        self.by_stashdb_id
            .get(stashdb_id)
            .map(|&idx| &self.performers[idx])
    }

    /// StashDB id carried by a Stashapp performer's cross-references
    pub fn stashdb_ref<'p>(&self, performer: &'p StashappPerformer) -> Option<&'p str> {
        performer
            .stash_ids
            .iter()
            .find(|s| s.endpoint.contains(self.external_endpoint.as_str()))
            .map(|s| s.stash_id.as_str())
    }

    /// Fill in the identifiers a candidate does not carry itself
    ///
    /// - StashDB candidate: Stashapp side comes from the roster entry linked
    ///   to the StashDB id, else [`UNMATCHED_STASHAPP_ID`] and an empty name
    /// - Stashapp candidate: StashDB side comes from its own cross-reference
    pub fn resolve(&self, identity: &CandidateIdentity<'_>) -> ResolvedIdentity {
        match *identity {
            CandidateIdentity::Stashdb(performer) => {
                let (stashapp_id, stashapp_name) = match self.find_by_stashdb_id(&performer.id) {
                    Some(linked) => (linked.id, linked.name.clone()),
                    None => (UNMATCHED_STASHAPP_ID, String::new()),
                };
                ResolvedIdentity {
                    stashapp_id,
                    stashapp_name,
                    stashdb_id: performer.id.clone(),
                    stashdb_name: performer.name.clone(),
                }
            }
            CandidateIdentity::Stashapp(performer) => {
                let (stashdb_id, stashdb_name) = match self.stashdb_ref(performer) {
                    Some(id) => (id.to_string(), performer.name.clone()),
                    None => (String::new(), String::new()),
                };
                ResolvedIdentity {
                    stashapp_id: performer.id,
                    stashapp_name: performer.name.clone(),
                    stashdb_id,
                    stashdb_name,
                }
            }
        }
    }
}

/// Pool of candidates for one matching round
pub trait CandidateSource {
    /// Round tag recorded on results
    fn source(&self) -> MatchSource;

    /// Candidates in input order (order is the tie-break)
    fn candidates(&self) -> &[Candidate<'_>];

    /// Roster used to resolve cross-references
    fn roster(&self) -> &Roster;

    /// Stashapp/StashDB identifiers for a winning candidate
    fn resolve(&self, candidate: &Candidate<'_>) -> ResolvedIdentity {
        self.roster().resolve(&candidate.identity)
    }
}

/// Cast credited on one scene by Stashapp or StashDB
pub struct SceneScopedSource<'a> {
    source: MatchSource,
    candidates: Vec<Candidate<'a>>,
    roster: &'a Roster,
}

impl<'a> SceneScopedSource<'a> {
    /// Performers Stashapp links to the scene
    pub fn stashapp(cast: &'a [StashappPerformer], roster: &'a Roster) -> Self {
        Self {
            source: MatchSource::SceneMediaServer,
            candidates: cast.iter().map(Candidate::from_stashapp).collect(),
            roster,
        }
    }

    /// Performers StashDB credits on the scene
    pub fn stashdb(cast: &'a [StashdbPerformer], roster: &'a Roster) -> Self {
        Self {
            source: MatchSource::SceneExternalDb,
            candidates: cast.iter().map(Candidate::from_stashdb).collect(),
            roster,
        }
    }
}

impl CandidateSource for SceneScopedSource<'_> {
    fn source(&self) -> MatchSource {
        self.source
    }

    fn candidates(&self) -> &[Candidate<'_>] {
        &self.candidates
    }

    fn roster(&self) -> &Roster {
        self.roster
    }
}

/// Every Stashapp performer in the roster
pub struct GlobalRosterSource<'a> {
    candidates: Vec<Candidate<'a>>,
    roster: &'a Roster,
}

impl<'a> GlobalRosterSource<'a> {
    pub fn new(roster: &'a Roster) -> Self {
        Self {
            candidates: roster.performers().iter().map(Candidate::from_stashapp).collect(),
            roster,
        }
    }
}

impl CandidateSource for GlobalRosterSource<'_> {
    fn source(&self) -> MatchSource {
        MatchSource::GlobalMediaServer
    }

    fn candidates(&self) -> &[Candidate<'_>] {
        &self.candidates
    }

    fn roster(&self) -> &Roster {
        self.roster
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::new(
            vec![
                StashappPerformer::new(1, "Jill Kassidy")
                    .with_stash_id("https://stashdb.org/graphql", "c853"),
                StashappPerformer::new(2, "Riley Reid")
                    .with_stash_id("https://theporndb.net/graphql", "tpdb-9"),
                StashappPerformer::new(3, "Jill K").with_stash_id("stashdb", "c853"),
            ],
            "stashdb",
        )
    }

    #[test]
    fn test_stashdb_index_ignores_other_endpoints() {
        let roster = roster();
        assert_eq!(roster.find_by_stashdb_id("c853").map(|p| p.id), Some(1));
        assert!(roster.find_by_stashdb_id("tpdb-9").is_none());
    }

    #[test]
    fn test_stashdb_candidate_resolves_linked_stashapp_performer() {
        let roster = roster();
        let credit = StashdbPerformer::new("c853", "Jill Kassidy");
        let resolved = roster.resolve(&CandidateIdentity::Stashdb(&credit));

        assert_eq!(resolved.stashapp_id, 1);
        assert_eq!(resolved.stashapp_name, "Jill Kassidy");
        assert_eq!(resolved.stashdb_id, "c853");
    }

    #[test]
    fn test_unlinked_stashdb_candidate_gets_sentinel() {
        let roster = roster();
        let credit = StashdbPerformer::new("np-uuid", "New Performer");
        let resolved = roster.resolve(&CandidateIdentity::Stashdb(&credit));

        assert_eq!(resolved.stashapp_id, UNMATCHED_STASHAPP_ID);
        assert_eq!(resolved.stashapp_name, "");
        assert_eq!(resolved.stashdb_id, "np-uuid");
        assert_eq!(resolved.stashdb_name, "New Performer");
    }

    #[test]
    fn test_stashapp_candidate_without_stashdb_link() {
        let roster = roster();
        let resolved = roster.resolve(&CandidateIdentity::Stashapp(&roster.performers()[1]));

        assert_eq!(resolved.stashapp_id, 2);
        assert_eq!(resolved.stashdb_id, "");
        assert_eq!(resolved.stashdb_name, "");
    }

    #[test]
    fn test_credited_as_joins_aliases_once() {
        let same = StashdbPerformer::new("x", "Silvie Deluxe")
            .with_aliases(["Simona"])
            .with_credited_as("Simona");
        assert_eq!(Candidate::from_stashdb(&same).aliases, vec!["Simona"]);

        let different = StashdbPerformer::new("x", "Silvie Deluxe")
            .with_aliases(["Simona"])
            .with_credited_as("Silvia");
        assert_eq!(Candidate::from_stashdb(&different).aliases, vec!["Simona", "Silvia"]);
    }

    #[test]
    fn test_sources_report_their_round() {
        let roster = roster();
        let cast = vec![StashdbPerformer::new("c853", "Jill Kassidy")];
        assert_eq!(
            SceneScopedSource::stashdb(&cast, &roster).source(),
            MatchSource::SceneExternalDb
        );
        let global = GlobalRosterSource::new(&roster);
        assert_eq!(global.source(), MatchSource::GlobalMediaServer);
        assert_eq!(global.candidates().len(), 3);
    }
}
