//! Seeded fixture profiles.
//!
//! A fixed lookup table keyed by trigger substrings. When a query contains
//! one of the triggers (case-insensitive), the evidence adapter answers with
//! the profile's canned records and performs no network I/O. This drives
//! offline demos and doubles as the canonical test fixture.

use crate::types::{EvidenceRecord, EvidenceSet};

/// A canned multi-source profile and the tokens that select it.
#[derive(Debug, Clone, Copy)]
pub struct FixtureProfile {
    pub name: &'static str,
    pub triggers: &'static [&'static str],
    /// `(title, snippet, source_link)` in the order they are returned.
    pub records: &'static [(&'static str, &'static str, &'static str)],
}

impl FixtureProfile {
    fn matches(&self, query_lower: &str) -> bool {
        self.triggers.iter().any(|t| query_lower.contains(t))
    }

    pub fn evidence(&self) -> EvidenceSet {
        self.records
            .iter()
            .map(|(title, snippet, link)| EvidenceRecord::new(*title, *snippet, *link))
            .collect()
    }
}

/// Student profile spread over an institutional page, a code-hosting
/// profile, a professional network and a social network.
pub const DEMO_STUDENT_PROFILE: FixtureProfile = FixtureProfile {
    name: "demo-student",
    triggers: &["adith", "cet", "demo"],
    records: &[
        (
            "Adith S - Student Profile | CET Trivandrum",
            "Adith S is a B.Tech Computer Science student at College of Engineering Trivandrum (CET). \
             Core Team member of CET CyberSec Club.",
            "https://cet.ac.in/students/adith-s",
        ),
        (
            "GitHub - Adith S (CET)",
            "Security Researcher & Python Dev. Projects: Shadow-Scout, CET-Event-Bot. \
             Located: Trivandrum, Kerala.",
            "https://github.com/adiths-cet",
        ),
        (
            "Adith S - LinkedIn",
            "Engineering Student at CET. Skills: Python, OSINT, Network Security. \
             Volunteer at FOSS Cell CET.",
            "https://linkedin.com/in/adith-s-cet",
        ),
        (
            "Instagram: @adith_cet",
            "Trivandrum | CETian | Tech & Travels. DM for Hackathon collabs.",
            "https://instagram.com/adith_cet",
        ),
    ],
};

/// Ordered set of fixture profiles; the first matching profile wins.
#[derive(Debug, Clone)]
pub struct FixtureTable {
    profiles: Vec<FixtureProfile>,
}

impl FixtureTable {
    /// The table shipped with the tool.
    pub fn seeded() -> Self {
        Self {
            profiles: vec![DEMO_STUDENT_PROFILE],
        }
    }

    pub fn empty() -> Self {
        Self {
            profiles: Vec::new(),
        }
    }

    pub fn with_profile(mut self, profile: FixtureProfile) -> Self {
        self.profiles.push(profile);
        self
    }

    /// Return the canned evidence for `query`, if any trigger matches.
    pub fn lookup(&self, query: &str) -> Option<EvidenceSet> {
        self.matching_profile(query).map(FixtureProfile::evidence)
    }

    pub fn matching_profile(&self, query: &str) -> Option<&FixtureProfile> {
        let lower = query.to_lowercase();
        self.profiles.iter().find(|p| p.matches(&lower))
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for FixtureTable {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_match_is_case_insensitive() {
        let table = FixtureTable::seeded();
        for query in ["demo test", "DEMO", "Adith S Trivandrum", "student at CET"] {
            assert!(table.lookup(query).is_some(), "query {:?} should match", query);
        }
    }

    #[test]
    fn test_no_trigger_no_fixture() {
        let table = FixtureTable::seeded();
        assert!(table.lookup("zzz_no_such_person_qxy").is_none());
        assert!(table.lookup("").is_none());
    }

    #[test]
    fn test_fixture_is_deterministic() {
        let table = FixtureTable::seeded();
        let first = table.lookup("demo").unwrap();
        let second = table.lookup("Demo run").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_fixture_contains_institutional_page() {
        let records = FixtureTable::seeded().lookup("demo test").unwrap();
        assert!(
            records
                .iter()
                .any(|r| r.source_link().ends_with(".ac.in/students/adith-s"))
        );
        assert!(records.iter().any(|r| r.source_link().contains("github.com")));
        assert!(records.iter().any(|r| r.source_link().contains("instagram.com")));
    }

    #[test]
    fn test_empty_table_never_matches() {
        let table = FixtureTable::empty();
        assert!(table.is_empty());
        assert!(table.lookup("demo").is_none());
    }

    #[test]
    fn test_first_matching_profile_wins() {
        const OTHER: FixtureProfile = FixtureProfile {
            name: "other",
            triggers: &["demo"],
            records: &[("x", "y", "z")],
        };
        let table = FixtureTable::seeded().with_profile(OTHER);
        assert_eq!(table.matching_profile("demo").unwrap().name, "demo-student");

        let table = FixtureTable::empty().with_profile(OTHER);
        assert_eq!(table.lookup("demo").unwrap().len(), 1);
    }
}
