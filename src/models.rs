use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One cast vote, as stored in the ledger.
///
/// Records are immutable once appended: `hash` covers every other field
/// together with `prev_hash`, so editing any of them after the fact breaks
/// the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub voter_id: String,
    pub voter_name: String,
    pub party: String,
    pub comment: String,
    /// Raw polarity in [-1.0, 1.0].
    pub sentiment: f64,
    /// Multiplier in [0.5, 1.0] applied when tallying.
    pub weight: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(alias = "prev_hash")]
    pub prev_hash: String,
    pub hash: String,
}

/// A vote as handed to the ledger, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSubmission {
    pub voter_id: String,
    pub voter_name: String,
    pub party: String,
    #[serde(default)]
    pub comment: String,
}

impl VoteSubmission {
    pub fn new(
        voter_id: impl Into<String>,
        voter_name: impl Into<String>,
        party: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            voter_id: voter_id.into(),
            voter_name: voter_name.into(),
            party: party.into(),
            comment: comment.into(),
        }
    }

    /// Copy with surrounding whitespace stripped from every field.
    pub fn trimmed(&self) -> Self {
        Self {
            voter_id: self.voter_id.trim().to_string(),
            voter_name: self.voter_name.trim().to_string(),
            party: self.party.trim().to_string(),
            comment: self.comment.trim().to_string(),
        }
    }
}

pub const DEFAULT_PARTIES: [&str; 7] = ["DMK", "TVK", "AIADMK", "BJP", "INC", "NTK", "DMDK"];

/// The closed, ordered set of parties a vote may be cast for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartySet(Vec<String>);

impl PartySet {
    /// Builds a set from the given names, keeping their order.
    /// Returns `None` when the list is empty or names a party twice.
    pub fn new<I, S>(names: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parties: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if parties.contains(&name) {
                return None;
            }
            parties.push(name);
        }
        if parties.is_empty() {
            None
        } else {
            Some(PartySet(parties))
        }
    }

    pub fn contains(&self, party: &str) -> bool {
        self.0.iter().any(|p| p == party)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for PartySet {
    fn default() -> Self {
        PartySet(DEFAULT_PARTIES.iter().map(|p| p.to_string()).collect())
    }
}
