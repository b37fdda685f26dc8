//! The voting ledger: validates submissions and appends them to the hash
//! chain, one voter at a time.

use std::sync::Mutex;

use chrono::Utc;
use log::{info, warn};
use serde::Serialize;

use crate::chain::{self, ChainBreak, HashInput};
use crate::error::{LedgerError, Result};
use crate::models::{PartySet, VoteRecord, VoteSubmission};
use crate::results::{self, ResultsReport};
use crate::sentiment::SentimentScorer;
use crate::store::{LedgerStore, StoredLedger};

pub const MAX_VOTER_ID_CHARS: usize = 10;
pub const MAX_VOTER_NAME_CHARS: usize = 50;
pub const MAX_COMMENT_CHARS: usize = 200;

/// Outcome of an accepted vote.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub record: VoteRecord,
    /// The full ledger after the append, so callers can tally without
    /// reading the store again.
    pub records: Vec<VoteRecord>,
}

impl Receipt {
    pub fn weight(&self) -> f64 {
        self.record.weight
    }

    pub fn message(&self) -> String {
        format!("Vote recorded! Sentiment weight: {:.2}", self.record.weight)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub records: usize,
    pub broken_at: Option<ChainBreak>,
    /// Set when the stored ledger could not be parsed at all.
    pub unreadable: Option<String>,
}

impl AuditReport {
    pub fn is_valid(&self) -> bool {
        self.broken_at.is_none() && self.unreadable.is_none()
    }

    pub fn reason(&self) -> Option<String> {
        match (&self.unreadable, &self.broken_at) {
            (Some(cause), _) => Some(format!("ledger is unreadable: {}", cause)),
            (None, Some(b)) => Some(b.to_string()),
            (None, None) => None,
        }
    }
}

pub struct VotingLedger<S> {
    store: S,
    scorer: SentimentScorer,
    parties: PartySet,
    // Held across load, duplicate check and persist in `submit`.
    write_lock: Mutex<()>,
}

impl<S: LedgerStore> VotingLedger<S> {
    pub fn new(store: S, parties: PartySet) -> Self {
        Self::with_scorer(store, parties, SentimentScorer::default())
    }

    pub fn with_scorer(store: S, parties: PartySet, scorer: SentimentScorer) -> Self {
        VotingLedger {
            store,
            scorer,
            parties,
            write_lock: Mutex::new(()),
        }
    }

    pub fn parties(&self) -> &PartySet {
        &self.parties
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates and records a vote.
    ///
    /// Checks run in a fixed order and the first failure is returned.
    /// A rejected vote leaves the store untouched.
    pub fn submit(&self, submission: &VoteSubmission) -> Result<Receipt> {
        let vote = submission.trimmed();
        if let Err(e) = self.validate(&vote) {
            info!("Rejected vote from {:?}: {}", vote.voter_id, e);
            return Err(e);
        }

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut records = self.store.load()?;
        if records.iter().any(|r| r.voter_id == vote.voter_id) {
            info!("Rejected duplicate vote from {}", vote.voter_id);
            return Err(LedgerError::DuplicateVoter(vote.voter_id));
        }

        let sentiment = self.scorer.score(&vote.comment);
        let last = records.last();
        let prev_hash = last.map(|r| r.hash.clone()).unwrap_or_default();
        let now = Utc::now();
        let timestamp = last.map_or(now, |r| r.timestamp.max(now));

        let hash = chain::digest(
            &HashInput {
                voter_id: &vote.voter_id,
                voter_name: &vote.voter_name,
                party: &vote.party,
                comment: &vote.comment,
                sentiment: sentiment.polarity,
                weight: sentiment.weight,
                timestamp: &timestamp,
            },
            &prev_hash,
        );

        let record = VoteRecord {
            voter_id: vote.voter_id,
            voter_name: vote.voter_name,
            party: vote.party,
            comment: vote.comment,
            sentiment: sentiment.polarity,
            weight: sentiment.weight,
            timestamp,
            prev_hash,
            hash,
        };
        records.push(record.clone());
        self.store.replace_all(&records)?;

        info!(
            "Recorded vote #{} voter={} party={} weight={:.2}",
            records.len(),
            record.voter_id,
            record.party,
            record.weight
        );
        Ok(Receipt { record, records })
    }

    fn validate(&self, vote: &VoteSubmission) -> Result<()> {
        let id_len = vote.voter_id.chars().count();
        if id_len == 0 || id_len > MAX_VOTER_ID_CHARS {
            return Err(LedgerError::InvalidVoterId);
        }
        let name_len = vote.voter_name.chars().count();
        if name_len == 0 || name_len > MAX_VOTER_NAME_CHARS {
            return Err(LedgerError::InvalidVoterName);
        }
        if !self.parties.contains(&vote.party) {
            return Err(LedgerError::InvalidParty(vote.party.clone()));
        }
        if vote.comment.chars().count() > MAX_COMMENT_CHARS {
            return Err(LedgerError::CommentTooLong);
        }
        Ok(())
    }

    pub fn records(&self) -> Result<Vec<VoteRecord>> {
        self.store.load()
    }

    pub fn results(&self) -> Result<ResultsReport> {
        Ok(results::report(&self.parties, &self.store.load()?))
    }

    pub fn verify(&self) -> Result<bool> {
        self.store.verify()
    }

    pub fn audit(&self) -> Result<AuditReport> {
        Ok(match self.store.load_strict()? {
            StoredLedger::Records(records) => AuditReport {
                records: records.len(),
                broken_at: chain::verify_chain(&records).err(),
                unreadable: None,
            },
            StoredLedger::Unreadable(cause) => {
                warn!("Audit found an unreadable ledger: {}", cause);
                AuditReport {
                    records: 0,
                    broken_at: None,
                    unreadable: Some(cause),
                }
            }
        })
    }
}
