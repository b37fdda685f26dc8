//! Hash chaining of vote records.
//!
//! The canonical digest input is every record field in a fixed order, each
//! written as `<char count>:<value>;`. Length prefixes keep adjacent fields
//! from being re-split into a different record with the same bytes.

use std::fmt::{self, Write as _};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::models::VoteRecord;

/// Borrowed view of the fields a record's hash covers.
#[derive(Debug, Clone, Copy)]
pub struct HashInput<'a> {
    pub voter_id: &'a str,
    pub voter_name: &'a str,
    pub party: &'a str,
    pub comment: &'a str,
    pub sentiment: f64,
    pub weight: f64,
    pub timestamp: &'a DateTime<Utc>,
}

impl<'a> From<&'a VoteRecord> for HashInput<'a> {
    fn from(record: &'a VoteRecord) -> Self {
        HashInput {
            voter_id: &record.voter_id,
            voter_name: &record.voter_name,
            party: &record.party,
            comment: &record.comment,
            sentiment: record.sentiment,
            weight: record.weight,
            timestamp: &record.timestamp,
        }
    }
}

pub fn canonical_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn push_field(buf: &mut String, value: &str) {
    // Writing into a String cannot fail.
    let _ = write!(buf, "{}:{};", value.chars().count(), value);
}

fn canonical_form(input: &HashInput<'_>, prev_hash: &str) -> String {
    let mut buf = String::new();
    push_field(&mut buf, input.voter_id);
    push_field(&mut buf, input.voter_name);
    push_field(&mut buf, input.party);
    push_field(&mut buf, input.comment);
    // `{}` prints the shortest form that parses back to the same f64.
    push_field(&mut buf, &input.sentiment.to_string());
    push_field(&mut buf, &input.weight.to_string());
    push_field(&mut buf, &canonical_timestamp(input.timestamp));
    push_field(&mut buf, prev_hash);
    buf
}

/// SHA-256 of the record content chained to `prev_hash`, as 64 lowercase
/// hex characters.
pub fn digest(input: &HashInput<'_>, prev_hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_form(input, prev_hash).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Recomputes the hash a stored record should carry.
pub fn record_digest(record: &VoteRecord) -> String {
    digest(&HashInput::from(record), &record.prev_hash)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BreakKind {
    /// `prevHash` does not match the preceding record's `hash`.
    Link,
    /// The stored `hash` does not match the record's content.
    Content,
}

/// First position at which a chain fails verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainBreak {
    pub index: usize,
    pub kind: BreakKind,
}

impl fmt::Display for ChainBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            BreakKind::Link => write!(f, "record {} does not link to its predecessor", self.index),
            BreakKind::Content => write!(f, "record {} was modified after it was hashed", self.index),
        }
    }
}

pub fn verify_chain(records: &[VoteRecord]) -> Result<(), ChainBreak> {
    let mut expected_prev = "";
    for (index, record) in records.iter().enumerate() {
        if record.prev_hash != expected_prev {
            return Err(ChainBreak {
                index,
                kind: BreakKind::Link,
            });
        }
        if record.hash != record_digest(record) {
            return Err(ChainBreak {
                index,
                kind: BreakKind::Content,
            });
        }
        expected_prev = &record.hash;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn chained(entries: &[(&str, &str)]) -> Vec<VoteRecord> {
        let mut records: Vec<VoteRecord> = Vec::new();
        for (i, (id, party)) in entries.iter().enumerate() {
            let prev_hash = records.last().map(|r| r.hash.clone()).unwrap_or_default();
            let mut record = VoteRecord {
                voter_id: id.to_string(),
                voter_name: format!("Voter {}", i),
                party: party.to_string(),
                comment: String::new(),
                sentiment: 0.0,
                weight: 0.75,
                timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, i as u32).unwrap(),
                prev_hash,
                hash: String::new(),
            };
            record.hash = record_digest(&record);
            records.push(record);
        }
        records
    }

    #[test]
    fn digest_is_hex_sha256() {
        let records = chained(&[("TN001", "DMK")]);
        let hash = &records[0].hash;
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(record_digest(&records[0]), *hash);
    }

    #[test]
    fn shifted_field_boundaries_do_not_collide() {
        let records = chained(&[("TN1", "DMK")]);
        let mut a = records[0].clone();
        a.voter_id = "TN1".into();
        a.voter_name = "Ab".into();
        let mut b = a.clone();
        b.voter_id = "TN1A".into();
        b.voter_name = "b".into();
        assert_ne!(record_digest(&a), record_digest(&b));
    }

    #[test]
    fn every_field_feeds_the_digest() {
        let base = chained(&[("TN001", "DMK")]).remove(0);
        let mut variants = Vec::new();
        let mut r = base.clone();
        r.comment = "x".into();
        variants.push(r);
        let mut r = base.clone();
        r.weight = 0.76;
        variants.push(r);
        let mut r = base.clone();
        r.sentiment = 0.04;
        variants.push(r);
        let mut r = base.clone();
        r.timestamp = r.timestamp + chrono::Duration::microseconds(1);
        variants.push(r);
        let mut r = base.clone();
        r.prev_hash = "00".into();
        variants.push(r);
        for variant in variants {
            assert_ne!(record_digest(&variant), base.hash);
        }
    }

    #[test]
    fn sub_cent_weight_edit_is_detected() {
        let mut records = chained(&[("A", "DMK"), ("B", "BJP")]);
        records[0].weight = 0.754;
        assert_eq!(
            verify_chain(&records),
            Err(ChainBreak {
                index: 0,
                kind: BreakKind::Content
            })
        );

        let mut records = chained(&[("A", "DMK")]);
        records[0].sentiment = 0.001;
        assert!(verify_chain(&records).is_err());
    }

    #[test]
    fn digest_survives_json_reload() {
        let mut records = chained(&[("A", "DMK")]);
        records[0].weight = 0.97;
        records[0].sentiment = 0.88;
        records[0].hash = record_digest(&records[0]);
        let json = serde_json::to_string(&records).unwrap();
        let reloaded: Vec<VoteRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(verify_chain(&reloaded), Ok(()));
    }

    #[test]
    fn intact_chain_verifies() {
        let records = chained(&[("A", "DMK"), ("B", "BJP"), ("C", "INC")]);
        assert_eq!(verify_chain(&records), Ok(()));
        assert_eq!(verify_chain(&[]), Ok(()));
    }

    #[test]
    fn edited_comment_is_detected() {
        let mut records = chained(&[("A", "DMK"), ("B", "BJP"), ("C", "INC")]);
        records[1].comment = "rewritten".into();
        assert_eq!(
            verify_chain(&records),
            Err(ChainBreak {
                index: 1,
                kind: BreakKind::Content
            })
        );
    }

    #[test]
    fn rehashed_record_breaks_next_link() {
        let mut records = chained(&[("A", "DMK"), ("B", "BJP"), ("C", "INC")]);
        records[1].party = "INC".into();
        records[1].hash = record_digest(&records[1]);
        assert_eq!(
            verify_chain(&records),
            Err(ChainBreak {
                index: 2,
                kind: BreakKind::Link
            })
        );
    }

    #[test]
    fn first_record_must_have_empty_prev_hash() {
        let mut records = chained(&[("A", "DMK")]);
        records[0].prev_hash = "abc".into();
        records[0].hash = record_digest(&records[0]);
        assert_eq!(verify_chain(&records).unwrap_err().kind, BreakKind::Link);
    }
}
