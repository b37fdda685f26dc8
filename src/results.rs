use serde::Serialize;

use crate::models::{PartySet, VoteRecord};

pub const NO_VOTES_MESSAGE: &str = "No votes yet.";

/// Weighted total per party, in party-set order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tally {
    totals: Vec<(String, f64)>,
}

impl Tally {
    pub fn get(&self, party: &str) -> Option<f64> {
        self.totals.iter().find(|(p, _)| p == party).map(|(_, t)| *t)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.totals.iter().map(|(p, t)| (p.as_str(), *t))
    }
}

/// Sums record weights per party. Every party starts at zero; records for
/// parties outside the set are ignored.
pub fn aggregate(parties: &PartySet, records: &[VoteRecord]) -> Tally {
    let mut totals: Vec<(String, f64)> = parties.iter().map(|p| (p.to_string(), 0.0)).collect();
    for record in records {
        if let Some((_, total)) = totals.iter_mut().find(|(p, _)| *p == record.party) {
            *total += record.weight;
        }
    }
    Tally { totals }
}

pub fn summarize(tally: &Tally) -> String {
    tally
        .iter()
        .map(|(party, total)| format!("{}: {:.2} weighted votes", party, total))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ResultsReport {
    NoVotes,
    Tallied {
        summary: String,
        totals: Tally,
        votes: usize,
    },
}

pub fn report(parties: &PartySet, records: &[VoteRecord]) -> ResultsReport {
    if records.is_empty() {
        return ResultsReport::NoVotes;
    }
    let totals = aggregate(parties, records);
    ResultsReport::Tallied {
        summary: summarize(&totals),
        totals,
        votes: records.len(),
    }
}
