use log::{info, warn};

use crate::error::Result;
use crate::ledger::VotingLedger;
use crate::models::VoteSubmission;
use crate::store::LedgerStore;

const SAMPLE_VOTES: [(&str, &str); 10] = [
    ("DMK", "Great vision for the state!"),
    ("AIADMK", "Stable leadership and good governance."),
    ("BJP", "Development and national integration."),
    ("INC", "Historic party with new ideas."),
    ("NTK", "Focus on environment and youth."),
    ("DMDK", "Fresh perspective in politics."),
    ("DMK", "Progressive policies."),
    ("AIADMK", "Strong welfare schemes."),
    ("BJP", "Bold reforms."),
    ("TVK", "Youthful energy and new leadership."),
];

/// Fills an empty ledger with demo votes `TN0001`..`TN0010`, skipping
/// parties that are not configured. Returns how many were recorded.
pub fn seed_sample_votes<S: LedgerStore>(ledger: &VotingLedger<S>) -> Result<usize> {
    if !ledger.records()?.is_empty() {
        info!("Ledger already has votes, skipping sample data");
        return Ok(0);
    }

    let mut seeded = 0;
    for (i, (party, comment)) in SAMPLE_VOTES.iter().enumerate() {
        if !ledger.parties().contains(party) {
            warn!("Sample party {} is not configured, skipping", party);
            continue;
        }
        let n = i + 1;
        let vote = VoteSubmission::new(format!("TN00{:02}", n), format!("User{}", n), *party, *comment);
        ledger.submit(&vote)?;
        seeded += 1;
    }
    info!("Seeded {} sample votes", seeded);
    Ok(seeded)
}
