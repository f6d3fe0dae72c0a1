use crate::model::{Buckets, ReconSummary};

/// Compute count statistics from the classified buckets.
pub fn compute_summary(buckets: &Buckets) -> ReconSummary {
    ReconSummary {
        total_members: buckets.matched.len() + buckets.new_users.len() + buckets.no_match.len(),
        matched: buckets.matched.len(),
        needs_update: buckets.needs_update.len(),
        new_users: buckets.new_users.len(),
        cancelled: buckets.cancelled.len(),
        no_match: buckets.no_match.len(),
    }
}
