use crate::model::SourceMember;

const CANCELLED_STATUSES: [&str; 2] = ["cancelled", "churned"];
const CHURN_SEGMENT_MARKER: &str = "churned";

/// Whether the source snapshot says this member has churned.
///
/// Decided from source fields only; the CRM's prior status is reporting
/// material, never an input. The check is stateless, so a member flagged
/// last week is flagged again this week; deduplicating repeat
/// notifications is the downstream consumer's job.
pub fn is_cancelled(member: &SourceMember) -> bool {
    let status = member.status.trim().to_lowercase();
    if CANCELLED_STATUSES.contains(&status.as_str()) {
        return true;
    }
    member
        .segment
        .trim()
        .to_lowercase()
        .contains(CHURN_SEGMENT_MARKER)
}
