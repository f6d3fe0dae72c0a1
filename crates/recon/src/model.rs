use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One platform account from the membership export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceMember {
    pub external_id: String,
    pub email: String,
    pub status: String,
    pub segment: String,
    /// Lifetime spend in minor units. Never negative; unparseable input
    /// loads as 0.
    pub lifetime_value_cents: i64,
}

/// One transaction from the payment export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcePayment {
    pub member_email: String,
    pub member_external_id: String,
    /// Minor units. Non-positive amounts never qualify as activity.
    pub amount_cents: i64,
    /// `None` when the export had no parseable date. Ranks below every
    /// dated payment but the payment itself stays eligible.
    pub charge_date: Option<NaiveDate>,
}

/// One relationship record from the CRM export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetRecord {
    pub target_id: String,
    pub external_id: Option<String>,
    pub contact_email: Option<String>,
    /// Prior recorded status, surfaced in cancellation entries only.
    pub status: Option<String>,
    pub last_payment_date: Option<NaiveDate>,
}

/// Pre-loaded snapshots of both systems.
#[derive(Debug)]
pub struct ReconInput {
    pub members: Vec<SourceMember>,
    pub payments: Vec<SourcePayment>,
    pub targets: Vec<TargetRecord>,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// A source member resolved to exactly one CRM record.
#[derive(Debug, Clone, Serialize)]
pub struct MemberMatch {
    pub member: SourceMember,
    pub target: TargetRecord,
}

/// A matched member whose newest qualifying payment postdates the CRM's
/// recorded payment date.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRefresh {
    pub member: SourceMember,
    pub target_id: String,
    pub recorded_date: Option<NaiveDate>,
    pub payment: SourcePayment,
}

/// A matched member whose source status or segment indicates churn.
#[derive(Debug, Clone, Serialize)]
pub struct Cancellation {
    pub member: SourceMember,
    pub target_id: String,
    pub previous_status: Option<String>,
}

/// The five result buckets. Every bucket preserves member input order.
/// `needs_update` and `cancelled` only ever hold matched members; each
/// member lands in exactly one of `matched`, `new_users`, `no_match`.
#[derive(Debug, Clone, Serialize)]
pub struct Buckets {
    pub matched: Vec<MemberMatch>,
    pub needs_update: Vec<PaymentRefresh>,
    pub new_users: Vec<SourceMember>,
    pub cancelled: Vec<Cancellation>,
    pub no_match: Vec<SourceMember>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconSummary {
    pub total_members: usize,
    pub matched: usize,
    pub needs_update: usize,
    pub new_users: usize,
    pub cancelled: usize,
    pub no_match: usize,
}

impl ReconSummary {
    /// Entries the weekly workflow has to act on.
    pub fn action_items(&self) -> usize {
        self.needs_update + self.new_users + self.cancelled
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub buckets: Buckets,
}
