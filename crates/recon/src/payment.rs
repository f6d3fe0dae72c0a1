use std::collections::HashMap;

use chrono::NaiveDate;

use crate::matcher::{canonical_email, canonical_id};
use crate::model::{SourceMember, SourcePayment};

/// Grouping index over the payment snapshot, built once per run so member
/// lookups never rescan the full payment list. Values are positions into
/// the payment slice. Only strictly-positive amounts are indexed: refunds
/// and zero-dollar entries never count as activity.
pub struct PaymentIndex {
    by_external_id: HashMap<String, Vec<usize>>,
    by_email: HashMap<String, Vec<usize>>,
}

pub fn build_payment_index(payments: &[SourcePayment]) -> PaymentIndex {
    let mut by_external_id: HashMap<String, Vec<usize>> = HashMap::new();
    let mut by_email: HashMap<String, Vec<usize>> = HashMap::new();

    for (i, payment) in payments.iter().enumerate() {
        if payment.amount_cents <= 0 {
            continue;
        }
        let id_key = canonical_id(&payment.member_external_id);
        if !id_key.is_empty() {
            by_external_id.entry(id_key).or_default().push(i);
        }
        let email_key = canonical_email(&payment.member_email);
        if !email_key.is_empty() {
            by_email.entry(email_key).or_default().push(i);
        }
    }

    PaymentIndex {
        by_external_id,
        by_email,
    }
}

/// Date rank for selection: undated payments sort below every dated one
/// but stay eligible when nothing else qualifies.
fn charge_rank(payment: &SourcePayment) -> NaiveDate {
    payment.charge_date.unwrap_or(NaiveDate::MIN)
}

/// The member's newest qualifying payment: maximum charge date over
/// payments reachable by external id or email. Ties keep the candidate
/// seen first (id bucket before email bucket, input order within each).
pub fn latest_qualifying<'a>(
    member: &SourceMember,
    payments: &'a [SourcePayment],
    index: &PaymentIndex,
) -> Option<&'a SourcePayment> {
    let id_key = canonical_id(&member.external_id);
    let email_key = canonical_email(&member.email);

    let buckets = [
        (!id_key.is_empty())
            .then(|| index.by_external_id.get(&id_key))
            .flatten(),
        (!email_key.is_empty())
            .then(|| index.by_email.get(&email_key))
            .flatten(),
    ];

    let mut best: Option<&'a SourcePayment> = None;
    for bucket in buckets.into_iter().flatten() {
        for &i in bucket {
            let candidate = &payments[i];
            let newer = match best {
                Some(current) => charge_rank(candidate) > charge_rank(current),
                None => true,
            };
            if newer {
                best = Some(candidate);
            }
        }
    }

    best
}

/// Whether the CRM's recorded payment date is stale against the member's
/// newest qualifying payment. Strictly-greater comparison with absent
/// dates ranked earliest, so equal dates never trigger and a re-run over
/// already-synced data produces no refresh entries.
pub fn needs_refresh(payment_date: Option<NaiveDate>, recorded: Option<NaiveDate>) -> bool {
    payment_date.unwrap_or(NaiveDate::MIN) > recorded.unwrap_or(NaiveDate::MIN)
}
