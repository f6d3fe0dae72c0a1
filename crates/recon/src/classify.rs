use crate::matcher::{build_indices, match_member};
use crate::model::{Buckets, Cancellation, MemberMatch, PaymentRefresh, ReconInput};
use crate::payment::{build_payment_index, latest_qualifying, needs_refresh};
use crate::status::is_cancelled;

/// Partition the full member population into the result buckets.
///
/// Members are processed in input order and every bucket preserves it.
/// A matched member is appended to `matched`, then checked for
/// cancellation and payment staleness; an unmatched member splits on
/// lifetime value into `new_users` (paying, needs a manual account) or
/// `no_match` (non-paying, reported for visibility only).
pub fn classify(input: &ReconInput) -> Buckets {
    let indices = build_indices(&input.targets);
    let payment_index = build_payment_index(&input.payments);

    let mut buckets = Buckets {
        matched: Vec::new(),
        needs_update: Vec::new(),
        new_users: Vec::new(),
        cancelled: Vec::new(),
        no_match: Vec::new(),
    };

    for member in &input.members {
        let target_pos = match match_member(member, &indices) {
            Some(pos) => pos,
            None => {
                if member.lifetime_value_cents > 0 {
                    buckets.new_users.push(member.clone());
                } else {
                    buckets.no_match.push(member.clone());
                }
                continue;
            }
        };
        let target = &input.targets[target_pos];

        buckets.matched.push(MemberMatch {
            member: member.clone(),
            target: target.clone(),
        });

        if is_cancelled(member) {
            buckets.cancelled.push(Cancellation {
                member: member.clone(),
                target_id: target.target_id.clone(),
                previous_status: target.status.clone(),
            });
        }

        if let Some(payment) = latest_qualifying(member, &input.payments, &payment_index) {
            if needs_refresh(payment.charge_date, target.last_payment_date) {
                buckets.needs_update.push(PaymentRefresh {
                    member: member.clone(),
                    target_id: target.target_id.clone(),
                    recorded_date: target.last_payment_date,
                    payment: payment.clone(),
                });
            }
        }
    }

    buckets
}
