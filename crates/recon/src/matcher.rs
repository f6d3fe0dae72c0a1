use std::collections::HashMap;

use crate::model::{SourceMember, TargetRecord};

/// Canonical text form of an external id: surrounding whitespace stripped.
/// Ids are compared in this form on both sides, so numeric-looking and
/// textual ids with the same rendering are equal.
pub fn canonical_id(raw: &str) -> String {
    raw.trim().to_string()
}

/// Canonical email key: trimmed and lowercased.
pub fn canonical_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Lookup indices over the CRM snapshot. Values are positions into the
/// target slice the indices were built from.
#[derive(Debug)]
pub struct TargetIndices {
    by_external_id: HashMap<String, usize>,
    by_email: HashMap<String, usize>,
}

/// Build both indices in one pass over the targets.
///
/// A record may land in both indices, in one, or in neither (both fields
/// absent). Duplicate keys are last-write-wins: the later record in input
/// order overwrites the entry, matching the source system's silent
/// overwrite.
pub fn build_indices(targets: &[TargetRecord]) -> TargetIndices {
    let mut by_external_id = HashMap::new();
    let mut by_email = HashMap::new();

    for (i, target) in targets.iter().enumerate() {
        if let Some(ref id) = target.external_id {
            let key = canonical_id(id);
            if !key.is_empty() {
                by_external_id.insert(key, i);
            }
        }
        if let Some(ref email) = target.contact_email {
            let key = canonical_email(email);
            if !key.is_empty() {
                by_email.insert(key, i);
            }
        }
    }

    TargetIndices {
        by_external_id,
        by_email,
    }
}

/// Resolve a member to a target position.
///
/// Strict precedence: the id index is probed first, and a hit is final;
/// the email is not consulted even if it would point elsewhere. Only when
/// the id lookup misses (or the id is empty) does a non-empty email fall
/// back to the email index. No fuzzy matching, no multi-candidate scoring.
pub fn match_member(member: &SourceMember, indices: &TargetIndices) -> Option<usize> {
    let id_key = canonical_id(&member.external_id);
    if !id_key.is_empty() {
        if let Some(&pos) = indices.by_external_id.get(&id_key) {
            return Some(pos);
        }
    }

    let email_key = canonical_email(&member.email);
    if email_key.is_empty() {
        return None;
    }
    indices.by_email.get(&email_key).copied()
}
