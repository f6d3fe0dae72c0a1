use chrono::NaiveDate;

use crate::classify::classify;
use crate::config::{MembersConfig, PaymentsConfig, SyncConfig, TargetsConfig};
use crate::error::ReconError;
use crate::model::{
    ReconInput, ReconMeta, ReconResult, SourceMember, SourcePayment, TargetRecord,
};
use crate::summary::compute_summary;

/// Run reconciliation over pre-loaded snapshots. Returns classified
/// buckets + summary. Same inputs produce the same classification, in the
/// same order; only `meta.run_at` varies between runs.
pub fn run(config: &SyncConfig, input: &ReconInput) -> Result<ReconResult, ReconError> {
    let buckets = classify(input);
    let summary = compute_summary(&buckets);

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        buckets,
    })
}

// ---------------------------------------------------------------------------
// Normalization boundary: CSV → canonical records
// ---------------------------------------------------------------------------
//
// Field-level defects are never fatal here: unparseable dates load as
// `None`, unparseable money as 0, blank optional cells as absent. Input
// shape is fatal: an unreadable file, or a mapped column that does not
// exist in the export.

fn read_headers<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<Vec<String>, ReconError> {
    Ok(reader
        .headers()
        .map_err(|e| ReconError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect())
}

fn header_index(headers: &[String], role: &str, column: &str) -> Result<usize, ReconError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| ReconError::MissingColumn {
            role: role.into(),
            column: column.into(),
        })
}

/// Parse a `%Y-%m-%d` cell. Anything else is the absent-date sentinel.
fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Parse a decimal amount string to i64 minor units (cents).
/// Handles "1234.56", "1234.5", "1234", "-1234.56". Integer math only.
pub fn parse_money(s: &str) -> Result<i64, String> {
    let s = s.trim();
    let negative = s.starts_with('-');
    let s = s.trim_start_matches('-');
    let (units, cents) = if let Some(dot) = s.find('.') {
        let u: i64 = s[..dot].parse().map_err(|e| format!("bad units: {e}"))?;
        let frac = &s[dot + 1..];
        let c: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|e| format!("bad cents: {e}"))? * 10,
            2 => frac.parse().map_err(|e| format!("bad cents: {e}"))?,
            _ => return Err(format!("too many decimal places: {s}")),
        };
        (u, c)
    } else {
        (s.parse().map_err(|e| format!("bad amount: {e}"))?, 0)
    };
    let minor = units * 100 + cents;
    Ok(if negative { -minor } else { minor })
}

fn blank_as_absent(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Load the membership export, applying the config's column mapping.
pub fn load_members(csv_data: &str, config: &MembersConfig) -> Result<Vec<SourceMember>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());
    let headers = read_headers(&mut reader)?;
    let col = &config.columns;

    let external_id_idx = header_index(&headers, "members", &col.external_id)?;
    let email_idx = header_index(&headers, "members", &col.email)?;
    let status_idx = header_index(&headers, "members", &col.status)?;
    let segment_idx = header_index(&headers, "members", &col.segment)?;
    let lifetime_idx = header_index(&headers, "members", &col.lifetime_value)?;

    let mut members = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ReconError::Io(e.to_string()))?;
        members.push(SourceMember {
            external_id: record.get(external_id_idx).unwrap_or("").to_string(),
            email: record.get(email_idx).unwrap_or("").to_string(),
            status: record.get(status_idx).unwrap_or("").to_string(),
            segment: record.get(segment_idx).unwrap_or("").to_string(),
            // Lifetime value is non-negative by contract; defects load as 0.
            lifetime_value_cents: parse_money(record.get(lifetime_idx).unwrap_or(""))
                .unwrap_or(0)
                .max(0),
        });
    }

    Ok(members)
}

/// Load the payment export, applying the config's column mapping.
pub fn load_payments(
    csv_data: &str,
    config: &PaymentsConfig,
) -> Result<Vec<SourcePayment>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());
    let headers = read_headers(&mut reader)?;
    let col = &config.columns;

    let email_idx = header_index(&headers, "payments", &col.member_email)?;
    let external_id_idx = header_index(&headers, "payments", &col.member_external_id)?;
    let amount_idx = header_index(&headers, "payments", &col.amount)?;
    let charge_date_idx = header_index(&headers, "payments", &col.charge_date)?;

    let mut payments = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ReconError::Io(e.to_string()))?;
        payments.push(SourcePayment {
            member_email: record.get(email_idx).unwrap_or("").to_string(),
            member_external_id: record.get(external_id_idx).unwrap_or("").to_string(),
            // Unparseable amounts load as 0, which never qualifies.
            amount_cents: parse_money(record.get(amount_idx).unwrap_or("")).unwrap_or(0),
            charge_date: parse_date(record.get(charge_date_idx).unwrap_or("")),
        });
    }

    Ok(payments)
}

/// Load the CRM export, applying the config's column mapping.
pub fn load_targets(
    csv_data: &str,
    config: &TargetsConfig,
) -> Result<Vec<TargetRecord>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());
    let headers = read_headers(&mut reader)?;
    let col = &config.columns;

    let target_id_idx = header_index(&headers, "targets", &col.target_id)?;
    let external_id_idx = header_index(&headers, "targets", &col.external_id)?;
    let contact_email_idx = header_index(&headers, "targets", &col.contact_email)?;
    let status_idx = header_index(&headers, "targets", &col.status)?;
    let last_payment_idx = header_index(&headers, "targets", &col.last_payment_date)?;

    let mut targets = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ReconError::Io(e.to_string()))?;
        targets.push(TargetRecord {
            target_id: record.get(target_id_idx).unwrap_or("").to_string(),
            external_id: blank_as_absent(record.get(external_id_idx).unwrap_or("")),
            contact_email: blank_as_absent(record.get(contact_email_idx).unwrap_or("")),
            status: blank_as_absent(record.get(status_idx).unwrap_or("")),
            last_payment_date: parse_date(record.get(last_payment_idx).unwrap_or("")),
        });
    }

    Ok(targets)
}
