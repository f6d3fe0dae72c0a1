//! `rollsync run` — config-driven weekly reconciliation.

use std::path::{Path, PathBuf};

use rollsync_recon::engine::{load_members, load_payments, load_targets, run};
use rollsync_recon::model::{PaymentRefresh, ReconInput, ReconResult};
use rollsync_recon::SyncConfig;

use crate::exit_codes::{EXIT_SYNC_ACTIONABLE, EXIT_SYNC_INVALID_CONFIG, EXIT_SYNC_RUNTIME};
use crate::CliError;

fn sync_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError {
        code,
        message: msg.into(),
        hint: None,
    }
}

fn read_config(path: &Path) -> Result<SyncConfig, CliError> {
    let config_str = std::fs::read_to_string(path)
        .map_err(|e| sync_err(EXIT_SYNC_RUNTIME, format!("cannot read config: {e}")))?;
    SyncConfig::from_toml(&config_str).map_err(|e| sync_err(EXIT_SYNC_INVALID_CONFIG, e.to_string()))
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    eprintln!("{}: ok ({})", config_path.display(), config.name);
    Ok(())
}

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let config = read_config(&config_path)?;

    // Resolve data files relative to the config file's directory
    let base_dir = config_path
        .parent()
        .unwrap_or_else(|| Path::new("."));

    let read = |file: &str| {
        let path = base_dir.join(file);
        std::fs::read_to_string(&path)
            .map_err(|e| sync_err(EXIT_SYNC_RUNTIME, format!("cannot read {}: {e}", path.display())))
    };

    let input = ReconInput {
        members: load_members(&read(&config.members.file)?, &config.members)
            .map_err(|e| sync_err(EXIT_SYNC_RUNTIME, e.to_string()))?,
        payments: load_payments(&read(&config.payments.file)?, &config.payments)
            .map_err(|e| sync_err(EXIT_SYNC_RUNTIME, e.to_string()))?,
        targets: load_targets(&read(&config.targets.file)?, &config.targets)
            .map_err(|e| sync_err(EXIT_SYNC_RUNTIME, e.to_string()))?,
    };

    let result = run(&config, &input).map_err(|e| sync_err(EXIT_SYNC_RUNTIME, e.to_string()))?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| sync_err(EXIT_SYNC_RUNTIME, format!("JSON serialization error: {e}")))?;

    // --output wins over the config's [output] json path
    let json_path = output_file.or_else(|| config.output.json.as_ref().map(|p| base_dir.join(p)));
    if let Some(ref path) = json_path {
        std::fs::write(path, &json_str)
            .map_err(|e| sync_err(EXIT_SYNC_RUNTIME, format!("cannot write output: {e}")))?;
        if !quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if let Some(ref updates_csv) = config.output.updates_csv {
        let path = base_dir.join(updates_csv);
        write_updates_csv(&result.buckets.needs_update, &path)?;
        if !quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if json_output {
        println!("{json_str}");
    }

    if !quiet {
        print_summary(&result);
    }

    let pending = result.summary.action_items();
    if pending > 0 {
        return Err(sync_err(
            EXIT_SYNC_ACTIONABLE,
            format!("{pending} action item(s) pending"),
        ));
    }

    Ok(())
}

/// Human summary to stderr, one line for the cron log.
fn print_summary(result: &ReconResult) {
    let s = &result.summary;
    eprintln!(
        "{}: {} members — {} matched, {} need payment refresh, {} new, {} cancelled, {} unmatched non-paying",
        result.meta.config_name,
        s.total_members,
        s.matched,
        s.needs_update,
        s.new_users,
        s.cancelled,
        s.no_match,
    );
}

// ---------------------------------------------------------------------------
// Updates work queue CSV
// ---------------------------------------------------------------------------

/// Fixed 5-column contract; the downstream CRM updater depends on the
/// header order. Always emits the header, even with zero rows.
#[derive(Debug, serde::Serialize)]
struct UpdateRow<'a> {
    target_id: &'a str,
    external_id: &'a str,
    email: &'a str,
    payment_date: String,
    amount_minor: i64,
}

fn write_updates_csv(refreshes: &[PaymentRefresh], path: &Path) -> Result<(), CliError> {
    let file = std::fs::File::create(path)
        .map_err(|e| sync_err(EXIT_SYNC_RUNTIME, format!("cannot create {}: {e}", path.display())))?;

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(std::io::BufWriter::new(file));

    if refreshes.is_empty() {
        writer
            .write_record(["target_id", "external_id", "email", "payment_date", "amount_minor"])
            .map_err(|e| sync_err(EXIT_SYNC_RUNTIME, format!("CSV write error: {e}")))?;
    }

    for refresh in refreshes {
        let row = UpdateRow {
            target_id: &refresh.target_id,
            external_id: &refresh.member.external_id,
            email: &refresh.member.email,
            payment_date: refresh
                .payment
                .charge_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            amount_minor: refresh.payment.amount_cents,
        };
        writer
            .serialize(row)
            .map_err(|e| sync_err(EXIT_SYNC_RUNTIME, format!("CSV write error: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| sync_err(EXIT_SYNC_RUNTIME, format!("CSV flush error: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
name = "Weekly sync"

[members]
file = "members.csv"
[members.columns]
external_id    = "member_id"
email          = "email"
status         = "status"
segment        = "segment"
lifetime_value = "total_spend"

[payments]
file = "payments.csv"
[payments.columns]
member_email       = "email"
member_external_id = "member_id"
amount             = "amount"
charge_date        = "charge_date"

[targets]
file = "crm.csv"
[targets.columns]
target_id         = "record_id"
external_id       = "member_id"
contact_email     = "email"
status            = "membership_status"
last_payment_date = "last_payment"

[output]
updates_csv = "updates.csv"
"#;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn stale_dataset(dir: &Path) -> PathBuf {
        write_file(
            dir,
            "members.csv",
            "member_id,email,status,segment,total_spend\n7,b@y.com,active,core,100.00\n",
        );
        write_file(
            dir,
            "payments.csv",
            "email,member_id,amount,charge_date\nb@y.com,7,20.00,2024-02-01\n",
        );
        write_file(
            dir,
            "crm.csv",
            "record_id,member_id,email,membership_status,last_payment\nrec_7,7,b@y.com,active,2024-01-01\n",
        );
        write_file(dir, "weekly.sync.toml", CONFIG)
    }

    #[test]
    fn run_reports_action_items_and_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = stale_dataset(dir.path());
        let report_path = dir.path().join("report.json");

        let err = cmd_run(config_path, false, Some(report_path.clone()), true).unwrap_err();
        assert_eq!(err.code, EXIT_SYNC_ACTIONABLE);
        assert!(err.message.contains("1 action item"));

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(report["summary"]["needs_update"], 1);

        let updates = std::fs::read_to_string(dir.path().join("updates.csv")).unwrap();
        let mut lines = updates.lines();
        assert_eq!(
            lines.next().unwrap(),
            "target_id,external_id,email,payment_date,amount_minor"
        );
        assert_eq!(lines.next().unwrap(), "rec_7,7,b@y.com,2024-02-01,2000");
    }

    #[test]
    fn run_exits_clean_when_fully_synced() {
        let dir = tempfile::tempdir().unwrap();
        stale_dataset(dir.path());
        // Recorded date already matches the latest payment.
        write_file(
            dir.path(),
            "crm.csv",
            "record_id,member_id,email,membership_status,last_payment\nrec_7,7,b@y.com,active,2024-02-01\n",
        );
        let config_path = dir.path().join("weekly.sync.toml");

        cmd_run(config_path, false, None, true).unwrap();

        // Header-only work queue.
        let updates = std::fs::read_to_string(dir.path().join("updates.csv")).unwrap();
        assert_eq!(
            updates.trim_end(),
            "target_id,external_id,email,payment_date,amount_minor"
        );
    }

    #[test]
    fn invalid_config_maps_to_config_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_file(dir.path(), "bad.sync.toml", "name = \"broken\"\n");

        let err = cmd_run(config_path, false, None, true).unwrap_err();
        assert_eq!(err.code, EXIT_SYNC_INVALID_CONFIG);
    }

    #[test]
    fn missing_data_file_maps_to_runtime_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = stale_dataset(dir.path());
        std::fs::remove_file(dir.path().join("payments.csv")).unwrap();

        let err = cmd_run(config_path, false, None, true).unwrap_err();
        assert_eq!(err.code, EXIT_SYNC_RUNTIME);
        assert!(err.message.contains("payments.csv"));
    }

    #[test]
    fn validate_accepts_good_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = stale_dataset(dir.path());
        cmd_validate(config_path).unwrap();
    }
}
