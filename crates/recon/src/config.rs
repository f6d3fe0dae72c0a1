use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SyncConfig {
    pub name: String,
    pub members: MembersConfig,
    pub payments: PaymentsConfig,
    pub targets: TargetsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct MembersConfig {
    pub file: String,
    pub columns: MemberColumns,
}

/// Header names in the membership export for each canonical attribute.
/// This mapping is the normalization boundary: the engine never branches
/// on alternate column spellings.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberColumns {
    pub external_id: String,
    pub email: String,
    pub status: String,
    pub segment: String,
    pub lifetime_value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentsConfig {
    pub file: String,
    pub columns: PaymentColumns,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentColumns {
    pub member_email: String,
    pub member_external_id: String,
    pub amount: String,
    pub charge_date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetsConfig {
    pub file: String,
    pub columns: TargetColumns,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetColumns {
    pub target_id: String,
    pub external_id: String,
    pub contact_email: String,
    pub status: String,
    pub last_payment_date: String,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Write the full JSON report here.
    #[serde(default)]
    pub json: Option<String>,
    /// Write the payment-refresh work queue here as CSV.
    #[serde(default)]
    pub updates_csv: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl SyncConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: SyncConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (role, file) in [
            ("members", &self.members.file),
            ("payments", &self.payments.file),
            ("targets", &self.targets.file),
        ] {
            if file.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "[{role}] file must not be empty"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Weekly membership sync"

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
"#;

    #[test]
    fn parse_valid() {
        let config = SyncConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Weekly membership sync");
        assert_eq!(config.members.columns.lifetime_value, "total_spend");
        assert_eq!(config.targets.columns.last_payment_date, "last_payment");
        assert!(config.output.json.is_none());
        assert!(config.output.updates_csv.is_none());
    }

    #[test]
    fn parse_output_section() {
        let input = format!(
            r#"{VALID}
[output]
json = "report.json"
updates_csv = "updates.csv"
"#
        );
        let config = SyncConfig::from_toml(&input).unwrap();
        assert_eq!(config.output.json.as_deref(), Some("report.json"));
        assert_eq!(config.output.updates_csv.as_deref(), Some("updates.csv"));
    }

    #[test]
    fn reject_missing_role_section() {
        let input = r#"
name = "Bad"

[members]
file = "members.csv"
[members.columns]
external_id    = "member_id"
email          = "email"
status         = "status"
segment        = "segment"
lifetime_value = "total_spend"
"#;
        let err = SyncConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("config parse error"));
    }

    #[test]
    fn reject_empty_file_path() {
        let input = VALID.replace("file = \"crm.csv\"", "file = \"  \"");
        let err = SyncConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("[targets] file"));
    }
}
