use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Amounts offered on the dues page, in KRW.
pub const DUES_AMOUNT_OPTIONS: [u32; 5] = [50_000, 100_000, 150_000, 200_000, 300_000];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuesPledge {
    pub id: i64,
    pub member_id: i64,
    pub region: Region,
    pub amount: u32,
    pub plan: DuesPlan,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "재경")]
    Seoul,
    #[serde(rename = "군산")]
    Gunsan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DuesPlan {
    #[serde(rename = "일회성")]
    OneTime,
    #[serde(rename = "정기결제")]
    Monthly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuesRequest {
    pub region: Region,
    pub amount: u32,
    pub plan: DuesPlan,
}

impl DuesRequest {
    pub fn validate_amount(&self) -> Result<()> {
        if DUES_AMOUNT_OPTIONS.contains(&self.amount) {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Invalid dues amount: {}. Expected one of {:?}",
                self.amount, DUES_AMOUNT_OPTIONS
            )))
        }
    }
}

/// Label shown next to an amount, e.g. `5만원`.
pub fn amount_label(amount: u32) -> String {
    format!("{}만원", amount / 10_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_validation() {
        let request = DuesRequest { region: Region::Gunsan, amount: 150_000, plan: DuesPlan::Monthly };
        assert!(request.validate_amount().is_ok());

        let request = DuesRequest { region: Region::Gunsan, amount: 12_345, plan: DuesPlan::OneTime };
        assert!(request.validate_amount().is_err());
    }

    #[test]
    fn test_amount_label() {
        assert_eq!(amount_label(50_000), "5만원");
        assert_eq!(amount_label(300_000), "30만원");
    }
}
