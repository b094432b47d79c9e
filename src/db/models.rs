use serde::{Deserialize, Serialize};

/// Moderation state of a report. `Pending` is the only state audits act on;
/// the other two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Approved => "approved",
            ReportStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReportStatus::Pending),
            "approved" => Some(ReportStatus::Approved),
            "rejected" => Some(ReportStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub identity: String,
    pub nickname: String,
    pub avatar_url: String,
    pub role: String,
    pub points: i64,
    pub badges: Vec<String>,
    pub created_at: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub owner: String,
    pub status: ReportStatus,
    /// Caller-supplied fields (description, coordinates, media refs). Opaque
    /// to the lifecycle engine.
    pub payload: serde_json::Value,
    pub like_count: i64,
    pub awarded_points: i64,
    pub remark: Option<String>,
    pub auditor: Option<String>,
    pub audit_time: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub report_id: String,
    pub user_identity: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub id: String,
    pub user_identity: String,
    pub product_id: String,
    pub price: i64,
    pub created_at: String,
}
