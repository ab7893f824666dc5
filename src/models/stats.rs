use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub download_count: i64,
}

/// Back-office dashboard figures. Earnings and withdrawals are placeholders.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_earned: f64,
    pub pending_withdrawals: i64,
    pub pending_amount: f64,
    pub total_downloads: i64,
}

#[derive(Debug, Serialize)]
pub struct WithdrawalsResponse {
    /// Always empty: withdrawals are not processed yet
    pub withdrawals: Vec<serde_json::Value>,
    pub can_approve: bool,
}
