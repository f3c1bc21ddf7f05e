use serde::{Deserialize, Serialize};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
};

use crate::expenses::repo_types::CategoryTotal;

/// POST /api/expenses body. Fields stay loose so validation can name the
/// failing field; owner fields sent by the client are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CreateExpenseRequest {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub date: Option<String>,
}

/// PUT /api/expenses/:id body; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateExpenseRequest {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub category_breakdown: Vec<CategoryTotal>,
    pub grand_total: f64,
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_date(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(dt);
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|d| d.midnight().assume_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn parses_browser_date_and_rfc3339() {
        assert_eq!(parse_date("2024-03-05"), Some(datetime!(2024-03-05 0:00 UTC)));
        assert_eq!(
            parse_date("2024-03-05T10:30:00Z"),
            Some(datetime!(2024-03-05 10:30 UTC))
        );
        assert_eq!(
            parse_date("2024-03-05T10:30:00+02:00"),
            Some(datetime!(2024-03-05 10:30 +2))
        );
        assert_eq!(parse_date("05/03/2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn create_request_ignores_owner_fields() {
        let req: CreateExpenseRequest = serde_json::from_value(serde_json::json!({
            "description": "Lunch",
            "amount": 12.5,
            "category": "Food",
            "ownerId": "00000000-0000-0000-0000-000000000000",
            "userId": "someone-else"
        }))
        .unwrap();
        assert_eq!(req.description.as_deref(), Some("Lunch"));
        assert_eq!(req.amount, Some(12.5));
        assert!(req.date.is_none());
    }

    #[test]
    fn summary_wire_shape() {
        let s = SummaryResponse {
            category_breakdown: vec![],
            grand_total: 0.0,
        };
        assert_eq!(
            serde_json::to_value(&s).unwrap(),
            serde_json::json!({"categoryBreakdown": [], "grandTotal": 0.0})
        );
    }
}
