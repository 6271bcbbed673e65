//! Subscriber entity.

use chrono::{DateTime, Utc};
use newsletter_sql::Record;
use serde::{Deserialize, Serialize};

use crate::row::{FromRow, Row, RowResult};

/// One row of the subscribers table.
///
/// Also the JSON body of the subscribe and unsubscribe endpoints; missing
/// properties take their default values.
#[derive(Debug, Clone, Default, PartialEq, Record, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Subscriber {
    #[sql(column = "id")]
    pub id: i64,
    #[sql(column = "email")]
    pub email: String,
    #[sql(column = "name")]
    pub name: String,
    #[sql(column = "isSubscribed")]
    pub is_subscribed: bool,
    #[sql(column = "subscribedDate")]
    pub subscribed_date: Option<DateTime<Utc>>,
    #[sql(column = "unsubscribedDate")]
    pub unsubscribed_date: Option<DateTime<Utc>>,
    #[sql(column = "delFlag")]
    pub del_flag: Option<bool>,
}

impl Subscriber {
    /// A fresh subscriber with only contact details set.
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

impl FromRow for Subscriber {
    fn from_row(row: &Row) -> RowResult<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            is_subscribed: row.try_get("isSubscribed")?,
            subscribed_date: row.try_get("subscribedDate")?,
            unsubscribed_date: row.try_get("unsubscribedDate")?,
            del_flag: row.try_get("delFlag")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use newsletter_sql::{SqlValue, active_fields};

    #[test]
    fn catalog_matches_table_columns() {
        let columns: Vec<_> = active_fields::<Subscriber>().map(|f| f.column()).collect();
        assert_eq!(
            columns,
            [
                "id",
                "email",
                "name",
                "isSubscribed",
                "subscribedDate",
                "unsubscribedDate",
                "delFlag"
            ]
        );
    }

    #[test]
    fn json_uses_camel_case_and_defaults() {
        let s: Subscriber =
            serde_json::from_str(r#"{"email":"a@b.co","name":"A","isSubscribed":true}"#).unwrap();
        assert_eq!(s.email, "a@b.co");
        assert!(s.is_subscribed);
        assert_eq!(s.id, 0);
        assert_eq!(s.subscribed_date, None);

        let json = serde_json::to_value(Subscriber::new("a@b.co", "A")).unwrap();
        assert_eq!(json["isSubscribed"], false);
        assert!(json["delFlag"].is_null());
    }

    #[test]
    fn decodes_from_row() {
        let date = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let row = Row::from_pairs([
            ("Id", SqlValue::Int(3)),
            ("Email", SqlValue::Text("a@b.co".into())),
            ("Name", SqlValue::Text("A".into())),
            ("IsSubscribed", SqlValue::Bool(true)),
            ("SubscribedDate", SqlValue::Timestamp(date.fixed_offset())),
            ("UnsubscribedDate", SqlValue::Null),
            ("Delflag", SqlValue::Bool(false)),
        ]);
        let s = Subscriber::from_row(&row).unwrap();
        assert_eq!(s.id, 3);
        assert_eq!(s.subscribed_date, Some(date));
        assert_eq!(s.unsubscribed_date, None);
        assert_eq!(s.del_flag, Some(false));
    }
}
