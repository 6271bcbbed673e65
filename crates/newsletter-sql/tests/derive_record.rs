#![cfg(feature = "derive")]

use chrono::{DateTime, TimeZone, Utc};
use newsletter_sql::{
    FieldSet, Record, TypeCategory, active_fields, column_names, column_names_including,
    column_values, describe, registered_records, update_assignments,
};

#[derive(Record)]
struct Subscriber {
    #[sql(column = "id")]
    id: i64,
    #[sql(column = "email")]
    email: String,
    #[sql(column = "name")]
    name: String,
    #[sql(column = "isSubscribed")]
    is_subscribed: bool,
    #[sql(column = "subscribedDate")]
    subscribed_date: Option<DateTime<Utc>>,
    #[sql(column = "-")]
    #[allow(dead_code)]
    password: String,
    #[sql(skip)]
    #[allow(dead_code)]
    cached: Vec<u8>,
    #[allow(dead_code)]
    untagged: String,
}

#[derive(Record)]
struct Keywords {
    #[sql(column = "type")]
    r#type: String,
    #[sql(column = "Amount")]
    r#amount: Option<f64>,
}

#[derive(Record)]
struct NothingMapped {
    #[allow(dead_code)]
    note: String,
}

fn subscriber() -> Subscriber {
    Subscriber {
        id: 7,
        email: "ann@example.com".into(),
        name: "Ann O'Neil".into(),
        is_subscribed: true,
        subscribed_date: Some(Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap()),
        password: "secret".into(),
        cached: vec![1, 2, 3],
        untagged: "x".into(),
    }
}

#[test]
fn catalog_lists_every_field_in_order() {
    let names: Vec<_> = describe::<Subscriber>().map(|d| d.field_name).collect();
    assert_eq!(
        names,
        [
            "id",
            "email",
            "name",
            "is_subscribed",
            "subscribed_date",
            "password",
            "cached",
            "untagged"
        ]
    );

    let active: Vec<_> = active_fields::<Subscriber>().map(|f| f.column()).collect();
    assert_eq!(
        active,
        ["id", "email", "name", "isSubscribed", "subscribedDate"]
    );
}

#[test]
fn categories_come_from_declared_types() {
    let categories: Vec<_> = active_fields::<Subscriber>()
        .map(|f| f.category().clone())
        .collect();
    assert_eq!(
        categories,
        [
            TypeCategory::Numeric,
            TypeCategory::String,
            TypeCategory::String,
            TypeCategory::Boolean,
            TypeCategory::pointer_of(TypeCategory::Timestamp),
        ]
    );
}

#[test]
fn insert_fragments() {
    let skip = FieldSet::of(["id"]);
    assert_eq!(
        column_names::<Subscriber>(&skip, "").to_sql(),
        "[email],[name],[isSubscribed],[subscribedDate]"
    );
    assert_eq!(
        column_values(&subscriber(), &skip).unwrap().to_sql(),
        "N'ann@example.com',N'Ann O''Neil',N'true',N'2024-05-01T08:30:00Z'"
    );
}

#[test]
fn password_never_leaks() {
    let include = FieldSet::of(["password", "email"]);
    assert_eq!(
        column_names_including::<Subscriber>(&include, "s").to_sql(),
        "s.[email]"
    );
    let all = column_values(&subscriber(), &FieldSet::new()).unwrap().to_sql();
    assert!(!all.contains("secret"));
}

#[test]
fn update_with_null_timestamp() {
    let s = Subscriber {
        subscribed_date: None,
        ..subscriber()
    };
    let skip = FieldSet::of(["id", "email", "name"]);
    assert_eq!(
        update_assignments(&s, &skip).unwrap().to_sql(),
        "[isSubscribed] = N'true',[subscribedDate] = null"
    );
}

#[test]
fn raw_identifiers_are_unprefixed() {
    let names: Vec<_> = describe::<Keywords>().map(|d| d.field_name).collect();
    assert_eq!(names, ["type", "amount"]);

    let k = Keywords {
        r#type: "weekly".into(),
        r#amount: Some(2.5),
    };
    assert_eq!(
        update_assignments(&k, &FieldSet::new()).unwrap().to_sql(),
        "[type] = N'weekly',[Amount] = 2.5"
    );
}

#[test]
fn record_without_mapped_fields_yields_nothing() {
    assert_eq!(active_fields::<NothingMapped>().count(), 0);
    assert_eq!(column_names::<NothingMapped>(&FieldSet::new(), "").to_sql(), "");
    let n = NothingMapped { note: "n".into() };
    assert!(column_values(&n, &FieldSet::new()).unwrap().is_empty());
}

#[test]
fn derived_records_are_registered() {
    let records = registered_records();
    let names: Vec<_> = records.iter().map(|(name, _)| *name).collect();
    assert!(names.contains(&"Subscriber"));
    assert!(names.contains(&"Keywords"));
    assert!(names.windows(2).all(|w| w[0] <= w[1]));

    let (_, descriptors) = records
        .iter()
        .find(|(name, _)| *name == "Subscriber")
        .unwrap();
    assert_eq!(descriptors.len(), 8);
    assert!(descriptors.iter().filter(|d| d.excluded).count() == 3);
    assert_eq!(Subscriber::record_name(), "Subscriber");
}
