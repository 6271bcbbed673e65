use std::sync::OnceLock;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use newsletter_sql::{
    Field, FieldSet, Record, SqlType, column_names, column_values, update_assignments, wrap,
};

/// A wide row: `n` text columns.
struct Wide {
    values: Vec<String>,
}

const COLUMNS: [&str; 16] = [
    "c0", "c1", "c2", "c3", "c4", "c5", "c6", "c7", "c8", "c9", "c10", "c11", "c12", "c13", "c14",
    "c15",
];

fn read(r: &Wide, i: usize) -> newsletter_sql::SqlValue {
    r.values[i].to_sql_value()
}

macro_rules! wide_fields {
    ($($i:literal),*) => {
        vec![$(
            Field::new(COLUMNS[$i], COLUMNS[$i], String::category(), |r: &Wide| read(r, $i)),
        )*]
    };
}

impl Record for Wide {
    fn fields() -> &'static [Field<Self>] {
        static FIELDS: OnceLock<Vec<Field<Wide>>> = OnceLock::new();
        FIELDS.get_or_init(|| wide_fields!(0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15))
    }
}

fn wide() -> Wide {
    Wide {
        values: (0..COLUMNS.len()).map(|i| format!("value '{i}', quoted")).collect(),
    }
}

fn bench_column_names(c: &mut Criterion) {
    let mut group = c.benchmark_group("fragment/column_names");

    for skip in [0, 4, 12] {
        let exclude: FieldSet = COLUMNS[..skip].iter().copied().collect();
        group.bench_with_input(BenchmarkId::from_parameter(skip), &exclude, |b, exclude| {
            b.iter(|| black_box(column_names::<Wide>(exclude, "t").to_sql()));
        });
    }

    group.finish();
}

fn bench_values_and_assignments(c: &mut Criterion) {
    let record = wide();
    let exclude = FieldSet::of(["c0"]);

    c.bench_function("fragment/column_values", |b| {
        b.iter(|| black_box(column_values(&record, &exclude)));
    });
    c.bench_function("fragment/update_assignments", |b| {
        b.iter(|| black_box(update_assignments(&record, &exclude)));
    });
}

fn bench_wrap(c: &mut Criterion) {
    let mut group = c.benchmark_group("transaction/wrap");

    for n in [1, 10, 100] {
        let statements: Vec<String> = (0..n)
            .map(|i| format!("DELETE FROM T WHERE Id = {i}"))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &statements, |b, s| {
            b.iter(|| black_box(wrap(s, None)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_column_names,
    bench_values_and_assignments,
    bench_wrap
);
criterion_main!(benches);
