use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tasknote_core::date::CalendarDate;
use tasknote_core::ledger::InstanceLedger;
use tasknote_core::materialization::{CalendarMaterializer, MaterializeOptions};
use tasknote_core::models::{DateRange, TaskRecord};
use tasknote_core::recurrence::{expand, RecurrenceRule};

fn anchor() -> CalendarDate {
    CalendarDate::from_ymd(2025, 1, 1).unwrap()
}

fn create_test_task(index: usize) -> TaskRecord {
    let rule = match index % 4 {
        0 => "FREQ=DAILY",
        1 => "FREQ=WEEKLY;BYDAY=MO,WE,FR",
        2 => "FREQ=MONTHLY;BYMONTHDAY=1,15",
        _ => "FREQ=WEEKLY;INTERVAL=2;BYDAY=SU",
    };
    TaskRecord {
        title: format!("Benchmark Task {}", index),
        recurrence_rule: Some(rule.to_string()),
        scheduled: Some("2025-01-01".to_string()),
        completed_instances: vec!["2025-01-01".to_string(), "2025-01-03".to_string()],
        ..Default::default()
    }
}

fn bench_rule_parsing(c: &mut Criterion) {
    c.bench_function("rule_parsing", |b| {
        b.iter(|| {
            RecurrenceRule::parse(
                black_box("DTSTART:20250101;FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE,FR;COUNT=50"),
                None,
            )
            .unwrap()
        })
    });
}

fn bench_expansion(c: &mut Criterion) {
    let rules = [
        ("daily", RecurrenceRule::parse("FREQ=DAILY", Some(anchor())).unwrap()),
        ("weekly_byday", RecurrenceRule::parse("FREQ=WEEKLY;BYDAY=MO,WE,FR", Some(anchor())).unwrap()),
        ("monthly", RecurrenceRule::parse("FREQ=MONTHLY;BYMONTHDAY=31", Some(anchor())).unwrap()),
    ];

    let mut group = c.benchmark_group("expansion");
    for (name, rule) in &rules {
        for days in [30i64, 365, 3650] {
            let end = anchor().saturating_add_days(days);
            group.bench_with_input(BenchmarkId::new(*name, days), &days, |b, _| {
                b.iter(|| expand(black_box(rule), black_box(anchor()), black_box(end)).unwrap())
            });
        }
    }
    group.finish();
}

fn bench_far_range(c: &mut Criterion) {
    let rule = RecurrenceRule::parse("FREQ=WEEKLY;BYDAY=SU", Some(anchor())).unwrap();
    let start = CalendarDate::from_ymd(2045, 1, 1).unwrap();
    let end = CalendarDate::from_ymd(2045, 1, 31).unwrap();
    c.bench_function("expansion_far_from_anchor", |b| {
        b.iter(|| expand(black_box(&rule), black_box(start), black_box(end)).unwrap())
    });
}

fn bench_next_pending(c: &mut Criterion) {
    let rule = RecurrenceRule::daily(anchor()).unwrap();
    let mut ledger = InstanceLedger::new();
    let mut day = anchor();
    for _ in 0..300 {
        ledger.mark_completed(day);
        day = day.succ();
    }
    c.bench_function("next_pending_after_resolved_run", |b| {
        b.iter(|| ledger.next_pending_on_or_after(black_box(&rule), black_box(anchor())))
    });
}

fn bench_materialization(c: &mut Criterion) {
    let tasks: Vec<TaskRecord> = (0..200).map(create_test_task).collect();
    let range = DateRange::new(anchor(), anchor().saturating_add_days(41)).unwrap();
    let options = MaterializeOptions::default();

    let mut group = c.benchmark_group("materialization");
    group.bench_function("uncached", |b| {
        let materializer = CalendarMaterializer::new();
        b.iter(|| materializer.materialize(black_box(&tasks), range, &options, anchor()))
    });
    group.bench_function("cached", |b| {
        let materializer = CalendarMaterializer::with_cache();
        b.iter(|| materializer.materialize(black_box(&tasks), range, &options, anchor()))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_rule_parsing,
    bench_expansion,
    bench_far_range,
    bench_next_pending,
    bench_materialization
);
criterion_main!(benches);
