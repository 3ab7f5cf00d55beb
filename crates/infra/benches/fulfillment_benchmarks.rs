use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{Duration, TimeZone, Utc};
use stockroom_core::ItemId;
use stockroom_fulfillment::{CustomerInfo, LineRequest, PackingSlip, SlipDraft};
use stockroom_infra::engine::{CreateSlip, FulfillmentEngine};
use stockroom_infra::store::{InMemoryStore, ItemStore};
use stockroom_inventory::{Item, NewItem};
use std::sync::Arc;

type Engine = FulfillmentEngine<Arc<InMemoryStore<Item>>, Arc<InMemoryStore<PackingSlip>>>;

fn engine_with_items(count: usize, quantity: u64) -> (Engine, Vec<ItemId>) {
    let items: Arc<InMemoryStore<Item>> = Arc::new(InMemoryStore::new());
    let slips: Arc<InMemoryStore<PackingSlip>> = Arc::new(InMemoryStore::new());
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let item = Item::create(
            ItemId::new(),
            NewItem {
                name: format!("Item {i}"),
                quantity,
                cost_price: 100,
                selling_price: 250,
                latest_price: 100,
                reorder_level: 0,
                purchase_history: Vec::new(),
                vendor: None,
                image_url: None,
            },
            Utc::now(),
        )
        .unwrap();
        ids.push(item.id_typed());
        items.save(item).unwrap();
    }
    (FulfillmentEngine::new(items, slips), ids)
}

fn draft(ids: &[ItemId]) -> SlipDraft {
    SlipDraft {
        customer: CustomerInfo {
            name: "Bench Customer".to_string(),
            ..CustomerInfo::default()
        },
        lines: ids
            .iter()
            .map(|&item_id| LineRequest { item_id, quantity: 2, price: 250 })
            .collect(),
        notes: None,
    }
}

/// Create followed by cancel. Each iteration uses a new day since cancelled
/// slip numbers are not reissued.
fn bench_create_cancel(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let mut group = c.benchmark_group("create_cancel");

    for line_count in [1usize, 10, 50].iter() {
        group.throughput(Throughput::Elements(*line_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(line_count),
            line_count,
            |b, &line_count| {
                let (engine, ids) = engine_with_items(line_count, 1_000_000);
                let start = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
                let mut day = 0;
                b.iter(|| {
                    day += 1;
                    rt.block_on(async {
                        let slip = engine
                            .create_slip(CreateSlip {
                                draft: draft(&ids),
                                occurred_at: start + Duration::days(day),
                            })
                            .await
                            .unwrap();
                        engine.cancel_slip(black_box(slip.id_typed())).await.unwrap();
                    })
                });
            },
        );
    }

    group.finish();
}

fn bench_preview(c: &mut Criterion) {
    let mut group = c.benchmark_group("preview");
    let (engine, ids) = engine_with_items(50, 10);
    let lines = draft(&ids).lines;

    group.bench_function("fifty_lines", |b| {
        b.iter(|| black_box(engine.preview(black_box(&lines)).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_create_cancel, bench_preview);
criterion_main!(benches);
