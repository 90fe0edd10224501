/// resolve an order item's bill items against a monthly schedule
use billing_schedule_rs::{
    BillingItemData, BillingRatio, BillingSchedule, BillingSchedulePeriod, BillingScheduleService,
    EngineConfig, Fraction, InMemoryScheduleStore, Money, Order, OrderItem, OrderItemData,
    OrderType, ProductInfo, SafeTimeProvider, TimeSource, Uuid,
};
use chrono::{Duration, TimeZone, Utc};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    println!("=== resolve order item billing ===\n");

    let schedule_id = Uuid::new_v4();
    let mut store = InMemoryScheduleStore::new().with_schedule(BillingSchedule {
        id: schedule_id,
        name: "2025 monthly".to_string(),
        is_archived: false,
    });

    // january to june, each billed two weeks before it starts
    let mut periods = Vec::new();
    for month in 1..=6u32 {
        let start = Utc.with_ymd_and_hms(2025, month, 1, 0, 0, 0).unwrap();
        let next = if month == 12 {
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
        } else {
            Utc.with_ymd_and_hms(2025, month + 1, 1, 0, 0, 0).unwrap()
        };
        let period = BillingSchedulePeriod {
            id: Uuid::new_v4(),
            billing_schedule_id: schedule_id,
            name: format!("2025-{:02}", month),
            start_date: start,
            end_date: next - Duration::seconds(1),
            billing_date: start - Duration::days(14),
        };

        // four weekly-ish slices charging 4/4 down to 1/4
        let slices = [(1, 7, 4), (8, 14, 3), (15, 21, 2), (22, 0, 1)];
        for (from, to, numerator) in slices {
            let slice_start = Utc.with_ymd_and_hms(2025, month, from, 0, 0, 0).unwrap();
            let slice_end = if to == 0 {
                period.end_date
            } else {
                Utc.with_ymd_and_hms(2025, month, to, 23, 59, 59).unwrap()
            };
            store = store.with_ratio(BillingRatio {
                id: Uuid::new_v4(),
                billing_schedule_period_id: period.id,
                start_date: slice_start,
                end_date: slice_end,
                fraction: Fraction::new(numerator, 4).ok_or("zero denominator")?,
            });
        }

        store = store.with_period(period.clone());
        periods.push(period);
    }

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
    ));
    println!("now: {}", time.now().format("%Y-%m-%d"));

    let product_id = Uuid::new_v4();
    let mut data = OrderItemData {
        product_info: ProductInfo {
            product_id,
            billing_schedule_id: schedule_id,
            disable_pro_rating: false,
            available_from: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            available_until: Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap(),
        },
        order: Order {
            order_id: Uuid::new_v4(),
            order_type: OrderType::New,
        },
        order_item: OrderItem {
            product_id,
            start_date: Some(Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap()),
            effective_date: None,
        },
        // march is pro-rated, april is billed on mar 18 and still upcoming
        bill_items: vec![
            BillingItemData::for_period(periods[2].id, false),
            BillingItemData::for_period(periods[3].id, true),
        ],
    };
    for item in data.bill_items.iter_mut() {
        item.price = Some(Money::from_major(400));
    }

    let service = BillingScheduleService::from_store(&store, EngineConfig::default());
    let resolution = service.resolve_order_item_billing(&data, &time)?;

    let full_price = Money::from_major(400);
    if let (Some(item), Some(ratio)) = (&resolution.pro_rated_item, &resolution.pro_rated_ratio) {
        println!(
            "pro-rated period: {} at {} -> ${}",
            item.period.name,
            ratio.fraction,
            ratio.prorate(full_price)
        );
    }
    for item in &resolution.normal_items {
        println!("normal period: {} -> ${}", item.period.name, full_price);
    }
    if let Some(item) = &resolution.upcoming_item {
        println!(
            "upcoming billing: {} due {}",
            item.period.name,
            item.period.billing_date.format("%Y-%m-%d")
        );
    }

    // a withdrawal on the same day charges from the next slice
    let mut withdrawal = data.clone();
    withdrawal.order.order_type = OrderType::Withdrawal;
    let resolution = service.resolve_order_item_billing(&withdrawal, &time)?;
    if let Some(charge) = resolution.pro_rated_charge() {
        println!("\nwithdrawal pro-rated charge: ${}", charge);
    }

    // skipping april leaves a gap
    let mut gap = data.clone();
    gap.bill_items = vec![
        BillingItemData::for_period(periods[2].id, false),
        BillingItemData::for_period(periods[4].id, true),
    ];
    match service.resolve_order_item_billing(&gap, &time) {
        Ok(_) => println!("gap accepted"),
        Err(e) => println!("gap rejected: {}", e),
    }

    println!("\n{}", resolution.to_json_pretty()?);

    Ok(())
}
