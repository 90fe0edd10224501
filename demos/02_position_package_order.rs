/// position new student package orders on a package timeline with controlled time
use billing_schedule_rs::{
    find_order_at, position_new_student_package_order, select_current_student_package_order,
    SafeTimeProvider, StudentPackageOrder, TimeRange, TimeSource, Uuid,
};
use chrono::{Duration, TimeZone, Utc};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    println!("=== student package order positioning ===\n");

    let package_id = Uuid::new_v4();
    let order = |from: (u32, u32), to: (u32, u32)| StudentPackageOrder {
        id: Uuid::new_v4(),
        student_package_id: package_id,
        start_at: Utc.with_ymd_and_hms(2025, from.0, from.1, 0, 0, 0).unwrap(),
        end_at: Utc.with_ymd_and_hms(2025, to.0, to.1, 0, 0, 0).unwrap(),
        is_current_student_package: false,
    };

    let mut existing = vec![order((1, 1), (1, 31)), order((3, 1), (3, 31))];
    existing[1].is_current_student_package = true;

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 2, 15, 0, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();

    let candidates = [
        TimeRange::new(
            Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 4, 30, 0, 0, 0).unwrap(),
        )?,
        TimeRange::new(
            Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 20, 0, 0, 0).unwrap(),
        )?,
        TimeRange::new(
            Utc.with_ymd_and_hms(2025, 3, 31, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 4, 15, 0, 0, 0).unwrap(),
        )?,
    ];

    for step in 0..3 {
        println!("now: {}", time.now().format("%Y-%m-%d"));

        let current = existing.iter().find(|o| o.is_current_student_package);
        for candidate in &candidates {
            match position_new_student_package_order(&existing, current, *candidate, &time) {
                Ok(position) => println!("  {} -> {:?}", candidate, position),
                Err(e) => println!("  {} -> rejected: {}", candidate, e),
            }
        }

        if let Some(selected) = select_current_student_package_order(&existing, &time) {
            println!("  selected current order: {}", selected.range());
        }
        match find_order_at(&existing, time.now()) {
            Some(active) => println!("  order active now: {}", active.range()),
            None => println!("  no order active now"),
        }

        if step < 2 {
            controller.advance(Duration::days(30));
        }
        println!();
    }

    Ok(())
}
