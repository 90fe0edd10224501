use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use tracing::{debug, warn};

use crate::errors::{Result, ScheduleError};
use crate::package::StudentPackageOrder;
use crate::time_range::{Relation, TimeRange};
use crate::types::PackagePosition;

/// classify a new order range against the package's existing orders
///
/// `existing` must be sorted ascending by start. when no order is flagged current
/// the active order is picked with [`select_current_student_package_order`].
pub fn position_new_student_package_order(
    existing: &[StudentPackageOrder],
    current: Option<&StudentPackageOrder>,
    new_range: TimeRange,
    time_provider: &SafeTimeProvider,
) -> Result<PackagePosition> {
    if let Some(conflict) = existing.iter().find(|o| o.range().overlaps(&new_range)) {
        warn!(
            student_package_id = %conflict.student_package_id,
            existing_order_id = %conflict.id,
            existing_range = %conflict.range(),
            %new_range,
            "new student package order overlaps an existing order",
        );
        return Err(ScheduleError::OverlappingStudentPackageOrder {
            student_package_id: conflict.student_package_id,
            existing_order_id: conflict.id,
            existing_range: conflict.range(),
            new_range,
        });
    }

    if existing.is_empty() {
        debug!(%new_range, "no existing student package order, new order is current");
        return Ok(PackagePosition::Current);
    }

    let now = time_provider.now();
    // non-empty input always yields an active order
    let Some(active) = current.or_else(|| current_at(existing, now)) else {
        return Ok(PackagePosition::Current);
    };

    let active_range = active.range();
    let position = match (active_range.relation_of(now), new_range.relation_of(now)) {
        (_, Relation::Within) => PackagePosition::Current,
        (Relation::Before, Relation::Before) => {
            if new_range.ends_before(&active_range) {
                PackagePosition::Current
            } else {
                PackagePosition::Future
            }
        }
        (Relation::Before, Relation::After) => PackagePosition::Past,
        (Relation::Within, Relation::Before) => PackagePosition::Future,
        (Relation::Within, Relation::After) => PackagePosition::Past,
        (Relation::After, Relation::Before) => PackagePosition::Current,
        (Relation::After, Relation::After) => {
            if new_range.ends_before(&active_range) {
                PackagePosition::Past
            } else {
                PackagePosition::Current
            }
        }
    };

    debug!(
        active_order_id = %active.id,
        %active_range,
        %new_range,
        %now,
        ?position,
        "student package order positioned",
    );
    Ok(position)
}

/// pick the order that should be active now
///
/// the order containing now, else the nearest future order, else the last one
pub fn select_current_student_package_order<'a>(
    orders: &'a [StudentPackageOrder],
    time_provider: &SafeTimeProvider,
) -> Option<&'a StudentPackageOrder> {
    current_at(orders, time_provider.now())
}

/// order whose range contains `instant`
pub fn find_order_at(
    orders: &[StudentPackageOrder],
    instant: DateTime<Utc>,
) -> Option<&StudentPackageOrder> {
    orders.iter().find(|o| o.range().within(instant))
}

fn current_at(orders: &[StudentPackageOrder], now: DateTime<Utc>) -> Option<&StudentPackageOrder> {
    let mut nearest_future = None;
    for order in orders {
        match order.range().relation_of(now) {
            Relation::Within => return Some(order),
            Relation::Before if nearest_future.is_none() => nearest_future = Some(order),
            _ => {}
        }
    }
    // sorted input: the first future order is the head when now precedes all of them
    nearest_future.or_else(|| orders.last())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use hourglass_rs::TimeSource;
    use uuid::Uuid;

    fn date(month: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, month, d, 0, 0, 0).unwrap()
    }

    fn range(from: DateTime<Utc>, to: DateTime<Utc>) -> TimeRange {
        TimeRange::new(from, to).unwrap()
    }

    fn clock(now: DateTime<Utc>) -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(now))
    }

    fn order(package_id: Uuid, r: TimeRange, is_current: bool) -> StudentPackageOrder {
        StudentPackageOrder {
            id: Uuid::new_v4(),
            student_package_id: package_id,
            start_at: r.from,
            end_at: r.to,
            is_current_student_package: is_current,
        }
    }

    fn march() -> TimeRange {
        range(date(3, 1), date(3, 31))
    }

    fn position_against_march(now: DateTime<Utc>, new_range: TimeRange) -> PackagePosition {
        let current = order(Uuid::new_v4(), march(), true);
        let existing = vec![current.clone()];
        position_new_student_package_order(&existing, Some(&current), new_range, &clock(now)).unwrap()
    }

    #[test]
    fn test_no_existing_orders_is_current() {
        let position =
            position_new_student_package_order(&[], None, march(), &clock(date(1, 1))).unwrap();
        assert_eq!(position, PackagePosition::Current);
    }

    #[test]
    fn test_no_existing_orders_ignores_current_argument() {
        let stale = order(Uuid::new_v4(), march(), true);

        let position = position_new_student_package_order(
            &[],
            Some(&stale),
            range(date(1, 1), date(1, 31)),
            &clock(date(3, 15)),
        )
        .unwrap();
        assert_eq!(position, PackagePosition::Current);
    }

    #[test]
    fn test_now_before_active_new_range_ends_before_active() {
        let position = position_against_march(date(1, 1), range(date(2, 1), date(2, 15)));
        assert_eq!(position, PackagePosition::Current);
    }

    #[test]
    fn test_now_before_active_new_range_after_active() {
        let position = position_against_march(date(2, 15), range(date(4, 1), date(4, 30)));
        assert_eq!(position, PackagePosition::Future);
    }

    #[test]
    fn test_now_before_active_inside_new_range() {
        let position = position_against_march(date(2, 10), range(date(2, 1), date(2, 15)));
        assert_eq!(position, PackagePosition::Current);
    }

    #[test]
    fn test_now_before_active_new_range_already_over() {
        let position = position_against_march(date(2, 20), range(date(2, 1), date(2, 15)));
        assert_eq!(position, PackagePosition::Past);
    }

    #[test]
    fn test_now_within_active_new_range_later() {
        let position = position_against_march(date(3, 15), range(date(4, 1), date(4, 30)));
        assert_eq!(position, PackagePosition::Future);
    }

    #[test]
    fn test_now_within_active_new_range_earlier() {
        let position = position_against_march(date(3, 15), range(date(1, 1), date(1, 31)));
        assert_eq!(position, PackagePosition::Past);
    }

    #[test]
    fn test_now_after_active_new_range_upcoming() {
        let position = position_against_march(date(4, 15), range(date(5, 1), date(5, 31)));
        assert_eq!(position, PackagePosition::Current);
    }

    #[test]
    fn test_now_after_active_new_range_before_active() {
        let position = position_against_march(date(4, 15), range(date(1, 1), date(1, 31)));
        assert_eq!(position, PackagePosition::Past);
    }

    #[test]
    fn test_now_after_active_new_range_ended_after_active() {
        let position = position_against_march(date(4, 15), range(date(4, 1), date(4, 10)));
        assert_eq!(position, PackagePosition::Current);
    }

    #[test]
    fn test_now_after_active_inside_new_range() {
        let position = position_against_march(date(4, 15), range(date(4, 1), date(4, 30)));
        assert_eq!(position, PackagePosition::Current);
    }

    #[test]
    fn test_disjoint_ranges_always_classify() {
        let candidates = [
            range(date(1, 1), date(1, 31)),
            range(date(2, 1), date(2, 28)),
            range(date(4, 1), date(4, 30)),
            range(date(5, 1), date(5, 31)),
        ];
        let mut now = date(1, 1);
        while now <= date(6, 30) {
            for candidate in &candidates {
                let current = order(Uuid::new_v4(), march(), true);
                let result = position_new_student_package_order(
                    &[current.clone()],
                    Some(&current),
                    *candidate,
                    &clock(now),
                );
                assert!(result.is_ok(), "{} at {}", candidate, now);
            }
            now += Duration::days(5);
        }
    }

    #[test]
    fn test_one_day_overlap_rejected() {
        let package_id = Uuid::new_v4();
        let current = order(package_id, march(), true);
        let new_range = range(date(3, 31), date(4, 30));

        let err = position_new_student_package_order(
            &[current.clone()],
            Some(&current),
            new_range,
            &clock(date(2, 15)),
        )
        .unwrap_err();

        match err {
            ScheduleError::OverlappingStudentPackageOrder {
                student_package_id,
                existing_order_id,
                existing_range,
                new_range: rejected,
            } => {
                assert_eq!(student_package_id, package_id);
                assert_eq!(existing_order_id, current.id);
                assert_eq!(existing_range, march());
                assert_eq!(rejected, new_range);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_overlap_with_non_current_order_rejected() {
        let package_id = Uuid::new_v4();
        let january = order(package_id, range(date(1, 1), date(1, 31)), false);
        let current = order(package_id, march(), true);

        let err = position_new_student_package_order(
            &[january, current.clone()],
            Some(&current),
            range(date(1, 20), date(2, 10)),
            &clock(date(3, 15)),
        )
        .unwrap_err();
        assert!(matches!(err, ScheduleError::OverlappingStudentPackageOrder { .. }));
    }

    #[test]
    fn test_missing_current_flag_falls_back_to_selection() {
        let package_id = Uuid::new_v4();
        let existing = vec![
            order(package_id, range(date(1, 1), date(1, 31)), false),
            order(package_id, march(), false),
        ];

        // now sits in the february gap, so march is picked as the active order
        let position = position_new_student_package_order(
            &existing,
            None,
            range(date(4, 1), date(4, 30)),
            &clock(date(2, 15)),
        )
        .unwrap();
        assert_eq!(position, PackagePosition::Future);
    }

    #[test]
    fn test_select_current_order() {
        let package_id = Uuid::new_v4();
        let orders = vec![
            order(package_id, range(date(1, 1), date(1, 31)), false),
            order(package_id, march(), false),
            order(package_id, range(date(5, 1), date(5, 31)), false),
        ];

        let at = |now| select_current_student_package_order(&orders, &clock(now)).map(|o| o.id);

        assert_eq!(at(date(3, 10)), Some(orders[1].id));
        assert_eq!(at(date(1, 1) - Duration::days(10)), Some(orders[0].id));
        assert_eq!(at(date(6, 15)), Some(orders[2].id));
        assert_eq!(at(date(4, 10)), Some(orders[2].id));
        assert_eq!(at(date(2, 10)), Some(orders[1].id));
    }

    #[test]
    fn test_select_current_is_idempotent_and_ignores_flag() {
        let package_id = Uuid::new_v4();
        let orders = vec![
            order(package_id, range(date(1, 1), date(1, 31)), true),
            order(package_id, march(), false),
        ];
        let time = clock(date(3, 5));

        let first = select_current_student_package_order(&orders, &time).map(|o| o.id);
        let second = select_current_student_package_order(&orders, &time).map(|o| o.id);
        assert_eq!(first, Some(orders[1].id));
        assert_eq!(first, second);
        assert!(select_current_student_package_order(&[], &time).is_none());
    }

    #[test]
    fn test_selection_follows_clock() {
        let package_id = Uuid::new_v4();
        let orders = vec![
            order(package_id, range(date(1, 1), date(1, 31)), false),
            order(package_id, march(), false),
        ];
        let time = clock(date(1, 20));
        assert_eq!(
            select_current_student_package_order(&orders, &time).map(|o| o.id),
            Some(orders[0].id)
        );

        time.test_control().unwrap().advance(Duration::days(45));
        assert_eq!(
            select_current_student_package_order(&orders, &time).map(|o| o.id),
            Some(orders[1].id)
        );
    }

    #[test]
    fn test_find_order_at() {
        let package_id = Uuid::new_v4();
        let orders = vec![
            order(package_id, range(date(1, 1), date(1, 31)), false),
            order(package_id, march(), true),
        ];

        assert_eq!(find_order_at(&orders, date(3, 31)).map(|o| o.id), Some(orders[1].id));
        assert_eq!(find_order_at(&orders, date(1, 1)).map(|o| o.id), Some(orders[0].id));
        assert!(find_order_at(&orders, date(2, 15)).is_none());
    }
}
