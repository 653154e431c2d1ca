mod common;

use blast_report::metrics::{
    category_breakdown, compute_kpis, hourly_activity, status_breakdown,
};
use common::{record, record_set, utc};

fn message(id: &str, category: &str, status: &str, delivery_report_status: &str) -> blast_report::TransactionRecord {
    let mut r = record(id);
    r.category = category.to_string();
    r.status = status.to_string();
    r.delivery_report_status = delivery_report_status.to_string();
    r.delivery_status = if delivery_report_status.is_empty() {
        status.to_string()
    } else {
        delivery_report_status.to_string()
    };
    r
}

#[test]
fn kpis_for_three_row_scenario() {
    let set = record_set(vec![
        message("1", "marketing", "succeeded", ""),
        message("2", "marketing", "failed", ""),
        message("3", "transactional", "succeeded", ""),
    ]);
    let kpis = compute_kpis(&set);
    assert_eq!(kpis.total, 3);
    assert_eq!(kpis.delivered, 1);
    assert_eq!(kpis.failed, 1);
    assert_eq!(kpis.read, 0);
    assert_eq!(kpis.unread, 0);
    assert!((kpis.delivery_rate - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn delivered_read_unread_are_marketing_gated_but_failed_is_not() {
    let set = record_set(vec![
        message("1", "Transactional", "succeeded", "read"),
        message("2", "transactional", "failed", ""),
        message("3", "MARKETING", "succeeded", "delivered"),
        message("4", "marketing", "", "sent"),
        message("5", "marketing", "", "read"),
    ]);
    let kpis = compute_kpis(&set);
    // Non-marketing successes and reads do not count.
    assert_eq!(kpis.delivered, 1);
    assert_eq!(kpis.read, 1);
    assert_eq!(kpis.unread, 2);
    // Failures count regardless of category.
    assert_eq!(kpis.failed, 1);
}

#[test]
fn delivered_count_partitions_marketing_rows() {
    let set = record_set(vec![
        message("1", "marketing", "succeeded", ""),
        message("2", "marketing", "failed", ""),
        message("3", "marketing", "pending", ""),
        message("4", "transactional", "succeeded", ""),
    ]);
    let kpis = compute_kpis(&set);
    let marketing = set
        .iter()
        .filter(|r| r.category.eq_ignore_ascii_case("marketing"))
        .count();
    let marketing_not_succeeded = set
        .iter()
        .filter(|r| r.category.eq_ignore_ascii_case("marketing") && r.status != "succeeded")
        .count();
    assert_eq!(kpis.delivered + marketing_not_succeeded, marketing);
}

#[test]
fn empty_set_yields_exact_zero_rates() {
    let kpis = compute_kpis(&record_set(Vec::new()));
    assert_eq!(kpis.total, 0);
    assert_eq!(kpis.delivery_rate, 0.0);
    assert_eq!(kpis.read_rate, 0.0);
    assert_eq!(kpis.avg_rate, 0.0);
    assert_eq!(kpis.total_cost, 0.0);
}

#[test]
fn cost_figures_ignore_the_marketing_gate() {
    let mut a = message("1", "marketing", "succeeded", "");
    a.rate_value = 100.0;
    let mut b = message("2", "transactional", "succeeded", "");
    b.rate_value = 50.0;
    let kpis = compute_kpis(&record_set(vec![a, b]));
    assert_eq!(kpis.total_cost, 150.0);
    assert_eq!(kpis.avg_rate, 75.0);
}

#[test]
fn status_breakdown_uses_fixed_label_order() {
    let set = record_set(vec![
        message("1", "marketing", "succeeded", "read"),
        message("2", "marketing", "failed", ""),
        message("3", "marketing", "succeeded", "sent"),
    ]);
    let breakdown = status_breakdown(&set);
    let labels: Vec<&str> = breakdown.iter().map(|e| e.status.as_str()).collect();
    assert_eq!(labels, vec!["delivered", "read", "unread", "failed"]);
    let counts: Vec<usize> = breakdown.iter().map(|e| e.count).collect();
    assert_eq!(counts, vec![2, 1, 1, 1]);
}

#[test]
fn category_totals_sum_to_record_count() {
    let set = record_set(vec![
        message("1", "marketing", "succeeded", ""),
        message("2", "marketing", "failed", ""),
        message("3", "utility", "succeeded", ""),
        message("4", "transactional", "succeeded", ""),
        message("5", "transactional", "failed", ""),
    ]);
    let breakdown = category_breakdown(&set);
    let total: usize = breakdown.iter().map(|agg| agg.total).sum();
    assert_eq!(total, set.len());
}

#[test]
fn category_breakdown_sorts_by_total_with_first_seen_tie_break() {
    let mut costly = message("3", "utility", "succeeded", "");
    costly.rate_value = 12.5;
    let set = record_set(vec![
        message("1", "utility", "succeeded", ""),
        message("2", "transactional", "succeeded", ""),
        costly,
        message("4", "transactional", "failed", ""),
        message("5", "marketing", "succeeded", ""),
    ]);
    let breakdown = category_breakdown(&set);
    let categories: Vec<&str> = breakdown.iter().map(|agg| agg.category.as_str()).collect();
    // utility (2) before transactional (2) because it appeared first; marketing last.
    assert_eq!(categories, vec!["utility", "transactional", "marketing"]);
    assert_eq!(breakdown[0].rate_sum, 12.5);
    // The gate keeps non-marketing delivered counts at zero.
    assert_eq!(breakdown[0].delivered, 0);
    assert_eq!(breakdown[2].delivered, 1);
}

#[test]
fn hourly_activity_counts_marketing_reads_and_sums_to_their_total() {
    let mut morning = message("1", "marketing", "succeeded", "read");
    // 08:00 UTC = 15:00 in the reporting zone.
    morning.read_at = Some(utc(2024, 5, 6, 8, 0, 0));
    let mut evening = message("2", "marketing", "succeeded", "read");
    // 13:00 UTC = 20:00 local.
    evening.read_at = Some(utc(2024, 5, 6, 13, 0, 0));
    let mut other_category = message("3", "transactional", "succeeded", "read");
    other_category.read_at = Some(utc(2024, 5, 6, 8, 0, 0));
    let unread = message("4", "marketing", "succeeded", "sent");

    let buckets = hourly_activity(&record_set(vec![morning, evening, other_category, unread]));
    assert_eq!(buckets.len(), 8);
    let total: usize = buckets.iter().map(|b| b.read).sum();
    assert_eq!(total, 2);
    assert_eq!(buckets.iter().find(|b| b.block == 15).map(|b| b.read), Some(1));
    assert_eq!(buckets.iter().find(|b| b.block == 18).map(|b| b.read), Some(1));
}

#[test]
fn late_night_local_hours_shift_into_afternoon_buckets() {
    let mut late_night = message("1", "marketing", "succeeded", "read");
    // 19:00 UTC = 02:00 local; the +12 display shift lands it at hour 14.
    late_night.read_at = Some(utc(2024, 5, 5, 19, 0, 0));
    let buckets = hourly_activity(&record_set(vec![late_night]));
    let hit = buckets.iter().find(|b| b.read > 0).expect("one bucket hit");
    assert_eq!(hit.block, 12);
    assert_eq!(hit.label, "12:00 - 15:00");
}

#[test]
fn empty_buckets_report_zero() {
    let buckets = hourly_activity(&record_set(Vec::new()));
    assert_eq!(buckets.len(), 8);
    assert!(buckets.iter().all(|b| b.read == 0));
    assert_eq!(buckets[0].label, "00:00 - 03:00");
    assert_eq!(buckets[7].label, "21:00 - 24:00");
}
