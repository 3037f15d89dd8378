//! Tests for instance-type queries through the facade.

mod common;

use cloudinfo::{
    CategoryFilter, CloudInfoError, CloudInfoStore, FloatFilter, InstanceCategory,
    InstanceTypeFilter, InstanceTypeQuery, NetworkCategory, NetworkCategoryFilter, Price, VmInfo,
};
use common::Harness;

const REGION: &str = "eu-west-1";

/// Three compute shapes in a two-zone region; only m5.large has spot prices.
fn seeded() -> Harness {
    let harness = Harness::new();
    let store = &harness.store;
    store.replace_zones(
        "amazon",
        "compute",
        REGION,
        vec!["eu-west-1a".into(), "eu-west-1b".into()],
    );
    store.replace_vms(
        "amazon",
        "compute",
        REGION,
        vec![
            VmInfo::new("m5.large", 2.0, 8.0)
                .with_price(0.107)
                .with_category(InstanceCategory::GeneralPurpose)
                .with_network("Up to 10 Gigabit", NetworkCategory::High),
            VmInfo::new("c5.large", 2.0, 4.0)
                .with_price(0.096)
                .with_category(InstanceCategory::ComputeOptimized)
                .with_network("Up to 10 Gigabit", NetworkCategory::High),
            VmInfo::new("p3.2xlarge", 8.0, 61.0)
                .with_price(3.06)
                .with_gpus(1.0)
                .with_category(InstanceCategory::Gpu)
                .with_network("Up to 10 Gigabit", NetworkCategory::High)
                .with_zones(["eu-west-1a"]),
        ],
    );
    store.store_price(
        "amazon",
        REGION,
        "m5.large",
        Price::on_demand(0.107).with_spot("eu-west-1a", 0.034),
    );
    harness
}

fn query(filter: InstanceTypeFilter) -> InstanceTypeQuery {
    InstanceTypeQuery::new(REGION).filter(filter)
}

fn rows(harness: &Harness, query: &InstanceTypeQuery) -> Vec<(String, String)> {
    harness
        .info(&["amazon"])
        .query_instance_types("amazon", "compute", query)
        .unwrap()
        .into_iter()
        .map(|row| (row.name, row.zone))
        .collect()
}

fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(n, z)| (n.to_string(), z.to_string()))
        .collect()
}

// ============================================================================
// Zone expansion
// ============================================================================

#[test]
fn cpu_and_memory_equality_expands_zones() {
    let harness = seeded();
    let q = query(
        InstanceTypeFilter::new()
            .cpu(FloatFilter::default().equal_to(2.0))
            .memory(FloatFilter::default().equal_to(8.0)),
    );

    let result = harness
        .info(&["amazon"])
        .query_instance_types("amazon", "compute", &q)
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result[0].name, "m5.large");
    assert_eq!(result[0].zone, "eu-west-1a");
    assert_eq!(result[0].spot_price, 0.034);
    assert_eq!(result[0].price, 0.107);
    assert_eq!(result[1].zone, "eu-west-1b");
    assert_eq!(result[1].spot_price, 0.0);
}

#[test]
fn no_filter_returns_every_product_zone() {
    let harness = seeded();
    let result = rows(&harness, &InstanceTypeQuery::new(REGION));
    assert_eq!(
        result,
        pairs(&[
            ("m5.large", "eu-west-1a"),
            ("m5.large", "eu-west-1b"),
            ("c5.large", "eu-west-1a"),
            ("c5.large", "eu-west-1b"),
            ("p3.2xlarge", "eu-west-1a"),
        ])
    );
}

#[test]
fn zone_restricts_rows() {
    let harness = seeded();
    let result = rows(&harness, &InstanceTypeQuery::new(REGION).zone("eu-west-1b"));
    assert_eq!(
        result,
        pairs(&[("m5.large", "eu-west-1b"), ("c5.large", "eu-west-1b")])
    );
}

#[test]
fn missing_region_zones_yield_zoneless_rows() {
    let harness = Harness::new();
    harness.store.replace_vms(
        "amazon",
        "compute",
        REGION,
        vec![VmInfo::new("m5.large", 2.0, 8.0).with_price(0.107)],
    );

    let result = rows(&harness, &InstanceTypeQuery::new(REGION));
    assert_eq!(result, pairs(&[("m5.large", "")]));
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn spot_true_keeps_zones_with_spot_price() {
    let harness = seeded();
    let result = rows(&harness, &query(InstanceTypeFilter::new().spot(true)));
    assert_eq!(result, pairs(&[("m5.large", "eu-west-1a")]));
}

#[test]
fn spot_false_keeps_zones_without_spot_price() {
    let harness = seeded();
    let result = rows(&harness, &query(InstanceTypeFilter::new().spot(false)));
    assert_eq!(result.len(), 4);
    assert!(!result.contains(&("m5.large".to_string(), "eu-west-1a".to_string())));
}

#[test]
fn spot_price_filter_treats_missing_as_zero() {
    let harness = seeded();
    let result = rows(
        &harness,
        &query(InstanceTypeFilter::new().spot_price(FloatFilter::default().less_than(0.05))),
    );
    assert_eq!(result.len(), 5);

    let result = rows(
        &harness,
        &query(InstanceTypeFilter::new().spot_price(FloatFilter::default().greater_than(0.0))),
    );
    assert_eq!(result, pairs(&[("m5.large", "eu-west-1a")]));
}

#[test]
fn price_range_filter() {
    let harness = seeded();
    let result = rows(
        &harness,
        &query(
            InstanceTypeFilter::new().price(FloatFilter::default().at_least(0.1).at_most(1.0)),
        ),
    );
    assert_eq!(
        result,
        pairs(&[("m5.large", "eu-west-1a"), ("m5.large", "eu-west-1b")])
    );
}

#[test]
fn gpu_and_category_filters() {
    let harness = seeded();
    let result = rows(
        &harness,
        &query(InstanceTypeFilter::new().gpu(FloatFilter::default().greater_than(0.0))),
    );
    assert_eq!(result, pairs(&[("p3.2xlarge", "eu-west-1a")]));

    let result = rows(
        &harness,
        &query(
            InstanceTypeFilter::new().category(
                CategoryFilter::default().none_of([InstanceCategory::Gpu, InstanceCategory::ComputeOptimized]),
            ),
        ),
    );
    assert_eq!(
        result,
        pairs(&[("m5.large", "eu-west-1a"), ("m5.large", "eu-west-1b")])
    );
}

#[test]
fn network_category_filter() {
    let harness = seeded();
    let result = rows(
        &harness,
        &query(
            InstanceTypeFilter::new()
                .network_category(NetworkCategoryFilter::default().equal_to(NetworkCategory::Low)),
        ),
    );
    assert!(result.is_empty());
}

#[test]
fn memory_in_list_filter() {
    let harness = seeded();
    let result = rows(
        &harness,
        &query(InstanceTypeFilter::new().memory(FloatFilter::default().one_of([4.0, 61.0]))),
    );
    assert_eq!(
        result,
        pairs(&[
            ("c5.large", "eu-west-1a"),
            ("c5.large", "eu-west-1b"),
            ("p3.2xlarge", "eu-west-1a"),
        ])
    );
}

#[test]
fn json_query_round_trips_through_facade() {
    let harness = seeded();
    let q: InstanceTypeQuery = serde_json::from_value(serde_json::json!({
        "region": REGION,
        "zone": "eu-west-1a",
        "filter": { "cpu": { "gt": 4 } }
    }))
    .unwrap();
    assert_eq!(rows(&harness, &q), pairs(&[("p3.2xlarge", "eu-west-1a")]));
}

// ============================================================================
// Validation and cache state
// ============================================================================

#[test]
fn validation_happens_before_store_lookup() {
    let harness = Harness::new();
    let info = harness.info(&["amazon"]);

    let err = info
        .query_instance_types("amazon", "compute", &InstanceTypeQuery::default())
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "region field must not be empty");

    let err = info
        .query_instance_types("", "compute", &InstanceTypeQuery::new(REGION))
        .unwrap_err();
    assert_eq!(err.to_string(), "provider field must not be empty");

    let err = info
        .query_instance_types("amazon", "", &InstanceTypeQuery::new(REGION))
        .unwrap_err();
    assert_eq!(err.to_string(), "service field must not be empty");
}

#[test]
fn unscraped_region_is_not_yet_cached() {
    let harness = seeded();
    let err = harness
        .info(&["amazon"])
        .query_instance_types("amazon", "compute", &InstanceTypeQuery::new("ap-south-1"))
        .unwrap_err();
    assert!(matches!(err, CloudInfoError::NotYetCached { what: "VMs", .. }));
}

#[test]
fn query_products_matches_any_zone() {
    let harness = seeded();
    let products = harness
        .info(&["amazon"])
        .query_products(
            "amazon",
            "compute",
            REGION,
            &InstanceTypeFilter::new().spot(true),
        )
        .unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].vm.instance_type, "m5.large");
}
