//! Instance-type query engine.
//!
//! A declarative filter over cached [`ProductDetails`]. Evaluation is pure:
//! the caller loads products and zones from the store and hands them in.
//!
//! A record matches iff every present filter field matches. Within one
//! field all present comparators must hold. Absent fields do not constrain.

use serde::{Deserialize, Serialize};

use crate::error::{CloudInfoError, Result};
use crate::types::{InstanceCategory, NetworkCategory, ProductDetails};

// ============================================================================
// Comparators
// ============================================================================

/// Comparator set over a numeric field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatFilter {
    pub eq: Option<f64>,
    pub ne: Option<f64>,
    pub lt: Option<f64>,
    pub lte: Option<f64>,
    pub gt: Option<f64>,
    pub gte: Option<f64>,
    #[serde(rename = "in")]
    pub r#in: Option<Vec<f64>>,
    pub nin: Option<Vec<f64>>,
}

impl FloatFilter {
    pub fn equal_to(mut self, value: f64) -> Self {
        self.eq = Some(value);
        self
    }

    pub fn not_equal_to(mut self, value: f64) -> Self {
        self.ne = Some(value);
        self
    }

    pub fn less_than(mut self, value: f64) -> Self {
        self.lt = Some(value);
        self
    }

    pub fn at_most(mut self, value: f64) -> Self {
        self.lte = Some(value);
        self
    }

    pub fn greater_than(mut self, value: f64) -> Self {
        self.gt = Some(value);
        self
    }

    pub fn at_least(mut self, value: f64) -> Self {
        self.gte = Some(value);
        self
    }

    pub fn one_of(mut self, values: impl Into<Vec<f64>>) -> Self {
        self.r#in = Some(values.into());
        self
    }

    pub fn none_of(mut self, values: impl Into<Vec<f64>>) -> Self {
        self.nin = Some(values.into());
        self
    }

    pub fn matches(&self, value: f64) -> bool {
        self.eq.is_none_or(|v| value == v)
            && self.ne.is_none_or(|v| value != v)
            && self.lt.is_none_or(|v| value < v)
            && self.lte.is_none_or(|v| value <= v)
            && self.gt.is_none_or(|v| value > v)
            && self.gte.is_none_or(|v| value >= v)
            && self.r#in.as_ref().is_none_or(|vs| vs.contains(&value))
            && self.nin.as_ref().is_none_or(|vs| !vs.contains(&value))
    }
}

/// Equality comparator set over an enumerated field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "T: Deserialize<'de>"))]
pub struct EnumFilter<T> {
    pub eq: Option<T>,
    pub ne: Option<T>,
    #[serde(rename = "in")]
    pub r#in: Option<Vec<T>>,
    pub nin: Option<Vec<T>>,
}

impl<T> Default for EnumFilter<T> {
    fn default() -> Self {
        Self {
            eq: None,
            ne: None,
            r#in: None,
            nin: None,
        }
    }
}

impl<T: PartialEq> EnumFilter<T> {
    pub fn equal_to(mut self, value: T) -> Self {
        self.eq = Some(value);
        self
    }

    pub fn not_equal_to(mut self, value: T) -> Self {
        self.ne = Some(value);
        self
    }

    pub fn one_of(mut self, values: impl Into<Vec<T>>) -> Self {
        self.r#in = Some(values.into());
        self
    }

    pub fn none_of(mut self, values: impl Into<Vec<T>>) -> Self {
        self.nin = Some(values.into());
        self
    }

    pub fn matches(&self, value: &T) -> bool {
        self.eq.as_ref().is_none_or(|v| value == v)
            && self.ne.as_ref().is_none_or(|v| value != v)
            && self.r#in.as_ref().is_none_or(|vs| vs.contains(value))
            && self.nin.as_ref().is_none_or(|vs| !vs.contains(value))
    }
}

pub type NetworkCategoryFilter = EnumFilter<NetworkCategory>;
pub type CategoryFilter = EnumFilter<InstanceCategory>;

// ============================================================================
// Query
// ============================================================================

/// Filter over instance-type fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstanceTypeFilter {
    /// On-demand price.
    pub price: Option<FloatFilter>,
    /// Spot price in the evaluated zone (0 when none is known).
    pub spot_price: Option<FloatFilter>,
    /// Whether a spot price is known in the evaluated zone.
    pub spot: Option<bool>,
    pub cpu: Option<FloatFilter>,
    pub memory: Option<FloatFilter>,
    pub gpu: Option<FloatFilter>,
    pub network_category: Option<NetworkCategoryFilter>,
    pub category: Option<CategoryFilter>,
}

impl InstanceTypeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn price(mut self, filter: FloatFilter) -> Self {
        self.price = Some(filter);
        self
    }

    pub fn spot_price(mut self, filter: FloatFilter) -> Self {
        self.spot_price = Some(filter);
        self
    }

    pub fn spot(mut self, spot: bool) -> Self {
        self.spot = Some(spot);
        self
    }

    pub fn cpu(mut self, filter: FloatFilter) -> Self {
        self.cpu = Some(filter);
        self
    }

    pub fn memory(mut self, filter: FloatFilter) -> Self {
        self.memory = Some(filter);
        self
    }

    pub fn gpu(mut self, filter: FloatFilter) -> Self {
        self.gpu = Some(filter);
        self
    }

    pub fn network_category(mut self, filter: NetworkCategoryFilter) -> Self {
        self.network_category = Some(filter);
        self
    }

    pub fn category(mut self, filter: CategoryFilter) -> Self {
        self.category = Some(filter);
        self
    }

    /// Whether `product` matches when offered in `zone`.
    pub fn matches(&self, product: &ProductDetails, zone: &str) -> bool {
        let vm = &product.vm;
        let field = |filter: &Option<FloatFilter>, value: f64| {
            filter.as_ref().is_none_or(|f| f.matches(value))
        };

        if !(field(&self.price, vm.on_demand_price)
            && field(&self.cpu, vm.cpus)
            && field(&self.memory, vm.mem)
            && field(&self.gpu, vm.gpus))
        {
            return false;
        }
        if !self
            .network_category
            .as_ref()
            .is_none_or(|f| f.matches(&vm.ntw_perf_category))
        {
            return false;
        }
        if !self.category.as_ref().is_none_or(|f| f.matches(&vm.category)) {
            return false;
        }

        if self.spot.is_some() || self.spot_price.is_some() {
            let spot_price = product.spot_price_in(zone).unwrap_or(0.0);
            if let Some(spot) = self.spot
                && spot == (spot_price == 0.0)
            {
                return false;
            }
            if !field(&self.spot_price, spot_price) {
                return false;
            }
        }
        true
    }

    /// Whether `product` matches in at least one zone it is offered in.
    pub fn matches_any_zone(&self, product: &ProductDetails, region_zones: &[String]) -> bool {
        offered_zones(product, region_zones)
            .iter()
            .any(|zone| self.matches(product, zone))
    }
}

/// Instance-type query over one region of a provider's service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceTypeQuery {
    /// Required; an absent or empty region fails validation.
    pub region: Option<String>,
    /// Restrict results to one availability zone.
    pub zone: Option<String>,
    pub filter: Option<InstanceTypeFilter>,
}

impl InstanceTypeQuery {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
            ..Default::default()
        }
    }

    pub fn zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn filter(mut self, filter: InstanceTypeFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Check the query preconditions and return the region.
    pub fn validate<'a>(&'a self, provider: &str, service: &str) -> Result<&'a str> {
        if provider.is_empty() {
            return Err(CloudInfoError::Validation(
                "provider field must not be empty".into(),
            ));
        }
        if service.is_empty() {
            return Err(CloudInfoError::Validation(
                "service field must not be empty".into(),
            ));
        }
        match self.region.as_deref() {
            Some(region) if !region.is_empty() => Ok(region),
            _ => Err(CloudInfoError::Validation(
                "region field must not be empty".into(),
            )),
        }
    }
}

/// One instance type offered in one zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceType {
    pub name: String,
    pub region: String,
    /// Empty when no zone is known for the region.
    pub zone: String,
    pub price: f64,
    pub spot_price: f64,
    pub cpu: f64,
    pub memory: f64,
    pub gpu: f64,
    pub network_category: NetworkCategory,
    pub category: InstanceCategory,
}

impl InstanceType {
    fn from_product(product: &ProductDetails, region: &str, zone: &str) -> Self {
        let vm = &product.vm;
        Self {
            name: vm.instance_type.clone(),
            region: region.to_string(),
            zone: zone.to_string(),
            price: vm.on_demand_price,
            spot_price: product.spot_price_in(zone).unwrap_or(0.0),
            cpu: vm.cpus,
            memory: vm.mem,
            gpu: vm.gpus,
            network_category: vm.ntw_perf_category,
            category: vm.category,
        }
    }
}

/// Expand products into per-zone rows and apply the query filter.
///
/// Products without zones of their own fall back to `region_zones`, then to
/// a single zone-less row.
pub fn evaluate(
    products: &[ProductDetails],
    region: &str,
    region_zones: &[String],
    query: &InstanceTypeQuery,
) -> Vec<InstanceType> {
    let mut rows = Vec::new();

    for product in products {
        for zone in offered_zones(product, region_zones) {
            if query.zone.as_ref().is_some_and(|z| z != zone) {
                continue;
            }
            if query
                .filter
                .as_ref()
                .is_some_and(|f| !f.matches(product, zone))
            {
                continue;
            }
            rows.push(InstanceType::from_product(product, region, zone));
        }
    }
    rows
}

/// Products matching `filter` in at least one zone.
pub fn filter_products(
    products: &[ProductDetails],
    region_zones: &[String],
    filter: &InstanceTypeFilter,
) -> Vec<ProductDetails> {
    products
        .iter()
        .filter(|p| filter.matches_any_zone(p, region_zones))
        .cloned()
        .collect()
}

const NO_ZONE: &[String] = &[String::new()];

/// The product's own zones, else the region's, else a single empty zone.
fn offered_zones<'a>(product: &'a ProductDetails, region_zones: &'a [String]) -> &'a [String] {
    if !product.vm.zones.is_empty() {
        &product.vm.zones
    } else if !region_zones.is_empty() {
        region_zones
    } else {
        NO_ZONE
    }
}
