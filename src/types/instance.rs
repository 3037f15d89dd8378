//! Instance types, prices and the read-time product composite.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Spot prices keyed by availability zone.
pub type SpotPriceInfo = BTreeMap<String, f64>;

/// Normalized network performance of an instance type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkCategory {
    Low,
    Medium,
    High,
    Extra,
    #[default]
    #[serde(other)]
    Unknown,
}

impl NetworkCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkCategory::Low => "low",
            NetworkCategory::Medium => "medium",
            NetworkCategory::High => "high",
            NetworkCategory::Extra => "extra",
            NetworkCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for NetworkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generalized instance family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum InstanceCategory {
    #[serde(rename = "General purpose")]
    GeneralPurpose,
    #[serde(rename = "Compute optimized")]
    ComputeOptimized,
    #[serde(rename = "Memory optimized")]
    MemoryOptimized,
    #[serde(rename = "Storage optimized")]
    StorageOptimized,
    #[serde(rename = "GPU instance")]
    Gpu,
    #[default]
    #[serde(other, rename = "unknown")]
    Unknown,
}

impl InstanceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceCategory::GeneralPurpose => "General purpose",
            InstanceCategory::ComputeOptimized => "Compute optimized",
            InstanceCategory::MemoryOptimized => "Memory optimized",
            InstanceCategory::StorageOptimized => "Storage optimized",
            InstanceCategory::Gpu => "GPU instance",
            InstanceCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for InstanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A virtual machine shape offered in one (provider, service, region).
///
/// `on_demand_price` is the authoritative value merged in from the cached
/// [`Price`], not the provider's raw product feed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmInfo {
    #[serde(rename = "type")]
    pub instance_type: String,
    #[serde(default)]
    pub category: InstanceCategory,
    #[serde(default)]
    pub on_demand_price: f64,
    #[serde(rename = "cpusPerVm")]
    pub cpus: f64,
    #[serde(rename = "memPerVm")]
    pub mem: f64,
    #[serde(rename = "gpusPerVm", default)]
    pub gpus: f64,
    #[serde(default)]
    pub ntw_perf: String,
    #[serde(rename = "ntwPerfCategory", default)]
    pub ntw_perf_category: NetworkCategory,
    #[serde(default)]
    pub zones: Vec<String>,
    /// Extensible capability bag.
    ///
    /// Keys are provider specific (e.g. `"instanceTypeCategory"`,
    /// `"cpu"`, `"memory"`); consumers must tolerate unknown keys.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Whether the instance type belongs to the current generation.
    #[serde(default)]
    pub current_gen: bool,
}

impl VmInfo {
    /// Create a shape with the given type name, vCPUs and memory (GiB).
    pub fn new(instance_type: impl Into<String>, cpus: f64, mem: f64) -> Self {
        Self {
            instance_type: instance_type.into(),
            cpus,
            mem,
            current_gen: true,
            ..Default::default()
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.on_demand_price = price;
        self
    }

    pub fn with_category(mut self, category: InstanceCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_gpus(mut self, gpus: f64) -> Self {
        self.gpus = gpus;
        self
    }

    pub fn with_network(mut self, perf: impl Into<String>, category: NetworkCategory) -> Self {
        self.ntw_perf = perf.into();
        self.ntw_perf_category = category;
        self
    }

    pub fn with_zones<I, S>(mut self, zones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.zones = zones.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Burstable shapes are recognized by a `t`/`T` type prefix.
    pub fn is_burst(&self) -> bool {
        self.instance_type.starts_with(['t', 'T'])
    }

    /// Only positively priced shapes are ever surfaced on the read path.
    pub fn is_priced(&self) -> bool {
        self.on_demand_price > 0.0
    }
}

/// Price of one instance type in one region.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub on_demand_price: f64,
    #[serde(default)]
    pub spot_price: SpotPriceInfo,
}

impl Price {
    pub fn on_demand(price: f64) -> Self {
        Self {
            on_demand_price: price,
            spot_price: SpotPriceInfo::new(),
        }
    }

    pub fn with_spot(mut self, zone: impl Into<String>, price: f64) -> Self {
        self.spot_price.insert(zone.into(), price);
        self
    }
}

/// Spot price of an instance type in one zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonePrice {
    pub zone: String,
    pub price: f64,
}

impl ZonePrice {
    pub fn new(zone: impl Into<String>, price: f64) -> Self {
        Self {
            zone: zone.into(),
            price,
        }
    }
}

/// Read-time composite of a [`VmInfo`] and its current spot prices.
///
/// Never stored; rebuilt from the cached VM collection and prices on every
/// read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    #[serde(flatten)]
    pub vm: VmInfo,
    #[serde(default)]
    pub spot_price: Vec<ZonePrice>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub burst: bool,
}

impl ProductDetails {
    /// Build details from a VM, attaching spot prices from `price` if any.
    pub fn new(vm: VmInfo, price: Option<&Price>) -> Self {
        let spot_price = price
            .map(|p| {
                p.spot_price
                    .iter()
                    .map(|(zone, price)| ZonePrice::new(zone.clone(), *price))
                    .collect()
            })
            .unwrap_or_default();
        let burst = vm.is_burst();
        Self {
            vm,
            spot_price,
            burst,
        }
    }

    /// Spot price in `zone`, if the provider reported one.
    pub fn spot_price_in(&self, zone: &str) -> Option<f64> {
        self.spot_price
            .iter()
            .find(|zp| zp.zone == zone)
            .map(|zp| zp.price)
    }
}
