//! Data model for cached cloud information.

mod image;
mod instance;
mod provider;
mod region;

pub use image::{Image, LocationVersion};
pub use instance::{
    InstanceCategory, NetworkCategory, Price, ProductDetails, SpotPriceInfo, VmInfo, ZonePrice,
};
pub use provider::{COMPUTE_SERVICE, Provider, Service};
pub use region::{Continent, Region};

use std::collections::{BTreeMap, HashMap};

/// Region id → display name, as returned by providers and cached per service.
pub type RegionMap = BTreeMap<String, String>;

/// Provider-wide price baseline: region → instance type → price.
pub type PriceBaseline = HashMap<String, HashMap<String, Price>>;
