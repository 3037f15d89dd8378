//! Read-only aggregation facade.
//!
//! [`CloudInfo`] composes store lookups into provider, service, region and
//! product views. It never calls a provider: when the store has nothing yet
//! for a key, reads fail with [`CloudInfoError::NotYetCached`] so callers can
//! tell "not refreshed yet" apart from real failures.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{CloudInfoError, Result};
use crate::query::{self, InstanceType, InstanceTypeFilter, InstanceTypeQuery};
use crate::store::CloudInfoStore;
use crate::types::{
    Continent, Image, LocationVersion, ProductDetails, Provider, Region, RegionMap, Service,
};

/// Read path over a [`CloudInfoStore`].
#[derive(Clone)]
pub struct CloudInfo {
    providers: Vec<String>,
    store: Arc<dyn CloudInfoStore>,
}

impl CloudInfo {
    /// Create a facade serving the given (enabled) providers.
    pub fn new<I, S>(providers: I, store: Arc<dyn CloudInfoStore>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            providers: providers.into_iter().map(Into::into).collect(),
            store,
        }
    }

    fn provider_enabled(&self, provider: &str) -> bool {
        self.providers.iter().any(|p| p == provider)
    }

    /// Every enabled provider with its services.
    pub fn get_providers(&self) -> Result<Vec<Provider>> {
        self.providers
            .iter()
            .map(|name| self.get_provider(name))
            .collect()
    }

    /// One enabled provider with its services.
    pub fn get_provider(&self, provider: &str) -> Result<Provider> {
        if !self.provider_enabled(provider) {
            return Err(CloudInfoError::UnsupportedProvider(provider.to_string()));
        }
        Ok(Provider {
            provider: provider.to_string(),
            services: self.get_services(provider)?,
        })
    }

    pub fn get_services(&self, provider: &str) -> Result<Vec<Service>> {
        self.store
            .get_services(provider)
            .ok_or_else(|| CloudInfoError::not_yet_cached("services", provider))
    }

    pub fn get_regions(&self, provider: &str, service: &str) -> Result<RegionMap> {
        self.store
            .get_regions(provider, service)
            .ok_or_else(|| CloudInfoError::not_yet_cached("regions", format!("{provider}/{service}")))
    }

    pub fn get_zones(&self, provider: &str, service: &str, region: &str) -> Result<Vec<String>> {
        self.store
            .get_zones(provider, service, region)
            .ok_or_else(|| not_yet_cached("zones", provider, service, region))
    }

    /// Instance types of a region with their current spot prices.
    ///
    /// Only positively priced instance types are returned.
    pub fn get_product_details(
        &self,
        provider: &str,
        service: &str,
        region: &str,
    ) -> Result<Vec<ProductDetails>> {
        let vms = self
            .store
            .get_vms(provider, service, region)
            .ok_or_else(|| not_yet_cached("VMs", provider, service, region))?;

        Ok(vms
            .into_iter()
            .filter(|vm| vm.is_priced())
            .map(|vm| {
                let price = self.store.get_price(provider, region, &vm.instance_type);
                if price.is_none() {
                    debug!(
                        provider,
                        region,
                        instance_type = %vm.instance_type,
                        "price not yet cached"
                    );
                }
                ProductDetails::new(vm, price.as_ref())
            })
            .collect())
    }

    /// Time of the provider's last successful full scrape (unix millis).
    pub fn get_status(&self, provider: &str) -> Result<String> {
        self.store
            .get_status(provider)
            .ok_or_else(|| CloudInfoError::not_yet_cached("status", provider))
    }

    pub fn get_service_images(
        &self,
        provider: &str,
        service: &str,
        region: &str,
    ) -> Result<Vec<Image>> {
        self.store
            .get_images(provider, service, region)
            .ok_or_else(|| not_yet_cached("images", provider, service, region))
    }

    pub fn get_versions(
        &self,
        provider: &str,
        service: &str,
        region: &str,
    ) -> Result<Vec<LocationVersion>> {
        self.store
            .get_versions(provider, service, region)
            .ok_or_else(|| not_yet_cached("versions", provider, service, region))
    }

    /// Continents regions are grouped under.
    pub fn get_continents(&self) -> Vec<Continent> {
        Continent::ALL.to_vec()
    }

    /// Cached regions of a service grouped by continent.
    pub fn get_continents_data(
        &self,
        provider: &str,
        service: &str,
    ) -> Result<BTreeMap<Continent, Vec<Region>>> {
        let regions = self.get_regions(provider, service)?;
        let mut continents: BTreeMap<Continent, Vec<Region>> = BTreeMap::new();
        for (id, name) in regions {
            continents
                .entry(Continent::from_region(&id))
                .or_default()
                .push(Region { id, name });
        }
        Ok(continents)
    }

    /// Run an instance-type query.
    ///
    /// The query is validated before the store is touched. Rows are
    /// expanded per availability zone.
    pub fn query_instance_types(
        &self,
        provider: &str,
        service: &str,
        query: &InstanceTypeQuery,
    ) -> Result<Vec<InstanceType>> {
        let region = query.validate(provider, service)?;
        let products = self.get_product_details(provider, service, region)?;
        let zones = self
            .store
            .get_zones(provider, service, region)
            .unwrap_or_default();
        Ok(query::evaluate(&products, region, &zones, query))
    }

    /// Product details of a region matching `filter` in at least one zone.
    pub fn query_products(
        &self,
        provider: &str,
        service: &str,
        region: &str,
        filter: &InstanceTypeFilter,
    ) -> Result<Vec<ProductDetails>> {
        let products = self.get_product_details(provider, service, region)?;
        let zones = self
            .store
            .get_zones(provider, service, region)
            .unwrap_or_default();
        Ok(query::filter_products(&products, &zones, filter))
    }
}

impl std::fmt::Debug for CloudInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudInfo")
            .field("providers", &self.providers)
            .finish_non_exhaustive()
    }
}

fn not_yet_cached(what: &'static str, provider: &str, service: &str, region: &str) -> CloudInfoError {
    CloudInfoError::not_yet_cached(what, format!("{provider}/{service}/{region}"))
}
