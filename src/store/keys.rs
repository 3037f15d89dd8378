//! Store key space.

const PREFIX: &str = "/cloudinfo/providers";

pub fn services(provider: &str) -> String {
    format!("{PREFIX}/{provider}/services")
}

pub fn regions(provider: &str, service: &str) -> String {
    format!("{PREFIX}/{provider}/services/{service}/regions/")
}

pub fn zones(provider: &str, service: &str, region: &str) -> String {
    format!("{PREFIX}/{provider}/services/{service}/regions/{region}/zones/")
}

/// Prices are provider-wide: every service of a provider shares them.
pub fn price(provider: &str, region: &str, instance_type: &str) -> String {
    format!("{PREFIX}/{provider}/regions/{region}/prices/{instance_type}")
}

pub fn vms(provider: &str, service: &str, region: &str) -> String {
    format!("{PREFIX}/{provider}/services/{service}/regions/{region}/vms")
}

pub fn images(provider: &str, service: &str, region: &str) -> String {
    format!("{PREFIX}/{provider}/services/{service}/regions/{region}/images")
}

pub fn versions(provider: &str, service: &str, region: &str) -> String {
    format!("{PREFIX}/{provider}/services/{service}/regions/{region}/versions")
}

pub fn status(provider: &str) -> String {
    format!("{PREFIX}/{provider}/status/")
}
