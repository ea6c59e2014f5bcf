use crate::schema::{get_region, region_keys, RegionTable, ALL_REGIONS};
use anyhow::{anyhow, bail, Result};

/// Resolves which region tables to refresh based on include/exclude filters.
/// The result keeps the canonical refresh order.
pub fn resolve_regions(
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
) -> Result<Vec<&'static RegionTable>> {
    match (include, exclude) {
        (Some(_), Some(_)) => {
            bail!("Cannot use both --include and --exclude at the same time");
        }
        (Some(include_list), None) => {
            let requested = lookup_all(&include_list)?;
            Ok(ALL_REGIONS
                .iter()
                .copied()
                .filter(|r| requested.iter().any(|q| q.key == r.key))
                .collect())
        }
        (None, Some(exclude_list)) => {
            let excluded = lookup_all(&exclude_list)?;
            Ok(ALL_REGIONS
                .iter()
                .copied()
                .filter(|r| !excluded.iter().any(|q| q.key == r.key))
                .collect())
        }
        (None, None) => Ok(ALL_REGIONS.to_vec()),
    }
}

fn lookup_all(names: &[String]) -> Result<Vec<&'static RegionTable>> {
    names
        .iter()
        .map(|name| {
            get_region(name.trim())
                .ok_or_else(|| anyhow!("Unknown region: {} (expected one of: {})", name, region_keys().join(", ")))
        })
        .collect()
}
