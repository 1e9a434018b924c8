//! Subgrid (zone) layer ranges.

use log::debug;

use super::error::{Result, RoffError};
use super::types::geometry::{Subgrid, SubgridMap};

pub const SUBGRID_KEY: &str = "subgrids!nLayers";

/// Builds named layer ranges from per-zone layer counts.
///
/// Returns `None` when the counts are absent or describe a single zone; the
/// whole grid is then one implicit zone and no map is produced. Otherwise
/// zone `i` is named `subgrid_<i>` and covers the layers directly after
/// zone `i-1`, starting from layer 1.
pub fn build(counts: Option<&[i32]>, nlay: usize) -> Result<Option<SubgridMap>> {
    let counts = match counts {
        Some(c) if c.len() > 1 => c,
        _ => {
            debug!("No subgrids declared");
            return Ok(None);
        }
    };

    let mismatch = || RoffError::SubgridMismatch {
        counts: counts.to_vec(),
        nlay,
    };

    let mut entries = Vec::with_capacity(counts.len());
    let mut next = 1usize;
    for (i, &count) in counts.iter().enumerate() {
        if count < 1 {
            return Err(mismatch());
        }
        let end = next + count as usize - 1;
        entries.push(Subgrid {
            name: format!("subgrid_{}", i),
            layers: next..=end,
        });
        next = end + 1;
    }
    if next - 1 != nlay {
        return Err(mismatch());
    }

    debug!("Built {} subgrids over {} layers", entries.len(), nlay);
    Ok(Some(SubgridMap::new(entries)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_layers_in_declaration_order() {
        let map = build(Some(&[3, 2, 5]), 10).unwrap().unwrap();
        let ranges: Vec<_> = map.iter().map(|s| (s.name.as_str(), s.layers.clone())).collect();
        assert_eq!(
            ranges,
            vec![("subgrid_0", 1..=3), ("subgrid_1", 4..=5), ("subgrid_2", 6..=10)]
        );
    }

    #[test]
    fn single_zone_yields_no_map() {
        assert!(build(Some(&[7]), 7).unwrap().is_none());
        assert!(build(Some(&[]), 7).unwrap().is_none());
        assert!(build(None, 7).unwrap().is_none());
    }

    #[test]
    fn counts_must_cover_all_layers() {
        assert!(matches!(
            build(Some(&[3, 3]), 10),
            Err(RoffError::SubgridMismatch { nlay: 10, .. })
        ));
        assert!(build(Some(&[3, 0, 7]), 10).is_err());
    }
}
