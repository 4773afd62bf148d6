/*
This file is part of the Campus GIS Lab Tools
Copyright (C) 2022 Novel-T

The Campus GIS Lab Tools is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/
use anyhow::{bail, Context, Result};
use gdal::Dataset;
use gdal::spatial_ref::{CoordTransform, SpatialRef};
use gdal::vector::{Layer, LayerAccess};
use log::info;

use crate::vector::{create_output_layer, get_input_columns, layer_geometry_type, write_mapped_features};

/// Makes sure coordinates are read X (longitude), Y (latitude)
pub fn set_traditional_axis_order(srs: &SpatialRef) {
    unsafe {
        gdal_sys::OSRSetAxisMappingStrategy(
            srs.to_c_hsrs(),
            gdal_sys::OSRAxisMappingStrategy::OAMS_TRADITIONAL_GIS_ORDER);
    }
}

pub fn spatial_ref_from_epsg(epsg_code: u32) -> Result<SpatialRef> {
    let srs = SpatialRef::from_epsg(epsg_code)
        .with_context(|| format!("Unknown EPSG code {}", epsg_code))?;
    set_traditional_axis_order(&srs);
    Ok(srs)
}

pub fn layer_spatial_ref(layer: &Layer) -> Option<SpatialRef> {
    let srs = layer.spatial_ref()?;
    set_traditional_axis_order(&srs);
    Some(srs)
}

pub fn spatial_ref_name(srs: Option<&SpatialRef>) -> String {
    match srs {
        Some(srs) => srs.name().unwrap_or_else(|_| "Unknown".to_string()),
        None => "Unknown".to_string(),
    }
}

/// Name of the layer's spatial reference, for reporting
pub fn spatial_reference_name(dataset: &Dataset, layer_name: &str) -> Result<String> {
    let layer = dataset.layer_by_name(layer_name)
        .with_context(|| format!("Layer {} not found", layer_name))?;
    Ok(spatial_ref_name(layer_spatial_ref(&layer).as_ref()))
}

/// Transforms from the source layer's spatial reference to `target`, None if they are the same
pub fn transform_between(source: Option<&SpatialRef>, target: Option<&SpatialRef>) -> Result<Option<CoordTransform>> {
    match (source, target) {
        (Some(s), Some(t)) if s != t => Ok(Some(CoordTransform::new(s, t)?)),
        _ => Ok(None),
    }
}

/// Writes a copy of the layer with every geometry transformed to `target_srs`
pub fn reproject_layer(src: &Dataset, src_layer: &str, dst: &mut Dataset, dst_layer: &str,
                       target_srs: &SpatialRef) -> Result<u64> {
    let mut input = src.layer_by_name(src_layer)
        .with_context(|| format!("Layer {} not found", src_layer))?;

    let source_srs = match layer_spatial_ref(&input) {
        Some(srs) => srs,
        None => bail!("Layer {} has no spatial reference, cannot re-project it", src_layer),
    };

    let transform = CoordTransform::new(&source_srs, target_srs)?;

    let columns = get_input_columns(&input);
    let geom_type = layer_geometry_type(&input);
    let output = create_output_layer(dst, dst_layer, Some(target_srs), geom_type, &columns)?;

    let count = write_mapped_features(&mut input, &output, &columns, true, |g| {
        Ok(Some(g.transform(&transform)?))
    })?;

    info!("Re-projected {} features from {} to {} ({})",
          count, spatial_ref_name(Some(&source_srs)), spatial_ref_name(Some(target_srs)), dst_layer);

    Ok(count)
}

#[cfg(test)]
mod transform_tests {
    use super::*;
    use crate::vector::{scratch_workspace, test_util::build_test_layer};
    use gdal::vector::{FieldValue, OGRFieldType};

    #[test]
    fn test_reproject_points() {
        let mut src = scratch_workspace().unwrap();
        build_test_layer(&mut src, "garages", 4326, &[("Name", OGRFieldType::OFTString)],
            &[("POINT (-99 30)", vec![FieldValue::StringValue("Central".to_string())])]).unwrap();

        let utm = spatial_ref_from_epsg(32614).unwrap();

        let mut dst = scratch_workspace().unwrap();
        assert_eq!(1, reproject_layer(&src, "garages", &mut dst, "garages_utm", &utm).unwrap());

        assert_eq!(spatial_reference_name(&dst, "garages_utm").unwrap(), "WGS 84 / UTM zone 14N");
        assert_eq!(spatial_reference_name(&src, "garages").unwrap(), "WGS 84");

        let mut layer = dst.layer_by_name("garages_utm").unwrap();
        let f = layer.features().next().unwrap();
        let env = f.geometry().unwrap().envelope();

        //-99 is the central meridian of zone 14, so x is the false easting
        assert!((env.MinX - 500_000.0).abs() < 0.01, "x {}", env.MinX);
        assert!((env.MinY - 3_318_785.0).abs() < 10.0, "y {}", env.MinY);
        assert_eq!(f.field_as_string_by_name("Name").unwrap(), Some("Central".to_string()));
    }

    #[test]
    fn test_transform_between_same_srs() {
        let a = spatial_ref_from_epsg(4326).unwrap();
        let b = spatial_ref_from_epsg(4326).unwrap();
        assert!(transform_between(Some(&a), Some(&b)).unwrap().is_none());
        assert!(transform_between(None, Some(&b)).unwrap().is_none());

        let c = spatial_ref_from_epsg(3857).unwrap();
        assert!(transform_between(Some(&a), Some(&c)).unwrap().is_some());
    }

    #[test]
    fn test_no_spatial_reference() {
        let mut src = scratch_workspace().unwrap();
        build_test_layer(&mut src, "no_srs", 0, &[], &[("POINT (1 1)", vec![])]).unwrap();

        assert_eq!(spatial_reference_name(&src, "no_srs").unwrap(), "Unknown");

        let mut dst = scratch_workspace().unwrap();
        let target = spatial_ref_from_epsg(4326).unwrap();
        assert!(reproject_layer(&src, "no_srs", &mut dst, "out", &target).is_err());
    }
}
