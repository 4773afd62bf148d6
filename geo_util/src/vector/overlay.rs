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
use anyhow::{Context, Result};
use gdal::Dataset;
use gdal::spatial_ref::CoordTransform;
use gdal::vector::{Feature, FieldValue, Layer, LayerAccess, OGRFieldType};
use geos::{Geom, Geometry as GeosGeometry};
use log::{debug, info};
use rstar::RTree;

use crate::convert::{convert_gdal_to_geos, convert_geos_to_gdal};
use crate::util::ProgressReporter;
use crate::vector::{create_output_layer, get_input_columns, into_multi, layer_dimension,
                    layer_spatial_ref, multi_geometry_type, read_field_values, rename_clashing_columns,
                    set_field_values, transform_between, envelope_to_aabb, write_mapped_features,
                    InputColumnInfo, RTreeIndexObject};

/// A feature held in memory for overlays
struct LoadedFeature {
    fid: Option<u64>,
    geometry: GeosGeometry<'static>,
    values: Vec<Option<FieldValue>>,
}

/// Reads all features with a geometry, transformed with `transform` when given
fn load_features(layer: &mut Layer, columns: &[InputColumnInfo], transform: Option<&CoordTransform>)
    -> Result<(Vec<LoadedFeature>, RTree<RTreeIndexObject>)>
{
    let mut features = Vec::new();
    let mut index_objects = Vec::new();

    for f in layer.features() {
        let geom = match f.geometry() {
            Some(g) => g,
            None => continue,
        };

        let geom = match transform {
            Some(t) => geom.transform(t)?,
            None => geom.clone(),
        };

        if geom.is_empty() {
            continue;
        }

        index_objects.push(RTreeIndexObject::new(features.len(), &geom.envelope()));

        features.push(LoadedFeature {
            fid: f.fid(),
            geometry: convert_gdal_to_geos(&geom)?,
            values: read_field_values(&f, columns)?,
        });
    }

    Ok((features, RTree::bulk_load(index_objects)))
}

fn fid_column(layer_name: &str) -> InputColumnInfo {
    InputColumnInfo::new(format!("FID_{}", layer_name), OGRFieldType::OFTInteger64)
}

fn fid_value(fid: Option<u64>) -> Option<FieldValue> {
    fid.map(|fid| FieldValue::Integer64Value(fid as i64))
}

/// Intersects every pair of overlapping features of the 2 layers.
///
/// The output uses the spatial reference of `lhs`, `rhs` is re-projected if needed.
/// Attributes of both sides are kept, prefixed by the source FIDs.  The output
/// dimension is the lowest of both inputs, lower dimension slivers are dropped.
pub fn intersect_layers(lhs_ds: &Dataset, lhs_layer: &str,
                        rhs_ds: &Dataset, rhs_layer: &str,
                        dst: &mut Dataset, dst_layer: &str) -> Result<u64> {
    let mut lhs = lhs_ds.layer_by_name(lhs_layer)
        .with_context(|| format!("Layer {} not found", lhs_layer))?;
    let mut rhs = rhs_ds.layer_by_name(rhs_layer)
        .with_context(|| format!("Layer {} not found", rhs_layer))?;

    let lhs_srs = layer_spatial_ref(&lhs);
    let rhs_srs = layer_spatial_ref(&rhs);
    let rhs_transform = transform_between(rhs_srs.as_ref(), lhs_srs.as_ref())?;
    if rhs_transform.is_some() {
        debug!("Re-projecting {} to the spatial reference of {}", rhs_layer, lhs_layer);
    }

    let dimension = match (layer_dimension(&mut lhs), layer_dimension(&mut rhs)) {
        (Some(l), Some(r)) => l.min(r),
        (Some(d), None) | (None, Some(d)) => d,
        (None, None) => 2,
    };

    let lhs_fid_column = fid_column(lhs_layer);
    let lhs_columns = rename_clashing_columns(&get_input_columns(&lhs), &[lhs_fid_column.clone()]);
    let lhs_source_columns = get_input_columns(&lhs);

    let mut taken = vec![lhs_fid_column.clone()];
    taken.extend(lhs_columns.iter().cloned());
    let rhs_fid_column = rename_clashing_columns(&[fid_column(rhs_layer)], &taken).remove(0);
    taken.push(rhs_fid_column.clone());
    let rhs_source_columns = get_input_columns(&rhs);
    let rhs_columns = rename_clashing_columns(&rhs_source_columns, &taken);

    let mut output_columns = vec![lhs_fid_column.clone()];
    output_columns.extend(lhs_columns.iter().cloned());
    output_columns.push(rhs_fid_column.clone());
    output_columns.extend(rhs_columns.iter().cloned());

    let (rhs_features, rhs_tree) = load_features(&mut rhs, &rhs_source_columns, rhs_transform.as_ref())?;

    let output = create_output_layer(dst, dst_layer, lhs_srs.as_ref(),
                                     multi_geometry_type(dimension), &output_columns)?;

    let mut progress = ProgressReporter::new(lhs.feature_count());
    let mut count = 0;

    for (idx, lhs_feature) in lhs.features().enumerate() {
        progress.tick(idx as u64);

        let lhs_geom = match lhs_feature.geometry() {
            Some(g) if !g.is_empty() => g,
            _ => continue,
        };

        let query = envelope_to_aabb(&lhs_geom.envelope());
        let mut candidates: Vec<usize> = rhs_tree.locate_in_envelope_intersecting(&query)
            .map(|o| o.feature_idx)
            .collect();
        if candidates.is_empty() {
            continue;
        }
        //keep the input order of rhs
        candidates.sort_unstable();

        let lhs_shape = convert_gdal_to_geos(lhs_geom)?;
        let lhs_values = read_field_values(&lhs_feature, &lhs_source_columns)?;

        for rhs_idx in candidates {
            let rhs_feature = &rhs_features[rhs_idx];

            if !lhs_shape.intersects(&rhs_feature.geometry)? {
                continue;
            }

            let intersection = convert_geos_to_gdal(&lhs_shape.intersection(&rhs_feature.geometry)?)?;

            let geom = match into_multi(&intersection, dimension)? {
                Some(g) => g,
                None => continue,
            };

            let mut ft = Feature::new(output.defn())?;
            ft.set_geometry(geom)?;

            set_field_values(&mut ft, &[lhs_fid_column.clone()], &[fid_value(lhs_feature.fid())])?;
            set_field_values(&mut ft, &lhs_columns, &lhs_values)?;
            set_field_values(&mut ft, &[rhs_fid_column.clone()], &[fid_value(rhs_feature.fid)])?;
            set_field_values(&mut ft, &rhs_columns, &rhs_feature.values)?;

            ft.create(&output)?;
            count += 1;
        }
    }

    info!("Intersected {} and {} into {} features", lhs_layer, rhs_layer, count);

    Ok(count)
}

/// Cuts the input features by the union of the clip layer's features.
///
/// Input attributes are kept, features falling outside the clip area are dropped.
pub fn clip_layer(input_ds: &Dataset, input_layer: &str,
                  clip_ds: &Dataset, clip_layer_name: &str,
                  dst: &mut Dataset, dst_layer: &str) -> Result<u64> {
    let mut input = input_ds.layer_by_name(input_layer)
        .with_context(|| format!("Layer {} not found", input_layer))?;
    let mut clip = clip_ds.layer_by_name(clip_layer_name)
        .with_context(|| format!("Layer {} not found", clip_layer_name))?;

    let input_srs = layer_spatial_ref(&input);
    let clip_transform = transform_between(layer_spatial_ref(&clip).as_ref(), input_srs.as_ref())?;

    let (clip_features, _) = load_features(&mut clip, &[], clip_transform.as_ref())?;

    let clip_area = if clip_features.is_empty() {
        None
    } else {
        let shapes = clip_features.into_iter().map(|f| f.geometry).collect();
        Some(GeosGeometry::create_geometry_collection(shapes)?.unary_union()?)
    };

    let dimension = layer_dimension(&mut input).unwrap_or(2);
    let columns = get_input_columns(&input);
    let output = create_output_layer(dst, dst_layer, input_srs.as_ref(),
                                     multi_geometry_type(dimension), &columns)?;

    let clip_area = match clip_area {
        Some(a) => a,
        None => {
            info!("Clip layer {} is empty, nothing to clip", clip_layer_name);
            return Ok(0);
        }
    };

    let count = write_mapped_features(&mut input, &output, &columns, false, |g| {
        if g.is_empty() {
            return Ok(None);
        }
        let shape = convert_gdal_to_geos(g)?;
        if !shape.intersects(&clip_area)? {
            return Ok(None);
        }
        let clipped = convert_geos_to_gdal(&shape.intersection(&clip_area)?)?;
        into_multi(&clipped, dimension)
    })?;

    info!("Clipped {} by {}, {} features kept", input_layer, clip_layer_name, count);

    Ok(count)
}
