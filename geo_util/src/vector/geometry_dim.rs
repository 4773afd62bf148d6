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
use anyhow::Result;
use gdal::vector::{Geometry, Layer, LayerAccess, OGRwkbGeometryType};

/// Topological dimension of a geometry type, None for collections and unknown types
pub fn geometry_dimension(geom_type: OGRwkbGeometryType::Type) -> Option<u8> {
    let flat = unsafe { gdal_sys::OGR_GT_Flatten(geom_type) };

    match flat {
        OGRwkbGeometryType::wkbPoint | OGRwkbGeometryType::wkbMultiPoint => Some(0),
        OGRwkbGeometryType::wkbLineString | OGRwkbGeometryType::wkbMultiLineString => Some(1),
        OGRwkbGeometryType::wkbPolygon | OGRwkbGeometryType::wkbMultiPolygon => Some(2),
        _ => None,
    }
}

pub fn multi_geometry_type(dimension: u8) -> OGRwkbGeometryType::Type {
    match dimension {
        0 => OGRwkbGeometryType::wkbMultiPoint,
        1 => OGRwkbGeometryType::wkbMultiLineString,
        _ => OGRwkbGeometryType::wkbMultiPolygon,
    }
}

fn is_multi(geom_type: OGRwkbGeometryType::Type) -> bool {
    let flat = unsafe { gdal_sys::OGR_GT_Flatten(geom_type) };
    flat == OGRwkbGeometryType::wkbMultiPoint
        || flat == OGRwkbGeometryType::wkbMultiLineString
        || flat == OGRwkbGeometryType::wkbMultiPolygon
}

pub fn layer_geometry_type(layer: &Layer) -> OGRwkbGeometryType::Type {
    unsafe { gdal_sys::OGR_L_GetGeomType(layer.c_layer()) }
}

/// Dimension of the layer's declared geometry type, falling back to the first feature
pub fn layer_dimension(layer: &mut Layer) -> Option<u8> {
    if let Some(dim) = geometry_dimension(layer_geometry_type(layer)) {
        return Some(dim);
    }

    let dim = layer.features()
        .filter_map(|f| f.geometry().and_then(|g| geometry_dimension(g.geometry_type())))
        .next();
    dim
}

/// Keeps the parts of `geom` that have the given dimension, as a multi geometry.
///
/// Returns None if nothing of that dimension is left (e.g. two polygons only touching on an edge).
pub fn into_multi(geom: &Geometry, dimension: u8) -> Result<Option<Geometry>> {
    let mut multi = Geometry::empty(multi_geometry_type(dimension))?;

    collect_parts(geom, dimension, &mut multi)?;

    if multi.geometry_count() == 0 {
        Ok(None)
    } else {
        Ok(Some(multi))
    }
}

fn collect_parts(geom: &Geometry, dimension: u8, multi: &mut Geometry) -> Result<()> {
    if geom.is_empty() {
        return Ok(());
    }

    let geom_type = geom.geometry_type();

    match geometry_dimension(geom_type) {
        Some(d) if d == dimension => {
            if is_multi(geom_type) {
                for i in 0..geom.geometry_count() {
                    let part = geom.get_geometry(i);
                    let part: &Geometry = &part;
                    multi.add_geometry(part.clone())?;
                }
            } else {
                multi.add_geometry(geom.clone())?;
            }
        }
        //lower or higher dimension parts are dropped
        Some(_) => {}
        None => {
            for i in 0..geom.geometry_count() {
                let part = geom.get_geometry(i);
                collect_parts(&part, dimension, multi)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod geometry_dim_tests {
    use super::*;

    #[test]
    fn test_geometry_dimension() {
        assert_eq!(Some(0), geometry_dimension(OGRwkbGeometryType::wkbPoint));
        assert_eq!(Some(0), geometry_dimension(OGRwkbGeometryType::wkbMultiPoint25D));
        assert_eq!(Some(1), geometry_dimension(OGRwkbGeometryType::wkbLineString));
        assert_eq!(Some(2), geometry_dimension(OGRwkbGeometryType::wkbMultiPolygon));
        assert_eq!(Some(2), geometry_dimension(OGRwkbGeometryType::wkbPolygon25D));
        assert_eq!(None, geometry_dimension(OGRwkbGeometryType::wkbGeometryCollection));
        assert_eq!(None, geometry_dimension(OGRwkbGeometryType::wkbUnknown));
    }

    #[test]
    fn test_polygon_to_multi() {
        let poly = Geometry::from_wkt("POLYGON ((0 0,0 1,1 1,1 0,0 0))").unwrap();
        let multi = into_multi(&poly, 2).unwrap().unwrap();
        assert_eq!(multi.geometry_type(), OGRwkbGeometryType::wkbMultiPolygon);
        assert_eq!(multi.geometry_count(), 1);
        assert!((multi.area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_collection_keeps_matching_parts() {
        let collection = Geometry::from_wkt(
            "GEOMETRYCOLLECTION (POINT (5 5),LINESTRING (0 0,1 1),POLYGON ((0 0,0 1,1 1,1 0,0 0)),\
             MULTIPOLYGON (((2 2,2 3,3 3,3 2,2 2)),((4 4,4 5,5 5,5 4,4 4))))").unwrap();

        let polygons = into_multi(&collection, 2).unwrap().unwrap();
        assert_eq!(polygons.geometry_count(), 3);

        let lines = into_multi(&collection, 1).unwrap().unwrap();
        assert_eq!(lines.geometry_type(), OGRwkbGeometryType::wkbMultiLineString);
        assert_eq!(lines.geometry_count(), 1);
    }

    #[test]
    fn test_lower_dimension_dropped() {
        let line = Geometry::from_wkt("LINESTRING (0 0,0 1)").unwrap();
        assert!(into_multi(&line, 2).unwrap().is_none());

        let empty = Geometry::from_wkt("POLYGON EMPTY").unwrap();
        assert!(into_multi(&empty, 2).unwrap().is_none());
    }
}
