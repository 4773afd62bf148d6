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
/// Convert between GDAL and GEOS geometries.  WKT is the exchange format.

use anyhow::Result;
use gdal::vector::Geometry as GdalGeometry;
use geos::{Geom, Geometry as GeosGeometry};

pub fn convert_gdal_to_geos(geom: &GdalGeometry) -> Result<GeosGeometry<'static>> {
    let wkt = geom.wkt()?;
    Ok(GeosGeometry::new_from_wkt(&wkt)?)
}

pub fn convert_geos_to_gdal(geom: &GeosGeometry) -> Result<GdalGeometry> {
    let wkt = geom.to_wkt()?;
    Ok(GdalGeometry::from_wkt(&wkt)?)
}

#[cfg(test)]
mod convert_tests {
    use super::*;

    #[test]
    fn test_polygon_with_hole() {
        let wkt = "POLYGON ((0 0,0 5,5 5,5 0,0 0),(1 1,1 2,2 2,2 1,1 1))";
        let gdal_geom = GdalGeometry::from_wkt(wkt).unwrap();

        let geos_geom = convert_gdal_to_geos(&gdal_geom).unwrap();
        assert!((geos_geom.area().unwrap() - 24.0).abs() < 1e-9);

        let back = convert_geos_to_gdal(&geos_geom).unwrap();
        assert_eq!(back.geometry_type(), gdal_geom.geometry_type());
        assert!((back.area() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_result() {
        let a = convert_gdal_to_geos(&GdalGeometry::from_wkt("POLYGON ((0 0,0 1,1 1,1 0,0 0))").unwrap()).unwrap();
        let b = convert_gdal_to_geos(&GdalGeometry::from_wkt("POLYGON ((5 5,5 6,6 6,6 5,5 5))").unwrap()).unwrap();

        let inter = a.intersection(&b).unwrap();
        assert!(inter.is_empty().unwrap());

        let back = convert_geos_to_gdal(&inter).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn test_multipoint() {
        let gdal_geom = GdalGeometry::from_wkt("MULTIPOINT ((0 0),(0 1),(1 2))").unwrap();
        let geos_geom = convert_gdal_to_geos(&gdal_geom).unwrap();
        assert_eq!(geos_geom.get_num_geometries().unwrap(), 3);
    }
}
