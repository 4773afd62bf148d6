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
use std::path::Path;

use anyhow::{bail, Context, Result};
use gdal::Dataset;
use gdal::spatial_ref::SpatialRef;
use gdal::vector::{Feature, FieldValue, Geometry, LayerAccess, OGRFieldType, OGRwkbGeometryType};
use log::info;

use crate::vector::{create_output_layer, set_field_values, InputColumnInfo};

fn parse_coordinate(value: &str, field: &str, line: u64) -> Result<f64> {
    let coord: f64 = value.trim().parse()
        .with_context(|| format!("Line {}: cannot parse {} value {:?}", line, field, value))?;
    if !coord.is_finite() {
        bail!("Line {}: {} value {:?} is not a finite number", line, field, value);
    }
    Ok(coord)
}

/// Imports a CSV file with coordinate columns as a point layer.
///
/// The coordinate columns are kept as real fields, every other column as a string field.
pub fn import_csv_points<P: AsRef<Path>>(
    csv_path: P,
    dst: &mut Dataset,
    dst_layer: &str,
    x_field: &str,
    y_field: &str,
    srs: Option<&SpatialRef>,
) -> Result<u64> {
    let csv_path = csv_path.as_ref();
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Cannot open {:?}", csv_path))?;

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let x_idx = match headers.iter().position(|h| h == x_field) {
        Some(i) => i,
        None => bail!("Column {} not found in {:?}, columns are {:?}", x_field, csv_path, headers),
    };
    let y_idx = match headers.iter().position(|h| h == y_field) {
        Some(i) => i,
        None => bail!("Column {} not found in {:?}, columns are {:?}", y_field, csv_path, headers),
    };

    let columns: Vec<InputColumnInfo> = headers.iter().enumerate().map(|(idx, name)| {
        if idx == x_idx || idx == y_idx {
            InputColumnInfo::new(name.as_str(), OGRFieldType::OFTReal)
        } else {
            InputColumnInfo::new(name.as_str(), OGRFieldType::OFTString)
        }
    }).collect();

    //every row is checked before the output layer replaces an existing one
    let mut points = Vec::new();

    for record in reader.records() {
        let record = record?;
        //header is line 1
        let line = record.position().map(|p| p.line()).unwrap_or(points.len() as u64 + 2);

        let x = parse_coordinate(record.get(x_idx).unwrap_or(""), x_field, line)?;
        let y = parse_coordinate(record.get(y_idx).unwrap_or(""), y_field, line)?;

        let values: Vec<Option<FieldValue>> = (0..columns.len()).map(|idx| {
            if idx == x_idx {
                Some(FieldValue::RealValue(x))
            } else if idx == y_idx {
                Some(FieldValue::RealValue(y))
            } else {
                match record.get(idx) {
                    Some(s) if !s.is_empty() => Some(FieldValue::StringValue(s.to_string())),
                    _ => None,
                }
            }
        }).collect();

        points.push((x, y, values));
    }

    let output = create_output_layer(dst, dst_layer, srs, OGRwkbGeometryType::wkbPoint, &columns)?;

    for (x, y, values) in points.iter() {
        let mut ft = Feature::new(output.defn())?;
        ft.set_geometry(Geometry::from_wkt(&format!("POINT ({} {})", x, y))?)?;
        set_field_values(&mut ft, &columns, values)?;
        ft.create(&output)?;
    }

    let count = points.len() as u64;

    info!("Imported {} points from {:?} into {}", count, csv_path, dst_layer);

    Ok(count)
}

#[cfg(test)]
mod csv_points_tests {
    use super::*;
    use std::fs;
    use crate::io::get_temp_filename;
    use crate::vector::{get_input_columns, layer_exists, scratch_workspace, spatial_ref_from_epsg};

    #[test]
    fn test_import_csv_points() {
        let csv_path = get_temp_filename("garages.csv");
        fs::write(&csv_path, "Name,X,Y,Type\n\
            West Campus Garage,-96.3512,30.6123,Garage\n\
            Lot 100,-96.34,30.61,\n").unwrap();

        let srs = spatial_ref_from_epsg(4326).unwrap();
        let mut ds = scratch_workspace().unwrap();
        let count = import_csv_points(&csv_path, &mut ds, "garages", "X", "Y", Some(&srs)).unwrap();
        assert_eq!(count, 2);

        let mut layer = ds.layer_by_name("garages").unwrap();
        let columns = get_input_columns(&layer);
        assert_eq!(columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), vec!["Name", "X", "Y", "Type"]);
        assert_eq!(columns[1].ogr_type, OGRFieldType::OFTReal);
        assert_eq!(columns[3].ogr_type, OGRFieldType::OFTString);

        let features: Vec<_> = layer.features().collect();
        let point = features[0].geometry().unwrap().get_point(0);
        assert!((point.0 - -96.3512).abs() < 1e-9);
        assert!((point.1 - 30.6123).abs() < 1e-9);
        assert_eq!(features[0].field_as_string_by_name("Name").unwrap().unwrap(), "West Campus Garage");
        assert!(features[1].field("Type").unwrap().is_none());
    }

    #[test]
    fn test_bad_coordinate_names_line() {
        let csv_path = get_temp_filename("bad.csv");
        fs::write(&csv_path, "Name,X,Y\nA,1,2\nB,abc,3\n").unwrap();

        let mut ds = scratch_workspace().unwrap();
        let err = import_csv_points(&csv_path, &mut ds, "garages", "X", "Y", None).unwrap_err();
        assert!(format!("{:#}", err).contains("Line 3"), "{:#}", err);
        assert!(!layer_exists(&ds, "garages"));
    }

    #[test]
    fn test_bad_coordinate_keeps_existing_layer() {
        let good_csv = get_temp_filename("good.csv");
        fs::write(&good_csv, "Name,X,Y
A,1,2
B,3,4
C,5,6
").unwrap();
        let bad_csv = get_temp_filename("bad.csv");
        fs::write(&bad_csv, "Name,X,Y
A,1,2
B,abc,3
").unwrap();

        let mut ds = scratch_workspace().unwrap();
        assert_eq!(3, import_csv_points(&good_csv, &mut ds, "garages", "X", "Y", None).unwrap());
        assert!(import_csv_points(&bad_csv, &mut ds, "garages", "X", "Y", None).is_err());

        assert_eq!(ds.layer_by_name("garages").unwrap().feature_count(), 3);
    }

    #[test]
    fn test_missing_column() {
        let csv_path = get_temp_filename("no_y.csv");
        fs::write(&csv_path, "Name,X\nA,1\n").unwrap();

        let mut ds = scratch_workspace().unwrap();
        assert!(import_csv_points(&csv_path, &mut ds, "garages", "X", "Y", None).is_err());
    }
}
