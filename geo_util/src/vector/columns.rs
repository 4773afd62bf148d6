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
use gdal::vector::{Feature, FieldDefn, FieldValue, LayerAccess, OGRFieldType};
use anyhow::Result;

#[derive(Clone, Debug, PartialEq)]
pub struct InputColumnInfo {
    pub ogr_type: OGRFieldType::Type,
    pub name: String,
    pub width: i32,
    pub precision: i32,
}

impl InputColumnInfo {
    pub fn new<S: Into<String>>(name: S, ogr_type: OGRFieldType::Type) -> Self {
        InputColumnInfo {
            ogr_type,
            name: name.into(),
            width: 0,
            precision: 0,
        }
    }

    pub fn renamed<S: Into<String>>(&self, name: S) -> Self {
        InputColumnInfo {
            name: name.into(),
            ..self.clone()
        }
    }
}

pub fn get_input_columns<L: LayerAccess>(layer: &L) -> Vec<InputColumnInfo>
{
    layer.defn().fields().map(|field|
        InputColumnInfo {
            ogr_type: field.field_type(),
            name: field.name(),
            width: field.width(),
            precision: field.precision(),
        }).collect()
}

pub fn add_columns_to_layer<L: LayerAccess>(out_lyr: &L, input_columns: &[InputColumnInfo]) -> Result<()> {
    for ci in input_columns.iter() {
        let field_defn = FieldDefn::new(&ci.name, ci.ogr_type)?;
        if ci.width > 0 {
            field_defn.set_width(ci.width);
        }
        if ci.precision > 0 {
            field_defn.set_precision(ci.precision);
        }
        field_defn.add_to_layer(out_lyr)?;
    }
    Ok(())
}

/// Renames columns that clash (OGR field names are case insensitive) with `taken`,
/// by appending `_1`, `_2`, ...
pub fn rename_clashing_columns(columns: &[InputColumnInfo], taken: &[InputColumnInfo]) -> Vec<InputColumnInfo> {
    let mut used: Vec<String> = taken.iter().map(|c| c.name.to_ascii_lowercase()).collect();
    let mut renamed = Vec::with_capacity(columns.len());

    for ci in columns.iter() {
        let mut name = ci.name.clone();
        let mut suffix = 1;
        while used.contains(&name.to_ascii_lowercase()) {
            name = format!("{}_{}", ci.name, suffix);
            suffix += 1;
        }
        used.push(name.to_ascii_lowercase());
        renamed.push(ci.renamed(name));
    }

    renamed
}

pub fn read_field_values(feature: &Feature, columns: &[InputColumnInfo]) -> Result<Vec<Option<FieldValue>>> {
    let mut values = Vec::with_capacity(columns.len());
    for ci in columns.iter() {
        values.push(feature.field(&ci.name)?);
    }
    Ok(values)
}

/// Sets the values on the output feature, nulls are left unset
pub fn set_field_values(feature: &mut Feature, columns: &[InputColumnInfo], values: &[Option<FieldValue>]) -> Result<()> {
    for (ci, value) in columns.iter().zip(values.iter()) {
        if let Some(v) = value {
            feature.set_field(&ci.name, v)?;
        }
    }
    Ok(())
}

pub fn field_type_name(ogr_type: OGRFieldType::Type) -> &'static str {
    match ogr_type {
        OGRFieldType::OFTInteger => "int32",
        OGRFieldType::OFTInteger64 => "int64",
        OGRFieldType::OFTReal => "float64",
        OGRFieldType::OFTString => "object",
        OGRFieldType::OFTDate => "date",
        OGRFieldType::OFTTime => "time",
        OGRFieldType::OFTDateTime => "datetime",
        OGRFieldType::OFTBinary => "binary",
        _ => "list",
    }
}

pub fn field_value_to_string(value: &Option<FieldValue>) -> String {
    match value {
        None => "None".to_string(),
        Some(FieldValue::IntegerValue(v)) => v.to_string(),
        Some(FieldValue::Integer64Value(v)) => v.to_string(),
        Some(FieldValue::RealValue(v)) => v.to_string(),
        Some(FieldValue::StringValue(v)) => v.clone(),
        Some(other) => format!("{:?}", other),
    }
}
