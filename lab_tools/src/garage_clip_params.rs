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
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use structopt::StructOpt;

use geo_util::io::get_sub_dir;
use geo_util::vector::BufferDistance;

/// Parameters of the garage clip workflow, from a TOML file, the command line or prompts
#[derive(StructOpt, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct GarageClipParams {
    #[structopt(long, help="Folder of the output geodatabase")]
    pub gdb_folder: Option<String>,

    #[structopt(long, help="Output geodatabase name, like Lab5.gdb")]
    pub gdb_name: Option<String>,

    #[structopt(long)]
    pub garage_csv: Option<String>,

    #[structopt(long)]
    pub garage_layer_name: Option<String>,

    #[structopt(long, help="Geodatabase with the Structures layer")]
    pub campus_gdb: Option<String>,

    #[structopt(long, help="BldgName of the garage to select")]
    pub selected_garage_name: Option<String>,

    #[structopt(long, help="Like '150 meters'")]
    pub buffer_radius: Option<String>,
}

/// Validated parameters
#[derive(Debug, Clone, PartialEq)]
pub struct GarageClipConfig {
    pub gdb_path: PathBuf,
    pub garage_csv: PathBuf,
    pub garage_layer_name: String,
    pub campus_gdb: PathBuf,
    pub selected_garage_name: String,
    pub buffer_radius: BufferDistance,
}

fn is_missing(value: &Option<String>) -> bool {
    match value {
        Some(s) => s.trim().is_empty(),
        None => true,
    }
}

fn required(value: &Option<String>, name: &str) -> Result<String> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s.clone()),
        _ => bail!("Parameter {} is missing", name),
    }
}

impl GarageClipParams {
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid parameter file {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Values set in `overrides` replace ours
    pub fn merge(self, overrides: GarageClipParams) -> GarageClipParams {
        GarageClipParams {
            gdb_folder: overrides.gdb_folder.or(self.gdb_folder),
            gdb_name: overrides.gdb_name.or(self.gdb_name),
            garage_csv: overrides.garage_csv.or(self.garage_csv),
            garage_layer_name: overrides.garage_layer_name.or(self.garage_layer_name),
            campus_gdb: overrides.campus_gdb.or(self.campus_gdb),
            selected_garage_name: overrides.selected_garage_name.or(self.selected_garage_name),
            buffer_radius: overrides.buffer_radius.or(self.buffer_radius),
        }
    }

    fn fields_mut(&mut self) -> Vec<(&mut Option<String>, &'static str)> {
        vec![
            (&mut self.gdb_folder, "Enter the path for the GDB Folder (e.g., '***/Labs/Lab5'): "),
            (&mut self.gdb_name, "Enter the GDB Name (e.g., 'Lab5.gdb'): "),
            (&mut self.garage_csv, "Enter the path for the Garage CSV File (e.g., '***/Labs/Lab5/garages.csv'): "),
            (&mut self.garage_layer_name, "Enter the Garage Layer Name (e.g., 'garages'): "),
            (&mut self.campus_gdb, "Enter the path for the Campus GDB (e.g., '***/Labs/Lab5/Campus.gdb'): "),
            (&mut self.selected_garage_name, "Enter the name of the garage to select (e.g., 'Northside Parking Garage'): "),
            (&mut self.buffer_radius, "Enter the Buffer Radius (e.g., '150 meters'): "),
        ]
    }

    /// Asks for every parameter that is still missing.  Stops asking at the end of the input.
    pub fn prompt_missing<R: BufRead, W: Write>(&mut self, mut reader: R, mut writer: W) -> Result<()> {
        let mut fields = self.fields_mut();

        if fields.iter().all(|(value, _)| !is_missing(value)) {
            return Ok(());
        }

        writeln!(writer, "Please input the following parameters:\n")?;

        for (value, prompt) in fields.iter_mut().filter(|(value, _)| is_missing(value)) {
            write!(writer, "{}", prompt)?;
            writer.flush()?;

            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            **value = Some(line.trim_end_matches(&['\r', '\n'][..]).to_string());
        }

        Ok(())
    }

    /// Checks every parameter before anything is processed.
    ///
    /// The CSV file is not checked, a failed import is reported by the workflow.
    pub fn validate(&self) -> Result<GarageClipConfig> {
        let gdb_folder = PathBuf::from(required(&self.gdb_folder, "gdb_folder")?);
        let gdb_name = required(&self.gdb_name, "gdb_name")?;
        let garage_csv = PathBuf::from(required(&self.garage_csv, "garage_csv")?);
        let garage_layer_name = required(&self.garage_layer_name, "garage_layer_name")?;
        let campus_gdb = PathBuf::from(required(&self.campus_gdb, "campus_gdb")?);
        let selected_garage_name = required(&self.selected_garage_name, "selected_garage_name")?;
        let buffer_radius = required(&self.buffer_radius, "buffer_radius")?;

        if !gdb_folder.is_dir() {
            bail!("GDB folder {} does not exist", gdb_folder.display());
        }

        if !campus_gdb.exists() {
            bail!("Campus GDB {} does not exist", campus_gdb.display());
        }

        let buffer_radius: BufferDistance = buffer_radius.parse()
            .with_context(|| format!("Invalid buffer radius {:?}", buffer_radius))?;

        Ok(GarageClipConfig {
            gdb_path: get_sub_dir(&gdb_folder, gdb_name),
            garage_csv,
            garage_layer_name,
            campus_gdb,
            selected_garage_name,
            buffer_radius,
        })
    }
}
