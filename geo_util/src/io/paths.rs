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
use std::path::{Path, PathBuf};

pub fn get_sub_dir<D, S>(directory_name: D, sub_dir: S) -> PathBuf
    where D: AsRef<Path>, S: AsRef<Path>
{
    let mut d = directory_name.as_ref().to_path_buf();
    d.push(sub_dir);
    d
}

/// Name of the last path component, used as a default layer name
pub fn path_stem<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
pub fn get_temp_filename(file_name: &str) -> PathBuf {
    let dir = get_sub_dir(std::env::temp_dir(), uuid::Uuid::new_v4().to_string());
    std::fs::create_dir_all(&dir).unwrap();
    get_sub_dir(dir, file_name)
}
