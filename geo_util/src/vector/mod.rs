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
mod buffer;
mod columns;
mod csv_points;
mod geometry_dim;
mod layer_copy;
mod overlay;
mod rtree_index_object;
mod transform;
mod utm;
mod workspace;

#[cfg(test)]
pub mod test_util;

pub use buffer::*;
pub use columns::*;
pub use csv_points::*;
pub use geometry_dim::*;
pub use layer_copy::*;
pub use overlay::*;
pub use rtree_index_object::*;
pub use transform::*;
pub use utm::*;
pub use workspace::*;
