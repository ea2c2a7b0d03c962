//! Solution output.
//!
//! - **VTK output**: nodal solutions as VTU files for ParaView, single
//!   snapshots or numbered frame series

mod vtk;

pub use vtk::{VtkError, series_path, write_vtk_fields, write_vtk_scalar, write_vtk_series};
