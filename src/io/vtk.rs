//! VTU (XML UnstructuredGrid) export of nodal DG solutions.
//!
//! Every dof becomes one VTK point at its support point, and each cell of
//! order p is split into p² VTK_QUAD sub-cells over its node lattice, so the
//! discontinuities between cells survive in ParaView.

use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::mesh::DofHandler;

/// VTK cell type id of a bilinear quad.
const VTK_QUAD: u8 = 9;

/// Error type for VTK operations.
#[derive(Debug, Error)]
pub enum VtkError {
    #[error("VTK I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Solution length does not match the dof handler.
    #[error("field '{name}' has {got} values, expected {expected}")]
    SizeMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
}

/// Point cloud and sub-cell connectivity of a dof handler.
struct VtkMesh<'a> {
    points: &'a [(f64, f64)],
    cells: Vec<[usize; 4]>,
    cell_ids: Vec<usize>,
}

fn build_vtk_mesh(dofs: &DofHandler) -> VtkMesh<'_> {
    let n_1d = dofs.order + 1;
    let per_cell = dofs.order * dofs.order;
    let mut cells = Vec::with_capacity(dofs.n_cells() * per_cell);
    let mut cell_ids = Vec::with_capacity(dofs.n_cells() * per_cell);

    for k in 0..dofs.n_cells() {
        let idx = dofs.cell_dof_indices(k);
        // Counter-clockwise corners of lattice square (i, j)
        for j in 0..dofs.order {
            for i in 0..dofs.order {
                cells.push([
                    idx[j * n_1d + i],
                    idx[j * n_1d + i + 1],
                    idx[(j + 1) * n_1d + i + 1],
                    idx[(j + 1) * n_1d + i],
                ]);
                cell_ids.push(k);
            }
        }
    }

    VtkMesh {
        points: dofs.support_points(),
        cells,
        cell_ids,
    }
}

/// Indented XML emitter.
struct VtkWriter<W: Write> {
    writer: BufWriter<W>,
    indent: usize,
}

impl<W: Write> VtkWriter<W> {
    fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            indent: 0,
        }
    }

    fn write_indent(&mut self) -> std::io::Result<()> {
        write!(self.writer, "{:width$}", "", width = 2 * self.indent)
    }

    fn write_header(&mut self) -> std::io::Result<()> {
        writeln!(self.writer, "<?xml version=\"1.0\"?>")?;
        writeln!(
            self.writer,
            "<VTKFile type=\"UnstructuredGrid\" version=\"0.1\" byte_order=\"LittleEndian\">"
        )?;
        self.indent += 1;
        Ok(())
    }

    fn write_footer(&mut self) -> std::io::Result<()> {
        self.indent -= 1;
        writeln!(self.writer, "</VTKFile>")?;
        self.writer.flush()
    }

    fn start_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> std::io::Result<()> {
        self.write_indent()?;
        write!(self.writer, "<{}", name)?;
        for (key, value) in attrs {
            write!(self.writer, " {}=\"{}\"", key, value)?;
        }
        writeln!(self.writer, ">")?;
        self.indent += 1;
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> std::io::Result<()> {
        self.indent -= 1;
        self.write_indent()?;
        writeln!(self.writer, "</{}>", name)
    }

    /// One `<DataArray>`; `per_line` values per text line.
    fn write_data_array<T, I>(
        &mut self,
        vtk_type: &str,
        attrs: &str,
        values: I,
        per_line: usize,
    ) -> std::io::Result<()>
    where
        T: Display,
        I: IntoIterator<Item = T>,
    {
        self.write_indent()?;
        writeln!(
            self.writer,
            "<DataArray type=\"{}\"{} format=\"ascii\">",
            vtk_type, attrs
        )?;

        self.indent += 1;
        self.write_indent()?;
        for (i, v) in values.into_iter().enumerate() {
            if i > 0 {
                if i % per_line == 0 {
                    writeln!(self.writer)?;
                    self.write_indent()?;
                } else {
                    write!(self.writer, " ")?;
                }
            }
            write!(self.writer, "{}", v)?;
        }
        writeln!(self.writer)?;
        self.indent -= 1;

        self.write_indent()?;
        writeln!(self.writer, "</DataArray>")
    }

    fn write_points(&mut self, points: &[(f64, f64)]) -> std::io::Result<()> {
        self.start_element("Points", &[])?;
        let coords = points
            .iter()
            .flat_map(|&(x, y)| [x, y, 0.0])
            .map(|c| format!("{:.10e}", c));
        self.write_data_array("Float64", " NumberOfComponents=\"3\"", coords, 6)?;
        self.end_element("Points")
    }

    fn write_cells(&mut self, cells: &[[usize; 4]]) -> std::io::Result<()> {
        self.start_element("Cells", &[])?;
        self.write_data_array(
            "Int32",
            " Name=\"connectivity\"",
            cells.iter().flatten(),
            20,
        )?;
        self.write_data_array(
            "Int32",
            " Name=\"offsets\"",
            (1..=cells.len()).map(|i| 4 * i),
            20,
        )?;
        self.write_data_array(
            "UInt8",
            " Name=\"types\"",
            std::iter::repeat_n(VTK_QUAD, cells.len()),
            20,
        )?;
        self.end_element("Cells")
    }

    fn write_scalar(&mut self, name: &str, values: &[f64]) -> std::io::Result<()> {
        self.write_data_array(
            "Float64",
            &format!(" Name=\"{}\"", name),
            values.iter().map(|v| format!("{:.10e}", v)),
            6,
        )
    }

    fn write_time(&mut self, time: f64) -> std::io::Result<()> {
        self.start_element("FieldData", &[])?;
        self.write_data_array(
            "Float64",
            " Name=\"TimeValue\" NumberOfTuples=\"1\"",
            [format!("{:.10e}", time)],
            1,
        )?;
        self.end_element("FieldData")
    }
}

/// Write named nodal fields on the dofs of `dofs` to a VTU file.
///
/// The first field is marked as the active scalar. Each field must have
/// one value per dof.
pub fn write_vtk_fields(
    path: impl AsRef<Path>,
    dofs: &DofHandler,
    fields: &[(&str, &[f64])],
    time: f64,
) -> Result<(), VtkError> {
    for &(name, values) in fields {
        if values.len() != dofs.n_dofs {
            return Err(VtkError::SizeMismatch {
                name: name.to_string(),
                expected: dofs.n_dofs,
                got: values.len(),
            });
        }
    }

    let vtk_mesh = build_vtk_mesh(dofs);
    let path = path.as_ref();
    let mut writer = VtkWriter::new(File::create(path)?);

    writer.write_header()?;
    writer.start_element("UnstructuredGrid", &[])?;
    writer.write_time(time)?;
    writer.start_element(
        "Piece",
        &[
            ("NumberOfPoints", &vtk_mesh.points.len().to_string()),
            ("NumberOfCells", &vtk_mesh.cells.len().to_string()),
        ],
    )?;

    writer.write_points(vtk_mesh.points)?;
    writer.write_cells(&vtk_mesh.cells)?;

    let active = fields.first().map_or("", |(name, _)| *name);
    writer.start_element("PointData", &[("Scalars", active)])?;
    for &(name, values) in fields {
        writer.write_scalar(name, values)?;
    }
    writer.end_element("PointData")?;

    writer.start_element("CellData", &[("Scalars", "cell_id")])?;
    writer.write_data_array("Int32", " Name=\"cell_id\"", &vtk_mesh.cell_ids, 20)?;
    writer.end_element("CellData")?;

    writer.end_element("Piece")?;
    writer.end_element("UnstructuredGrid")?;
    writer.write_footer()?;

    debug!(path = %path.display(), n_points = vtk_mesh.points.len(), "wrote VTU");
    Ok(())
}

/// Write a single scalar field named `phi`.
pub fn write_vtk_scalar(
    path: impl AsRef<Path>,
    dofs: &DofHandler,
    values: &[f64],
    time: f64,
) -> Result<(), VtkError> {
    write_vtk_fields(path, dofs, &[("phi", values)], time)
}

/// Frame path `<dir>/<stem>_NNNN.vtu` for `base_path = <dir>/<stem>[.ext]`.
pub fn series_path(base_path: impl AsRef<Path>, frame: usize) -> PathBuf {
    let base = base_path.as_ref();
    let stem = base.file_stem().unwrap_or_default().to_string_lossy();
    let parent = base.parent().unwrap_or(Path::new("."));
    parent.join(format!("{}_{:04}.vtu", stem, frame))
}

/// Write frame `frame` of a series; returns the created path.
pub fn write_vtk_series(
    base_path: impl AsRef<Path>,
    frame: usize,
    dofs: &DofHandler,
    values: &[f64],
    time: f64,
) -> Result<PathBuf, VtkError> {
    let path = series_path(base_path, frame);
    write_vtk_scalar(&path, dofs, values, time)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh2D;

    fn dofs(n: usize, order: usize) -> DofHandler {
        let mesh = Mesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, n, n);
        DofHandler::new(&mesh, order)
    }

    #[test]
    fn test_subcell_counts() {
        let d = dofs(2, 1);
        let m = build_vtk_mesh(&d);
        assert_eq!(m.points.len(), 16);
        assert_eq!(m.cells.len(), 4);

        let d = dofs(1, 3);
        let m = build_vtk_mesh(&d);
        assert_eq!(m.points.len(), 16);
        assert_eq!(m.cells.len(), 9);
        assert!(m.cell_ids.iter().all(|&k| k == 0));
    }

    #[test]
    fn test_subcells_are_counter_clockwise() {
        let d = dofs(2, 2);
        let m = build_vtk_mesh(&d);
        for cell in &m.cells {
            let p: Vec<_> = cell.iter().map(|&v| m.points[v]).collect();
            // Shoelace area is positive for counter-clockwise order
            let area: f64 = (0..4)
                .map(|a| {
                    let b = (a + 1) % 4;
                    p[a].0 * p[b].1 - p[b].0 * p[a].1
                })
                .sum();
            assert!(area > 0.0);
        }
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phi.vtu");
        let d = dofs(2, 2);
        let values = d.interpolate(|x, y| x + y);

        write_vtk_scalar(&path, &d, &values, 0.5).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("UnstructuredGrid"));
        assert!(content.contains("Name=\"phi\""));
        assert!(content.contains("NumberOfPoints=\"36\""));
        assert!(content.contains("NumberOfCells=\"16\""));
        assert!(content.trim_end().ends_with("</VTKFile>"));
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let d = dofs(1, 1);
        let err = write_vtk_scalar(dir.path().join("bad.vtu"), &d, &[0.0; 3], 0.0).unwrap_err();
        assert!(matches!(
            err,
            VtkError::SizeMismatch {
                expected: 4,
                got: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_series_naming() {
        let dir = tempfile::tempdir().unwrap();
        let d = dofs(1, 1);
        let path = write_vtk_series(dir.path().join("output"), 42, &d, &[1.0; 4], 0.0).unwrap();
        assert!(path.ends_with("output_0042.vtu"));
        assert!(path.exists());
        assert_eq!(
            series_path("run/solution.vtu", 7),
            Path::new("run").join("solution_0007.vtu")
        );
    }
}
