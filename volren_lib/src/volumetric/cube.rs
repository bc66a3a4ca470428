/*
    volren_lib
    Author: Michal Majer
    Date: 2022-05-05
*/

//! Gaussian cube files.
//!
//! ```text
//! title line
//! title line
//! <atoms> <origin x y z>
//! <nx> <axis x vector>
//! <ny> <axis y vector>
//! <nz> <axis z vector>
//! <element> <charge> <x y z>   (one line per atom)
//! <data, x outer, y middle, z inner>
//! ```
//!
//! Negative atom count means lengths are in Ångström, positive means Bohr.
//! Loaded files always hold Ångström.

use std::{io::Write, path::Path};

use nalgebra::{Point3, Vector3};
use nom::{
    character::complete::{i64 as parse_i64, line_ending, multispace0, not_line_ending},
    combinator::opt,
    multi::count,
    number::complete::double,
    sequence::{preceded, terminated, tuple},
    IResult,
};

use super::{voxel_count, VolumeGrid};
use crate::error::VolumeError;

pub const ANGSTROMS_IN_BOHR: f64 = 0.529177249;

#[derive(Debug, Clone, PartialEq)]
pub struct CubeAtom {
    /// Atomic number
    pub element: i64,
    pub charge: f64,
    pub position: Point3<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CubeFile {
    pub titles: [String; 2],
    pub origin: Point3<f64>,
    /// Number of voxels along each axis
    pub counts: [usize; 3],
    /// Voxel step along each axis
    pub axes: [Vector3<f64>; 3],
    pub atoms: Vec<CubeAtom>,
    pub data: Vec<f32>,
}

impl CubeFile {
    /// `None` if the voxel count overflows
    pub fn sample_count(&self) -> Option<usize> {
        let [nx, ny, nz] = self.counts;
        voxel_count(nx, ny, nz)
    }
}

// Every number takes at least one character and one separator
fn max_numbers(text: &str) -> usize {
    text.len() / 2 + 1
}

fn ws<'a, O>(
    inner: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    preceded(multispace0, inner)
}

fn title(s: &str) -> IResult<&str, &str> {
    terminated(not_line_ending, opt(line_ending))(s)
}

fn vector3(s: &str) -> IResult<&str, Vector3<f64>> {
    let (s, (x, y, z)) = tuple((ws(double), ws(double), ws(double)))(s)?;
    Ok((s, Vector3::new(x, y, z)))
}

fn axis(s: &str) -> IResult<&str, (i64, Vector3<f64>)> {
    tuple((ws(parse_i64), vector3))(s)
}

fn atom(s: &str) -> IResult<&str, CubeAtom> {
    let (s, (element, charge, position)) = tuple((ws(parse_i64), ws(double), vector3))(s)?;
    let atom = CubeAtom {
        element,
        charge,
        position: Point3::from(position),
    };
    Ok((s, atom))
}

fn format_error(what: &str) -> VolumeError {
    VolumeError::InvalidFormat(format!("cube file: cannot parse {}", what))
}

/// Parse the text of a cube file
pub fn read_cube(text: &str) -> Result<CubeFile, VolumeError> {
    let (s, first) = title(text).map_err(|_| format_error("title"))?;
    let (s, second) = title(s).map_err(|_| format_error("title"))?;

    let (s, (atom_count, origin)) =
        tuple((ws(parse_i64), vector3))(s).map_err(|_| format_error("atom count and origin"))?;
    let (s, raw_axes) = count(axis, 3)(s).map_err(|_| format_error("axes"))?;

    let in_angstrom = atom_count < 0;
    let scale = if in_angstrom { 1.0 } else { ANGSTROMS_IN_BOHR };

    let mut counts = [0usize; 3];
    let mut axes = [Vector3::zeros(); 3];
    for (i, (n, v)) in raw_axes.into_iter().enumerate() {
        if n <= 0 {
            return Err(VolumeError::InvalidFormat(format!(
                "cube file: axis {} has {} voxels",
                i, n
            )));
        }
        counts[i] = n as usize;
        axes[i] = v * scale;
    }

    let atom_count = atom_count.unsigned_abs() as usize;
    if atom_count > max_numbers(s) / 5 {
        return Err(VolumeError::InvalidFormat(format!(
            "cube file: {} atoms do not fit the file",
            atom_count
        )));
    }
    let (s, mut atoms) = count(atom, atom_count)(s).map_err(|_| format_error("atoms"))?;
    for atom in atoms.iter_mut() {
        atom.position.coords *= scale;
    }

    let [nx, ny, nz] = counts;
    let sample_count = voxel_count(nx, ny, nz)
        .filter(|&n| n <= max_numbers(s))
        .ok_or_else(|| {
            VolumeError::InvalidFormat(format!(
                "cube file: {} x {} x {} voxels do not fit the file",
                nx, ny, nz
            ))
        })?;
    let (_rest, data) = count(ws(double), sample_count)(s).map_err(|_| {
        VolumeError::InvalidFormat(format!(
            "cube file: expected {} data values",
            sample_count
        ))
    })?;

    Ok(CubeFile {
        titles: [first.trim_end().to_owned(), second.trim_end().to_owned()],
        origin: Point3::from(origin * scale),
        counts,
        axes,
        atoms,
        data: data.into_iter().map(|v| v as f32).collect(),
    })
}

pub fn load_cube_file<P>(path: P) -> Result<CubeFile, VolumeError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| VolumeError::resource(path, e))?;
    let cube = read_cube(&text)?;
    log::info!(
        "Loaded cube {}: {}x{}x{}, {} atoms",
        path.display(),
        cube.counts[0],
        cube.counts[1],
        cube.counts[2],
        cube.atoms.len()
    );
    Ok(cube)
}

/// Reorder cube data (z fastest) into a normalized grid (x fastest)
pub fn cube_to_grid(cube: &CubeFile) -> Result<VolumeGrid, VolumeError> {
    let [nx, ny, nz] = cube.counts;
    let expected = cube.sample_count().ok_or(VolumeError::TooLarge {
        width: nx,
        height: ny,
        depth: nz,
    })?;
    if cube.data.len() != expected {
        return Err(VolumeError::SizeMismatch {
            expected,
            actual: cube.data.len(),
        });
    }
    let grid = VolumeGrid::from_fn(nx, ny, nz, |x, y, z| cube.data[x * ny * nz + y * nz + z])?;
    Ok(grid.normalized())
}

/// Write `cube` in cube format. Lengths are written in Ångström.
pub fn write_cube<W: Write>(cube: &CubeFile, w: &mut W) -> std::io::Result<()> {
    writeln!(w, "{}", cube.titles[0])?;
    writeln!(w, "{}", cube.titles[1])?;
    writeln!(
        w,
        "{:5} {:12.6} {:12.6} {:12.6}",
        -(cube.atoms.len() as i64),
        cube.origin.x,
        cube.origin.y,
        cube.origin.z
    )?;
    for (n, v) in cube.counts.iter().zip(cube.axes.iter()) {
        writeln!(w, "{:5} {:12.6} {:12.6} {:12.6}", n, v.x, v.y, v.z)?;
    }
    for atom in &cube.atoms {
        writeln!(
            w,
            "{:5} {:12.6} {:12.6} {:12.6} {:12.6}",
            atom.element, atom.charge, atom.position.x, atom.position.y, atom.position.z
        )?;
    }
    for line in cube.data.chunks(6) {
        let line: Vec<String> = line.iter().map(|v| format!("{:13.5E}", v)).collect();
        writeln!(w, "{}", line.join(" "))?;
    }
    Ok(())
}
