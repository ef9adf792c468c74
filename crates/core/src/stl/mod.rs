//! STL export and import.
//!
//! Export always derives facet normals from vertex positions; the normals
//! stored on a [`TriangleMesh`] are never consulted. Import accepts both the
//! ASCII and the binary flavour and yields an unindexed mesh.

use std::io::Write;

use glam::Vec3;

use crate::{mesh::face_normal, Result, TriangleMesh, VaseError};

const BINARY_HEADER_LEN: usize = 80;
const BINARY_RECORD_LEN: usize = 50;

/// Writes `mesh` as an ASCII STL solid called `name`.
pub fn write_ascii_stl<W: Write>(mesh: &TriangleMesh, name: &str, mut writer: W) -> Result<()> {
    writeln!(writer, "solid {name}")?;
    for [a, b, c] in mesh.triangles() {
        let normal = face_normal(a, b, c);
        writeln!(writer, "  facet normal {}", format_vec(normal))?;
        writeln!(writer, "    outer loop")?;
        for vertex in [a, b, c] {
            writeln!(writer, "      vertex {}", format_vec(vertex))?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid {name}")?;
    writer.flush()?;

    tracing::debug!(triangles = mesh.triangle_count(), solid = name, "wrote ascii stl");
    Ok(())
}

/// Renders `mesh` to an ASCII STL string.
pub fn to_ascii_stl(mesh: &TriangleMesh, name: &str) -> String {
    let mut buffer = Vec::new();
    write_ascii_stl(mesh, name, &mut buffer).expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Writes `mesh` as binary STL. `name` goes into the 80-byte header,
/// truncated if necessary.
pub fn write_binary_stl<W: Write>(mesh: &TriangleMesh, name: &str, mut writer: W) -> Result<()> {
    let count = u32::try_from(mesh.triangle_count())
        .map_err(|_| VaseError::InvalidInput("too many triangles for binary STL"))?;

    let mut header = [0u8; BINARY_HEADER_LEN];
    let name = name.as_bytes();
    let len = name.len().min(BINARY_HEADER_LEN);
    header[..len].copy_from_slice(&name[..len]);
    writer.write_all(&header)?;
    writer.write_all(&count.to_le_bytes())?;

    for [a, b, c] in mesh.triangles() {
        for vector in [face_normal(a, b, c), a, b, c] {
            for component in vector.to_array() {
                writer.write_all(&component.to_le_bytes())?;
            }
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }
    writer.flush()?;

    tracing::debug!(triangles = count, "wrote binary stl");
    Ok(())
}

/// Parses ASCII or binary STL bytes into a flat mesh with recomputed normals.
pub fn parse_stl(bytes: &[u8]) -> Result<TriangleMesh> {
    let mesh = if is_binary(bytes) {
        parse_binary(bytes)?
    } else {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| VaseError::parse(1, "neither binary STL nor UTF-8 text"))?;
        parse_ascii(text)?
    };

    tracing::debug!(triangles = mesh.triangle_count(), "parsed stl");
    Ok(mesh)
}

/// Binary files declare their triangle count; ASCII files start with `solid`
/// but binary headers sometimes do too, so the size check wins.
fn is_binary(bytes: &[u8]) -> bool {
    if bytes.len() < BINARY_HEADER_LEN + 4 {
        return false;
    }

    let count = read_u32(bytes, BINARY_HEADER_LEN) as usize;
    let expected = count
        .checked_mul(BINARY_RECORD_LEN)
        .and_then(|body| body.checked_add(BINARY_HEADER_LEN + 4));
    expected == Some(bytes.len()) || !starts_with_solid(bytes)
}

fn starts_with_solid(bytes: &[u8]) -> bool {
    bytes
        .trim_ascii_start()
        .get(..5)
        .is_some_and(|head| head.eq_ignore_ascii_case(b"solid"))
}

fn parse_binary(bytes: &[u8]) -> Result<TriangleMesh> {
    let count = read_u32(bytes, BINARY_HEADER_LEN) as usize;
    let body = &bytes[BINARY_HEADER_LEN + 4..];
    if body.len() / BINARY_RECORD_LEN < count {
        return Err(VaseError::parse(
            1,
            format!("binary STL declares {count} triangles but is truncated"),
        ));
    }

    let mut positions = Vec::with_capacity(count * 3);
    for record in body.chunks_exact(BINARY_RECORD_LEN).take(count) {
        // Skip the stored normal (12 bytes); three vertices follow.
        for vertex in 0..3 {
            let offset = 12 + vertex * 12;
            positions.push(Vec3::new(
                read_f32(record, offset),
                read_f32(record, offset + 4),
                read_f32(record, offset + 8),
            ));
        }
    }

    Ok(TriangleMesh::flat(positions))
}

fn parse_ascii(text: &str) -> Result<TriangleMesh> {
    let mut positions = Vec::new();
    let mut in_loop = 0usize;
    let mut saw_solid = false;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };

        match keyword.to_ascii_lowercase().as_str() {
            "solid" => saw_solid = true,
            "facet" | "endfacet" | "endsolid" => {}
            "outer" => in_loop = 0,
            "vertex" => {
                let mut component = || -> Result<f32> {
                    let token = tokens
                        .next()
                        .ok_or_else(|| VaseError::parse(line_no, "vertex needs three coordinates"))?;
                    token
                        .parse()
                        .map_err(|_| VaseError::parse(line_no, format!("invalid coordinate `{token}`")))
                };
                let vertex = Vec3::new(component()?, component()?, component()?);
                positions.push(vertex);
                in_loop += 1;
            }
            "endloop" => {
                if in_loop != 3 {
                    return Err(VaseError::parse(
                        line_no,
                        format!("facet has {in_loop} vertices, expected 3"),
                    ));
                }
            }
            other => {
                return Err(VaseError::parse(
                    line_no,
                    format!("unexpected keyword `{other}`"),
                ))
            }
        }
    }

    if !saw_solid {
        return Err(VaseError::parse(1, "missing `solid` header"));
    }
    if positions.len() % 3 != 0 {
        return Err(VaseError::parse(
            text.lines().count(),
            "trailing incomplete facet",
        ));
    }

    Ok(TriangleMesh::flat(positions))
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(raw)
}

fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    f32::from_bits(read_u32(bytes, offset))
}

fn format_vec(vector: Vec3) -> String {
    format!("{} {} {}", vector.x, vector.y, vector.z)
}
