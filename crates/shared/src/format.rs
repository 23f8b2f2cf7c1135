//! Text geometry format codec.
//!
//! Wire format, per object block:
//! - one position line: 3 whitespace-separated floats,
//! - then triangle lines: 18 whitespace-separated floats each.
//!
//! Blank lines are skipped. A new 3-field line starts the next block, which
//! is how several objects concatenate into one file: the field count of a
//! whitespace-tokenized line is the only framing.

use crate::{ObjectBlock, TriangleRecord, TRIANGLE_FLOATS};

/// Errors produced while parsing a geometry file.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("line {line}: invalid float {value:?}")]
    InvalidFloat { line: usize, value: String },
    #[error("line {line}: expected 3 (position) or 18 (triangle) fields, found {found}")]
    FieldCount { line: usize, found: usize },
    #[error("line {line}: triangle data before any position line")]
    MissingPosition { line: usize },
    #[error("empty geometry data")]
    Empty,
}

/// Parse one or more object blocks from geometry text.
pub fn parse_blocks(data: &str) -> Result<Vec<ObjectBlock>, FormatError> {
    let mut blocks: Vec<ObjectBlock> = Vec::new();

    for (i, line) in data.lines().enumerate() {
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }

        let fields = parse_fields(line, line_no)?;
        match fields.len() {
            3 => blocks.push(ObjectBlock {
                position: [fields[0], fields[1], fields[2]],
                triangles: Vec::new(),
            }),
            TRIANGLE_FLOATS => {
                let block = blocks
                    .last_mut()
                    .ok_or(FormatError::MissingPosition { line: line_no })?;
                let mut record = [0.0f32; TRIANGLE_FLOATS];
                record.copy_from_slice(&fields);
                block.triangles.push(TriangleRecord(record));
            }
            found => return Err(FormatError::FieldCount { line: line_no, found }),
        }
    }

    if blocks.is_empty() {
        return Err(FormatError::Empty);
    }
    Ok(blocks)
}

/// Parse a single object block; fails if the file holds none.
pub fn parse_block(data: &str) -> Result<ObjectBlock, FormatError> {
    parse_blocks(data).map(|mut blocks| blocks.remove(0))
}

/// Serialize a single block.
pub fn write_block(block: &ObjectBlock) -> String {
    let mut out = String::new();
    push_floats(&mut out, &block.position);
    for tri in &block.triangles {
        push_floats(&mut out, &tri.0);
    }
    out
}

/// Serialize blocks back-to-back, the multi-object file layout.
pub fn write_blocks(blocks: &[ObjectBlock]) -> String {
    let mut out = String::new();
    for block in blocks {
        out.push_str(&write_block(block));
    }
    out
}

fn parse_fields(line: &str, line_no: usize) -> Result<Vec<f32>, FormatError> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<f32>().map_err(|_| FormatError::InvalidFloat {
                line: line_no,
                value: tok.to_string(),
            })
        })
        .collect()
}

fn push_floats(out: &mut String, values: &[f32]) {
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        // `{}` prints the shortest representation that parses back exactly,
        // so save -> load round-trips bit-for-bit.
        out.push_str(&format!("{v}"));
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn tri(base: f32) -> TriangleRecord {
        let mut v = [0.0f32; TRIANGLE_FLOATS];
        for (i, slot) in v.iter_mut().enumerate() {
            *slot = base + i as f32 * 0.25;
        }
        TriangleRecord(v)
    }

    #[test]
    fn round_trip_single_block() {
        let block = ObjectBlock::new(Vec3::new(0.1, -0.2, 0.3), vec![tri(1.0), tri(-2.5)]);
        let text = write_block(&block);
        let parsed = parse_block(&text).unwrap();
        assert_eq!(parsed, block);
    }

    #[test]
    fn round_trip_multiple_blocks() {
        let blocks = vec![
            ObjectBlock::new(Vec3::ZERO, vec![tri(0.0)]),
            ObjectBlock::new(Vec3::new(1.0, 2.0, 3.0), vec![tri(0.5), tri(0.75)]),
        ];
        let text = write_blocks(&blocks);
        let parsed = parse_blocks(&text).unwrap();
        assert_eq!(parsed, blocks);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let text = "0 0 0\n\n1 1 1 0.5 0.5 0.5 -1 -1 -1 0.5 0.5 0.5 1 -1 1 0.5 0.5 0.5\n\n";
        let blocks = parse_blocks(text).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].triangles.len(), 1);
    }

    #[test]
    fn position_line_starts_new_block() {
        let tri_line = ["0.0"; TRIANGLE_FLOATS].join(" ");
        let text = format!("0 0 0\n{tri_line}\n1 0 0\n{tri_line}\n{tri_line}\n");
        let blocks = parse_blocks(&text).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].triangles.len(), 1);
        assert_eq!(blocks[1].triangles.len(), 2);
        assert_eq!(blocks[1].position, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn triangle_before_position_is_an_error() {
        let tri_line = ["0.0"; TRIANGLE_FLOATS].join(" ");
        assert!(matches!(
            parse_blocks(&tri_line),
            Err(FormatError::MissingPosition { line: 1 })
        ));
    }

    #[test]
    fn bad_field_count_is_an_error() {
        assert!(matches!(
            parse_blocks("1 2 3 4\n"),
            Err(FormatError::FieldCount { line: 1, found: 4 })
        ));
    }

    #[test]
    fn bad_float_is_an_error() {
        assert!(matches!(
            parse_blocks("0 zero 0\n"),
            Err(FormatError::InvalidFloat { line: 1, .. })
        ));
    }

    #[test]
    fn y_scaling_touches_only_vertex_y() {
        let block = ObjectBlock::new(Vec3::new(1.0, 2.0, 3.0), vec![tri(1.0)]);
        let stretched = block.with_y_scaled(2.0);
        assert_eq!(stretched.position, block.position);
        for i in 0..3 {
            let orig = block.triangles[0].position(i);
            let out = stretched.triangles[0].position(i);
            assert_eq!(out.x, orig.x);
            assert_eq!(out.y, orig.y * 2.0);
            assert_eq!(out.z, orig.z);
            assert_eq!(stretched.triangles[0].color(i), block.triangles[0].color(i));
        }
    }

    #[test]
    fn stretch_then_unstretch_is_identity_within_tolerance() {
        let block = ObjectBlock::new(Vec3::new(0.0, 0.1, 0.0), vec![tri(0.3)]);
        let aspect = 1280.0 / 720.0;
        let back = block.with_y_scaled(aspect).with_y_scaled(1.0 / aspect);
        for i in 0..3 {
            assert!((back.triangles[0].position(i) - block.triangles[0].position(i))
                .abs()
                .max_element()
                < 1e-5);
        }
    }
}
