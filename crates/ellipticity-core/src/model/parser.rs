//! Reader for "named discontinuity" (`.nd`) model files.
//!
//! Each data row is `depth vp vs rho [qp qs]`. A row repeating the previous
//! depth starts a discontinuity, and the keywords `mantle`, `outer-core` and
//! `inner-core` (or `moho`, `cmb`, `icb`) on their own line name the boundary
//! at the depth of the preceding row.

use super::{Layer, VelocityModel};
use crate::domain::{EllipError, ModelResult};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NamedBoundaries {
    pub moho: Option<f64>,
    pub cmb: Option<f64>,
    pub icb: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum NdParseError {
    #[error("failed to read model file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("model needs at least two depth rows, found {found}")]
    TooShort { found: usize },
}

impl From<NdParseError> for EllipError {
    fn from(error: NdParseError) -> Self {
        match error {
            NdParseError::Read { .. } => EllipError::io_system("IO.MODEL_READ", error.to_string()),
            _ => EllipError::input_validation("INPUT.MODEL_FILE", error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Row {
    depth: f64,
    p_velocity: f64,
    s_velocity: f64,
    density: f64,
}

pub fn parse_nd_source(source: &str) -> Result<(Vec<Layer>, NamedBoundaries), NdParseError> {
    let mut rows: Vec<Row> = Vec::new();
    let mut boundaries = NamedBoundaries::default();

    for (index, raw_line) in source.lines().enumerate() {
        let line_number = index + 1;
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let keyword = line.to_ascii_lowercase();
        let named = match keyword.as_str() {
            "mantle" | "moho" => Some(&mut boundaries.moho),
            "outer-core" | "cmb" => Some(&mut boundaries.cmb),
            "inner-core" | "icb" => Some(&mut boundaries.icb),
            _ => None,
        };
        if let Some(slot) = named {
            let Some(previous) = rows.last() else {
                return Err(NdParseError::Syntax {
                    line: line_number,
                    message: format!("boundary '{}' appears before any depth row", line),
                });
            };
            *slot = Some(previous.depth);
            continue;
        }

        let row = parse_row(line, line_number)?;
        if let Some(previous) = rows.last() {
            if row.depth < previous.depth {
                return Err(NdParseError::Syntax {
                    line: line_number,
                    message: format!(
                        "depth {} km is shallower than the previous row at {} km",
                        row.depth, previous.depth
                    ),
                });
            }
        }
        rows.push(row);
    }

    if rows.len() < 2 {
        return Err(NdParseError::TooShort { found: rows.len() });
    }

    let layers = rows
        .windows(2)
        .filter(|pair| pair[1].depth > pair[0].depth)
        .map(|pair| Layer {
            top_depth: pair[0].depth,
            bot_depth: pair[1].depth,
            top_p_velocity: pair[0].p_velocity,
            bot_p_velocity: pair[1].p_velocity,
            top_s_velocity: pair[0].s_velocity,
            bot_s_velocity: pair[1].s_velocity,
            top_density: pair[0].density,
            bot_density: pair[1].density,
        })
        .collect();

    Ok((layers, boundaries))
}

/// Reads and validates a model file; the model is named after the file stem.
pub fn read_nd_file(path: impl AsRef<Path>, length_of_day: f64) -> ModelResult<VelocityModel> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| NdParseError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let (layers, boundaries) = parse_nd_source(&source).map_err(|error| {
        EllipError::input_validation(
            "INPUT.MODEL_FILE",
            format!("model file '{}': {}", path.display(), error),
        )
    })?;

    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("custom");
    tracing::info!(path = %path.display(), layers = layers.len(), "loaded velocity model file");
    VelocityModel::with_length_of_day(name, layers, boundaries, length_of_day)
}

fn strip_comment(line: &str) -> &str {
    let end = [line.find('#'), line.find("//")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(line.len());
    &line[..end]
}

fn parse_row(line: &str, line_number: usize) -> Result<Row, NdParseError> {
    let values = line
        .split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| NdParseError::Syntax {
                line: line_number,
                message: format!("invalid number '{}'", token),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if values.len() < 4 {
        return Err(NdParseError::Syntax {
            line: line_number,
            message: format!(
                "expected depth, vp, vs and density, found {} value(s)",
                values.len()
            ),
        });
    }

    Ok(Row {
        depth: values[0],
        p_velocity: values[1],
        s_velocity: values[2],
        density: values[3],
    })
}

#[cfg(test)]
mod tests {
    use super::{NdParseError, parse_nd_source, read_nd_file};
    use crate::common::constants::EARTH_LOD;
    use crate::domain::EllipErrorCategory;
    use std::fs;
    use tempfile::TempDir;

    const SMALL_PLANET: &str = "\
# depth vp vs rho
0.0     5.8   3.2   2.6
35.0    6.5   3.7   2.9
35.0    8.0   4.5   3.3   // moho
mantle
1500.0  12.0  6.5   5.0
outer-core
1500.0  8.0   0.0   9.9
2800.0  9.5   0.0   11.5
inner-core
2800.0  11.0  3.5   12.5
3400.0  11.2  3.6   13.0
";

    #[test]
    fn rows_become_layers_and_names_mark_boundaries() {
        let (layers, boundaries) = parse_nd_source(SMALL_PLANET).expect("model should parse");
        assert_eq!(layers.len(), 4);
        assert_eq!(layers[0].top_depth, 0.0);
        assert_eq!(layers[0].bot_p_velocity, 6.5);
        assert_eq!(layers[1].top_p_velocity, 8.0);
        assert_eq!(layers[3].bot_depth, 3400.0);
        assert_eq!(boundaries.moho, Some(35.0));
        assert_eq!(boundaries.cmb, Some(1500.0));
        assert_eq!(boundaries.icb, Some(2800.0));
    }

    #[test]
    fn syntax_errors_carry_line_numbers() {
        let error = parse_nd_source("0 5.8 3.2 2.6\n10 5.8 x 2.6\n").expect_err("bad number");
        assert!(matches!(error, NdParseError::Syntax { line: 2, .. }));

        let error = parse_nd_source("0 5.8 3.2 2.6\n10 5.8 3.2\n").expect_err("short row");
        assert!(error.to_string().starts_with("line 2:"));

        let error = parse_nd_source("10 5.8 3.2 2.6\n5 5.8 3.2 2.6\n").expect_err("decreasing");
        assert!(matches!(error, NdParseError::Syntax { line: 2, .. }));

        let error = parse_nd_source("mantle\n0 5.8 3.2 2.6\n").expect_err("early name");
        assert!(matches!(error, NdParseError::Syntax { line: 1, .. }));

        let error = parse_nd_source("0 5.8 3.2 2.6\n").expect_err("single row");
        assert!(matches!(error, NdParseError::TooShort { found: 1 }));
    }

    #[test]
    fn model_files_build_named_velocity_models() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("small.nd");
        fs::write(&path, SMALL_PLANET).expect("model should be written");

        let model = read_nd_file(&path, EARTH_LOD).expect("model file should load");
        assert_eq!(model.name(), "small");
        assert_eq!(model.radius(), 3400.0);
        assert_eq!(model.cmb_depth(), 1500.0);
        assert_eq!(model.iocb_depth(), 2800.0);
        assert_eq!(model.discontinuity_depths(), &[0.0, 35.0, 1500.0, 2800.0]);
    }

    #[test]
    fn missing_model_files_are_io_errors() {
        let temp = TempDir::new().expect("tempdir should be created");
        let error = read_nd_file(temp.path().join("absent.nd"), EARTH_LOD)
            .expect_err("missing file should fail");
        assert_eq!(error.category(), EllipErrorCategory::IoSystemError);
        assert!(error.message().contains("absent.nd"));
    }
}
