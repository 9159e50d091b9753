//! Adobe/Resolve .cube LUT format support.
//!
//! The .cube format is a simple text-based LUT format widely supported
//! by DaVinci Resolve, Adobe applications, and most photo editors.
//!
//! # Format
//!
//! ```text
//! # Comment
//! TITLE "LUT Name"
//! LUT_3D_SIZE 33
//! DOMAIN_MIN 0.0 0.0 0.0
//! DOMAIN_MAX 1.0 1.0 1.0
//! 0.0 0.0 0.0
//! ...
//! 1.0 1.0 1.0
//! ```
//!
//! Samples are listed with red varying fastest, then green, then blue.
//! Only 3D tables are accepted.

use crate::{Lut3D, LutError, LutResult};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// File extension recognized by the catalog (compared case-insensitively).
pub const EXTENSION: &str = "cube";

/// Reads a 3D LUT from a .cube file.
///
/// # Example
///
/// ```rust,ignore
/// let lut = grade_lut::cube::read_3d("luts/warm.cube")?;
/// let rgb = lut.apply([0.5, 0.3, 0.2]);
/// ```
pub fn read_3d<P: AsRef<Path>>(path: P) -> LutResult<Lut3D> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    parse_3d(reader)
}

/// Parses a 3D LUT from a reader.
///
/// Unknown keywords are skipped; a `LUT_1D_SIZE` header is rejected.
pub fn parse_3d<R: BufRead>(reader: R) -> LutResult<Lut3D> {
    let mut header = Header::default();
    let mut data: Vec<[f32; 3]> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line_no = idx + 1;

        let (keyword, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(k, r)| (k, r.trim()));
        if !keyword.starts_with(|c: char| c.is_ascii_alphabetic()) {
            if header.size.is_none() {
                return Err(syntax(line_no, "table data before LUT_3D_SIZE"));
            }
            data.push(numbers::<3>(line, line_no)?);
            continue;
        }

        match keyword {
            "TITLE" => header.title = Some(rest.trim_matches('"').to_string()),
            "LUT_3D_SIZE" => {
                if header.size.is_some() {
                    return Err(syntax(line_no, "LUT_3D_SIZE given twice"));
                }
                let size = rest
                    .parse()
                    .map_err(|_| syntax(line_no, &format!("bad LUT_3D_SIZE {:?}", rest)))?;
                header.size = Some(size);
            }
            "LUT_1D_SIZE" => return Err(syntax(line_no, "1D tables are not supported")),
            "DOMAIN_MIN" => header.min = numbers::<3>(rest, line_no)?,
            "DOMAIN_MAX" => header.max = numbers::<3>(rest, line_no)?,
            "LUT_3D_INPUT_RANGE" => {
                let [lo, hi] = numbers::<2>(rest, line_no)?;
                header.min = [lo; 3];
                header.max = [hi; 3];
            }
            _ => {}
        }
    }

    let size = header
        .size
        .ok_or_else(|| LutError::ParseError("no LUT_3D_SIZE header".into()))?;
    let expected = size.saturating_mul(size).saturating_mul(size);
    if data.len() != expected {
        return Err(LutError::ParseError(format!(
            "size {} needs {} samples, file has {}",
            size,
            expected,
            data.len()
        )));
    }
    if header.min.iter().zip(&header.max).any(|(lo, hi)| hi <= lo) {
        return Err(LutError::ParseError(format!(
            "domain {:?}..{:?} is empty",
            header.min, header.max
        )));
    }

    let mut lut = Lut3D::from_data(data, size)?.with_domain(header.min, header.max);
    lut.title = header.title;
    Ok(lut)
}

struct Header {
    size: Option<usize>,
    title: Option<String>,
    min: [f32; 3],
    max: [f32; 3],
}

impl Default for Header {
    fn default() -> Self {
        Self {
            size: None,
            title: None,
            min: [0.0; 3],
            max: [1.0; 3],
        }
    }
}

fn syntax(line_no: usize, msg: &str) -> LutError {
    LutError::ParseError(format!("line {}: {}", line_no, msg))
}

/// Exactly `N` whitespace-separated floats.
fn numbers<const N: usize>(text: &str, line_no: usize) -> LutResult<[f32; N]> {
    let mut out = [0.0f32; N];
    let mut fields = text.split_whitespace();
    for slot in out.iter_mut() {
        let field = fields
            .next()
            .ok_or_else(|| syntax(line_no, &format!("expected {} numbers in {:?}", N, text)))?;
        *slot = field
            .parse()
            .map_err(|_| syntax(line_no, &format!("not a number: {:?}", field)))?;
    }
    if fields.next().is_some() {
        return Err(syntax(line_no, &format!("expected {} numbers in {:?}", N, text)));
    }
    Ok(out)
}

/// Writes a 3D LUT to a .cube file.
///
/// # Example
///
/// ```rust,ignore
/// let lut = Lut3D::identity(33)?;
/// cube::write_3d("identity.cube", &lut)?;
/// ```
pub fn write_3d<P: AsRef<Path>>(path: P, lut: &Lut3D) -> LutResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_3d_to(&mut writer, lut)?;
    writer.flush()?;
    Ok(())
}

/// Serializes a 3D LUT into any writer.
///
/// Domain lines are emitted only for a non-unit domain.
pub fn write_3d_to<W: Write>(writer: &mut W, lut: &Lut3D) -> LutResult<()> {
    let mut header = String::from("# Generated by grade-lut\n");
    if let Some(title) = &lut.title {
        header.push_str(&format!("TITLE \"{}\"\n", title));
    }
    header.push_str(&format!("LUT_3D_SIZE {}\n", lut.size));
    if lut.domain_min != [0.0; 3] || lut.domain_max != [1.0; 3] {
        for (key, v) in [("DOMAIN_MIN", lut.domain_min), ("DOMAIN_MAX", lut.domain_max)] {
            header.push_str(&format!("{} {} {} {}\n", key, v[0], v[1], v[2]));
        }
    }
    writeln!(writer, "{}", header)?;

    for [r, g, b] in &lut.data {
        writeln!(writer, "{:.6} {:.6} {:.6}", r, g, b)?;
    }
    Ok(())
}
