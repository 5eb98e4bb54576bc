//! Reader for the `.npy` arrays written by a snapshot export.
//!
//! Only what snapshots contain is supported: little-endian `f4`/`f8` arrays in
//! C order. The shape is validated against the payload and then flattened.

use std::{fs, path::Path};

use crate::error::{HarnessError, Result};

const MAGIC: &[u8] = b"\x93NUMPY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dtype {
    F32,
    F64,
}

impl Dtype {
    fn size(self) -> usize {
        match self {
            Self::F32 => 4,
            Self::F64 => 8,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Header {
    dtype: Dtype,
    shape: Vec<usize>,
}

/// Reads a `.npy` file into a flat vector of `f32`.
///
/// `f8` arrays are narrowed to `f32`.
///
/// # Errors
/// `Io` if the file cannot be read, `Npy` if it is not a supported array.
pub fn read_f32(path: &Path) -> Result<Vec<f32>> {
    let bytes = fs::read(path)?;
    decode(&bytes).map_err(|msg| HarnessError::Npy {
        path: path.to_path_buf(),
        msg,
    })
}

fn decode(bytes: &[u8]) -> std::result::Result<Vec<f32>, String> {
    let rest = bytes.strip_prefix(MAGIC).ok_or("missing NUMPY magic")?;
    let [major, _minor, rest @ ..] = rest else {
        return Err("truncated version".into());
    };

    let (header_len, rest) = match *major {
        1 => {
            let [a, b, rest @ ..] = rest else {
                return Err("truncated header length".into());
            };
            (usize::from(u16::from_le_bytes([*a, *b])), rest)
        }
        2 | 3 => {
            let [a, b, c, d, rest @ ..] = rest else {
                return Err("truncated header length".into());
            };
            (u32::from_le_bytes([*a, *b, *c, *d]) as usize, rest)
        }
        v => return Err(format!("unsupported format version {v}")),
    };

    if rest.len() < header_len {
        return Err("truncated header".into());
    }
    let (header, data) = rest.split_at(header_len);
    let header = std::str::from_utf8(header).map_err(|_| "header is not text")?;
    let header = parse_header(header)?;

    let size = header.dtype.size();
    let needed = header
        .shape
        .iter()
        .try_fold(1usize, |n, &dim| n.checked_mul(dim))
        .and_then(|count| count.checked_mul(size))
        .ok_or_else(|| format!("shape {:?} overflows", header.shape))?;
    if data.len() != needed {
        return Err(format!(
            "payload has {} bytes, shape {:?} needs {needed}",
            data.len(),
            header.shape,
        ));
    }

    let values = match header.dtype {
        Dtype::F32 => data
            .chunks_exact(size)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
        Dtype::F64 => data
            .chunks_exact(size)
            .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]) as f32)
            .collect(),
    };

    Ok(values)
}

/// Parses the python-literal dict, e.g. `{'descr': '<f4', 'fortran_order': False, 'shape': (3, 1), }`.
fn parse_header(header: &str) -> std::result::Result<Header, String> {
    let descr = quoted_value(header, "descr").ok_or("missing descr")?;
    let dtype = match descr {
        "<f4" => Dtype::F32,
        "<f8" => Dtype::F64,
        other => return Err(format!("unsupported dtype {other}")),
    };

    let fortran = raw_value(header, "fortran_order").ok_or("missing fortran_order")?;
    if !fortran.starts_with("False") {
        return Err("fortran-ordered arrays are not supported".into());
    }

    let shape = raw_value(header, "shape").ok_or("missing shape")?;
    let shape = shape
        .strip_prefix('(')
        .and_then(|s| s.split_once(')'))
        .map(|(inner, _)| inner)
        .ok_or("malformed shape")?;
    let shape = shape
        .split(',')
        .map(str::trim)
        .filter(|dim| !dim.is_empty())
        .map(|dim| dim.parse::<usize>().map_err(|_| format!("bad dimension {dim:?}")))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Header { dtype, shape })
}

/// The text following `'key':`, with leading whitespace removed.
fn raw_value<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("'{key}':");
    let start = header.find(&needle)? + needle.len();
    Some(header[start..].trim_start())
}

fn quoted_value<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    let value = raw_value(header, key)?.strip_prefix('\'')?;
    value.split_once('\'').map(|(inner, _)| inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn npy_v1(descr: &str, shape: &str, payload: &[u8]) -> Vec<u8> {
        let mut header = format!("{{'descr': '{descr}', 'fortran_order': False, 'shape': {shape}, }}");
        // Pad so that magic + version + length + header is a multiple of 64, ending in '\n'.
        let unpadded = MAGIC.len() + 2 + 2 + header.len() + 1;
        header.push_str(&" ".repeat((64 - unpadded % 64) % 64));
        header.push('\n');

        let mut bytes = MAGIC.to_vec();
        bytes.extend([1, 0]);
        bytes.extend((header.len() as u16).to_le_bytes());
        bytes.extend(header.as_bytes());
        bytes.extend(payload);
        bytes
    }

    #[test]
    fn decodes_f32_vector() {
        let payload: Vec<u8> = [1.0f32, -0.5, 0.25]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let bytes = npy_v1("<f4", "(3,)", &payload);
        assert_eq!(decode(&bytes).unwrap(), [1.0, -0.5, 0.25]);
    }

    #[test]
    fn decodes_f64_matrix_flattened() {
        let payload: Vec<u8> = [1.0f64, 2.0, 3.0, 4.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let bytes = npy_v1("<f8", "(2, 2)", &payload);
        assert_eq!(decode(&bytes).unwrap(), [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn rejects_size_mismatch_and_other_dtypes() {
        let bytes = npy_v1("<f4", "(4,)", &[0; 8]);
        assert!(decode(&bytes).unwrap_err().contains("needs 16"));

        let bytes = npy_v1("<i4", "(1,)", &[0; 4]);
        assert!(decode(&bytes).unwrap_err().contains("unsupported dtype"));

        assert!(decode(b"not an array").is_err());
    }

    #[test]
    fn rejects_overflowing_shape() {
        let bytes = npy_v1("<f4", "(9223372036854775807, 4)", &[0; 16]);
        assert!(decode(&bytes).unwrap_err().contains("overflows"));

        let bytes = npy_v1("<f8", &format!("({},)", usize::MAX / 4), &[0; 8]);
        assert!(decode(&bytes).unwrap_err().contains("overflows"));
    }

    #[test]
    fn read_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.npy");
        fs::write(&path, b"\x93NUMPY").unwrap();

        let err = read_f32(&path).unwrap_err();
        assert!(matches!(err, HarnessError::Npy { .. }));
        assert!(err.to_string().contains("bad.npy"));
    }

    #[test]
    fn scalar_shape_has_one_element() {
        let bytes = npy_v1("<f4", "()", &2.0f32.to_le_bytes());
        assert_eq!(decode(&bytes).unwrap(), [2.0]);
    }
}
