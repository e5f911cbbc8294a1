//! Line-oriented text encoding of [`FmCoefficients`].
//!
//! ```text
//! W:R,C,A:k0,k1,k2        header: weight count, factor rows/cols, active
//!                         factor count, bias/first/second-order flags
//! bias
//! i,value                 W lines, every index once, value descending
//! r,c,value               A lines, one per non-zero factor entry
//! ```
//!
//! Lines are separated by `\n` with no trailing newline. Values use the
//! shortest representation that parses back to the same `f32`, so a
//! decode of an encode reproduces every value bit for bit.

use ndarray::{Array1, Array2};
use tracing::debug;

use crate::config::Groups;
use crate::error::{CoefficientError, Result};
use crate::fm::FmCoefficients;

/// Encodes a store.
///
/// Weight lines are ordered by value, largest first; equal values keep
/// ascending index order. Factor lines are emitted in row-major order.
/// Disabled groups are encoded with whatever values they hold.
pub fn encode(coefficients: &FmCoefficients) -> String {
    let weights = coefficients.weights();
    let factors = coefficients.factors();
    let groups = coefficients.groups();
    let active = coefficients.active_factor_count();

    let mut lines = Vec::with_capacity(2 + weights.len() + active);
    lines.push(format!(
        "{}:{},{},{}:{},{},{}",
        weights.len(),
        factors.nrows(),
        factors.ncols(),
        active,
        groups.bias,
        groups.first_order,
        groups.second_order,
    ));
    lines.push(format_value(coefficients.bias()));

    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]).then(a.cmp(&b)));
    lines.extend(
        order
            .into_iter()
            .map(|i| format!("{},{}", i, format_value(weights[i]))),
    );

    lines.extend(
        factors
            .indexed_iter()
            .filter(|(_, v)| **v != 0.0)
            .map(|((r, c), &v)| format!("{},{},{}", r, c, format_value(v))),
    );

    lines.join("\n")
}

/// Decodes a store, rejecting anything that does not match the format exactly.
///
/// A trailing `\r` on a line is ignored. The decoded store carries default
/// init parameters.
///
/// # Errors
///
/// Returns a decode variant of [`CoefficientError`] describing the first
/// problem found. Line numbers in errors are 1-based.
pub fn decode(text: &str) -> Result<FmCoefficients> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let header = Header::parse(lines[0])?;
    let expected_lines = header.line_count()?;
    if lines.len() < expected_lines {
        return Err(CoefficientError::UnexpectedEnd {
            expected_lines,
            actual_lines: lines.len(),
        });
    }
    if lines.len() > expected_lines {
        return Err(CoefficientError::TrailingData {
            line: expected_lines + 1,
        });
    }

    let bias = parse_token::<f32>(lines[1], 2)?;

    let mut weights = Array1::<f32>::zeros(header.num_features);
    let mut seen = vec![false; header.num_features];
    let weight_lines = &lines[2..2 + header.num_features];
    for (offset, line) in weight_lines.iter().enumerate() {
        let line_no = offset + 3;
        let [index, value] = split_fields::<2>(line, line_no)?;
        let index = parse_index(index, header.num_features, line_no)?;
        if seen[index] {
            return Err(CoefficientError::DuplicateWeightIndex {
                line: line_no,
                index,
            });
        }
        seen[index] = true;
        weights[index] = parse_token(value, line_no)?;
    }

    let mut factors = header.zeroed_factors()?;
    let factor_lines = &lines[2 + header.num_features..];
    for (offset, line) in factor_lines.iter().enumerate() {
        let line_no = offset + 3 + header.num_features;
        let [row, col, value] = split_fields::<3>(line, line_no)?;
        let row = parse_index(row, header.rows, line_no)?;
        let col = parse_index(col, header.cols, line_no)?;
        let value: f32 = parse_token(value, line_no)?;
        if value == 0.0 {
            return Err(CoefficientError::ZeroFactorEntry {
                line: line_no,
                row,
                col,
            });
        }
        // Zero values are rejected above, so a filled slot is non-zero.
        if factors[[row, col]] != 0.0 {
            return Err(CoefficientError::DuplicateFactorEntry {
                line: line_no,
                row,
                col,
            });
        }
        factors[[row, col]] = value;
    }

    debug!(
        num_features = header.num_features,
        rows = header.rows,
        cols = header.cols,
        active = header.active,
        "Decoded coefficients"
    );

    Ok(FmCoefficients::from_parts(
        bias,
        weights,
        factors,
        header.groups,
    ))
}

/// Formats a value so that parsing it back yields the identical `f32`.
///
/// Always carries a decimal point or an exponent (`5.0`, `0.1`, `1e-8`).
pub fn format_value(value: f32) -> String {
    format!("{value:?}")
}

struct Header {
    num_features: usize,
    rows: usize,
    cols: usize,
    active: usize,
    groups: Groups,
}

impl Header {
    fn parse(line: &str) -> Result<Self> {
        let sections: Vec<&str> = line.split(':').collect();
        if sections.len() != 3 {
            return Err(CoefficientError::MalformedHeader {
                reason: format!("expected 3 ':'-separated sections, got {}", sections.len()),
            });
        }

        let num_features = parse_token(sections[0], 1)?;

        let dims: Vec<&str> = sections[1].split(',').collect();
        if dims.len() != 3 {
            return Err(CoefficientError::MalformedHeader {
                reason: format!("expected 3 factor dimensions, got {}", dims.len()),
            });
        }
        let rows = parse_token(dims[0], 1)?;
        let cols = parse_token(dims[1], 1)?;
        let active = parse_token(dims[2], 1)?;

        let flags: Vec<&str> = sections[2].split(',').collect();
        if flags.len() != 3 {
            return Err(CoefficientError::MalformedHeader {
                reason: format!("expected 3 group flags, got {}", flags.len()),
            });
        }
        let groups = Groups::new(
            parse_token(flags[0], 1)?,
            parse_token(flags[1], 1)?,
            parse_token(flags[2], 1)?,
        );

        let capacity = usize::checked_mul(rows, cols).ok_or_else(|| {
            CoefficientError::MalformedHeader {
                reason: format!("factor shape {rows}x{cols} overflows"),
            }
        })?;
        if active > capacity {
            return Err(CoefficientError::MalformedHeader {
                reason: format!("{active} active factors exceed {rows}x{cols} matrix"),
            });
        }
        let fits = capacity
            .checked_mul(std::mem::size_of::<f32>())
            .is_some_and(|bytes| bytes <= isize::MAX as usize);
        if !fits {
            return Err(CoefficientError::MalformedHeader {
                reason: format!("factor shape {rows}x{cols} is too large"),
            });
        }

        Ok(Self {
            num_features,
            rows,
            cols,
            active,
            groups,
        })
    }

    /// Allocates the declared factor matrix, zero-filled.
    fn zeroed_factors(&self) -> Result<Array2<f32>> {
        let len = self.rows * self.cols;
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|_| CoefficientError::MalformedHeader {
                reason: format!("cannot allocate {}x{} factor matrix", self.rows, self.cols),
            })?;
        buffer.resize(len, 0.0f32);
        Array2::from_shape_vec((self.rows, self.cols), buffer).map_err(|e| {
            CoefficientError::MalformedHeader {
                reason: format!("invalid factor shape: {e}"),
            }
        })
    }

    fn line_count(&self) -> Result<usize> {
        self.num_features
            .checked_add(self.active)
            .and_then(|n| n.checked_add(2))
            .ok_or_else(|| CoefficientError::MalformedHeader {
                reason: "declared line count overflows".to_string(),
            })
    }
}

fn split_fields<const N: usize>(line: &str, line_no: usize) -> Result<[&str; N]> {
    let fields: Vec<&str> = line.split(',').collect();
    let actual = fields.len();
    fields
        .try_into()
        .map_err(|_| CoefficientError::FieldCount {
            line: line_no,
            expected: N,
            actual,
        })
}

fn parse_token<T: std::str::FromStr>(token: &str, line_no: usize) -> Result<T> {
    token.parse().map_err(|_| CoefficientError::InvalidNumber {
        line: line_no,
        token: token.to_string(),
    })
}

fn parse_index(token: &str, bound: usize, line_no: usize) -> Result<usize> {
    let index = parse_token::<usize>(token, line_no)?;
    if index >= bound {
        return Err(CoefficientError::IndexOutOfRange {
            line: line_no,
            index,
            bound,
        });
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::Coefficients;
    use ndarray::{arr1, arr2};

    fn sample() -> FmCoefficients {
        FmCoefficients::from_parts(
            0.5,
            arr1(&[1.0, 5.0, -2.0]),
            arr2(&[[0.0, 1.5], [-0.25, 0.0]]),
            Groups::new(true, true, false),
        )
    }

    #[test]
    fn test_encode_layout() {
        let text = encode(&sample());
        assert_eq!(
            text,
            "3:2,2,2:true,true,false\n0.5\n1,5.0\n0,1.0\n2,-2.0\n0,1,1.5\n1,0,-0.25"
        );
    }

    #[test]
    fn test_encode_orders_weights_descending() {
        let fm = FmCoefficients::from_parts(
            0.0,
            arr1(&[5.0, 1.0]),
            Array2::zeros((0, 0)),
            Groups::all(),
        );
        let text = encode(&fm);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[2], "0,5.0");
        assert_eq!(lines[3], "1,1.0");
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_encode_ties_keep_index_order() {
        let fm = FmCoefficients::from_parts(
            0.0,
            arr1(&[0.0, 2.0, 0.0, 2.0]),
            Array2::zeros((1, 1)),
            Groups::all(),
        );
        let lines: Vec<String> = encode(&fm).lines().map(String::from).collect();
        assert_eq!(&lines[2..], ["1,2.0", "3,2.0", "0,0.0", "2,0.0"]);
    }

    #[test]
    fn test_decode_roundtrip() {
        let fm = sample();
        let decoded = decode(&encode(&fm)).unwrap();
        assert_eq!(decoded, fm);
    }

    #[test]
    fn test_decode_any_line_order() {
        let text = "2:2,1,2:true,true,true\n-1.0\n1,3.0\n0,4.0\n1,0,7.0\n0,0,6.0";
        let fm = decode(text).unwrap();
        assert_eq!(fm.bias(), -1.0);
        assert_eq!(fm.weights(), arr1(&[4.0, 3.0]));
        assert_eq!(fm.factors(), arr2(&[[6.0], [7.0]]));
    }

    #[test]
    fn test_decode_crlf() {
        let text = "1:1,1,1:true,true,true\r\n2.0\r\n0,1.0\r\n0,0,3.0";
        let fm = decode(text).unwrap();
        assert_eq!(fm.factors()[[0, 0]], 3.0);
    }

    #[test]
    fn test_decode_bit_exact_values() {
        let values = [0.1f32, -3.5e-8, 1.0 / 3.0, f32::MAX, f32::MIN_POSITIVE];
        let fm = FmCoefficients::from_parts(
            values[2],
            Array1::from(values.to_vec()),
            Array2::zeros((1, 1)),
            Groups::all(),
        );
        let decoded = decode(&encode(&fm)).unwrap();
        for (a, b) in decoded.weights().iter().zip(values.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
        assert_eq!(decoded.bias().to_bits(), values[2].to_bits());
    }

    #[test]
    fn test_decode_malformed_header() {
        for text in ["", "3:2,2", "3:2,2:true,true,true", "1:1,1,1:true,true"] {
            assert!(
                matches!(decode(text), Err(CoefficientError::MalformedHeader { .. })),
                "{text:?}"
            );
        }
        assert!(matches!(
            decode("0:1,1,2:true,true,true\n0.0\n0,0,1.0\n0,0,1.0"),
            Err(CoefficientError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_decode_invalid_tokens() {
        assert_eq!(
            decode("x:1,1,0:true,true,true\n0.0").unwrap_err(),
            CoefficientError::InvalidNumber {
                line: 1,
                token: "x".to_string()
            }
        );
        assert!(matches!(
            decode("0:1,1,0:yes,true,true\n0.0"),
            Err(CoefficientError::InvalidNumber { line: 1, .. })
        ));
        assert!(matches!(
            decode("0:1,1,0:true,true,true\nabc"),
            Err(CoefficientError::InvalidNumber { line: 2, .. })
        ));
        assert!(matches!(
            decode("1:1,1,0:true,true,true\n0.0\n0,1.0x"),
            Err(CoefficientError::InvalidNumber { line: 3, .. })
        ));
    }

    #[test]
    fn test_decode_field_count() {
        assert_eq!(
            decode("1:1,1,0:true,true,true\n0.0\n0,1.0,2.0").unwrap_err(),
            CoefficientError::FieldCount {
                line: 3,
                expected: 2,
                actual: 3
            }
        );
        assert!(matches!(
            decode("1:1,1,1:true,true,true\n0.0\n0,1.0\n0,1.0"),
            Err(CoefficientError::FieldCount { line: 4, expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_decode_index_out_of_range() {
        assert_eq!(
            decode("2:1,1,0:true,true,true\n0.0\n0,1.0\n2,1.0").unwrap_err(),
            CoefficientError::IndexOutOfRange {
                line: 4,
                index: 2,
                bound: 2
            }
        );
        assert!(matches!(
            decode("0:2,2,1:true,true,true\n0.0\n1,2,1.0"),
            Err(CoefficientError::IndexOutOfRange { line: 3, index: 2, bound: 2 })
        ));
    }

    #[test]
    fn test_decode_duplicate_weight_index() {
        assert_eq!(
            decode("2:1,1,0:true,true,true\n0.0\n1,1.0\n1,2.0").unwrap_err(),
            CoefficientError::DuplicateWeightIndex { line: 4, index: 1 }
        );
    }

    #[test]
    fn test_decode_absurd_shape() {
        for text in [
            "0:4611686018427387904,1,0:true,true,true\n0.0",
            "0:4611686018427387904,2,0:true,true,true\n0.0",
            "0:2305843009213693952,1,0:true,true,true\n0.0",
        ] {
            let err = decode(text).unwrap_err();
            assert!(
                matches!(err, CoefficientError::MalformedHeader { .. }),
                "{text:?}: {err}"
            );
        }
    }

    #[test]
    fn test_decode_duplicate_factor_entry() {
        assert_eq!(
            decode("0:1,2,2:true,true,true\n0.0\n0,1,1.0\n0,1,2.0").unwrap_err(),
            CoefficientError::DuplicateFactorEntry {
                line: 4,
                row: 0,
                col: 1
            }
        );
    }

    #[test]
    fn test_decode_zero_factor_entry() {
        for value in ["0.0", "-0.0"] {
            let text = format!("0:1,1,1:true,true,true\n0.0\n0,0,{value}");
            assert_eq!(
                decode(&text).unwrap_err(),
                CoefficientError::ZeroFactorEntry {
                    line: 3,
                    row: 0,
                    col: 0
                }
            );
        }
    }

    #[test]
    fn test_decoded_header_matches_reencode() {
        let text = "1:2,2,2:true,true,true\n1.0\n0,3.0\n1,1,-0.5\n0,0,2.0";
        let fm = decode(text).unwrap();
        assert_eq!(fm.active_factor_count(), 2);
        assert!(encode(&fm).starts_with("1:2,2,2:"));
    }

    #[test]
    fn test_decode_line_count() {
        assert_eq!(
            decode("2:1,1,0:true,true,true\n0.0\n0,1.0").unwrap_err(),
            CoefficientError::UnexpectedEnd {
                expected_lines: 4,
                actual_lines: 3
            }
        );
        assert_eq!(
            decode("1:1,1,0:true,true,true\n0.0\n0,1.0\n").unwrap_err(),
            CoefficientError::TrailingData { line: 4 }
        );
    }

    #[test]
    fn test_decode_keeps_disabled_group_values() {
        let text = "1:1,1,1:false,true,false\n9.0\n0,1.0\n0,0,2.0";
        let fm = decode(text).unwrap();
        assert_eq!(fm.groups(), Groups::new(false, true, false));
        assert_eq!(fm.bias(), 9.0);
        assert_eq!(fm.norm(), 1.0);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(5.0), "5.0");
        assert_eq!(format_value(-0.25), "-0.25");
        assert_eq!(format_value(0.1), "0.1");
        assert_eq!("1e-8".parse::<f32>().unwrap(), 1e-8);
    }
}
