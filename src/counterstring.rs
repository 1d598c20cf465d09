// counterstring.rs

//! Counter strings: the number before each marker is the position of that
//! marker, counting from 1, so `2*4*6*8*11*` can be measured by eye.

use crate::error::CounterStringError;

pub const DEFAULT_MARKER: &str = "*";

fn digits(n: usize) -> usize {
    let mut n = n;
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

/// Generate a counter string of exactly `target_length` characters.
///
/// Only the first character of `marker` is used.
pub fn generate(target_length: usize, marker: &str) -> Result<String, CounterStringError> {
    let marker = marker.chars().next().ok_or(CounterStringError::EmptyMarker)?;

    let mut result = String::with_capacity(target_length + 8);
    result.push('2');
    result.push(marker);
    // length in chars; the marker may be wider than one byte
    let mut len = 2;
    let mut counting_no = 2;

    while len < target_length {
        let cn_len = digits(counting_no);
        counting_no = len + cn_len + 1;
        if digits(counting_no) > cn_len {
            counting_no += 1;
        }
        let numeral = counting_no.to_string();
        len += numeral.len() + 1;
        result.push_str(&numeral);
        result.push(marker);
    }

    if len > target_length {
        if let Some((cut, _)) = result.char_indices().nth(target_length) {
            result.truncate(cut);
        }
    }
    Ok(result)
}
