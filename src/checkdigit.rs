// checkdigit.rs

//! ASN (Arrest Summons Number) check letter.
//!
//! The check letter is derived from a re-ordering of the first 19
//! characters, taken modulo 23 and mapped onto a fixed alphabet.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::CheckDigitError;

pub const SEED_LEN: usize = 19;

/// Prefix used by `generate_asn`; the rest of the seed comes from the clock.
pub const ASN_PREFIX: &str = "1234AA";

const LETTERS: &[u8; 23] = b"ZABCDEFGHJKLMNPQRTUVWXY";

/// Append the check letter to a 19 character ASN seed.
///
/// ```text
/// 1223AA8900000000000 -> 1223AA8900000000000M
/// ```
pub fn compute(identifier: &str) -> Result<String, CheckDigitError> {
    let len = identifier.chars().count();
    if len != SEED_LEN {
        return Err(CheckDigitError::InvalidLength(len));
    }
    // 19 chars but multi-byte: the letters can only sit at [4:6], so some
    // digit position is taken by a non-digit.
    if !identifier.is_ascii() {
        return Err(CheckDigitError::NonNumeric);
    }
    let id = identifier;
    let rearranged = [&id[2..4], &id[6..8], &id[0..2], &id[8..19]].concat();
    if !rearranged.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CheckDigitError::NonNumeric);
    }
    // 17 digits always fit in a u64.
    let value: u64 = rearranged
        .parse()
        .map_err(|_| CheckDigitError::NonNumeric)?;
    let letter = LETTERS[(value % 23) as usize] as char;

    let mut result = String::with_capacity(SEED_LEN + 1);
    result.push_str(identifier);
    result.push(letter);
    Ok(result)
}

/// Build a valid ASN from the fixed prefix and the given time in
/// milliseconds since the Unix epoch.
pub fn generate_asn(since_epoch: Duration) -> Result<String, CheckDigitError> {
    let seed = format!("{}{:013}", ASN_PREFIX, since_epoch.as_millis());
    compute(&seed)
}

/// `generate_asn` for the current time.
pub fn asn_now() -> Result<String, CheckDigitError> {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    generate_asn(since_epoch)
}
