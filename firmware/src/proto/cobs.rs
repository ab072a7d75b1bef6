//! Consistent-Overhead Byte Stuffing.
//!
//! Removes every `0x00` from a packet so the frame delimiter is
//! unambiguous. Worst-case overhead is one byte per 254 bytes of input
//! plus one; the empty packet encodes to the single byte `0x01`.

/// Decode failure. The caller reports it on the wire as `BAD_LEN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CobsError {
    /// Encoded frame had zero length.
    Empty,
    /// A block code of `0x00` is never produced by a valid encoder.
    ZeroCode,
    /// A block code pointed past the end of the frame.
    Truncated,
    /// Output did not fit in the destination buffer.
    Overrun,
}

/// Worst-case encoded size for `n` input bytes (delimiter excluded).
pub const fn max_encoded_len(n: usize) -> usize {
    n + n / 254 + 1
}

/// Encode `src` into `dst`, returning the encoded length.
///
/// Returns `None` if `dst` is too small. The trailing `0x00` delimiter
/// is not written here; the codec appends it.
pub fn encode(src: &[u8], dst: &mut [u8]) -> Option<usize> {
    let mut code_index = 0usize;
    let mut code: u8 = 1;
    let mut out = 1usize;

    if dst.is_empty() {
        return None;
    }

    for &byte in src {
        if byte == 0 {
            dst[code_index] = code;
            code_index = out;
            if out >= dst.len() {
                return None;
            }
            out += 1;
            code = 1;
            continue;
        }

        if out >= dst.len() {
            return None;
        }
        dst[out] = byte;
        out += 1;
        code += 1;

        if code == 0xFF {
            dst[code_index] = code;
            code_index = out;
            if out >= dst.len() {
                return None;
            }
            out += 1;
            code = 1;
        }
    }

    dst[code_index] = code;
    Some(out)
}

/// Decode `src` (delimiter already stripped) into `dst`, returning the
/// decoded length.
pub fn decode(src: &[u8], dst: &mut [u8]) -> Result<usize, CobsError> {
    if src.is_empty() {
        return Err(CobsError::Empty);
    }

    let mut out = 0usize;
    let mut index = 0usize;

    while index < src.len() {
        let code = src[index];
        if code == 0 {
            return Err(CobsError::ZeroCode);
        }
        index += 1;

        let end = index + code as usize - 1;
        if end > src.len() {
            return Err(CobsError::Truncated);
        }

        let run = &src[index..end];
        if out + run.len() > dst.len() {
            return Err(CobsError::Overrun);
        }
        dst[out..out + run.len()].copy_from_slice(run);
        out += run.len();
        index = end;

        if code < 0xFF && index < src.len() {
            if out >= dst.len() {
                return Err(CobsError::Overrun);
            }
            dst[out] = 0;
            out += 1;
        }
    }

    Ok(out)
}

// ── Tests ────────────────────────────────────────────────────
