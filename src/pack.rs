//! Checksum and trailer handling for an SKC payload stapled to an initrd.
//!
//! Ported from `skced.c`'s `checksum()`/`load_skc_from_initrd()`/
//! `append_skc()`/`delete_skc()`. The original keeps this in the same
//! translation unit as the parser rather than treating it as a separate
//! tool, so it lands here as a small first-party module instead of being
//! left as an unimplemented "collaborator".

/// A detected trailer: the byte range of the payload and its declared size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
    /// Start of the payload within the file.
    pub payload_start: usize,
    /// Length of the payload, not including the 8-byte size+checksum footer.
    pub payload_len: usize,
}

/// Unsigned byte sum of `payload`, wrapping on overflow. Mirrors
/// `checksum()` in `skced.c`.
pub fn checksum(payload: &[u8]) -> u32 {
    payload.iter().fold(0u32, |sum, &b| sum.wrapping_add(b as u32))
}

/// Look for a `payload | u32 size | u32 checksum` trailer at the end of
/// `file`, validating the checksum. Mirrors `load_skc_from_initrd()`.
///
/// Returns `None` if the file is too short, the declared size doesn't fit,
/// or the checksum doesn't match — any of which the original treats as
/// "no SKC here" rather than a hard error.
pub fn find_trailer(file: &[u8]) -> Option<Trailer> {
    if file.len() < 8 {
        return None;
    }
    let footer = &file[file.len() - 8..];
    let size = u32::from_ne_bytes(footer[0..4].try_into().unwrap()) as usize;
    let want_csum = u32::from_ne_bytes(footer[4..8].try_into().unwrap());

    if size.checked_add(8)? > file.len() {
        return None;
    }
    let payload_start = file.len() - 8 - size;
    let payload = &file[payload_start..payload_start + size];

    if checksum(payload) != want_csum {
        return None;
    }

    Some(Trailer { payload_start, payload_len: size })
}

/// Truncate any existing trailer out of `file`. Returns whether one was
/// present. Mirrors `delete_skc()`.
pub fn delete(file: &mut Vec<u8>) -> bool {
    match find_trailer(file) {
        Some(t) => {
            file.truncate(t.payload_start);
            true
        }
        None => false,
    }
}

/// Delete any existing trailer, then append `payload | size | checksum`.
/// Mirrors `append_skc()`.
pub fn append(file: &mut Vec<u8>, payload: &[u8]) {
    delete(file);
    let size = payload.len() as u32;
    let csum = checksum(payload);
    file.extend_from_slice(payload);
    file.extend_from_slice(&size.to_ne_bytes());
    file.extend_from_slice(&csum.to_ne_bytes());
}
