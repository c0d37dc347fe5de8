//! The OpenSubtitles-style content fingerprint of §4.4 step 2, confirmed
//! byte-for-byte against
//! `original_source/src/common/utils.py::calculate_opensubtitles_hash`:
//! seed = file size; sum the first and last 64 KiB as little-endian
//! 8-byte words, wrapping modulo 2^64; render as 16 lowercase hex
//! digits. Files smaller than 128 KiB have no fingerprint.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

const CHUNK_SIZE: u64 = 65536;
const MIN_FILE_SIZE: u64 = CHUNK_SIZE * 2;

/// Computes the fingerprint of a local file, or `None` if it does not
/// exist, is not a regular file, or is smaller than 128 KiB.
pub fn compute_fingerprint(path: &Path) -> std::io::Result<Option<String>> {
    if !path.is_file() {
        return Ok(None);
    }
    let mut file = File::open(path)?;
    let file_size = file.metadata()?.len();
    if file_size < MIN_FILE_SIZE {
        return Ok(None);
    }

    let mut hash_value = file_size as u64;
    hash_value = hash_value.wrapping_add(sum_words(&mut file, 0)?);
    hash_value = hash_value.wrapping_add(sum_words(&mut file, file_size - CHUNK_SIZE)?);

    Ok(Some(format!("{hash_value:016x}")))
}

fn sum_words(file: &mut File, offset: u64) -> std::io::Result<u64> {
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = [0u8; 8];
    let mut sum: u64 = 0;
    for _ in 0..(CHUNK_SIZE / 8) {
        file.read_exact(&mut buf)?;
        sum = sum.wrapping_add(u64::from_le_bytes(buf));
    }
    Ok(sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_of_size(size: usize, fill: u8) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(&vec![fill; size]).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn below_minimum_size_has_no_fingerprint() {
        let f = file_of_size((MIN_FILE_SIZE - 1) as usize, 0xAB);
        assert_eq!(compute_fingerprint(f.path()).unwrap(), None);
    }

    #[test]
    fn exactly_minimum_size_has_a_fingerprint() {
        let f = file_of_size(MIN_FILE_SIZE as usize, 0xAB);
        assert!(compute_fingerprint(f.path()).unwrap().is_some());
    }

    #[test]
    fn is_deterministic_across_runs() {
        let f = file_of_size(200_000, 0x42);
        let a = compute_fingerprint(f.path()).unwrap();
        let b = compute_fingerprint(f.path()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn differs_for_different_content() {
        let a = file_of_size(200_000, 0x11);
        let b = file_of_size(200_000, 0x22);
        assert_ne!(
            compute_fingerprint(a.path()).unwrap(),
            compute_fingerprint(b.path()).unwrap()
        );
    }

    #[test]
    fn is_sixteen_lowercase_hex_digits() {
        let f = file_of_size(200_000, 0x77);
        let hash = compute_fingerprint(f.path()).unwrap().unwrap();
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn missing_file_has_no_fingerprint() {
        let path = Path::new("/nonexistent/path/to/nowhere.mp4");
        assert_eq!(compute_fingerprint(path).unwrap(), None);
    }

    proptest::proptest! {
        #[test]
        fn determinism_and_shape_hold_for_arbitrary_sizes_and_fill_bytes(
            extra in 0u64..4096,
            fill in proptest::prelude::any::<u8>(),
        ) {
            let size = (MIN_FILE_SIZE + extra) as usize;
            let f = file_of_size(size, fill);
            let a = compute_fingerprint(f.path()).unwrap().unwrap();
            let b = compute_fingerprint(f.path()).unwrap().unwrap();
            proptest::prop_assert_eq!(&a, &b);
            proptest::prop_assert_eq!(a.len(), 16);
            proptest::prop_assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }
}
