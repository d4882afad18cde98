//! Payload masking.
//!
//! Masked frames XOR payload byte `i` with `key[i % 4]`. Applying the same key
//! twice restores the original bytes, so one routine serves both directions.

/// Mask or unmask `buf` in place with `key`.
///
/// # Examples
///
/// ```
/// use wsframe::mask::apply_mask;
///
/// let key = [0x37, 0xfa, 0x21, 0x3d];
/// let mut payload = *b"Hello";
/// apply_mask(&mut payload, key);
/// assert_eq!(payload, [0x7f, 0x9f, 0x4d, 0x51, 0x58]);
/// apply_mask(&mut payload, key);
/// assert_eq!(&payload, b"Hello");
/// ```
pub fn apply_mask(buf: &mut [u8], key: [u8; 4]) {
    let mut chunks = buf.chunks_exact_mut(4);
    for chunk in &mut chunks {
        for (byte, k) in chunk.iter_mut().zip(key) {
            *byte ^= k;
        }
    }
    for (byte, k) in chunks.into_remainder().iter_mut().zip(key) {
        *byte ^= k;
    }
}

/// Produce a fresh random masking key.
#[must_use]
pub fn generate_mask_key() -> [u8; 4] { rand::random() }

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;

    use super::{apply_mask, generate_mask_key};

    #[rstest]
    #[case(0)]
    #[case(3)]
    #[case(4)]
    #[case(1_027)]
    fn masking_twice_is_identity(#[case] len: usize) {
        let original: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        let mut buf = original.clone();
        let key = [0xde, 0xad, 0xbe, 0xef];

        apply_mask(&mut buf, key);
        if len > 0 {
            assert_ne!(buf, original);
        }
        apply_mask(&mut buf, key);
        assert_eq!(buf, original);
    }

    #[test]
    fn masking_uses_byte_position_modulo_four() {
        let mut buf = [0_u8; 6];
        apply_mask(&mut buf, [1, 2, 3, 4]);
        assert_eq!(buf, [1, 2, 3, 4, 1, 2]);
    }

    #[test]
    fn generated_keys_are_random() {
        let keys: HashSet<[u8; 4]> = (0..256).map(|_| generate_mask_key()).collect();
        assert!(keys.len() > 250, "only {} distinct keys in 256", keys.len());

        let spread: HashSet<u8> = keys.iter().map(|key| key[3]).collect();
        assert!(spread.len() > 64, "last key byte barely varies");
    }
}
