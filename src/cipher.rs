//! Byte-wise XOR stream transform
//!
//! This is reversible obfuscation, **not** encryption. Every content byte is
//! XORed with a single session key byte; there is no key schedule, no
//! diffusion, no authentication, and the key is trivially recoverable from
//! any known plaintext byte. The only property the pipeline relies on is the
//! involution: applying the transform twice with the same key restores the
//! original bytes.
//!
//! Each byte's transform is independent of every other byte, so callers may
//! stream fixed-size chunks through [`StreamCipher::apply`] in any order and
//! across any number of workers.

/// Reversible XOR transform over byte buffers
///
/// ```
/// use parbak::cipher::StreamCipher;
///
/// let cipher = StreamCipher::new(0xAE);
/// let mut data = *b"hello";
/// cipher.apply(&mut data);
/// assert_ne!(&data, b"hello");
/// cipher.apply(&mut data);
/// assert_eq!(&data, b"hello");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StreamCipher {
    key: u8,
}

impl StreamCipher {
    /// Create a cipher for the given session key byte
    pub fn new(key: u8) -> Self {
        Self { key }
    }

    /// The session key byte
    pub fn key(&self) -> u8 {
        self.key
    }

    /// Transform a buffer in place
    ///
    /// Applying this twice with the same key is the identity.
    pub fn apply(&self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            *byte ^= self.key;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_vector() {
        let cipher = StreamCipher::new(0xAE);
        let mut data = vec![0x00, 0xFF, 0xAE, 0x41];
        cipher.apply(&mut data);
        assert_eq!(data, vec![0xAE, 0x51, 0x00, 0xEF]);
    }

    #[test]
    fn test_zero_key_is_identity() {
        let cipher = StreamCipher::new(0x00);
        let mut data = b"unchanged".to_vec();
        cipher.apply(&mut data);
        assert_eq!(data, b"unchanged");
    }

    #[test]
    fn test_empty_buffer() {
        let cipher = StreamCipher::new(0xAE);
        let mut data: Vec<u8> = Vec::new();
        cipher.apply(&mut data);
        assert!(data.is_empty());
    }

    proptest! {
        #[test]
        fn prop_double_apply_restores_original(data in proptest::collection::vec(any::<u8>(), 0..4096), key in any::<u8>()) {
            let cipher = StreamCipher::new(key);
            let mut transformed = data.clone();
            cipher.apply(&mut transformed);
            cipher.apply(&mut transformed);
            prop_assert_eq!(transformed, data);
        }

        #[test]
        fn prop_chunked_equals_whole(data in proptest::collection::vec(any::<u8>(), 0..4096), key in any::<u8>(), split in 0usize..4096) {
            let cipher = StreamCipher::new(key);
            let mut whole = data.clone();
            cipher.apply(&mut whole);

            let mut chunked = data;
            let mid = split.min(chunked.len());
            let (head, tail) = chunked.split_at_mut(mid);
            cipher.apply(head);
            cipher.apply(tail);
            prop_assert_eq!(chunked, whole);
        }
    }
}
