use rand::Rng;

// No 0/O/1/I so codes survive being read over the phone at the counter.
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const SUFFIX_LEN: usize = 8;

/// Generate a booking code like `FRY-7KQW2MNB`. Uniqueness is enforced
/// by the unique column constraint; collisions at this length are
/// practically nonexistent.
pub fn booking_code() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("FRY-{}", suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_has_expected_shape() {
        let code = booking_code();
        assert_eq!(code.len(), 4 + SUFFIX_LEN);
        assert!(code.starts_with("FRY-"));
        assert!(code[4..].bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn codes_are_not_constant() {
        let a = booking_code();
        let b = booking_code();
        // Astronomically unlikely to collide in two draws.
        assert_ne!(a, b);
    }
}
