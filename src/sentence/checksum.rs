/// XOR of every byte in `content`.
///
/// `content` is everything between, and excluding, the `$` and `*` delimiters.
#[must_use]
pub fn checksum(content: &str) -> u8 {
    content.bytes().fold(0, |acc, b| acc ^ b)
}

/// Compare a transmitted checksum field against the checksum computed for `content`.
///
/// The transmitted field must be exactly two hex digits. Returns the computed value in
/// the `Err` case so it can be reported.
pub(crate) fn verify(content: &str, transmitted: &str) -> std::result::Result<(), u8> {
    let computed = checksum(content);
    if transmitted.len() != 2 || !transmitted.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(computed);
    }
    match u8::from_str_radix(transmitted, 16) {
        Ok(sum) if sum == computed => Ok(()),
        _ => Err(computed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_known_value() {
        // Standard NMEA example sentence
        assert_eq!(
            checksum("GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,"),
            0x47
        );
    }

    #[test]
    fn test_checksum_empty() {
        assert_eq!(checksum(""), 0);
    }

    #[test]
    fn test_verify() {
        let sum = format!("{:02X}", checksum("CUSWIND,1,2,3"));
        assert_eq!(sum, "4D");
        assert_eq!(verify("CUSWIND,1,2,3", &sum), Ok(()));
        assert_eq!(verify("CUSWIND,1,2,3", &sum.to_lowercase()), Ok(()));
        assert!(verify("CUSWIND,1,2,3", "ZZ").is_err());
        assert!(verify("CUSWIND,1,2,3", "+D").is_err());
        assert!(verify("CUSWIND,1,2,3", "").is_err());
        assert!(verify("CUSWIND,1,2,3", &format!("0{sum}")).is_err());
    }
}
