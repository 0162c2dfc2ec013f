use isbnscan_core::{Identifier, IdentifierScanner, ScanConfig, ScanError};

use super::ConfigArgs;

pub fn run(isbn: &str, config_args: &ConfigArgs) -> Result<(), ScanError> {
    let config = config_args.resolve()?;
    let id = check(isbn, &config)?;
    match id.prefix() {
        Some(prefix) => println!("{}  {}  (prefix {})", id.kind(), id, prefix),
        None => println!("{}  {}", id.kind(), id),
    }
    Ok(())
}

/// Validate the checksum, then the ISBN-13 prefix against the configured set.
fn check(isbn: &str, config: &ScanConfig) -> Result<Identifier, ScanError> {
    let id: Identifier = isbn.parse()?;
    if !IdentifierScanner::new(config).accepts(&id) {
        return Err(ScanError::PrefixNotAccepted {
            isbn: id.to_string(),
            prefix: id.prefix().unwrap_or_default().to_string(),
        });
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_valid() {
        let id = check("978-0-13-468599-1", &ScanConfig::default()).unwrap();
        assert_eq!(id.digits(), "9780134685991");
        assert!(check("0-8044-2957-X", &ScanConfig::default()).is_ok());
    }

    #[test]
    fn test_check_rejects_unknown_prefix() {
        let err = check("1234567890128", &ScanConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ScanError::PrefixNotAccepted { ref prefix, .. } if prefix == "123"
        ));

        let only_979 = ScanConfig::default().with_prefixes(vec!["979".into()]);
        assert!(check("9780134685991", &only_979).is_err());
    }

    #[test]
    fn test_check_rejects_bad_checksum() {
        let err = check("978-0-13-468599-2", &ScanConfig::default()).unwrap_err();
        assert!(matches!(err, ScanError::InvalidIsbn(_)));
    }
}
