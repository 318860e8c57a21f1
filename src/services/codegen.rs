use uuid::Uuid;

/// Issues the two public identifiers a ticket carries. Uniqueness is
/// enforced by the store, so a collision here only costs the caller a
/// regenerate-and-retry.
pub trait CodeGenerator: Send + Sync {
    /// Short human-readable reference, the kind printed on receipts.
    fn ticket_number(&self) -> String;

    /// Credential presented at the gate. Must be hard to guess, so it
    /// carries far more entropy than the ticket number.
    fn scan_code(&self) -> String;
}

/// UUID-backed generator: `TKT-` plus eight uppercase hex characters for
/// the number, `QR-` plus a full 128-bit hex string for the scan code.
pub struct UuidCodes;

impl CodeGenerator for UuidCodes {
    fn ticket_number(&self) -> String {
        let hex = Uuid::new_v4().simple().to_string().to_uppercase();
        format!("TKT-{}", &hex[..8])
    }

    fn scan_code(&self) -> String {
        format!("QR-{}", Uuid::new_v4().simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_numbers_have_the_short_uppercase_form() {
        let number = UuidCodes.ticket_number();
        assert_eq!(number.len(), "TKT-".len() + 8);
        assert!(number.starts_with("TKT-"));
        assert!(number["TKT-".len()..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn scan_codes_carry_full_uuid_entropy() {
        let code = UuidCodes.scan_code();
        assert_eq!(code.len(), "QR-".len() + 32);
        assert!(code.starts_with("QR-"));
        assert!(code["QR-".len()..]
            .chars()
            .all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn consecutive_codes_differ() {
        assert_ne!(UuidCodes.ticket_number(), UuidCodes.ticket_number());
        assert_ne!(UuidCodes.scan_code(), UuidCodes.scan_code());
    }
}
