use crate::error::{Result, StorageError};

/// One binary payload submitted for storage.
///
/// Ownership moves into the batch coordinator's unit of work for the
/// duration of the operation and is released when the unit completes. The
/// display name travels to the store as metadata and shows up in error and
/// log text; it is never used as a storage key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadItem {
    pub display_name: String,
    pub bytes: Vec<u8>,
}

impl PayloadItem {
    pub fn new(display_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            display_name: display_name.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Guardrail applied by the facade before any unit is spawned.
    pub fn validate(&self) -> Result<()> {
        if self.display_name.trim().is_empty() {
            return Err(StorageError::InvalidPayload(
                "payload display name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_payload_passes_validation() {
        let item = PayloadItem::new("track.flac", vec![1, 2, 3]);
        assert!(item.validate().is_ok());
        assert_eq!(item.size(), 3);
    }

    #[test]
    fn blank_display_name_is_rejected() {
        let item = PayloadItem::new("   ", vec![1]);
        assert!(matches!(
            item.validate(),
            Err(StorageError::InvalidPayload(_))
        ));
    }
}
