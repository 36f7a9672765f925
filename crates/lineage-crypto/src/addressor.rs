use lineage_types::{ContentKey, Dataset, DatasetRef};
use sha2::{Digest, Sha256};

/// Derives the [`ContentKey`] for a dataset reference.
///
/// The key is `SHA-256(name || namespace)` with no separator between the two
/// parts; it must stay byte-compatible with keys already in long-lived stores.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContentAddressor;

impl ContentAddressor {
    pub const fn new() -> Self {
        Self
    }

    /// Key for a raw name/namespace pair.
    pub fn key_for(&self, name: &str, namespace: &str) -> ContentKey {
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update(namespace.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        ContentKey::from_digest(bytes)
    }

    pub fn key_for_ref(&self, reference: DatasetRef<'_>) -> ContentKey {
        self.key_for(reference.name, reference.namespace)
    }

    pub fn key_for_dataset(&self, dataset: &Dataset) -> ContentKey {
        self.key_for_ref(dataset.reference())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn key_is_deterministic() {
        let a = ContentAddressor::new().key_for("/sales", "abfss://raw@lake");
        let b = ContentAddressor::new().key_for("/sales", "abfss://raw@lake");
        assert_eq!(a, b);
    }

    #[test]
    fn matches_known_sha256_vectors() {
        let addressor = ContentAddressor::new();
        // SHA-256("abc")
        assert_eq!(
            addressor.key_for("ab", "c").to_hex(),
            "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD"
        );
        // SHA-256("")
        assert_eq!(
            addressor.key_for("", "").to_hex(),
            "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855"
        );
    }

    #[test]
    fn concatenation_has_no_separator() {
        let addressor = ContentAddressor::new();
        assert_eq!(addressor.key_for("a", "bc"), addressor.key_for("ab", "c"));
    }

    #[test]
    fn dataset_facets_do_not_affect_key() {
        let addressor = ContentAddressor::new();
        let plain = Dataset::new("orders", "postgres://db");
        let rich = plain
            .clone()
            .with_member("facets", serde_json::json!({"schema": {"fields": []}}));
        assert_eq!(
            addressor.key_for_dataset(&plain),
            addressor.key_for_dataset(&rich)
        );
    }

    #[test]
    fn swapping_name_and_namespace_changes_key() {
        let addressor = ContentAddressor::new();
        assert_ne!(
            addressor.key_for("orders", "db"),
            addressor.key_for("db", "orders")
        );
    }

    proptest! {
        #[test]
        fn distinct_concatenations_get_distinct_keys(
            n1 in ".{0,24}", ns1 in ".{0,24}", n2 in ".{0,24}", ns2 in ".{0,24}"
        ) {
            let addressor = ContentAddressor::new();
            let same_input = format!("{n1}{ns1}") == format!("{n2}{ns2}");
            prop_assert_eq!(
                addressor.key_for(&n1, &ns1) == addressor.key_for(&n2, &ns2),
                same_input
            );
        }
    }
}
