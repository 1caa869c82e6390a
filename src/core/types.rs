//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// A tenant identifier. Exactly one current configuration exists per tenant.
pub type TenantId = String;

/// A receiver name as referenced by the routing tree.
pub type ReceiverName = String;

/// A secure field name (e.g., `token`, `url`, `password`).
pub type FieldName = String;

/// An encrypted secret value (base64 of a binary age ciphertext).
pub type EncryptedValue = String;

/// Free-form, non-secret notifier settings.
pub type Settings = serde_json::Map<String, serde_json::Value>;
