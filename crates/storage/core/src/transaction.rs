//! Transaction shapes exchanged with signing capabilities.
//!
//! Wallets and SDKs hand over transactions in two shapes: raw BCS bytes, or a
//! structured transaction object whose optional abilities (a sender setter, a
//! serialization accessor, a bare `serialize` method) vary by origin. The
//! shape is resolved once, at the adapter boundary, into a [`SignableRequest`].

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Raw shapes
// ============================================================================

/// Transaction as produced by a collaborator, before normalization.
pub enum RawTransaction {
    /// Byte-encoded transaction; must be decoded before it can be signed.
    Bytes(Vec<u8>),
    /// Structured transaction object.
    Structured(Box<dyn TransactionObject>),
}

impl RawTransaction {
    pub fn shape(&self) -> TransactionShape {
        match self {
            RawTransaction::Bytes(_) => TransactionShape::RawBytes,
            RawTransaction::Structured(_) => TransactionShape::Structured,
        }
    }
}

impl fmt::Debug for RawTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawTransaction::Bytes(bytes) => {
                write!(f, "RawTransaction::Bytes({} bytes)", bytes.len())
            }
            RawTransaction::Structured(tx) => f
                .debug_tuple("RawTransaction::Structured")
                .field(tx)
                .finish(),
        }
    }
}

/// Shape a transaction arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionShape {
    RawBytes,
    Structured,
}

/// Structured transaction object with optional abilities.
///
/// Abilities are probed explicitly (`has_*`) rather than assumed. Defaults
/// describe an object with no abilities at all.
pub trait TransactionObject: Send + Sync + fmt::Debug {
    /// The object itself, as JSON.
    fn snapshot(&self) -> serde_json::Value;

    /// Sender currently recorded on the object, if any.
    fn sender(&self) -> Option<&str> {
        None
    }

    fn has_sender_setter(&self) -> bool {
        false
    }

    /// Only called when [`has_sender_setter`](Self::has_sender_setter) is true.
    fn set_sender(&mut self, _sender: &str) {}

    /// Whether the object exposes its own serialization accessor.
    fn has_serializer(&self) -> bool {
        false
    }

    /// Serialization accessor. Only called when [`has_serializer`](Self::has_serializer) is true.
    fn to_json(&self) -> serde_json::Value {
        self.snapshot()
    }

    /// Bare `serialize` method, when the object has one.
    fn serialize(&self) -> Option<Vec<u8>> {
        None
    }
}

// ============================================================================
// Normalized shapes
// ============================================================================

/// Serialized form presented to a signing capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum TransactionPayload {
    Bytes(Vec<u8>),
    Json(serde_json::Value),
}

/// Transaction guaranteed to expose a serialization entry point.
///
/// Objects that already have an accessor are passed through; the rest are
/// wrapped, deferring to `serialize` when present and to the object itself
/// otherwise.
#[derive(Debug)]
pub struct SerializableTransaction {
    inner: Box<dyn TransactionObject>,
    wrapped: bool,
}

impl SerializableTransaction {
    pub fn new(inner: Box<dyn TransactionObject>) -> Self {
        let wrapped = !inner.has_serializer();
        Self { inner, wrapped }
    }

    /// Whether an adapter had to supply the serialization accessor.
    pub fn is_wrapped(&self) -> bool {
        self.wrapped
    }

    pub fn payload(&self) -> TransactionPayload {
        if !self.wrapped {
            return TransactionPayload::Json(self.inner.to_json());
        }
        match self.inner.serialize() {
            Some(bytes) => TransactionPayload::Bytes(bytes),
            None => TransactionPayload::Json(self.inner.snapshot()),
        }
    }

    pub fn inner(&self) -> &dyn TransactionObject {
        self.inner.as_ref()
    }
}

/// Uniform envelope handed to a signing capability.
#[derive(Debug)]
pub struct SignableRequest {
    /// Always the signer's address.
    pub sender: String,
    pub shape: TransactionShape,
    pub transaction: SerializableTransaction,
}

impl SignableRequest {
    pub fn payload(&self) -> TransactionPayload {
        self.transaction.payload()
    }

    /// JSON rendering for signers that live outside the process.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "sender": self.sender,
            "shape": self.shape,
            "payload": self.payload(),
        })
    }
}

/// Result returned by a signing capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// Transaction digest reported by the signer
    pub digest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Bare;

    impl TransactionObject for Bare {
        fn snapshot(&self) -> serde_json::Value {
            serde_json::json!({ "bare": true })
        }
    }

    #[derive(Debug)]
    struct WithSerialize;

    impl TransactionObject for WithSerialize {
        fn snapshot(&self) -> serde_json::Value {
            serde_json::Value::Null
        }

        fn serialize(&self) -> Option<Vec<u8>> {
            Some(vec![1, 2, 3])
        }
    }

    #[derive(Debug)]
    struct WithAccessor;

    impl TransactionObject for WithAccessor {
        fn snapshot(&self) -> serde_json::Value {
            serde_json::Value::Null
        }

        fn has_serializer(&self) -> bool {
            true
        }

        fn to_json(&self) -> serde_json::Value {
            serde_json::json!({ "accessor": true })
        }

        fn serialize(&self) -> Option<Vec<u8>> {
            Some(vec![9])
        }
    }

    #[test]
    fn test_payload_fallback_chain() {
        let bare = SerializableTransaction::new(Box::new(Bare));
        assert!(bare.is_wrapped());
        assert_eq!(
            bare.payload(),
            TransactionPayload::Json(serde_json::json!({ "bare": true }))
        );

        let serialize = SerializableTransaction::new(Box::new(WithSerialize));
        assert!(serialize.is_wrapped());
        assert_eq!(serialize.payload(), TransactionPayload::Bytes(vec![1, 2, 3]));

        let accessor = SerializableTransaction::new(Box::new(WithAccessor));
        assert!(!accessor.is_wrapped());
        assert_eq!(
            accessor.payload(),
            TransactionPayload::Json(serde_json::json!({ "accessor": true }))
        );
    }

    #[test]
    fn test_request_json() {
        let request = SignableRequest {
            sender: "0xa11ce".to_string(),
            shape: TransactionShape::RawBytes,
            transaction: SerializableTransaction::new(Box::new(WithSerialize)),
        };
        let json = request.to_json();
        assert_eq!(json["sender"], "0xa11ce");
        assert_eq!(json["shape"], "rawBytes");
        assert_eq!(json["payload"]["kind"], "bytes");
        assert_eq!(json["payload"]["data"], serde_json::json!([1, 2, 3]));
    }
}
