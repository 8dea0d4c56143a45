/* Copyright (c) 2026 Olle Mårtensson. This Source Code Form is subject to the terms of the Eclipse Public License, v. 2.0. */
//! Crypto-conditions: composable cryptographic commitments.
//!
//! A [`Condition`] is a compact commitment to a required proof; a
//! [`Fulfillment`] is the proof itself. Deriving a condition from a
//! fulfillment is deterministic, both sides have a canonical DER wire
//! form, and conditions additionally have an `ni:` URI form. Everything
//! is a pure function of its inputs: no state, no I/O.
//!
//! # Examples
//! ```
//! use cryptoconditions::{decode_fulfillment, encode_fulfillment, validate, Fulfillment, PreimageSha256};
//!
//! let fulfillment = Fulfillment::from(PreimageSha256::new(b"hello".to_vec()));
//! let condition = fulfillment.condition();
//!
//! let bytes = encode_fulfillment(&fulfillment);
//! let decoded = decode_fulfillment(&bytes).expect("decode");
//! assert_eq!(decoded, fulfillment);
//!
//! validate(&condition, &decoded, b"any message").expect("validate");
//! ```

mod error;

pub mod binary;
pub mod condition;
pub mod fulfillment;
pub mod uri;
pub mod validate;

pub use binary::{
    decode_condition, decode_fulfillment, encode_condition, encode_fulfillment, MAX_DECODE_DEPTH,
};
pub use condition::{Condition, ConditionType, ConditionTypeSet};
pub use error::{CryptoConditionError, CryptoConditionResult};
pub use fulfillment::{
    Ed25519Sha256, Fulfillment, PreimageSha256, PrefixSha256, RsaSha256, ThresholdSha256,
};
pub use uri::{condition_uri, parse_condition_uri};
pub use validate::validate;
