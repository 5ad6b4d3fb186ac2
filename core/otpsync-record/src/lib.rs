//! OTP provisioning record model and codec.
//!
//! An OTP record is the small auxiliary file that drives counter-based
//! one-time-password generation. It is synchronized between a device cache
//! and a remote backend, so its encoding must stay readable by every client:
//! - [`OtpRecord`] holds the `counter` plus provider-opaque fields
//! - [`OtpRecordCodec`] parses and writes the XML encoding
//!
//! The counter is the only field this crate interprets. All other elements,
//! structured ones included, are carried through in their original order.
//!
//! # Example
//!
//! ```
//! use otpsync_record::{OtpRecord, OtpRecordCodec};
//!
//! let record = OtpRecord::new(7).with_field("Secret", "JBSWY3DPEHPK3PXP");
//! let bytes = OtpRecordCodec::encode(&record).unwrap();
//! let decoded = OtpRecordCodec::decode(&bytes).unwrap();
//!
//! assert_eq!(decoded.counter(), 7);
//! assert_eq!(decoded.field("Secret"), Some("JBSWY3DPEHPK3PXP"));
//! ```

mod codec;
mod error;
mod record;

pub use codec::{COUNTER_ELEMENT, OtpRecordCodec};
pub use error::{RecordError, RecordResult};
pub use record::{DEFAULT_ROOT_ELEMENT, OtpField, OtpRecord, XmlAttribute};
