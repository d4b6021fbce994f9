//! Macro for implementing Display and FromStr for status enums
//!
//! Lifecycle and status enums are persisted as lowercase text columns and
//! rendered in API payloads, so both directions go through one mapping.
//!
//! # Example
//!
//! ```rust
//! use showup_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum DeliveryState {
//!     Queued,
//!     Sent,
//! }
//!
//! impl_domain_status_conversions!(DeliveryState {
//!     Queued => "queued",
//!     Sent => "sent",
//! });
//!
//! assert_eq!(DeliveryState::Sent.to_string(), "sent");
//! assert_eq!("QUEUED".parse::<DeliveryState>(), Ok(DeliveryState::Queued));
//! ```

/// Implements Display and FromStr traits for status enums
///
/// This macro generates:
/// - Display trait: writes the mapped string for each variant
/// - FromStr trait: parses case-insensitive strings to enum variants
///
/// Parse failures name the enum, e.g. `Invalid MeetingLifecycle: archived`.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
