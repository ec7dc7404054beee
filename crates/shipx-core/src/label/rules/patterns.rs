//! Built-in anchor patterns for shipping label fields.
//!
//! Every pattern carries exactly one capture group holding the field value.

use lazy_static::lazy_static;
use regex::Regex;

/// `Order ID:` followed by `SA` and exactly nine digits.
pub const ORDER_ID_PATTERN: &str = r"Order ID:\s*(SA\d{9})(?:\D|$)";

/// `Tracking ID:` followed by exactly twelve digits.
pub const TRACKING_ID_PATTERN: &str = r"Tracking ID:\s*(\d{12})(?:\D|$)";

/// Rest of the line after the shipping deadline sentence.
pub const DUE_DATE_PATTERN: &str = r"Be sure to ship your package by\s*(\S.*)";

/// Device description between `about your` and `trade-in`.
pub const TRADE_IN_PATTERN: &str = r"about your\s*(.*?)\s*trade-in";

lazy_static! {
    pub static ref ORDER_ID: Regex = Regex::new(ORDER_ID_PATTERN).unwrap();

    pub static ref TRACKING_ID: Regex = Regex::new(TRACKING_ID_PATTERN).unwrap();

    pub static ref DUE_DATE: Regex = Regex::new(DUE_DATE_PATTERN).unwrap();

    pub static ref TRADE_IN: Regex = Regex::new(TRADE_IN_PATTERN).unwrap();
}
