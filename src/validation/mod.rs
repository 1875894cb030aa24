//! Request field validation.
//!
//! Pure predicates with no I/O. The HTTP pipeline in
//! [`crate::http::middleware::pipeline`] wraps them as short-circuiting
//! stages; config validation reuses the address check for the admin list.

pub mod address;
pub mod amount;

pub use address::{check_address, is_valid_address, select_address, AddressError, ADDRESS_EXPECTATION};
pub use amount::{check_amount, parse_amount, AmountError, AmountParsing, MAX_AMOUNT};
