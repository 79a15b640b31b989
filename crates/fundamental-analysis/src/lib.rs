//! Free-cash-flow estimation and discounted-cash-flow valuation.

pub mod dcf;
pub mod fcf;
pub mod labels;
pub mod resolver;

pub use dcf::{project, upside_percent, DcfValuator};
pub use fcf::{estimate_fcf, fcf_from_statements};
pub use resolver::{resolve_field, resolve_field_checked};

#[cfg(test)]
pub(crate) mod test_support;
