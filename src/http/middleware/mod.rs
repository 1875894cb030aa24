//! Route-level middleware.

pub mod pipeline;

pub use pipeline::{
    validation_middleware, AddressValidator, AmountValidator, JsonBody, Pipeline, RequestFields,
    Validator,
};
