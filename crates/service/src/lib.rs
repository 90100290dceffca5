//! Service layer providing business-oriented CRUD operations on top of models.
//! - Separates business logic from data access through repository traits.
//! - Validates untyped request parts with static rule sets before any store call.
//! - Reuses entity definitions and model checks from the `models` crate.

pub mod errors;
pub mod pagination;
pub mod validation;
pub mod restaurant;
#[cfg(test)]
pub mod test_support;
