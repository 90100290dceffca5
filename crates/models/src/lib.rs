//! Entity schema for the restaurant directory: the SeaORM entity, its
//! insert/patch payloads, and database connection helpers.

pub mod errors;
pub mod db;
pub mod restaurant;

#[cfg(test)]
mod tests;
