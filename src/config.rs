//! `Settings` and the loader that layers defaults, `config.toml` and
//! `MAESTRO__*` environment overrides.

mod load;
mod schema;

pub use load::default_state_dir;
pub use schema::*;

#[cfg(test)]
mod tests;
