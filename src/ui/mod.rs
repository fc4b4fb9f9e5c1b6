//! Terminal output helpers
//!
//! Uses `cliclack` styling in interactive terminals and falls back to plain
//! prefixed lines in CI and when output is piped.

mod context;
mod output;

pub use context::UiContext;
pub use output::{
    intro, key_value, outro_success, outro_warn, step_error_detail, step_info, step_ok_detail,
};
