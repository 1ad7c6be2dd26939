//! Prompt templates for recipe generation and field repair.

mod generation;
mod repair;

pub use generation::{render_user_prompt, GENERATION_SYSTEM_PROMPT};
pub use repair::{render_repair_prompt, REPAIR_SYSTEM_PROMPT};
