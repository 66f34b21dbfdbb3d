//! Storybook Engine: personalized Arabic storybook text.
//!
//! Rewrites masculine-default narrative templates into gender-correct prose
//! using a static lexical rule table, then wraps the result into a
//! right-to-left text box sized for a fixed illustration panel.

pub mod config;
pub mod core;
pub mod schema;
