//! Widgets drawn through any [`Drawable`](crate::drawable::Drawable).

pub mod input_field;
pub mod list;
pub mod prompt;

pub use input_field::{common_prefix, FieldEvent, InputField, Suggester};
pub use list::{Formatter, List};
pub use prompt::{int_prompt, Prompt, PromptBuilder};
