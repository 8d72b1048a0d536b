//! Line parsing: shlex tokenizer, substitution engine, redirection split.

pub mod redirect;
pub mod substitute;
pub mod tokenize;
pub mod types;

pub use redirect::{has_redirection_token, plan as plan_redirection};
pub use substitute::{is_valid_name, substitute};
pub use tokenize::{join, split_command, tokenize, unbalanced_quoting};
pub use types::{RedirectMode, Redirection};
