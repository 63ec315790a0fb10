pub mod wrapper;

pub use wrapper::{split_tokens, wrap_text, Token};
