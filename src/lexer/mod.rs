mod lexer;
mod stream;
mod token;

pub use lexer::{ELEMENT_MAX, INPUT_MAX, LexError, Lexer};
pub use stream::TokenStream;
pub use token::{Token, TokenKind};
