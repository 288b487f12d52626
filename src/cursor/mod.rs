pub mod codec;
pub mod token;

pub use codec::{decode, encode, CursorBound, CursorMap};
pub use token::{carried_cursors, generate_token, next_cursors};
