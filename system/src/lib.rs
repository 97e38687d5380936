pub extern crate bincode;
pub extern crate serde;
pub extern crate serde_json;
pub extern crate uuid;

mod codec;
mod hub;
mod message;
mod operation_log;
mod presence;
mod stroke_buffer;
mod undo_redo;

pub use codec::*;
pub use hub::*;
pub use message::*;
pub use operation_log::*;
pub use presence::*;
pub use stroke_buffer::*;
pub use undo_redo::*;
