// Chat turns: the streaming driver and its Server-Sent Events surface.

pub mod driver;
pub mod stream;

pub use driver::StreamMode;
pub use stream::{spawn_turn, TurnSse};
