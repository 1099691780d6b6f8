pub mod command_stream;
pub mod error;
pub mod output_macros;

pub use command_stream::{stream_and_capture, CommandOutput, LineObserver, LogObserver};
pub use error::{CoreError, Result};
