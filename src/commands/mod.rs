mod compare_command;
pub use compare_command::*;

mod text_command;
pub use text_command::*;
