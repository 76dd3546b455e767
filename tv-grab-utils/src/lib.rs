pub mod fs_util;
pub mod macros;
pub mod text;
