// apps/sg_cli/src/commands/mod.rs

//! 子命令

pub mod assign;
pub mod info;
pub mod profiles;
pub mod scan;
pub mod validate;
