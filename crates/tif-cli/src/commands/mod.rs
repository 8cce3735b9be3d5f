//! Command implementations for tif-cli

pub mod formats;
pub mod load;
pub mod register;
pub mod save;
pub mod status;

pub use formats::run_formats;
pub use load::run_load;
pub use register::run_register;
pub use save::run_save;
pub use status::run_status;
