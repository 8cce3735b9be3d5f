//! Built-in file formats

mod externalized;
mod text;

pub use externalized::ExternalizedFormat;
pub use text::TextFormat;
