pub mod assets;
pub mod browser;
