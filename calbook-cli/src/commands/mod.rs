pub mod headless;
pub mod interactive;
