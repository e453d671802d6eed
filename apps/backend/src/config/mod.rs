pub mod draft;

pub use draft::DraftSettings;
