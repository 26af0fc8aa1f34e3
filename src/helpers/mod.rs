//! Helper functions shared by the view layer and templates

mod url;

pub use url::*;
