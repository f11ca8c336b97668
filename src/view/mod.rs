//! Page rendering.
//!
//! - [`templates`]: tera engine holding `base.html` and `home.html`
//! - [`home`]: the home page handler that fetches from Service A

pub mod home;
pub mod templates;

pub use home::{DataFetchHandler, HomeContext};
pub use templates::{Templates, HOME_TEMPLATE};
