//! Configuration module

mod site;

pub use site::ContactConfig;
pub use site::MarkdownConfig;
pub use site::MenuItem;
pub use site::SiteConfig;
pub use site::CONTACT_URL_ENV;
