//! HWPX package handling and the application form layout.

pub mod form;
pub mod package;

pub use form::{
    ACCOUNT_PLACEHOLDER, BACKPAGE_SLOTS, FormLayout, ParcelTable, SINGLE_PAGE_SLOTS, TemplateKind,
};
pub use package::{HWPX_MIMETYPE, Package};
