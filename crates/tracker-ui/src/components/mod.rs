//! Small reusable widgets shared by the tracker views.

pub mod header;
pub mod input;
