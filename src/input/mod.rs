//! Reading of the report artifacts and reference resources.

pub mod clinvar;
pub mod html;
pub mod tables;
pub mod variants;
