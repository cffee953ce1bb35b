// Logical document model produced by generation and consumed by layout.

pub mod assets;
pub mod model;

pub use assets::ImageAsset;
pub use model::{
    ContentError, ContentModel, Cover, CoverArt, DocumentKind, Language, QaPair, Section,
};
