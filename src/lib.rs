pub mod age;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod genogram;
pub mod grouping;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod linking;
pub mod relation;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, GenerationOrientation, LayoutConfig};
pub use error::GenogramError;
pub use genogram::{
    Genogram, GenogramEdge, GenogramNode, NodeShape, build_genogram, build_genogram_at,
    build_genogram_from_values,
};
pub use grouping::{Family, family_of, group_families};
pub use ir::{Member, MemberId, Relationship, load_documents, load_members, parse_members_value};
pub use layout::{FamilyCard, compute_family_overview};
pub use linking::link_documents;
pub use relation::{EdgeKind, RELATION_LABELS, canonical_label, inverse_label};
pub use render::render_svg;
pub use theme::Theme;
