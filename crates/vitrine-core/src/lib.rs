//! Vitrine Core - Scene model, format adapters and session persistence
//!
//! This crate holds everything in the viewer that does not need a renderer:
//! - Imported scene model
//! - Import and export adapters over Assimp, including post-import processing
//! - Conversion of imported scenes into render-ready groups and inspector lists
//! - Bounds, camera preset and turntable math
//! - Settings, recent files, string tables, texture export and model reports

mod assimp;
pub mod bounds;
pub mod convert;
pub mod export;
pub mod i18n;
pub mod import;
pub mod material;
pub mod recent;
pub mod report;
pub mod scene;
pub mod settings;
pub mod textures;
pub mod view;

pub use bounds::Aabb;
pub use convert::{
    convert_scene, ConvertedModel, MeshNode, RenderGroup, RenderMaterial, RenderMesh,
    TextureNode, Thumbnail,
};
pub use export::{export_scene, single_mesh_scene, ExportError, ExportFormat};
pub use i18n::{Language, Localizer};
pub use import::{import_file, ImportError, ModelFormat, PostProcessSteps, VIEWER_STEPS};
pub use material::{EffectiveMaterial, MaterialOverrides};
pub use recent::RecentFiles;
pub use report::{ModelReport, Unit};
pub use scene::{EmbeddedTexture, Face, Material, Mesh, Node, Scene};
pub use settings::{SessionPaths, Settings, SettingsError};
pub use textures::{export_all_textures, save_texture, TextureError};
pub use view::CameraView;
