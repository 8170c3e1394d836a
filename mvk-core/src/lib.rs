/// MVK Core Library - Scene, materials, text geometry and rendering shared by the front-ends
///
/// This library holds everything that does not depend on a display surface:
/// the glass torus scene, the material parameter panel, typeface fonts and
/// extruded text, a software rasterizer, and the frame loop.

pub mod config;
pub mod context;
pub mod error;
pub mod font;
pub mod frame_loop;
pub mod geometry;
pub mod material;
pub mod panel;
pub mod params;
pub mod projection;
pub mod raster;
pub mod scene;
pub mod shading;
pub mod shape;
pub mod text;
pub mod transform;
pub mod triangulate;

// Re-export commonly used types
pub use config::SceneConfig;
pub use context::{LabelState, RenderContext};
pub use error::{CommitError, ConfigError, FontError, PanelError};
pub use font::{Font, PendingFont};
pub use frame_loop::{FrameDriver, FrameLoop, StopToken};
pub use geometry::{Mesh, Triangle, Vertex};
pub use material::{Color, Material, PhysicalMaterial, Side};
pub use panel::{Control, ControlKind, ControlSpec, Panel, MATERIAL_CONTROLS};
pub use params::{MaterialParams, ParamField, ParamValue};
pub use projection::{Camera, Viewport};
pub use raster::{Frame, Present, Rasterizer};
pub use scene::{NodeId, Scene};
pub use transform::{RotationState, Transform};
