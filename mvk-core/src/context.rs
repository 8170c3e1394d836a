//! The render context: sole owner of everything the demo mutates.
//!
//! Setup, panel commits, pointer input, frame ticks and the late-arriving
//! label all go through one [`RenderContext`], so there is no shared state
//! beyond the value the host holds.

use nalgebra::Point3;

use crate::config::SceneConfig;
use crate::error::{CommitError, FontError};
use crate::font::Font;
use crate::geometry::Mesh;
use crate::material::{BasicMaterial, Color, Material, PhysicalMaterial, Side};
use crate::panel::Panel;
use crate::params::{MaterialParams, ParamField, ParamValue};
use crate::projection::{Camera, Viewport};
use crate::raster::{Present, Rasterizer};
use crate::scene::{AmbientLight, DirectionalLight, Node, NodeId, NodeKind, Scene};
use crate::text::{text_mesh, TextOptions};
use crate::transform::RotationState;

/// Progress of the asynchronously loaded label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelState {
    /// No font result yet
    Pending,
    Inserted(NodeId),
    /// The font failed to load; the label never appears
    Failed,
}

pub struct RenderContext<P: Present> {
    config: SceneConfig,
    scene: Scene,
    camera: Camera,
    rasterizer: Rasterizer,
    params: MaterialParams,
    panel: Panel,
    group: NodeId,
    torus: NodeId,
    label: LabelState,
    renders: u64,
    presenter: P,
}

impl<P: Present> RenderContext<P> {
    /// Build the scene, camera and panel.
    ///
    /// `viewport` is the logical surface size used for the aspect ratio;
    /// frames are rasterized at `raster_width` x `raster_height`.
    pub fn new(
        config: SceneConfig,
        viewport: Viewport,
        raster_width: usize,
        raster_height: usize,
        presenter: P,
    ) -> Self {
        let mut scene = Scene::new();

        let lights = &config.lights;
        let [x, y, z] = lights.directional_position;
        scene.add(
            Node::new(
                "directional-light",
                NodeKind::DirectionalLight(DirectionalLight {
                    color: Color::from_hex(lights.directional_color),
                    intensity: lights.directional_intensity,
                    target: Point3::origin(),
                }),
            )
            .with_position(x, y, z),
        );
        scene.add(Node::new(
            "ambient-light",
            NodeKind::AmbientLight(AmbientLight {
                color: Color::from_hex(lights.ambient_color),
                intensity: lights.ambient_intensity,
            }),
        ));

        let params = MaterialParams::default();
        let t = &config.torus;
        let mut torus = Node::mesh(
            "torus",
            Mesh::torus(t.radius, t.tube, t.radial_segments, t.tubular_segments),
            Material::Physical(PhysicalMaterial::from_params(&params, Side::Double)),
        );
        torus.rotation.y = t.initial_yaw;

        let group = scene.add(Node::group("rotation-group"));
        let torus = scene.add_child(group, torus);

        let camera = Camera::new(&config.camera, viewport);
        let panel = Panel::bind(&params);

        log::info!(
            "scene ready: {} nodes, viewport {}x{}, raster {}x{}",
            scene.len(),
            viewport.width,
            viewport.height,
            raster_width,
            raster_height
        );

        Self {
            config,
            scene,
            camera,
            rasterizer: Rasterizer::new(raster_width, raster_height),
            params,
            panel,
            group,
            torus,
            label: LabelState::Pending,
            renders: 0,
            presenter,
        }
    }

    /// Rasterize the scene and present it
    pub fn render(&mut self) -> Result<(), P::Error> {
        self.renders += 1;
        let frame = self.rasterizer.render(&self.scene, &self.camera);
        self.presenter.present(frame)
    }

    /// Commit a panel edit: validate against the field's control, write the
    /// store, copy the field into the live material and render once.
    ///
    /// Returns the value actually stored, after clamping.
    pub fn commit(
        &mut self,
        field: ParamField,
        value: ParamValue,
    ) -> Result<ParamValue, CommitError<P::Error>> {
        let accepted = self.panel.control(field)?.accept(value)?;
        self.params.set(field, accepted)?;
        if let Some(Material::Physical(material)) = self.scene.node_mut(self.torus).material_mut() {
            field.apply(&self.params, material);
        }
        self.panel.show(field, accepted);
        log::debug!("{field} set to {accepted}");

        self.render().map_err(CommitError::Present)?;
        Ok(accepted)
    }

    /// [`commit`](Self::commit) addressed by display name, e.g. `"ior"`
    pub fn commit_named(
        &mut self,
        name: &str,
        value: ParamValue,
    ) -> Result<ParamValue, CommitError<P::Error>> {
        let field: ParamField = name.parse()?;
        self.commit(field, value)
    }

    /// Move a control one step and commit the result
    pub fn nudge(
        &mut self,
        field: ParamField,
        direction: i32,
    ) -> Result<ParamValue, CommitError<P::Error>> {
        let value = self.panel.control(field)?.nudged(direction);
        self.commit(field, value)
    }

    /// Point the rotation group according to the pointer position in surface pixels
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        let divisor = self.config.motion.pointer_divisor;
        let group = &mut self.scene.node_mut(self.group).rotation;
        group.x = y / divisor;
        group.y = x / divisor;
    }

    /// Advance the animation one frame and render
    pub fn tick(&mut self) -> Result<(), P::Error> {
        self.scene.node_mut(self.torus).rotation.x += self.config.motion.spin_per_frame;
        self.render()
    }

    /// Hand the font load result to the scene.
    ///
    /// Only the first result counts: a success inserts the label, a failure
    /// leaves the scene without one for good. Returns the label's node when
    /// this call inserted it.
    pub fn resolve_font(&mut self, result: Result<Font, FontError>) -> Option<NodeId> {
        if self.label != LabelState::Pending {
            log::debug!("ignoring font result, label already {:?}", self.label);
            return None;
        }

        let font = match result {
            Ok(font) => font,
            Err(err) => {
                log::warn!("label disabled, font failed to load: {err}");
                self.label = LabelState::Failed;
                return None;
            }
        };

        let label = &self.config.label;
        let mut mesh = text_mesh(
            &font,
            &label.text,
            &TextOptions {
                size: label.size,
                depth: label.depth,
                curve_segments: label.curve_segments,
            },
        );
        mesh.center();
        let material = Material::Basic(BasicMaterial {
            color: Color::from_hex(label.color),
            side: Side::Front,
        });
        let id = self
            .scene
            .add(Node::mesh("label", mesh, material).with_position(0.0, 0.0, label.z));

        log::debug!("inserted label {:?} using font {:?}", label.text, font.family);
        self.label = LabelState::Inserted(id);
        Some(id)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn params(&self) -> &MaterialParams {
        &self.params
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    /// Panel visibility only; values change through [`commit`](Self::commit)
    pub fn panel_mut(&mut self) -> &mut Panel {
        &mut self.panel
    }

    /// The torus's live material
    pub fn material(&self) -> Option<&PhysicalMaterial> {
        match self.scene.node(self.torus).material() {
            Some(Material::Physical(material)) => Some(material),
            _ => None,
        }
    }

    pub fn torus_rotation(&self) -> RotationState {
        self.scene.node(self.torus).rotation
    }

    pub fn group_rotation(&self) -> RotationState {
        self.scene.node(self.group).rotation
    }

    pub fn label_state(&self) -> LabelState {
        self.label
    }

    /// Number of render calls so far
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    pub fn frame(&self) -> &crate::raster::Frame {
        self.rasterizer.frame()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }
}
