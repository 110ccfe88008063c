//! Retained 3D scene: models, visuals and the viewport that renders them.

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use crate::camera::Camera;
use crate::error::KernelError;
use crate::geometry::matrix::Matrix4x4;
use crate::geometry::point::Point3d;
use crate::geometry::transform::{BoundingBox, Transform3D};
use crate::geometry::vector::Vec3;
use crate::mesh::MeshGeometry;

// ─── Entity Keys ─────────────────────────────────────────────────────────────

new_key_type! {
    pub struct ModelId;
    pub struct VisualId;
}

// ─── Appearance ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 0.5, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    pub const YELLOW: Self = Self::rgb(1.0, 1.0, 0.0);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Material {
    Diffuse { color: Color },
    Emissive { color: Color },
    Specular { color: Color, power: f64 },
    Group(Vec<Material>),
}

impl Material {
    pub fn diffuse(color: Color) -> Self {
        Self::Diffuse { color }
    }
}

/// Light sources. They take part in the scene graph but are never hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Light {
    Ambient {
        color: Color,
    },
    Directional {
        color: Color,
        direction: Vec3,
    },
    Point {
        color: Color,
        position: Point3d,
        range: f64,
        /// Constant, linear and quadratic attenuation.
        attenuation: [f64; 3],
    },
    Spot {
        color: Color,
        position: Point3d,
        direction: Vec3,
        range: f64,
        inner_cone_angle: f64,
        outer_cone_angle: f64,
    },
}

// ─── Models and Visuals ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryModel3D {
    pub geometry: MeshGeometry,
    /// Front faces are hit only when a front material is set.
    pub material: Option<Material>,
    /// Back faces are hit only when a back material is set.
    pub back_material: Option<Material>,
    pub transform: Transform3D,
}

impl GeometryModel3D {
    pub fn new(geometry: MeshGeometry, material: Material) -> Self {
        Self {
            geometry,
            material: Some(material),
            back_material: None,
            transform: Transform3D::Identity,
        }
    }

    pub fn with_back_material(mut self, material: Material) -> Self {
        self.back_material = Some(material);
        self
    }

    pub fn with_transform(mut self, transform: Transform3D) -> Self {
        self.transform = transform;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Model3D {
    Geometry(GeometryModel3D),
    Group {
        children: Vec<ModelId>,
        transform: Transform3D,
    },
    Light {
        light: Light,
        transform: Transform3D,
    },
}

impl Model3D {
    pub fn transform(&self) -> &Transform3D {
        match self {
            Model3D::Geometry(g) => &g.transform,
            Model3D::Group { transform, .. } | Model3D::Light { transform, .. } => transform,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelVisual3D {
    pub content: Option<ModelId>,
    pub children: Vec<VisualId>,
    pub transform: Transform3D,
}

// ─── Scene Store ─────────────────────────────────────────────────────────────

/// Arena-based storage for the models and visuals of one viewport.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneStore {
    pub models: SlotMap<ModelId, Model3D>,
    pub visuals: SlotMap<VisualId, ModelVisual3D>,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_model(&mut self, model: Model3D) -> ModelId {
        self.models.insert(model)
    }

    pub fn add_geometry(&mut self, model: GeometryModel3D) -> ModelId {
        self.models.insert(Model3D::Geometry(model))
    }

    pub fn add_group(&mut self, children: Vec<ModelId>, transform: Transform3D) -> ModelId {
        self.models.insert(Model3D::Group {
            children,
            transform,
        })
    }

    pub fn add_light(&mut self, light: Light) -> ModelId {
        self.models.insert(Model3D::Light {
            light,
            transform: Transform3D::Identity,
        })
    }

    pub fn add_visual(&mut self, content: Option<ModelId>, transform: Transform3D) -> VisualId {
        self.visuals.insert(ModelVisual3D {
            content,
            children: Vec::new(),
            transform,
        })
    }

    pub fn add_child_visual(&mut self, parent: VisualId, child: VisualId) -> Result<(), KernelError> {
        if !self.visuals.contains_key(child) {
            return Err(KernelError::MissingEntity { kind: "visual" });
        }
        self.visual_mut(parent)?.children.push(child);
        Ok(())
    }

    pub fn model(&self, id: ModelId) -> Result<&Model3D, KernelError> {
        self.models
            .get(id)
            .ok_or(KernelError::MissingEntity { kind: "model" })
    }

    pub fn model_mut(&mut self, id: ModelId) -> Result<&mut Model3D, KernelError> {
        self.models
            .get_mut(id)
            .ok_or(KernelError::MissingEntity { kind: "model" })
    }

    pub fn visual(&self, id: VisualId) -> Result<&ModelVisual3D, KernelError> {
        self.visuals
            .get(id)
            .ok_or(KernelError::MissingEntity { kind: "visual" })
    }

    pub fn visual_mut(&mut self, id: VisualId) -> Result<&mut ModelVisual3D, KernelError> {
        self.visuals
            .get_mut(id)
            .ok_or(KernelError::MissingEntity { kind: "visual" })
    }

    /// World-space bounds of a model placed under `parent`.
    pub fn model_bounds(&self, id: ModelId, parent: &Matrix4x4) -> Result<BoundingBox, KernelError> {
        let model = self.model(id)?;
        let world = Matrix4x4::multiply(&model.transform().value(), parent);
        let mut bb = BoundingBox::empty();
        match model {
            Model3D::Geometry(g) => {
                for p in &g.geometry.positions {
                    bb.expand_to_include(&world.transform_point(p));
                }
            }
            Model3D::Group { children, .. } => {
                for &child in children {
                    bb = bb.union(&self.model_bounds(child, &world)?);
                }
            }
            Model3D::Light { .. } => {}
        }
        Ok(bb)
    }

    /// World-space bounds of a visual subtree placed under `parent`.
    pub fn visual_bounds(&self, id: VisualId, parent: &Matrix4x4) -> Result<BoundingBox, KernelError> {
        let visual = self.visual(id)?;
        let world = Matrix4x4::multiply(&visual.transform.value(), parent);
        let mut bb = match visual.content {
            Some(model) => self.model_bounds(model, &world)?,
            None => BoundingBox::empty(),
        };
        for &child in &visual.children {
            bb = bb.union(&self.visual_bounds(child, &world)?);
        }
        Ok(bb)
    }
}

// ─── Viewport ────────────────────────────────────────────────────────────────

/// A camera looking at a set of root visuals through a pixel rectangle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport3D {
    pub camera: Camera,
    pub width: f64,
    pub height: f64,
    pub store: SceneStore,
    pub children: Vec<VisualId>,
}

impl Viewport3D {
    pub fn new(camera: Camera, width: f64, height: f64) -> Self {
        Self {
            camera,
            width,
            height,
            store: SceneStore::new(),
            children: Vec::new(),
        }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Wrap `model` in a new root visual.
    pub fn add_model_visual(&mut self, model: ModelId) -> VisualId {
        let visual = self.store.add_visual(Some(model), Transform3D::Identity);
        self.children.push(visual);
        visual
    }

    pub fn bounds(&self) -> Result<BoundingBox, KernelError> {
        let mut bb = BoundingBox::empty();
        for &visual in &self.children {
            bb = bb.union(&self.store.visual_bounds(visual, &Matrix4x4::identity())?);
        }
        Ok(bb)
    }

    pub fn to_json(&self) -> Result<String, KernelError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, KernelError> {
        Ok(serde_json::from_str(json)?)
    }
}
