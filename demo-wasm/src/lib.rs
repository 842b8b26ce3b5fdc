use knitmesh::{DragTarget, ForceTerm, KnitConfig, LinkClass, LinkId, SimState, Simulation};
use wasm_bindgen::prelude::*;

fn flatten(points: &[knitmesh::Vec2<f32>]) -> Vec<f32> {
    let mut out = Vec::with_capacity(points.len() * 2);
    for p in points {
        out.push(p.x);
        out.push(p.y);
    }
    out
}

fn js_err(err: knitmesh::KnitError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// ---- Knit Demo ----

#[wasm_bindgen]
pub struct KnitDemo {
    sim: Simulation<f32>,
}

#[wasm_bindgen]
impl KnitDemo {
    #[wasm_bindgen(constructor)]
    pub fn new(width: usize, height: usize, edge_length: f32) -> Result<KnitDemo, JsValue> {
        let config = KnitConfig::new()
            .with_dimensions(width, height)
            .with_edge_length(edge_length)
            .with_center(350.0, 250.0)
            .with_origin(350.0 - width as f32 * edge_length * 0.5, 250.0 - height as f32 * edge_length * 0.5);
        let mut sim = Simulation::new(config).map_err(js_err)?;
        sim.start_simulation().map_err(js_err)?;
        Ok(KnitDemo { sim })
    }

    /// Advance one frame. Returns false once the mesh has settled.
    pub fn update(&mut self) -> bool {
        if self.sim.state() != SimState::Running {
            return false;
        }
        self.sim.tick().is_ok()
    }

    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), JsValue> {
        let config = self.sim.config().clone().with_dimensions(width, height);
        self.sim.set_config(config).map_err(js_err)
    }

    pub fn set_edge_length(&mut self, edge_length: f32) -> Result<(), JsValue> {
        let config = self.sim.config().clone().with_edge_length(edge_length);
        self.sim.set_config(config).map_err(js_err)
    }

    pub fn set_iterations(&mut self, iterations: usize) -> Result<(), JsValue> {
        let config = self.sim.config().clone().with_iterations(iterations);
        self.sim.set_config(config).map_err(js_err)
    }

    /// Toggle a force by name: "stretch", "shear", "strut", "charge" or "collision".
    pub fn set_force(&mut self, name: &str, enabled: bool) -> Result<(), JsValue> {
        let term = ForceTerm::CONFIGURABLE
            .into_iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| JsValue::from_str("unknown force"))?;
        self.sim.set_force_term(term, enabled).map_err(js_err)
    }

    pub fn pin(&mut self, vertex: usize) -> Result<(), JsValue> {
        self.sim.pin(vertex).map_err(js_err)
    }

    pub fn unpin(&mut self, vertex: usize) -> Result<(), JsValue> {
        self.sim.unpin(vertex).map_err(js_err)
    }

    pub fn grab_vertex(&mut self, vertex: usize) -> Result<(), JsValue> {
        self.sim.begin_drag(DragTarget::Vertex(vertex)).map_err(js_err)
    }

    pub fn grab_stretch_link(&mut self, index: usize) -> Result<(), JsValue> {
        self.sim
            .begin_drag(DragTarget::Link(LinkId::new(LinkClass::Stretch, index)))
            .map_err(js_err)
    }

    pub fn grab_face(&mut self, face: usize) -> Result<(), JsValue> {
        self.sim.begin_drag(DragTarget::Face(face)).map_err(js_err)
    }

    pub fn drag_by(&mut self, dx: f32, dy: f32) -> Result<(), JsValue> {
        self.sim.drag_by(dx, dy).map_err(js_err)
    }

    pub fn release(&mut self) -> Result<(), JsValue> {
        self.sim.end_drag().map_err(js_err)
    }

    /// Returns flat [x0, y0, x1, y1, ...] in row-major order
    pub fn positions(&self) -> Vec<f32> {
        flatten(&self.sim.positions())
    }

    /// Returns flat [a0, b0, c0, d0, a1, ...] corner indices, one quad per face
    pub fn faces(&self) -> Vec<u32> {
        self.sim
            .topology()
            .map(|t| t.faces().iter().flat_map(|f| f.vertices.map(|v| v as u32)).collect())
            .unwrap_or_default()
    }

    /// Returns flat [source0, target0, ...] for the stretch links
    pub fn stretch_links(&self) -> Vec<u32> {
        self.sim
            .topology()
            .map(|t| {
                t.links(LinkClass::Stretch)
                    .iter()
                    .flat_map(|l| [l.source as u32, l.target as u32])
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn alpha(&self) -> f32 {
        self.sim.alpha()
    }

    pub fn vertex_count(&self) -> usize {
        self.sim.vertices().len()
    }
}
