use crate::Editor;
use floorplan::{Command, CuttingLine, EditorConfig, Pick, Point, Shape, SliceReport, Wall};
use wasm_bindgen::prelude::*;
type JsValue = wasm_bindgen::JsValue;
use crate::error;
use crate::interop::{arr_points, arr_u32, new_obj, set_kv, to_js};

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn check_point(x: f64, y: f64) -> Result<Point, JsValue> {
    if !x.is_finite() {
        return Err(error::non_finite("x"));
    }
    if !y.is_finite() {
        return Err(error::non_finite("y"));
    }
    Ok(Point::new(x, y))
}

fn parse_json(v: JsValue) -> Result<serde_json::Value, JsValue> {
    serde_wasm_bindgen::from_value::<serde_json::Value>(v).map_err(error::json_parse)
}

fn report_rejections(r: &SliceReport) {
    for id in &r.rejected_shapes {
        web_sys::console::info_1(&JsValue::from_str(&format!(
            "slice: shape {} needs two crossing points; left unchanged",
            id
        )));
    }
}

fn pick_to_js(p: &Pick) -> JsValue {
    let obj = new_obj();
    match *p {
        Pick::Wall { id, edge, t, dist } => {
            set_kv(&obj, "kind", &JsValue::from_str("wall"));
            set_kv(&obj, "id", &JsValue::from_f64(id as f64));
            set_kv(&obj, "edge", &JsValue::from_f64(edge as f64));
            set_kv(&obj, "t", &JsValue::from_f64(t));
            set_kv(&obj, "dist", &JsValue::from_f64(dist));
        }
        Pick::Shape { id, dist } => {
            set_kv(&obj, "kind", &JsValue::from_str("shape"));
            set_kv(&obj, "id", &JsValue::from_f64(id as f64));
            set_kv(&obj, "dist", &JsValue::from_f64(dist));
        }
    }
    obj.into()
}

#[wasm_bindgen]
impl Editor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Editor {
        crate::Editor::rs_new()
    }
    /// Construct with a partial config object; missing keys take defaults.
    /// Throws the `{ ok: false, error }` envelope on a malformed config.
    pub fn with_config(v: JsValue) -> Result<Editor, JsValue> {
        if v.is_undefined() || v.is_null() {
            return Ok(crate::Editor::rs_new());
        }
        let val = parse_json(v)?;
        let cfg = EditorConfig::from_json_value(val).map_err(|e| error::scene(&e))?;
        Ok(Editor { inner: floorplan::Editor::with_config(cfg) })
    }
    pub fn version(&self) -> u64 {
        self.rs_version()
    }
    pub fn set_config_res(&mut self, v: JsValue) -> JsValue {
        let val = match parse_json(v) {
            Ok(val) => val,
            Err(e) => return e,
        };
        match EditorConfig::from_json_value(val) {
            Ok(cfg) => {
                self.inner.set_config(cfg);
                error::ok(JsValue::TRUE)
            }
            Err(e) => error::scene(&e),
        }
    }
    pub fn get_config(&self) -> JsValue {
        to_js(self.inner.scene().config())
    }

    // Wall drawing session
    pub fn begin_wall_draft(&mut self, x: f64, y: f64) -> bool {
        self.inner.begin_wall_draft(Point::new(x, y)).is_ok()
    }
    pub fn begin_wall_draft_res(&mut self, x: f64, y: f64) -> JsValue {
        let p = match check_point(x, y) {
            Ok(p) => p,
            Err(e) => return e,
        };
        match self.inner.begin_wall_draft(p) {
            Ok(o) => error::ok(to_js(&o)),
            Err(e) => error::scene(&e),
        }
    }
    pub fn append_wall_draft_point(&mut self, x: f64, y: f64) -> bool {
        matches!(self.inner.append_wall_draft_point(Point::new(x, y)), Ok(floorplan::Outcome::Draft { .. }))
    }
    pub fn append_wall_draft_point_res(&mut self, x: f64, y: f64) -> JsValue {
        let p = match check_point(x, y) {
            Ok(p) => p,
            Err(e) => return e,
        };
        match self.inner.append_wall_draft_point(p) {
            Ok(o) => error::ok(to_js(&o)),
            Err(e) => error::scene(&e),
        }
    }
    pub fn update_wall_draft_preview(&mut self, x: f64, y: f64) -> bool {
        self.inner.update_wall_draft_preview(Point::new(x, y)).is_ok()
    }
    pub fn update_wall_draft_preview_res(&mut self, x: f64, y: f64) -> JsValue {
        let p = match check_point(x, y) {
            Ok(p) => p,
            Err(e) => return e,
        };
        match self.inner.update_wall_draft_preview(p) {
            Ok(o) => error::ok(to_js(&o)),
            Err(e) => error::scene(&e),
        }
    }
    /// Draft points plus the preview endpoint, interleaved x/y.
    pub fn get_draft_points(&self) -> JsValue {
        arr_points(&self.inner.draft().preview_points()).into()
    }
    pub fn is_drawing(&self) -> bool {
        self.inner.draft().is_drawing()
    }
    pub fn commit_wall_draft(&mut self) -> JsValue {
        match self.inner.commit_wall_draft() {
            Ok(Some(r)) => to_js(&r),
            _ => JsValue::NULL,
        }
    }
    pub fn commit_wall_draft_res(&mut self) -> JsValue {
        match self.inner.commit_wall_draft() {
            Ok(Some(r)) => error::ok(to_js(&r)),
            Ok(None) => error::ok(JsValue::NULL),
            Err(e) => error::scene(&e),
        }
    }
    pub fn cancel_wall_draft(&mut self) -> bool {
        self.inner.cancel_wall_draft()
    }

    // Trim/slice
    pub fn slice_at(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> JsValue {
        match self.inner.slice_at(CuttingLine::new(Point::new(x0, y0), Point::new(x1, y1))) {
            Ok(r) => {
                report_rejections(&r);
                to_js(&r)
            }
            Err(_) => JsValue::NULL,
        }
    }
    pub fn slice_at_res(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> JsValue {
        let (a, b) = match (check_point(x0, y0), check_point(x1, y1)) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(e), _) | (_, Err(e)) => return e,
        };
        match self.inner.slice_at(CuttingLine::new(a, b)) {
            Ok(r) => {
                report_rejections(&r);
                error::ok(to_js(&r))
            }
            Err(e) => error::scene(&e),
        }
    }

    // Rendering
    pub fn build_offset_geometry(&self, id: u32) -> JsValue {
        let Some(g) = self.inner.scene().build_offset_geometry(id) else { return JsValue::NULL };
        let obj = new_obj();
        set_kv(&obj, "outer", &arr_points(&g.outer).into());
        set_kv(&obj, "inner", &arr_points(&g.inner).into());
        set_kv(&obj, "runs", &arr_u32(&g.runs).into());
        set_kv(&obj, "closed", &JsValue::from_bool(g.closed));
        obj.into()
    }
    pub fn build_offset_geometry_res(&self, id: u32) -> JsValue {
        if self.inner.scene().wall(id).is_none() {
            return error::invalid_id("wall", id);
        }
        error::ok(self.build_offset_geometry(id))
    }

    // Scene read accessors
    pub fn list_walls(&self) -> JsValue {
        to_js(&self.inner.scene().list_walls())
    }
    pub fn list_shapes(&self) -> JsValue {
        to_js(&self.inner.scene().list_shapes())
    }
    pub fn wall_ids(&self) -> JsValue {
        arr_u32(&self.inner.scene().wall_ids()).into()
    }
    pub fn shape_ids(&self) -> JsValue {
        arr_u32(&self.inner.scene().shape_ids()).into()
    }
    pub fn get_wall_res(&self, id: u32) -> JsValue {
        match self.inner.scene().wall(id) {
            Some(w) => error::ok(to_js(w)),
            None => error::invalid_id("wall", id),
        }
    }
    pub fn get_shape_res(&self, id: u32) -> JsValue {
        match self.inner.scene().shape(id) {
            Some(s) => error::ok(to_js(s)),
            None => error::invalid_id("shape", id),
        }
    }

    // Direct mutation accessors
    pub fn add_wall_res(&mut self, v: JsValue) -> JsValue {
        let wall: Wall = match serde_wasm_bindgen::from_value(v) {
            Ok(w) => w,
            Err(e) => return error::json_parse(e),
        };
        match self.inner.mutate(|s| s.add_wall(wall)) {
            Ok(id) => error::ok(JsValue::from_f64(id as f64)),
            Err(e) => error::scene(&e),
        }
    }
    pub fn update_wall_res(&mut self, v: JsValue) -> JsValue {
        let wall: Wall = match serde_wasm_bindgen::from_value(v) {
            Ok(w) => w,
            Err(e) => return error::json_parse(e),
        };
        match self.inner.mutate(|s| s.update_wall(wall)) {
            Ok(()) => error::ok(JsValue::TRUE),
            Err(e) => error::scene(&e),
        }
    }
    pub fn remove_wall(&mut self, id: u32) -> bool {
        self.inner.mutate(|s| s.remove_wall(id)).is_ok()
    }
    pub fn remove_wall_res(&mut self, id: u32) -> JsValue {
        match self.inner.mutate(|s| s.remove_wall(id)) {
            Ok(_) => error::ok(JsValue::TRUE),
            Err(e) => error::scene(&e),
        }
    }
    pub fn move_wall_res(&mut self, id: u32, dx: f64, dy: f64) -> JsValue {
        match self.inner.mutate(|s| s.move_wall(id, dx, dy)) {
            Ok(()) => error::ok(JsValue::TRUE),
            Err(e) => error::scene(&e),
        }
    }
    pub fn add_shape_res(&mut self, v: JsValue) -> JsValue {
        let shape: Shape = match serde_wasm_bindgen::from_value(v) {
            Ok(s) => s,
            Err(e) => return error::json_parse(e),
        };
        match self.inner.mutate(|s| s.add_shape(shape)) {
            Ok(id) => error::ok(JsValue::from_f64(id as f64)),
            Err(e) => error::scene(&e),
        }
    }
    pub fn add_rectangle(&mut self, cx: f64, cy: f64, w: f64, h: f64, rotation: f64) -> JsValue {
        let shape = Shape::rectangle(Point::new(cx, cy), w, h).with_rotation(rotation);
        match self.inner.mutate(|s| s.add_shape(shape)) {
            Ok(id) => error::ok(JsValue::from_f64(id as f64)),
            Err(e) => error::scene(&e),
        }
    }
    pub fn update_shape_res(&mut self, v: JsValue) -> JsValue {
        let shape: Shape = match serde_wasm_bindgen::from_value(v) {
            Ok(s) => s,
            Err(e) => return error::json_parse(e),
        };
        match self.inner.mutate(|s| s.update_shape(shape)) {
            Ok(()) => error::ok(JsValue::TRUE),
            Err(e) => error::scene(&e),
        }
    }
    pub fn remove_shape(&mut self, id: u32) -> bool {
        self.inner.mutate(|s| s.remove_shape(id)).is_ok()
    }
    pub fn remove_shape_res(&mut self, id: u32) -> JsValue {
        match self.inner.mutate(|s| s.remove_shape(id)) {
            Ok(_) => error::ok(JsValue::TRUE),
            Err(e) => error::scene(&e),
        }
    }
    pub fn move_shape_res(&mut self, id: u32, dx: f64, dy: f64) -> JsValue {
        match self.inner.mutate(|s| s.move_shape(id, dx, dy)) {
            Ok(()) => error::ok(JsValue::TRUE),
            Err(e) => error::scene(&e),
        }
    }

    // Picking return
    pub fn pick(&self, x: f64, y: f64, tol: f64) -> JsValue {
        match self.inner.scene().pick(Point::new(x, y), tol) {
            Some(p) => pick_to_js(&p),
            None => JsValue::NULL,
        }
    }
    pub fn pick_res(&self, x: f64, y: f64, tol: f64) -> JsValue {
        if let Err(e) = check_point(x, y) {
            return e;
        }
        if !tol.is_finite() {
            return error::non_finite("tol");
        }
        if tol < 0.0 {
            return error::out_of_range("tol", 0.0, f64::INFINITY, tol);
        }
        error::ok(self.pick(x, y, tol))
    }

    // History
    pub fn undo(&mut self) -> bool {
        self.inner.undo()
    }
    pub fn redo(&mut self) -> bool {
        self.inner.redo()
    }
    pub fn can_undo(&self) -> bool {
        self.inner.history().can_undo()
    }
    pub fn can_redo(&self) -> bool {
        self.inner.history().can_redo()
    }

    /// Generic entry point: `{ type: "slice_at", line: {...} }` and friends.
    pub fn dispatch_res(&mut self, cmd: JsValue) -> JsValue {
        let cmd: Command = match serde_wasm_bindgen::from_value(cmd) {
            Ok(c) => c,
            Err(e) => return error::json_parse(e),
        };
        match self.inner.dispatch(cmd) {
            Ok(outcome) => {
                if let floorplan::Outcome::Sliced(r) = &outcome {
                    report_rejections(r);
                }
                error::ok(to_js(&outcome))
            }
            Err(e) => error::scene(&e),
        }
    }

    // Snapshots
    pub fn to_json(&self) -> JsValue {
        to_js(&self.inner.scene().to_json_value())
    }
    pub fn from_json(&mut self, v: JsValue) -> bool {
        match parse_json(v) {
            Ok(val) => self.inner.import_json_value(val),
            Err(_) => false,
        }
    }
    pub fn from_json_res(&mut self, v: JsValue) -> JsValue {
        let val = match parse_json(v) {
            Ok(val) => val,
            Err(e) => return e,
        };
        match self.inner.load_json_value(val) {
            Ok(()) => error::ok(JsValue::TRUE),
            Err(e) => error::scene(&e),
        }
    }
}
