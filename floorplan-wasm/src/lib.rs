use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;

#[wasm_bindgen]
pub struct Editor { pub(crate) inner: floorplan::Editor }

impl Editor {
    pub fn rs_new() -> Editor { Editor { inner: floorplan::Editor::new() } }
    pub fn rs_version(&self) -> u64 { self.inner.scene().version() }
}
