//! Recursive-descent block parser for the ASE/ASK scene format
//!
//! The grammar is brace-nested and keyword-tagged: every keyword starts
//! with `*`, every section is delimited by `{`/`}`. Each section handler
//! loops one token at a time with its own depth counter; top-level
//! sections treat end-of-buffer as normal termination while nested
//! sections raise a structural error. Field-level problems are recovered
//! with defaults and logged with the current line number.

use glam::{Quat, Vec3, Vec4};
use tracing::warn;

use super::document::{
    Animation, AseCamera, AseCameraKind, AseDummy, AseFace, AseLight, AseLightKind, AseMaterial,
    AseMesh, BoneVertex, Document, FORMAT_VERSION_ASE, MAX_UV_CHANNELS, NodeInfo, QuatKey,
    TextureMap, TrackKind, VectorKey,
};
use super::scanner::{
    is_line_end, is_numeric, is_space_or_line_end, parse_f32, parse_u32, skip_spaces,
    skip_spaces_and_line_ends,
};
use crate::error::{Error, Result};
use crate::scene::material::ShadingModel;

/// Result of one bookkeeping step of a section loop.
enum Step {
    Continue,
    Done,
}

/// Which node kind an object block is being parsed into; gates the legal
/// keyword set without casting through a base handle.
enum ObjectSlot<'m> {
    Mesh(&'m mut AseMesh),
    Light(&'m mut AseLight),
    Camera(&'m mut AseCamera),
    Dummy(&'m mut AseDummy),
}

impl ObjectSlot<'_> {
    fn info(&self) -> &NodeInfo {
        match self {
            ObjectSlot::Mesh(m) => &m.node,
            ObjectSlot::Light(l) => &l.node,
            ObjectSlot::Camera(c) => &c.node,
            ObjectSlot::Dummy(d) => &d.node,
        }
    }

    fn info_mut(&mut self) -> &mut NodeInfo {
        match self {
            ObjectSlot::Mesh(m) => &mut m.node,
            ObjectSlot::Light(l) => &mut l.node,
            ObjectSlot::Camera(c) => &mut c.node,
            ObjectSlot::Dummy(d) => &mut d.node,
        }
    }

    /// True for nodes that may own a `.Target` animation channel.
    fn is_target_node(&self) -> bool {
        match self {
            ObjectSlot::Light(l) => l.kind == AseLightKind::Target,
            ObjectSlot::Camera(c) => c.kind == AseCameraKind::Target,
            ObjectSlot::Mesh(_) | ObjectSlot::Dummy(_) => false,
        }
    }
}

/// Which animation channel the keyframe tracks currently feed.
#[derive(Clone, Copy, PartialEq, Eq)]
enum AnimChannel {
    Node,
    Target,
    Disabled,
}

/// The stateful parser: a cursor over the input plus the growing
/// document. Depth counters live in each section handler, not in the
/// call stack.
pub struct Parser<'a> {
    buf: &'a [u8],
    cur: usize,
    line: u32,
    last_was_line_end: bool,
    doc: Document,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `buf`. `format_hint` seeds the file format
    /// version for files without a version keyword (ASE, ASK and ASC
    /// use different defaults).
    pub fn new(buf: &'a [u8], format_hint: u32) -> Self {
        Parser {
            buf,
            cur: 0,
            line: 0,
            last_was_line_end: false,
            doc: Document::new(format_hint),
        }
    }

    /// Runs the parse to completion and returns the document.
    ///
    /// # Errors
    /// Returns an error when the input ends inside a section that must be
    /// well-bracketed. End-of-buffer at the document scope is a normal,
    /// successful termination.
    pub fn parse(mut self) -> Result<Document> {
        self.parse_top_level()?;
        Ok(self.doc)
    }

    // ==================== cursor primitives ====================

    fn byte(&self) -> u8 {
        self.buf.get(self.cur).copied().unwrap_or(0)
    }

    /// End of input; an embedded NUL ends the parse exactly like the
    /// buffer end.
    fn at_end(&self) -> bool {
        self.cur >= self.buf.len() || self.buf[self.cur] == 0
    }

    fn warn(&self, msg: &str) {
        warn!("line {}: {}", self.line, msg);
    }

    fn info(&self, msg: &str) {
        tracing::info!("line {}: {}", self.line, msg);
    }

    /// Counts a line terminator once even when it is two bytes (CRLF).
    fn count_line(&mut self) {
        if is_line_end(self.byte()) && !self.last_was_line_end {
            self.line += 1;
            self.last_was_line_end = true;
        } else {
            self.last_was_line_end = false;
        }
    }

    /// Advances to the next `*`, `{` or `}`; false at end of input.
    fn skip_to_next_token(&mut self) -> bool {
        loop {
            if self.at_end() {
                return false;
            }
            let me = self.byte();
            self.count_line();
            if me == b'*' || me == b'{' || me == b'}' {
                return true;
            }
            self.cur += 1;
        }
    }

    /// Skips one brace-balanced section, subsections included.
    fn skip_section(&mut self) -> bool {
        let mut depth = 0i32;
        loop {
            if self.at_end() {
                self.warn("unable to parse block: unexpected end of file, closing bracket expected");
                return false;
            }
            match self.byte() {
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        self.cur += 1;
                        self.skip_to_next_token();
                        return true;
                    }
                }
                b'{' => depth += 1,
                b => {
                    if is_line_end(b) {
                        self.line += 1;
                    }
                }
            }
            self.cur += 1;
        }
    }

    /// Matches a keyword at the cursor. Keywords are delimited by spaces
    /// or line ends; the delimiter is consumed along with the keyword.
    fn token_match(&mut self, token: &str) -> bool {
        let t = token.as_bytes();
        let end = self.cur + t.len();
        if end > self.buf.len() || &self.buf[self.cur..end] != t {
            return false;
        }
        let next = self.buf.get(end).copied().unwrap_or(0);
        if !is_space_or_line_end(next) {
            return false;
        }
        self.cur = (end + 1).min(self.buf.len());
        true
    }

    /// Case-insensitive word check that does not consume anything; used
    /// for enum-valued fields whose remainder is skipped by the section
    /// loop.
    fn match_word_ci(&self, word: &str) -> bool {
        let mut cur = self.cur;
        if !skip_spaces(self.buf, &mut cur) {
            return false;
        }
        let w = word.as_bytes();
        let end = cur + w.len();
        end <= self.buf.len() && self.buf[cur..end].eq_ignore_ascii_case(w)
    }

    // ==================== section bookkeeping ====================

    /// One bookkeeping step shared by every section loop. `saw_star` is
    /// set when this iteration already consumed a `*` keyword marker (the
    /// brace checks are skipped then, exactly like the keyword dispatch
    /// falling through). `nested` carries the section name and level for
    /// the strict end-of-input policy; `None` applies the top-level
    /// policy where end-of-input terminates normally.
    fn section_step(
        &mut self,
        depth: &mut i32,
        saw_star: bool,
        nested: Option<(&'static str, u32)>,
    ) -> Result<Step> {
        if !saw_star {
            if self.byte() == b'{' {
                *depth += 1;
            } else if self.byte() == b'}' {
                *depth -= 1;
                if *depth == 0 {
                    self.cur += 1;
                    self.skip_to_next_token();
                    return Ok(Step::Done);
                }
            }
        }
        if self.at_end() {
            return match nested {
                Some((section, level)) => Err(Error::UnexpectedEofInSection {
                    line: self.line,
                    section,
                    level,
                }),
                None => Ok(Step::Done),
            };
        }
        self.count_line();
        self.cur += 1;
        Ok(Step::Continue)
    }

    // ==================== field primitives ====================

    /// Quoted string field. A missing or unterminated quote pair fails
    /// the single field (warning + `None`), never the parse.
    fn parse_string(&mut self, keyword: &str) -> Option<String> {
        if !skip_spaces(self.buf, &mut self.cur) {
            self.warn(&format!("unable to parse {keyword} block: unexpected end of line"));
            return None;
        }
        if self.byte() != b'"' {
            self.warn(&format!(
                "unable to parse {keyword} block: strings are expected to be enclosed in double quotation marks"
            ));
            return None;
        }
        self.cur += 1;
        let start = self.cur;
        let mut end = self.cur;
        while end < self.buf.len() && self.buf[end] != b'"' && self.buf[end] != 0 {
            end += 1;
        }
        if end >= self.buf.len() || self.buf[end] != b'"' {
            self.warn(&format!(
                "unable to parse {keyword} block: end of file reached before the closing quotation mark"
            ));
            return None;
        }
        let out = String::from_utf8_lossy(&self.buf[start..end]).into_owned();
        self.cur = end + 1;
        Some(out)
    }

    fn parse_u32_field(&mut self) -> u32 {
        if !skip_spaces(self.buf, &mut self.cur) {
            self.warn("unable to parse int: unexpected end of line");
            self.line += 1;
            return 0;
        }
        parse_u32(self.buf, &mut self.cur)
    }

    fn parse_f32_field(&mut self) -> f32 {
        if !skip_spaces(self.buf, &mut self.cur) {
            self.warn("unable to parse float: unexpected end of line");
            self.line += 1;
            return 0.0;
        }
        parse_f32(self.buf, &mut self.cur)
    }

    fn parse_f32_triple(&mut self) -> Vec3 {
        let x = self.parse_f32_field();
        let y = self.parse_f32_field();
        let z = self.parse_f32_field();
        Vec3::new(x, y, z)
    }

    /// Index-prefixed float triple, as used by every index-carrying list
    /// entry.
    fn parse_indexed_f32_triple(&mut self) -> (u32, Vec3) {
        let index = self.parse_u32_field();
        (index, self.parse_f32_triple())
    }

    fn parse_u32_triple(&mut self) -> [u32; 3] {
        [
            self.parse_u32_field(),
            self.parse_u32_field(),
            self.parse_u32_field(),
        ]
    }

    fn parse_indexed_u32_triple(&mut self) -> (u32, [u32; 3]) {
        let index = self.parse_u32_field();
        (index, self.parse_u32_triple())
    }

    // ==================== top level ====================

    fn parse_top_level(&mut self) -> Result<()> {
        let mut depth = 0i32;
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;

                // version keyword; faulty exporters omit the value
                if self.token_match("3DSMAX_ASCIIEXPORT") {
                    let fmt = self.parse_u32_field();
                    if fmt > FORMAT_VERSION_ASE {
                        self.warn("unknown file format version: *3DSMAX_ASCIIEXPORT should be <= 200");
                    }
                    if fmt != 0 {
                        self.doc.format_version = fmt;
                    }
                    continue;
                }
                if self.token_match("SCENE") {
                    self.parse_scene_block()?;
                    continue;
                }
                // groups are not modelled; their contents parse as if
                // they were top-level
                if self.token_match("GROUP") {
                    self.parse_top_level()?;
                    continue;
                }
                if self.token_match("MATERIAL_LIST") {
                    self.parse_material_list()?;
                    continue;
                }
                if self.token_match("GEOMOBJECT") {
                    let mut mesh = AseMesh::new("UNNAMED");
                    self.parse_object_block(&mut ObjectSlot::Mesh(&mut mesh))?;
                    self.doc.meshes.push(mesh);
                    continue;
                }
                if self.token_match("HELPEROBJECT") {
                    let mut dummy = AseDummy::default();
                    self.parse_object_block(&mut ObjectSlot::Dummy(&mut dummy))?;
                    self.doc.dummies.push(dummy);
                    continue;
                }
                if self.token_match("LIGHTOBJECT") {
                    let mut light = AseLight::new("UNNAMED");
                    self.parse_object_block(&mut ObjectSlot::Light(&mut light))?;
                    self.doc.lights.push(light);
                    continue;
                }
                if self.token_match("CAMERAOBJECT") {
                    let mut camera = AseCamera::new("UNNAMED");
                    self.parse_object_block(&mut ObjectSlot::Camera(&mut camera))?;
                    self.doc.cameras.push(camera);
                    continue;
                }
                if self.token_match("COMMENT") {
                    match self.parse_string("*COMMENT") {
                        Some(text) => self.info(&format!("comment: {text}")),
                        None => {
                            self.skip_to_next_token();
                        }
                    }
                    continue;
                }
                // old ASC flavor stores skinning in a separate top-level block
                if self.doc.is_old_format() && self.token_match("MESH_SOFTSKINVERTS") {
                    self.parse_soft_skin_block();
                }
            }
            match self.section_step(&mut depth, saw_star, None)? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    // ==================== scene block ====================

    fn parse_scene_block(&mut self) -> Result<()> {
        let mut depth = 0i32;
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                if self.token_match("SCENE_BACKGROUND_STATIC") {
                    self.doc.background_color = Some(self.parse_f32_triple());
                    continue;
                }
                if self.token_match("SCENE_AMBIENT_STATIC") {
                    self.doc.ambient_color = Some(self.parse_f32_triple());
                    continue;
                }
                if self.token_match("SCENE_FIRSTFRAME") {
                    self.doc.first_frame = self.parse_u32_field();
                    continue;
                }
                if self.token_match("SCENE_LASTFRAME") {
                    self.doc.last_frame = self.parse_u32_field();
                    continue;
                }
                if self.token_match("SCENE_FRAMESPEED") {
                    self.doc.frame_speed = self.parse_u32_field();
                    continue;
                }
                if self.token_match("SCENE_TICKSPERFRAME") {
                    self.doc.ticks_per_frame = self.parse_u32_field();
                    continue;
                }
            }
            match self.section_step(&mut depth, saw_star, None)? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    // ==================== materials ====================

    fn parse_material_list(&mut self) -> Result<()> {
        let mut depth = 0i32;
        let mut count: u32 = 0;
        let old_count = self.doc.materials.len();
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                if self.token_match("MATERIAL_COUNT") {
                    count = self.parse_u32_field();
                    let Some(total) = old_count.checked_add(count as usize) else {
                        self.warn("out of range: material count is too large");
                        return Ok(());
                    };
                    self.doc
                        .materials
                        .resize(total, AseMaterial::new("INVALID"));
                    continue;
                }
                if self.token_match("MATERIAL") {
                    if count == 0 {
                        self.warn("*MATERIAL_COUNT unspecified or 0");
                        count = 1;
                        self.doc
                            .materials
                            .resize(old_count + 1, AseMaterial::new("INVALID"));
                    }
                    let mut index = self.parse_u32_field();
                    if index >= count {
                        self.warn("out of range: material index is too large");
                        index = count - 1;
                    }
                    let slot = old_count + index as usize;
                    let mut mat = std::mem::replace(
                        &mut self.doc.materials[slot],
                        AseMaterial::new("INVALID"),
                    );
                    let parse_result = self.parse_material_block(&mut mat, 2);
                    self.doc.materials[slot] = mat;
                    parse_result?;
                    continue;
                }
                if depth == 1 {
                    // some exporters drop the closing brace of the
                    // material list; step back onto the keyword marker
                    self.warn("missing closing brace in material list");
                    self.cur -= 1;
                    return Ok(());
                }
            }
            match self.section_step(&mut depth, saw_star, None)? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    fn parse_material_block(&mut self, mat: &mut AseMaterial, level: u32) -> Result<()> {
        let mut depth = 0i32;
        let mut sub_count: u32 = 0;
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                if self.token_match("MATERIAL_NAME") {
                    match self.parse_string("*MATERIAL_NAME") {
                        Some(name) => mat.name = name,
                        None => {
                            self.skip_to_next_token();
                        }
                    }
                    continue;
                }
                if self.token_match("MATERIAL_AMBIENT") {
                    mat.ambient = self.parse_f32_triple();
                    continue;
                }
                if self.token_match("MATERIAL_DIFFUSE") {
                    mat.diffuse = self.parse_f32_triple();
                    continue;
                }
                if self.token_match("MATERIAL_SPECULAR") {
                    mat.specular = self.parse_f32_triple();
                    continue;
                }
                if self.token_match("MATERIAL_SHADING") {
                    if self.token_match("Blinn") {
                        mat.shading = ShadingModel::Blinn;
                    } else if self.token_match("Phong") {
                        mat.shading = ShadingModel::Phong;
                    } else if self.token_match("Flat") {
                        mat.shading = ShadingModel::Flat;
                    } else if self.token_match("Wire") {
                        mat.shading = ShadingModel::Wire;
                    } else {
                        mat.shading = ShadingModel::Gouraud;
                        self.skip_to_next_token();
                    }
                    continue;
                }
                if self.token_match("MATERIAL_TRANSPARENCY") {
                    // the file stores transparency, the document opacity
                    mat.opacity = 1.0 - self.parse_f32_field();
                    continue;
                }
                if self.token_match("MATERIAL_SELFILLUM") {
                    let f = self.parse_f32_field();
                    mat.emissive = Vec3::splat(f);
                    continue;
                }
                if self.token_match("MATERIAL_SHINE") {
                    mat.specular_exponent = self.parse_f32_field() * 15.0;
                    continue;
                }
                if self.token_match("MATERIAL_TWOSIDED") {
                    mat.two_sided = true;
                    continue;
                }
                if self.token_match("MATERIAL_SHINESTRENGTH") {
                    mat.shininess_strength = self.parse_f32_field();
                    continue;
                }
                if self.token_match("MAP_DIFFUSE") {
                    self.parse_map_block(&mut mat.tex_diffuse)?;
                    continue;
                }
                if self.token_match("MAP_AMBIENT") {
                    self.parse_map_block(&mut mat.tex_ambient)?;
                    continue;
                }
                if self.token_match("MAP_SPECULAR") {
                    self.parse_map_block(&mut mat.tex_specular)?;
                    continue;
                }
                if self.token_match("MAP_OPACITY") {
                    self.parse_map_block(&mut mat.tex_opacity)?;
                    continue;
                }
                if self.token_match("MAP_SELFILLUM") {
                    self.parse_map_block(&mut mat.tex_emissive)?;
                    continue;
                }
                if self.token_match("MAP_BUMP") {
                    self.parse_map_block(&mut mat.tex_bump)?;
                    continue;
                }
                if self.token_match("MAP_SHINESTRENGTH") {
                    self.parse_map_block(&mut mat.tex_shininess)?;
                    continue;
                }
                if self.token_match("NUMSUBMTLS") {
                    sub_count = self.parse_u32_field();
                    mat.sub_materials
                        .resize(sub_count as usize, AseMaterial::new("INVALID SUBMATERIAL"));
                    continue;
                }
                if self.token_match("SUBMATERIAL") {
                    if sub_count == 0 {
                        self.warn("*NUMSUBMTLS unspecified or 0");
                        sub_count = 1;
                        mat.sub_materials
                            .resize(1, AseMaterial::new("INVALID SUBMATERIAL"));
                    }
                    let mut index = self.parse_u32_field();
                    if index >= sub_count {
                        self.warn("out of range: submaterial index is too large");
                        index = sub_count - 1;
                    }
                    let slot = index as usize;
                    if slot < mat.sub_materials.len() {
                        let mut sub = std::mem::replace(
                            &mut mat.sub_materials[slot],
                            AseMaterial::new("INVALID SUBMATERIAL"),
                        );
                        let parse_result = self.parse_material_block(&mut sub, level + 1);
                        mat.sub_materials[slot] = sub;
                        parse_result?;
                    }
                    continue;
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("*MATERIAL", level)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    fn parse_map_block(&mut self, map: &mut TextureMap) -> Result<()> {
        let mut depth = 0i32;
        // *BITMAP may appear even when *MAP_CLASS is not a bitmap; an
        // unknown class disables path parsing for the rest of the block
        let mut parse_path = true;
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                if self.token_match("MAP_CLASS") {
                    let class = self.parse_string("*MAP_CLASS");
                    match class {
                        Some(ref c) if c == "Bitmap" || c == "Normal Bump" => {}
                        Some(c) => {
                            warn!("skipping unknown map type: {c}");
                            parse_path = false;
                        }
                        None => {
                            self.skip_to_next_token();
                        }
                    }
                    continue;
                }
                if parse_path && self.token_match("BITMAP") {
                    match self.parse_string("*BITMAP") {
                        Some(path) => {
                            if path == "None" {
                                // produced by some exporters for unused slots
                                warn!("skipping invalid map entry");
                                map.path = String::new();
                            } else {
                                map.path = path;
                            }
                        }
                        None => {
                            self.skip_to_next_token();
                        }
                    }
                    continue;
                }
                if self.token_match("UVW_U_OFFSET") {
                    map.offset_u = self.parse_f32_field();
                    continue;
                }
                if self.token_match("UVW_V_OFFSET") {
                    map.offset_v = self.parse_f32_field();
                    continue;
                }
                if self.token_match("UVW_U_TILING") {
                    map.scale_u = self.parse_f32_field();
                    continue;
                }
                if self.token_match("UVW_V_TILING") {
                    map.scale_v = self.parse_f32_field();
                    continue;
                }
                if self.token_match("UVW_ANGLE") {
                    map.rotation = self.parse_f32_field();
                    continue;
                }
                if self.token_match("MAP_AMOUNT") {
                    map.blend = self.parse_f32_field();
                    continue;
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("*MAP_XXXXXX", 3)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    // ==================== object blocks ====================

    fn parse_object_block(&mut self, slot: &mut ObjectSlot) -> Result<()> {
        let mut depth = 0i32;
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;

                // tokens shared by every node kind
                if self.token_match("NODE_NAME") {
                    match self.parse_string("*NODE_NAME") {
                        Some(name) => slot.info_mut().name = name,
                        None => {
                            self.skip_to_next_token();
                        }
                    }
                    continue;
                }
                if self.token_match("NODE_PARENT") {
                    match self.parse_string("*NODE_PARENT") {
                        Some(parent) => slot.info_mut().parent = Some(parent),
                        None => {
                            self.skip_to_next_token();
                        }
                    }
                    continue;
                }
                if self.token_match("NODE_TM") {
                    self.parse_node_transform_block(slot)?;
                    continue;
                }
                if self.token_match("TM_ANIMATION") {
                    self.parse_animation_block(slot)?;
                    continue;
                }

                match slot {
                    ObjectSlot::Light(light) => {
                        if self.token_match("LIGHT_SETTINGS") {
                            self.parse_light_settings_block(light)?;
                            continue;
                        }
                        if self.token_match("LIGHT_TYPE") {
                            if self.match_word_ci("omni") {
                                light.kind = AseLightKind::Omni;
                            } else if self.match_word_ci("target") {
                                light.kind = AseLightKind::Target;
                            } else if self.match_word_ci("free") {
                                light.kind = AseLightKind::Free;
                            } else if self.match_word_ci("directional") {
                                light.kind = AseLightKind::Directional;
                            } else {
                                self.warn("unknown kind of light source");
                            }
                            continue;
                        }
                    }
                    ObjectSlot::Camera(camera) => {
                        if self.token_match("CAMERA_SETTINGS") {
                            self.parse_camera_settings_block(camera)?;
                            continue;
                        }
                        if self.token_match("CAMERA_TYPE") {
                            if self.match_word_ci("target") {
                                camera.kind = AseCameraKind::Target;
                            } else if self.match_word_ci("free") {
                                camera.kind = AseCameraKind::Free;
                            } else {
                                self.warn("unknown kind of camera");
                            }
                            continue;
                        }
                    }
                    ObjectSlot::Mesh(mesh) => {
                        // older files use *MESH_SOFTSKIN for the geometry block
                        if self.token_match("MESH") || self.token_match("MESH_SOFTSKIN") {
                            self.parse_mesh_block(mesh)?;
                            continue;
                        }
                        if self.token_match("MATERIAL_REF") {
                            mesh.material_index = self.parse_u32_field();
                            continue;
                        }
                    }
                    ObjectSlot::Dummy(_) => {}
                }
            }
            match self.section_step(&mut depth, saw_star, None)? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    fn parse_camera_settings_block(&mut self, camera: &mut AseCamera) -> Result<()> {
        let mut depth = 0i32;
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                if self.token_match("CAMERA_NEAR") {
                    camera.near = self.parse_f32_field();
                    continue;
                }
                if self.token_match("CAMERA_FAR") {
                    camera.far = self.parse_f32_field();
                    continue;
                }
                if self.token_match("CAMERA_FOV") {
                    camera.fov = self.parse_f32_field();
                    continue;
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("CAMERA_SETTINGS", 2)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    fn parse_light_settings_block(&mut self, light: &mut AseLight) -> Result<()> {
        let mut depth = 0i32;
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                if self.token_match("LIGHT_COLOR") {
                    light.color = self.parse_f32_triple();
                    continue;
                }
                if self.token_match("LIGHT_INTENS") {
                    light.intensity = self.parse_f32_field();
                    continue;
                }
                if self.token_match("LIGHT_HOTSPOT") {
                    light.angle = self.parse_f32_field();
                    continue;
                }
                if self.token_match("LIGHT_FALLOFF") {
                    light.falloff = self.parse_f32_field();
                    continue;
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("LIGHT_SETTINGS", 2)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    fn parse_node_transform_block(&mut self, slot: &mut ObjectSlot) -> Result<()> {
        let mut depth = 0i32;
        // 0 = transform belongs to some other node, 1 = this node,
        // 2 = this node's target channel
        let mut mode = 0u8;
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                if self.token_match("NODE_NAME") {
                    let Some(name) = self.parse_string("*NODE_NAME") else {
                        self.skip_to_next_token();
                        continue;
                    };
                    if name == slot.info().name {
                        mode = 1;
                    } else if let Some(pos) = name.find(".Target") {
                        if name[..pos] == *slot.info().name {
                            if slot.is_target_node() {
                                mode = 2;
                            } else {
                                tracing::error!(
                                    "ignoring target transform, this is no spot light or target camera"
                                );
                            }
                        } else {
                            tracing::error!("unknown node transformation: {name}");
                        }
                    } else {
                        tracing::error!("unknown node transformation: {name}");
                    }
                    continue;
                }
                if mode != 0 {
                    // row 3 is the only row that matters for targets
                    if self.token_match("TM_ROW3") {
                        let v = self.parse_f32_triple();
                        if mode == 1 {
                            slot.info_mut().transform[3] = v;
                        } else {
                            slot.info_mut().target_position = v;
                        }
                        continue;
                    }
                    if mode == 1 {
                        if self.token_match("TM_ROW0") {
                            slot.info_mut().transform[0] = self.parse_f32_triple();
                            continue;
                        }
                        if self.token_match("TM_ROW1") {
                            slot.info_mut().transform[1] = self.parse_f32_triple();
                            continue;
                        }
                        if self.token_match("TM_ROW2") {
                            slot.info_mut().transform[2] = self.parse_f32_triple();
                            continue;
                        }
                        if self.token_match("INHERIT_POS") {
                            let v = self.parse_u32_triple();
                            slot.info_mut().inherit.position = v.map(|x| x != 0);
                            continue;
                        }
                        if self.token_match("INHERIT_ROT") {
                            let v = self.parse_u32_triple();
                            slot.info_mut().inherit.rotation = v.map(|x| x != 0);
                            continue;
                        }
                        if self.token_match("INHERIT_SCL") {
                            let v = self.parse_u32_triple();
                            slot.info_mut().inherit.scaling = v.map(|x| x != 0);
                            continue;
                        }
                    }
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("*NODE_TM", 2)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    // ==================== animation blocks ====================

    fn parse_animation_block(&mut self, slot: &mut ObjectSlot) -> Result<()> {
        let mut depth = 0i32;
        let mut channel = AnimChannel::Node;
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                if self.token_match("NODE_NAME") {
                    let Some(name) = self.parse_string("*NODE_NAME") else {
                        self.skip_to_next_token();
                        continue;
                    };
                    // a name containing .Target selects the animated
                    // camera/spot light target channel
                    if name.contains(".Target") {
                        if slot.is_target_node() {
                            channel = AnimChannel::Target;
                        } else {
                            tracing::error!(
                                "found target animation channel but the node is neither a camera nor a spot light"
                            );
                            channel = AnimChannel::Disabled;
                        }
                    }
                    continue;
                }
                if self.token_match("CONTROL_POS_TRACK")
                    || self.token_match("CONTROL_POS_BEZIER")
                    || self.token_match("CONTROL_POS_TCB")
                {
                    if channel == AnimChannel::Disabled {
                        self.skip_section();
                    } else {
                        let anim = Self::channel_anim(slot, channel);
                        self.parse_position_track(anim)?;
                    }
                    continue;
                }
                if self.token_match("CONTROL_SCALE_TRACK")
                    || self.token_match("CONTROL_SCALE_BEZIER")
                    || self.token_match("CONTROL_SCALE_TCB")
                {
                    if channel == AnimChannel::Node {
                        let anim = Self::channel_anim(slot, channel);
                        self.parse_scale_track(anim)?;
                    } else {
                        // target channels carry no scaling
                        tracing::error!("ignoring scaling channel in target animation");
                        self.skip_section();
                    }
                    continue;
                }
                if self.token_match("CONTROL_ROT_TRACK")
                    || self.token_match("CONTROL_ROT_BEZIER")
                    || self.token_match("CONTROL_ROT_TCB")
                {
                    if channel == AnimChannel::Node {
                        let anim = Self::channel_anim(slot, channel);
                        self.parse_rotation_track(anim)?;
                    } else {
                        tracing::error!("ignoring rotation channel in target animation");
                        self.skip_section();
                    }
                    continue;
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("TM_ANIMATION", 2)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    fn channel_anim<'s>(slot: &'s mut ObjectSlot, channel: AnimChannel) -> &'s mut Animation {
        let info = slot.info_mut();
        match channel {
            AnimChannel::Target => &mut info.target_anim,
            AnimChannel::Node | AnimChannel::Disabled => &mut info.anim,
        }
    }

    fn parse_position_track(&mut self, anim: &mut Animation) -> Result<()> {
        let mut depth = 0i32;
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                // bezier and TCB keys only contribute their sample; the
                // extra interpolation data is skipped by the section loop
                let mut matched = true;
                if self.token_match("CONTROL_POS_SAMPLE") {
                    anim.position_kind = TrackKind::Track;
                } else if self.token_match("CONTROL_BEZIER_POS_KEY") {
                    anim.position_kind = TrackKind::Bezier;
                } else if self.token_match("CONTROL_TCB_POS_KEY") {
                    anim.position_kind = TrackKind::Tcb;
                } else {
                    matched = false;
                }
                if matched {
                    let (index, value) = self.parse_indexed_f32_triple();
                    anim.positions.push(VectorKey {
                        time: f64::from(index),
                        value,
                    });
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("*CONTROL_POS_TRACK", 3)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    fn parse_scale_track(&mut self, anim: &mut Animation) -> Result<()> {
        let mut depth = 0i32;
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                let mut matched = true;
                if self.token_match("CONTROL_SCALE_SAMPLE") {
                    anim.scaling_kind = TrackKind::Track;
                } else if self.token_match("CONTROL_BEZIER_SCALE_KEY") {
                    anim.scaling_kind = TrackKind::Bezier;
                } else if self.token_match("CONTROL_TCB_SCALE_KEY") {
                    anim.scaling_kind = TrackKind::Tcb;
                } else {
                    matched = false;
                }
                if matched {
                    let (index, value) = self.parse_indexed_f32_triple();
                    anim.scalings.push(VectorKey {
                        time: f64::from(index),
                        value,
                    });
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("*CONTROL_SCALE_TRACK", 3)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    fn parse_rotation_track(&mut self, anim: &mut Animation) -> Result<()> {
        let mut depth = 0i32;
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                let mut matched = true;
                if self.token_match("CONTROL_ROT_SAMPLE") {
                    anim.rotation_kind = TrackKind::Track;
                } else if self.token_match("CONTROL_BEZIER_ROT_KEY") {
                    anim.rotation_kind = TrackKind::Bezier;
                } else if self.token_match("CONTROL_TCB_ROT_KEY") {
                    anim.rotation_kind = TrackKind::Tcb;
                } else {
                    matched = false;
                }
                if matched {
                    // keys are axis + angle
                    let (index, axis) = self.parse_indexed_f32_triple();
                    let angle = self.parse_f32_field();
                    let axis = axis.normalize_or_zero();
                    let value = if axis == Vec3::ZERO {
                        Quat::IDENTITY
                    } else {
                        Quat::from_axis_angle(axis, angle)
                    };
                    anim.rotations.push(QuatKey {
                        time: f64::from(index),
                        value,
                    });
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("*CONTROL_ROT_TRACK", 3)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    // ==================== mesh blocks ====================

    fn parse_mesh_block(&mut self, mesh: &mut AseMesh) -> Result<()> {
        let mut depth = 0i32;
        let mut num_vertices: u32 = 0;
        let mut num_faces: u32 = 0;
        let mut num_tvertices: u32 = 0;
        let mut num_tfaces: u32 = 0;
        let mut num_cvertices: u32 = 0;
        let mut num_cfaces: u32 = 0;
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                if self.token_match("MESH_NUMVERTEX") {
                    num_vertices = self.parse_u32_field();
                    continue;
                }
                if self.token_match("MESH_NUMTVERTEX") {
                    num_tvertices = self.parse_u32_field();
                    continue;
                }
                if self.token_match("MESH_NUMCVERTEX") {
                    num_cvertices = self.parse_u32_field();
                    continue;
                }
                if self.token_match("MESH_NUMFACES") {
                    num_faces = self.parse_u32_field();
                    continue;
                }
                if self.token_match("MESH_NUMTVFACES") {
                    num_tfaces = self.parse_u32_field();
                    continue;
                }
                if self.token_match("MESH_NUMCVFACES") {
                    num_cfaces = self.parse_u32_field();
                    continue;
                }
                if self.token_match("MESH_VERTEX_LIST") {
                    self.parse_vertex_list(num_vertices, mesh)?;
                    continue;
                }
                if self.token_match("MESH_FACE_LIST") {
                    self.parse_face_list(num_faces, mesh)?;
                    continue;
                }
                if self.token_match("MESH_TVERTLIST") {
                    self.parse_tvert_list(num_tvertices, mesh, 0)?;
                    continue;
                }
                if self.token_match("MESH_TFACELIST") {
                    self.parse_tface_list(num_tfaces, mesh, 0)?;
                    continue;
                }
                if self.token_match("MESH_CVERTLIST") {
                    self.parse_cvert_list(num_cvertices, mesh)?;
                    continue;
                }
                if self.token_match("MESH_CFACELIST") {
                    self.parse_cface_list(num_cfaces, mesh)?;
                    continue;
                }
                if self.token_match("MESH_NORMALS") {
                    self.parse_normals_block(mesh)?;
                    continue;
                }
                if self.token_match("MESH_MAPPINGCHANNEL") {
                    // channel 0 does not exist and channel 1 is the
                    // primary list parsed above; anything else selects an
                    // additional UV channel
                    let index = self.parse_u32_field();
                    if index < 2 {
                        self.warn("mapping channel has an invalid index, skipping UV channel");
                        self.skip_section();
                    } else if index as usize > MAX_UV_CHANNELS {
                        self.warn("too many UV channels specified, skipping channel");
                        self.skip_section();
                    } else {
                        self.parse_mapping_channel(index - 1, mesh)?;
                    }
                    continue;
                }
                if self.token_match("MESH_ANIMATION") {
                    // keyframe mesh animation has no counterpart in the
                    // scene graph
                    self.warn("found *MESH_ANIMATION element, keyframe animation is not supported and will be ignored");
                    continue;
                }
                if self.token_match("MESH_WEIGHTS") {
                    self.parse_mesh_weights_block(mesh)?;
                    continue;
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("*MESH", 2)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    fn parse_vertex_list(&mut self, num_vertices: u32, mesh: &mut AseMesh) -> Result<()> {
        let mut depth = 0i32;
        // entries are populated by explicit index into the pre-sized array
        mesh.positions = vec![Vec3::ZERO; num_vertices as usize];
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                if self.token_match("MESH_VERTEX") {
                    let (index, value) = self.parse_indexed_f32_triple();
                    if index >= num_vertices {
                        self.warn("invalid vertex index, it will be ignored");
                    } else {
                        mesh.positions[index as usize] = value;
                    }
                    continue;
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("*MESH_VERTEX_LIST", 3)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    fn parse_face_list(&mut self, num_faces: u32, mesh: &mut AseMesh) -> Result<()> {
        let mut depth = 0i32;
        mesh.faces = vec![AseFace::default(); num_faces as usize];
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                if self.token_match("MESH_FACE") {
                    if let Some((index, face)) = self.parse_face_entry() {
                        if index >= num_faces {
                            self.warn("face has an invalid index, it will be ignored");
                        } else {
                            mesh.faces[index as usize] = face;
                        }
                    }
                    continue;
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("*MESH_FACE_LIST", 3)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    /// One `*MESH_FACE` entry: `<idx>: A: a B: b C: c` plus optional
    /// `*MESH_SMOOTHING` and `*MESH_MTLID` trailers on the same line.
    fn parse_face_entry(&mut self) -> Option<(u32, AseFace)> {
        if !skip_spaces(self.buf, &mut self.cur) {
            self.warn("unable to parse *MESH_FACE element: unexpected end of line");
            self.skip_to_next_token();
            return None;
        }
        let face_index = parse_u32(self.buf, &mut self.cur);
        let mut face = AseFace::default();

        if !skip_spaces(self.buf, &mut self.cur) {
            self.warn("unable to parse *MESH_FACE element: unexpected end of line, ':' expected");
            self.skip_to_next_token();
            return Some((face_index, face));
        }
        // some exporters drop the colon after the face index
        if self.byte() == b':' {
            self.cur += 1;
        }

        for _ in 0..3 {
            if !skip_spaces(self.buf, &mut self.cur) {
                self.warn("unable to parse *MESH_FACE element: unexpected end of line");
                self.skip_to_next_token();
                return Some((face_index, face));
            }
            let slot = match self.byte() {
                b'A' | b'a' => 0,
                b'B' | b'b' => 1,
                b'C' | b'c' => 2,
                _ => {
                    self.warn("unable to parse *MESH_FACE element: A, B or C expected");
                    self.skip_to_next_token();
                    return Some((face_index, face));
                }
            };
            self.cur += 1;
            if !skip_spaces(self.buf, &mut self.cur) || self.byte() != b':' {
                self.warn("unable to parse *MESH_FACE element: unexpected end of line, ':' expected");
                self.skip_to_next_token();
                return Some((face_index, face));
            }
            self.cur += 1;
            if !skip_spaces(self.buf, &mut self.cur) {
                self.warn("unable to parse *MESH_FACE element: vertex index expected");
                self.skip_to_next_token();
                return Some((face_index, face));
            }
            face.indices[slot] = parse_u32(self.buf, &mut self.cur);
        }

        // skip the AB/BC/CA edge visibility flags
        loop {
            if self.byte() == b'*' {
                break;
            }
            if self.at_end() || is_line_end(self.byte()) {
                return Some((face_index, face));
            }
            self.cur += 1;
        }

        // smoothing groups: comma-separated bit positions OR'd into a mask
        if self.token_match("*MESH_SMOOTHING") {
            if !skip_spaces(self.buf, &mut self.cur) {
                self.warn("unable to parse *MESH_SMOOTHING element: smoothing group(s) expected");
                self.skip_to_next_token();
                return Some((face_index, face));
            }
            loop {
                if self.byte().is_ascii_digit() {
                    let value = parse_u32(self.buf, &mut self.cur);
                    if value < 32 {
                        face.smoothing_mask |= 1 << value;
                    } else {
                        self.warn(&format!(
                            "unable to set smoothing group, value {value} out of range"
                        ));
                    }
                }
                skip_spaces(self.buf, &mut self.cur);
                if self.byte() != b',' {
                    break;
                }
                self.cur += 1;
                skip_spaces(self.buf, &mut self.cur);
            }
        }

        // *MESH_MTLID is optional too
        loop {
            if self.byte() == b'*' {
                break;
            }
            if self.at_end() || is_line_end(self.byte()) {
                return Some((face_index, face));
            }
            self.cur += 1;
        }
        if self.token_match("*MESH_MTLID") {
            if !skip_spaces(self.buf, &mut self.cur) {
                self.warn("unable to parse *MESH_MTLID element: material index expected");
                self.skip_to_next_token();
                return Some((face_index, face));
            }
            face.material_id = parse_u32(self.buf, &mut self.cur);
        }
        Some((face_index, face))
    }

    fn parse_tvert_list(
        &mut self,
        num_vertices: u32,
        mesh: &mut AseMesh,
        channel: usize,
    ) -> Result<()> {
        let mut depth = 0i32;
        mesh.texcoords[channel] = vec![Vec3::ZERO; num_vertices as usize];
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                if self.token_match("MESH_TVERT") {
                    let (index, value) = self.parse_indexed_f32_triple();
                    if index >= num_vertices {
                        self.warn("tvertex has an invalid index, it will be ignored");
                    } else {
                        mesh.texcoords[channel][index as usize] = value;
                    }
                    if value.z != 0.0 {
                        // W is used, three components needed
                        mesh.uv_components[channel] = 3;
                    }
                    continue;
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("*MESH_TVERT_LIST", 3)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    fn parse_tface_list(
        &mut self,
        num_faces: u32,
        mesh: &mut AseMesh,
        channel: usize,
    ) -> Result<()> {
        let mut depth = 0i32;
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                if self.token_match("MESH_TFACE") {
                    let (index, values) = self.parse_indexed_u32_triple();
                    if index >= num_faces || index as usize >= mesh.faces.len() {
                        self.warn("UV face has an invalid index, it will be ignored");
                    } else {
                        mesh.faces[index as usize].uv_indices[channel] = values;
                    }
                    continue;
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("*MESH_TFACE_LIST", 3)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    fn parse_mapping_channel(&mut self, channel: u32, mesh: &mut AseMesh) -> Result<()> {
        let mut depth = 0i32;
        let mut num_tvertices: u32 = 0;
        let mut num_tfaces: u32 = 0;
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                if self.token_match("MESH_NUMTVERTEX") {
                    num_tvertices = self.parse_u32_field();
                    continue;
                }
                if self.token_match("MESH_NUMTVFACES") {
                    num_tfaces = self.parse_u32_field();
                    continue;
                }
                if self.token_match("MESH_TVERTLIST") {
                    self.parse_tvert_list(num_tvertices, mesh, channel as usize)?;
                    continue;
                }
                if self.token_match("MESH_TFACELIST") {
                    self.parse_tface_list(num_tfaces, mesh, channel as usize)?;
                    continue;
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("*MESH_MAPPING_CHANNEL", 3)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    fn parse_cvert_list(&mut self, num_vertices: u32, mesh: &mut AseMesh) -> Result<()> {
        let mut depth = 0i32;
        mesh.colors = vec![Vec4::new(0.0, 0.0, 0.0, 1.0); num_vertices as usize];
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                if self.token_match("MESH_VERTCOL") {
                    let (index, value) = self.parse_indexed_f32_triple();
                    if index >= num_vertices {
                        self.warn("vertex color has an invalid index, it will be ignored");
                    } else {
                        mesh.colors[index as usize] = Vec4::new(value.x, value.y, value.z, 1.0);
                    }
                    continue;
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("*MESH_CVERTEX_LIST", 3)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    fn parse_cface_list(&mut self, num_faces: u32, mesh: &mut AseMesh) -> Result<()> {
        let mut depth = 0i32;
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                if self.token_match("MESH_CFACE") {
                    let (index, values) = self.parse_indexed_u32_triple();
                    if index >= num_faces || index as usize >= mesh.faces.len() {
                        self.warn("color face has an invalid index, it will be ignored");
                    } else {
                        mesh.faces[index as usize].color_indices = values;
                    }
                    continue;
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("*MESH_CFACE_LIST", 3)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    fn parse_normals_block(&mut self, mesh: &mut AseMesh) -> Result<()> {
        let mut depth = 0i32;
        // three slots per face; face and vertex contributions are summed
        // and renormalization deferred downstream
        mesh.normals = vec![Vec3::ZERO; mesh.faces.len() * 3];
        let mut face_index = u32::MAX;
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                if face_index != u32::MAX && self.token_match("MESH_VERTEXNORMAL") {
                    let (index, normal) = self.parse_indexed_f32_triple();
                    let Some(face) = mesh.faces.get(face_index as usize) else {
                        continue;
                    };
                    // the vertex index selects the face corner it belongs to
                    let Some(corner) = face.indices.iter().position(|&i| i == index) else {
                        tracing::error!("invalid vertex index in MESH_VERTEXNORMAL section");
                        continue;
                    };
                    mesh.normals[face_index as usize * 3 + corner] += normal;
                    continue;
                }
                if self.token_match("MESH_FACENORMAL") {
                    let (index, normal) = self.parse_indexed_f32_triple();
                    face_index = index;
                    if index as usize >= mesh.faces.len() {
                        tracing::error!("invalid face index in MESH_FACENORMAL section");
                        continue;
                    }
                    for corner in 0..3 {
                        mesh.normals[index as usize * 3 + corner] += normal;
                    }
                    continue;
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("*MESH_NORMALS", 3)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    // ==================== skinning blocks ====================

    fn parse_mesh_weights_block(&mut self, mesh: &mut AseMesh) -> Result<()> {
        let mut depth = 0i32;
        let mut num_vertices: u32 = 0;
        let mut num_bones: u32 = 0;
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                if self.token_match("MESH_NUMVERTEX") {
                    num_vertices = self.parse_u32_field();
                    continue;
                }
                if self.token_match("MESH_NUMBONE") {
                    num_bones = self.parse_u32_field();
                    continue;
                }
                if self.token_match("MESH_BONE_LIST") {
                    self.parse_bone_list(num_bones, mesh)?;
                    continue;
                }
                if self.token_match("MESH_BONE_VERTEX_LIST") {
                    self.parse_bone_vertex_list(num_vertices, mesh)?;
                    continue;
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("*MESH_WEIGHTS", 3)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    fn parse_bone_list(&mut self, num_bones: u32, mesh: &mut AseMesh) -> Result<()> {
        let mut depth = 0i32;
        mesh.bones = vec!["UNNAMED".to_string(); num_bones as usize];
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                if self.token_match("MESH_BONE_NAME") {
                    if skip_spaces(self.buf, &mut self.cur) {
                        let index = parse_u32(self.buf, &mut self.cur);
                        if index >= num_bones {
                            self.warn("bone index is out of bounds");
                            continue;
                        }
                        match self.parse_string("*MESH_BONE_NAME") {
                            Some(name) => mesh.bones[index as usize] = name,
                            None => {
                                self.skip_to_next_token();
                            }
                        }
                        continue;
                    }
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("*MESH_BONE_LIST", 3)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    fn parse_bone_vertex_list(&mut self, num_vertices: u32, mesh: &mut AseMesh) -> Result<()> {
        let mut depth = 0i32;
        mesh.bone_vertices = vec![BoneVertex::default(); num_vertices as usize];
        loop {
            let mut saw_star = false;
            if self.byte() == b'*' {
                self.cur += 1;
                saw_star = true;
                if self.token_match("MESH_BONE_VERTEX") {
                    let mut index = self.parse_u32_field();
                    if mesh.bone_vertices.is_empty() {
                        self.skip_section();
                        continue;
                    }
                    if index >= num_vertices {
                        self.warn(
                            "bone vertex index is out of bounds, using the largest valid index instead",
                        );
                        index = num_vertices - 1;
                    }
                    // the vertex position triple is repeated here; ignored
                    let _ = self.parse_f32_triple();

                    loop {
                        if !skip_spaces(self.buf, &mut self.cur) {
                            break;
                        }
                        if !is_numeric(self.byte()) {
                            break;
                        }
                        let negative = self.byte() == b'-';
                        if negative {
                            self.cur += 1;
                        }
                        let bone = parse_u32(self.buf, &mut self.cur);
                        if !skip_spaces(self.buf, &mut self.cur) {
                            break;
                        }
                        let weight = parse_f32(self.buf, &mut self.cur);
                        // a bone index of -1 marks an unused entry
                        if !negative {
                            mesh.bone_vertices[index as usize].weights.push((bone, weight));
                        }
                    }
                    continue;
                }
            }
            match self.section_step(&mut depth, saw_star, Some(("*MESH_BONE_VERTEX", 4)))? {
                Step::Done => return Ok(()),
                Step::Continue => {}
            }
        }
    }

    /// The old ASC soft-skin block: no nested sections, no keyword
    /// markers, a bare node name followed by counted weight lines.
    fn parse_soft_skin_block(&mut self) {
        loop {
            if self.at_end() {
                return;
            }
            match self.byte() {
                b'}' => {
                    self.cur += 1;
                    return;
                }
                b'{' => {
                    self.cur += 1;
                }
                _ => {
                    let start = self.cur;
                    while !self.at_end() && !is_space_or_line_end(self.byte()) {
                        self.cur += 1;
                    }
                    if self.cur > start {
                        let name =
                            String::from_utf8_lossy(&self.buf[start..self.cur]).into_owned();
                        if self.read_soft_skin_weights(&name) {
                            return;
                        }
                    } else {
                        self.cur += 1;
                    }
                }
            }
            skip_spaces_and_line_ends(self.buf, &mut self.cur);
        }
    }

    /// Reads one node's soft-skin weight lines. Returns true when the
    /// closing brace of the whole block was consumed.
    fn read_soft_skin_weights(&mut self, name: &str) -> bool {
        let Some(mesh_index) = self.doc.meshes.iter().position(|m| m.node.name == name) else {
            self.warn("encountered unknown mesh in *MESH_SOFTSKINVERTS section");
            // skip numeric lines until a new mesh name or the block end
            loop {
                skip_spaces_and_line_ends(self.buf, &mut self.cur);
                if self.byte() == b'}' {
                    self.cur += 1;
                    return true;
                }
                if self.at_end() || !is_numeric(self.byte()) {
                    return false;
                }
                while !self.at_end() && !is_line_end(self.byte()) {
                    self.cur += 1;
                }
            }
        };

        // detach the mesh while the cursor methods run
        let mut mesh = std::mem::replace(&mut self.doc.meshes[mesh_index], AseMesh::new(""));
        skip_spaces_and_line_ends(self.buf, &mut self.cur);
        let num_vertices = self.parse_u32_field();
        mesh.bone_vertices.reserve(num_vertices as usize);

        for _ in 0..num_vertices {
            skip_spaces_and_line_ends(self.buf, &mut self.cur);
            let num_weights = self.parse_u32_field();
            let mut vertex = BoneVertex::default();
            vertex.weights.reserve(num_weights as usize);

            for _ in 0..num_weights {
                let bone = self
                    .parse_string("*MESH_SOFTSKINVERTS.Bone")
                    .unwrap_or_default();
                // bones are appended on first use
                let bone_index = mesh
                    .bones
                    .iter()
                    .position(|b| *b == bone)
                    .unwrap_or_else(|| {
                        mesh.bones.push(bone);
                        mesh.bones.len() - 1
                    });
                let weight = self.parse_f32_field();
                vertex.weights.push((bone_index as u32, weight));
            }
            mesh.bone_vertices.push(vertex);
        }
        self.doc.meshes[mesh_index] = mesh;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::material::ShadingModel;

    fn parse_ok(src: &str) -> Document {
        Parser::new(src.as_bytes(), FORMAT_VERSION_ASE)
            .parse()
            .expect("parse failed")
    }

    #[test]
    fn scene_block_scalars() {
        let doc = parse_ok(
            "*3DSMAX_ASCIIEXPORT 200\n\
             *SCENE {\n\
             \t*SCENE_BACKGROUND_STATIC 0.1 0.2 0.3\n\
             \t*SCENE_AMBIENT_STATIC 0.4 0.5 0.6\n\
             \t*SCENE_FIRSTFRAME 0\n\
             \t*SCENE_LASTFRAME 100\n\
             \t*SCENE_FRAMESPEED 25\n\
             \t*SCENE_TICKSPERFRAME 160\n\
             }\n",
        );
        assert_eq!(doc.format_version, 200);
        assert_eq!(doc.background_color, Some(Vec3::new(0.1, 0.2, 0.3)));
        assert_eq!(doc.ambient_color, Some(Vec3::new(0.4, 0.5, 0.6)));
        assert_eq!(doc.last_frame, 100);
        assert_eq!(doc.frame_speed, 25);
        assert_eq!(doc.ticks_per_frame, 160);
    }

    #[test]
    fn truncated_top_level_section_is_not_an_error() {
        // EOF at document scope terminates parsing with what was read
        let doc = parse_ok("*SCENE {\n\t*SCENE_LASTFRAME 10\n");
        assert_eq!(doc.last_frame, 10);
    }

    #[test]
    fn truncated_nested_section_is_structural() {
        let result = Parser::new(
            b"*GEOMOBJECT {\n\t*NODE_NAME \"Box01\"\n\t*MESH {\n\t\t*MESH_NUMVERTEX 3\n",
            FORMAT_VERSION_ASE,
        )
        .parse();
        assert!(matches!(
            result,
            Err(Error::UnexpectedEofInSection {
                section: "*MESH",
                ..
            })
        ));
    }

    #[test]
    fn material_without_count_defaults_to_one() {
        let doc = parse_ok(
            "*MATERIAL_LIST {\n\
             \t*MATERIAL 0 {\n\
             \t\t*MATERIAL_NAME \"wood\"\n\
             \t\t*MATERIAL_SHADING Phong\n\
             \t\t*MATERIAL_TRANSPARENCY 0.25\n\
             \t}\n\
             }\n",
        );
        assert_eq!(doc.materials.len(), 1);
        assert_eq!(doc.materials[0].name, "wood");
        assert_eq!(doc.materials[0].shading, ShadingModel::Phong);
        assert!((doc.materials[0].opacity - 0.75).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_material_index_clamps_to_last() {
        let doc = parse_ok(
            "*MATERIAL_LIST {\n\
             \t*MATERIAL_COUNT 2\n\
             \t*MATERIAL 5 {\n\
             \t\t*MATERIAL_NAME \"clamped\"\n\
             \t}\n\
             }\n",
        );
        assert_eq!(doc.materials.len(), 2);
        assert_eq!(doc.materials[1].name, "clamped");
    }

    #[test]
    fn sub_materials_recurse() {
        let doc = parse_ok(
            "*MATERIAL_LIST {\n\
             \t*MATERIAL_COUNT 1\n\
             \t*MATERIAL 0 {\n\
             \t\t*MATERIAL_NAME \"multi\"\n\
             \t\t*NUMSUBMTLS 2\n\
             \t\t*SUBMATERIAL 0 {\n\
             \t\t\t*MATERIAL_NAME \"first\"\n\
             \t\t}\n\
             \t\t*SUBMATERIAL 1 {\n\
             \t\t\t*MATERIAL_NAME \"second\"\n\
             \t\t\t*MAP_DIFFUSE {\n\
             \t\t\t\t*MAP_CLASS \"Bitmap\"\n\
             \t\t\t\t*BITMAP \"textures/second.png\"\n\
             \t\t\t}\n\
             \t\t}\n\
             \t}\n\
             }\n",
        );
        let mat = &doc.materials[0];
        assert_eq!(mat.sub_materials.len(), 2);
        assert_eq!(mat.sub_materials[0].name, "first");
        assert_eq!(mat.sub_materials[1].tex_diffuse.path, "textures/second.png");
    }

    #[test]
    fn unknown_map_class_disables_the_path() {
        let doc = parse_ok(
            "*MATERIAL_LIST {\n\
             \t*MATERIAL_COUNT 1\n\
             \t*MATERIAL 0 {\n\
             \t\t*MAP_DIFFUSE {\n\
             \t\t\t*MAP_CLASS \"Cellular\"\n\
             \t\t\t*BITMAP \"ignored.png\"\n\
             \t\t}\n\
             \t}\n\
             }\n",
        );
        assert_eq!(doc.materials[0].tex_diffuse.path, "");
    }

    fn box_mesh_source() -> &'static str {
        "*3DSMAX_ASCIIEXPORT 200\n\
         *GEOMOBJECT {\n\
         \t*NODE_NAME \"Box01\"\n\
         \t*NODE_TM {\n\
         \t\t*NODE_NAME \"Box01\"\n\
         \t\t*TM_ROW0 1.0 0.0 0.0\n\
         \t\t*TM_ROW1 0.0 1.0 0.0\n\
         \t\t*TM_ROW2 0.0 0.0 1.0\n\
         \t\t*TM_ROW3 1.0 2.0 3.0\n\
         \t\t*INHERIT_POS 1 0 1\n\
         \t}\n\
         \t*MESH {\n\
         \t\t*MESH_NUMVERTEX 3\n\
         \t\t*MESH_NUMFACES 1\n\
         \t\t*MESH_VERTEX_LIST {\n\
         \t\t\t*MESH_VERTEX 0 0.0 0.0 0.0\n\
         \t\t\t*MESH_VERTEX 1 1.0 0.0 0.0\n\
         \t\t\t*MESH_VERTEX 2 0.0 1.0 0.0\n\
         \t\t\t*MESH_VERTEX 7 9.0 9.0 9.0\n\
         \t\t}\n\
         \t\t*MESH_FACE_LIST {\n\
         \t\t\t*MESH_FACE 0: A: 0 B: 1 C: 2 AB: 1 BC: 1 CA: 1 *MESH_SMOOTHING 1,3 *MESH_MTLID 2\n\
         \t\t}\n\
         \t}\n\
         \t*MATERIAL_REF 4\n\
         }\n"
    }

    #[test]
    fn mesh_vertices_and_faces() {
        let doc = parse_ok(box_mesh_source());
        assert_eq!(doc.meshes.len(), 1);
        let mesh = &doc.meshes[0];
        assert_eq!(mesh.node.name, "Box01");
        assert_eq!(mesh.material_index, 4);

        // the out-of-range entry (index 7) was dropped, not appended
        assert_eq!(mesh.positions.len(), 3);
        assert_eq!(mesh.positions[2], Vec3::new(0.0, 1.0, 0.0));

        assert_eq!(mesh.faces.len(), 1);
        let face = &mesh.faces[0];
        assert_eq!(face.indices, [0, 1, 2]);
        assert_eq!(face.smoothing_mask, (1 << 1) | (1 << 3));
        assert_eq!(face.material_id, 2);
    }

    #[test]
    fn node_transform_rows_and_inherit_flags() {
        let doc = parse_ok(box_mesh_source());
        let node = &doc.meshes[0].node;
        assert_eq!(node.transform[3], Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(node.inherit.position, [true, false, true]);
    }

    #[test]
    fn mapping_channel_with_reserved_index_is_skipped() {
        let doc = parse_ok(
            "*GEOMOBJECT {\n\
             \t*NODE_NAME \"M\"\n\
             \t*MESH {\n\
             \t\t*MESH_NUMVERTEX 0\n\
             \t\t*MESH_NUMFACES 0\n\
             \t\t*MESH_MAPPINGCHANNEL 1 {\n\
             \t\t\t*MESH_NUMTVERTEX 4\n\
             \t\t}\n\
             \t\t*MESH_MAPPINGCHANNEL 2 {\n\
             \t\t\t*MESH_NUMTVERTEX 1\n\
             \t\t\t*MESH_TVERTLIST {\n\
             \t\t\t\t*MESH_TVERT 0 0.5 0.5 0.0\n\
             \t\t\t}\n\
             \t\t}\n\
             \t}\n\
             }\n",
        );
        let mesh = &doc.meshes[0];
        // channel index 1 is reserved, nothing landed in the primary slot
        assert!(mesh.texcoords[0].is_empty());
        // channel index 2 maps to slot 1
        assert_eq!(mesh.texcoords[1].len(), 1);
        assert_eq!(mesh.texcoords[1][0], Vec3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn spot_light_with_target_animation() {
        let doc = parse_ok(
            "*LIGHTOBJECT {\n\
             \t*NODE_NAME \"Spot01\"\n\
             \t*LIGHT_TYPE target\n\
             \t*LIGHT_SETTINGS {\n\
             \t\t*LIGHT_COLOR 1.0 0.5 0.25\n\
             \t\t*LIGHT_HOTSPOT 30.0\n\
             \t}\n\
             \t*TM_ANIMATION {\n\
             \t\t*NODE_NAME \"Spot01.Target\"\n\
             \t\t*CONTROL_POS_TRACK {\n\
             \t\t\t*CONTROL_POS_SAMPLE 0 1.0 2.0 3.0\n\
             \t\t}\n\
             \t}\n\
             }\n",
        );
        let light = &doc.lights[0];
        assert_eq!(light.kind, AseLightKind::Target);
        assert_eq!(light.color, Vec3::new(1.0, 0.5, 0.25));
        assert_eq!(light.angle, 30.0);
        assert_eq!(light.node.target_anim.positions.len(), 1);
        assert_eq!(
            light.node.target_anim.positions[0].value,
            Vec3::new(1.0, 2.0, 3.0)
        );
        assert!(light.node.anim.positions.is_empty());
    }

    #[test]
    fn target_animation_on_plain_mesh_is_dropped() {
        let doc = parse_ok(
            "*GEOMOBJECT {\n\
             \t*NODE_NAME \"Box01\"\n\
             \t*TM_ANIMATION {\n\
             \t\t*NODE_NAME \"Box01.Target\"\n\
             \t\t*CONTROL_POS_TRACK {\n\
             \t\t\t*CONTROL_POS_SAMPLE 0 1.0 2.0 3.0\n\
             \t\t}\n\
             \t}\n\
             }\n",
        );
        let node = &doc.meshes[0].node;
        assert!(node.anim.positions.is_empty());
        assert!(node.target_anim.positions.is_empty());
    }

    #[test]
    fn group_contents_parse_as_top_level() {
        let doc = parse_ok(
            "*GROUP \"g\" {\n\
             \t*GEOMOBJECT {\n\
             \t\t*NODE_NAME \"InGroup\"\n\
             \t}\n\
             }\n",
        );
        assert_eq!(doc.meshes.len(), 1);
        assert_eq!(doc.meshes[0].node.name, "InGroup");
    }

    #[test]
    fn rotation_keys_become_quaternions() {
        let doc = parse_ok(
            "*GEOMOBJECT {\n\
             \t*NODE_NAME \"Box01\"\n\
             \t*TM_ANIMATION {\n\
             \t\t*NODE_NAME \"Box01\"\n\
             \t\t*CONTROL_ROT_TRACK {\n\
             \t\t\t*CONTROL_ROT_SAMPLE 160 0.0 0.0 1.0 1.5707964\n\
             \t\t}\n\
             \t}\n\
             }\n",
        );
        let anim = &doc.meshes[0].node.anim;
        assert_eq!(anim.rotations.len(), 1);
        assert_eq!(anim.rotation_kind, TrackKind::Track);
        let q = anim.rotations[0].value;
        let expected = Quat::from_axis_angle(Vec3::Z, std::f32::consts::FRAC_PI_2);
        assert!((q.dot(expected).abs() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn old_format_soft_skin_weights() {
        let doc = Parser::new(
            b"*3DSMAX_ASCIIEXPORT 110\n\
              *GEOMOBJECT {\n\
              \t*NODE_NAME \"M\"\n\
              \t*MESH {\n\
              \t\t*MESH_NUMVERTEX 2\n\
              \t\t*MESH_NUMFACES 0\n\
              \t}\n\
              }\n\
              *MESH_SOFTSKINVERTS {\n\
              M\n\
              2\n\
              1 \"Bone01\" 0.75\n\
              2 \"Bone01\" 0.5 \"Bone02\" 0.5\n\
              }\n",
            crate::ase::document::FORMAT_VERSION_ASC,
        )
        .parse()
        .expect("parse failed");

        let mesh = &doc.meshes[0];
        assert_eq!(mesh.bones, vec!["Bone01".to_string(), "Bone02".to_string()]);
        assert_eq!(mesh.bone_vertices.len(), 2);
        assert_eq!(mesh.bone_vertices[0].weights, vec![(0, 0.75)]);
        assert_eq!(mesh.bone_vertices[1].weights, vec![(0, 0.5), (1, 0.5)]);
    }

    #[test]
    fn bone_weight_lists_drop_unused_entries() {
        let doc = parse_ok(
            "*GEOMOBJECT {\n\
             \t*NODE_NAME \"Skinned\"\n\
             \t*MESH {\n\
             \t\t*MESH_NUMVERTEX 1\n\
             \t\t*MESH_NUMFACES 0\n\
             \t\t*MESH_WEIGHTS {\n\
             \t\t\t*MESH_NUMVERTEX 1\n\
             \t\t\t*MESH_NUMBONE 2\n\
             \t\t\t*MESH_BONE_LIST {\n\
             \t\t\t\t*MESH_BONE_NAME 0 \"Root\"\n\
             \t\t\t\t*MESH_BONE_NAME 1 \"Arm\"\n\
             \t\t\t\t*MESH_BONE_NAME 9 \"OutOfRange\"\n\
             \t\t\t}\n\
             \t\t\t*MESH_BONE_VERTEX_LIST {\n\
             \t\t\t\t*MESH_BONE_VERTEX 0 0.0 0.0 0.0 0 0.25 -1 0.0 1 0.75\n\
             \t\t\t}\n\
             \t\t}\n\
             \t}\n\
             }\n",
        );
        let mesh = &doc.meshes[0];
        assert_eq!(mesh.bones, vec!["Root".to_string(), "Arm".to_string()]);
        assert_eq!(mesh.bone_vertices[0].weights, vec![(0, 0.25), (1, 0.75)]);
    }

    #[test]
    fn unterminated_string_fails_the_field_only() {
        // no closing quote anywhere before the end of input
        let doc = parse_ok(
            "*GEOMOBJECT {\n\
             \t*NODE_PARENT \"P\"\n\
             \t*NODE_NAME \"NoClose\n",
        );
        // the parent parsed, the node keeps its default name
        assert_eq!(doc.meshes[0].node.parent.as_deref(), Some("P"));
        assert_eq!(doc.meshes[0].node.name, "UNNAMED");
    }
}
