use eframe::egui::{self, Color32, ColorImage, Pos2, TextureOptions};
use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::input::{InputEvent, InputRouter, KeyEvent, Mode, PointerEvent, PointerKind};
use crate::map::{CursorHint, DrawingMap, GridStyle};
use crate::persistence::{self, MapClient, MapRecord, SaveMapRequest};
use crate::stroke::StrokeKind;

/// Canvas extent, matching the stored map format.
pub const CANVAS_SIZE: u32 = 800;

/// Connection and brush preferences persisted across sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub server_url: String,
    pub campaign_id: i64,
    pub brush_width: u32,
    pub grid_size: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            campaign_id: 1,
            brush_width: 5,
            grid_size: 50,
        }
    }
}

/// The eframe shell hosting the drawing engine: a side panel with the
/// brush, grid, mode and server controls plus the saved-map list, and a
/// central panel compositing the canvas at the repaint rate.
pub struct MapApp {
    map: DrawingMap,
    router: InputRouter,
    preferences: Preferences,
    brush_colour: Color32,
    saved_maps: Vec<MapRecord>,
    status: Option<String>,
    saving: bool,
    canvas_texture: Option<egui::TextureHandle>,
}

impl MapApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let preferences: Preferences = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let mut map = DrawingMap::new(CANVAS_SIZE, CANVAS_SIZE);
        map.brush_radius = preferences.brush_width;
        map.grid_size = preferences.grid_size;

        Self {
            map,
            router: InputRouter::new(),
            preferences,
            brush_colour: Color32::BLACK,
            saved_maps: Vec::new(),
            status: None,
            saving: false,
            canvas_texture: None,
        }
    }

    fn client(&self) -> MapClient {
        MapClient::new(&self.preferences.server_url, self.preferences.campaign_id)
    }

    fn refresh_map_list(&mut self) {
        match self.client().list_maps() {
            Ok(maps) => {
                self.saved_maps = maps;
                self.status = None;
            }
            Err(err) => {
                log::error!("failed to fetch map list: {}", err);
                self.status = Some("Could not reach the campaign server".to_string());
            }
        }
    }

    fn save_current_map(&mut self) {
        self.saving = true;
        let result = SaveMapRequest::from_map(&self.map, self.preferences.campaign_id)
            .and_then(|request| self.client().save_map(&request));
        match result {
            Ok(record) => {
                log::info!("saved map {:?} as id {}", self.map.name, record.id);
                self.status = None;
                self.refresh_map_list();
            }
            Err(err) => {
                log::error!("failed to save map: {}", err);
                self.status = Some("Saving the map failed".to_string());
            }
        }
        self.saving = false;
    }

    fn load_map(&mut self, record: &MapRecord) {
        match persistence::load_record(&mut self.map, record) {
            Ok(()) => {
                self.preferences.grid_size = self.map.grid_size;
                self.status = None;
            }
            Err(err) => {
                log::error!("failed to load map {}: {}", record.id, err);
                self.status = Some("Loading the map failed".to_string());
            }
        }
    }

    fn delete_map(&mut self, id: i64) {
        match self.client().delete_map(id) {
            Ok(()) => self.refresh_map_list(),
            Err(err) => {
                log::error!("failed to delete map {}: {}", id, err);
                self.status = Some("Deleting the map failed".to_string());
            }
        }
    }

    /// Converts this frame's raw egui events into canvas-relative input
    /// events for the router.
    fn gather_canvas_events(&self, ctx: &egui::Context, canvas_rect: egui::Rect) -> Vec<InputEvent> {
        let to_canvas =
            |pos: Pos2| Point::new(pos.x - canvas_rect.min.x, pos.y - canvas_rect.min.y);
        let mut events = Vec::new();
        ctx.input(|input| {
            for event in &input.events {
                match event {
                    egui::Event::PointerButton {
                        pos,
                        button: egui::PointerButton::Primary,
                        pressed,
                        ..
                    } => {
                        events.push(InputEvent::Pointer(if *pressed {
                            PointerEvent::Down {
                                position: to_canvas(*pos),
                                kind: PointerKind::Mouse,
                            }
                        } else {
                            PointerEvent::Up {
                                position: to_canvas(*pos),
                            }
                        }));
                    }
                    egui::Event::PointerMoved(pos) => {
                        events.push(InputEvent::Pointer(PointerEvent::Move {
                            position: to_canvas(*pos),
                            kind: PointerKind::Mouse,
                            pressure: 1.0,
                        }));
                    }
                    // Pens and touch screens report force; route them
                    // through the pressure-gated path.
                    egui::Event::Touch { pos, force, .. } => {
                        events.push(InputEvent::Pointer(PointerEvent::Move {
                            position: to_canvas(*pos),
                            kind: PointerKind::Pen,
                            pressure: force.unwrap_or(0.0),
                        }));
                    }
                    egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } => {
                        if let Some(shortcut) = shortcut_for(*key, *modifiers) {
                            events.push(InputEvent::Key(shortcut));
                        }
                    }
                    _ => {}
                }
            }
        });
        events
    }

    fn side_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Map Creator");
        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Name:");
            ui.text_edit_singleline(&mut self.map.name);
        });

        ui.separator();
        ui.label("Brush");
        ui.add(egui::Slider::new(&mut self.preferences.brush_width, 0..=50).text("width"));
        ui.horizontal(|ui| {
            ui.label("Colour:");
            egui::color_picker::color_edit_button_srgba(
                ui,
                &mut self.brush_colour,
                egui::color_picker::Alpha::Opaque,
            );
        });
        ui.horizontal(|ui| {
            for (kind, label) in [(StrokeKind::Pixel, "Pixel"), (StrokeKind::Line, "Line")] {
                if ui.selectable_label(self.map.brush_kind == kind, label).clicked() {
                    self.map.brush_kind = kind;
                }
            }
        });

        ui.separator();
        ui.label("Grid");
        ui.add(egui::Slider::new(&mut self.preferences.grid_size, 5..=200).text("size"));
        ui.horizontal(|ui| {
            for style in [GridStyle::None, GridStyle::Squared] {
                if ui
                    .selectable_label(self.map.grid_style == style, style.as_str())
                    .clicked()
                {
                    self.map.grid_style = style;
                }
            }
        });

        ui.separator();
        ui.label("Mode");
        ui.horizontal(|ui| {
            for (mode, label) in [
                (Mode::Drawing, "Draw"),
                (Mode::Selecting, "Select"),
                (Mode::Resizing, "Move"),
            ] {
                if ui.selectable_label(self.router.mode() == mode, label).clicked() {
                    self.router.set_mode(mode);
                }
            }
        });

        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Server:");
            ui.text_edit_singleline(&mut self.preferences.server_url);
        });
        ui.horizontal(|ui| {
            ui.label("Campaign:");
            ui.add(egui::DragValue::new(&mut self.preferences.campaign_id));
        });
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!self.saving, egui::Button::new("Save map"))
                .clicked()
            {
                self.save_current_map();
            }
            if ui.button("Refresh list").clicked() {
                self.refresh_map_list();
            }
        });
        if let Some(status) = &self.status {
            ui.colored_label(Color32::RED, status);
        }

        ui.separator();
        ui.label("Saved maps");
        let mut load = None;
        let mut delete = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for record in &self.saved_maps {
                ui.horizontal(|ui| {
                    let label = format!("{} (by {})", record.name, record.creator_id);
                    if ui.link(label).clicked() {
                        load = Some(record.clone());
                    }
                    if ui.small_button("🗑").clicked() {
                        delete = Some(record.id);
                    }
                });
            }
        });
        if let Some(record) = load {
            self.load_map(&record);
        }
        if let Some(id) = delete {
            self.delete_map(id);
        }
    }

    fn canvas_panel(&mut self, ui: &mut egui::Ui) {
        let size = egui::vec2(self.map.width() as f32, self.map.height() as f32);
        let (response, painter) = ui.allocate_painter(size, egui::Sense::click_and_drag());
        let rect = response.rect;

        // Controls are plain configuration values, read at action time.
        self.map.brush_radius = self.preferences.brush_width;
        self.map.brush_colour = colour_from(self.brush_colour);
        self.map.grid_size = self.preferences.grid_size;

        for event in self.gather_canvas_events(ui.ctx(), rect) {
            self.router.dispatch(&event, &mut self.map);
        }

        // Re-derive the visible canvas from the offscreen buffer and the
        // overlays.
        let frame = self.map.composite();
        let image = ColorImage::from_rgba_unmultiplied(
            [frame.width() as usize, frame.height() as usize],
            frame.image().as_raw(),
        );
        match &mut self.canvas_texture {
            Some(texture) => texture.set(image, TextureOptions::NEAREST),
            None => {
                self.canvas_texture =
                    Some(ui.ctx().load_texture("map-canvas", image, TextureOptions::NEAREST));
            }
        }
        if let Some(texture) = &self.canvas_texture {
            painter.image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        if self.router.cursor() == CursorHint::Grab {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
        }
    }
}

impl eframe::App for MapApp {
    /// Called by the framework to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.preferences);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("controls")
            .min_width(260.0)
            .show(ctx, |ui| self.side_panel(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.canvas_panel(ui));

        // Keep compositing at the repaint rate even without input.
        ctx.request_repaint();
    }
}

fn colour_from(colour: Color32) -> Rgba<u8> {
    Rgba([colour.r(), colour.g(), colour.b(), colour.a()])
}

fn shortcut_for(key: egui::Key, modifiers: egui::Modifiers) -> Option<KeyEvent> {
    if modifiers.command {
        return match key {
            egui::Key::Z => Some(KeyEvent::Undo),
            egui::Key::Y => Some(KeyEvent::Redo),
            egui::Key::X => Some(KeyEvent::Cut),
            egui::Key::C => Some(KeyEvent::Copy),
            egui::Key::V => Some(KeyEvent::Paste),
            _ => None,
        };
    }
    match key {
        egui::Key::D => Some(KeyEvent::DrawMode),
        egui::Key::S => Some(KeyEvent::SelectMode),
        egui::Key::Delete => Some(KeyEvent::DeleteSelection),
        _ => None,
    }
}
