//! Main application state and UI layout.

use std::path::PathBuf;

use eframe::egui::{self, CentralPanel, Context, Frame, Sense, TopBottomPanel};

use fideo_canvas::{Editor, ModalRequest, ModalResponse, PointerFrame};
use fideo_graph::Vec2;

use crate::surface::EguiSurface;

/// Main application state.
pub struct FideoApp {
    editor: Editor,

    /// Where Save writes without asking; set by Open and Save As.
    document_path: Option<PathBuf>,

    /// Text buffer behind the float/int popups.
    draft: String,
    /// The draft has been seeded for the current popup.
    draft_seeded: bool,

    show_debug: bool,
}

impl FideoApp {
    /// Create a new application instance, optionally opening `document`.
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        document: Option<PathBuf>,
        debug: bool,
        show_ids: bool,
        profile: bool,
    ) -> Self {
        let mut editor = Editor::default();
        editor.options.show_ids = show_ids;
        editor.options.profile = profile;

        let mut app = Self {
            editor,
            document_path: None,
            draft: String::new(),
            draft_seeded: false,
            show_debug: debug,
        };
        if let Some(path) = document {
            app.open(path);
        }
        app
    }

    fn open(&mut self, path: PathBuf) {
        match self.editor.load(&path) {
            Ok(()) => self.document_path = Some(path),
            Err(e) => tracing::error!(path = %path.display(), error = %e, "open failed"),
        }
    }

    fn save_to(&mut self, path: PathBuf) {
        match self.editor.save(&path) {
            Ok(()) => self.document_path = Some(path),
            Err(e) => tracing::error!(path = %path.display(), error = %e, "save failed"),
        }
    }

    fn save(&mut self) {
        match self.document_path.clone() {
            Some(path) => self.save_to(path),
            None => self.save_as(),
        }
    }

    fn save_as(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("fideo graph", &["json"])
            .set_file_name("untitled.json")
            .save_file()
        {
            self.save_to(path);
        }
    }

    fn render_menu_bar(&mut self, ui: &mut egui::Ui, ctx: &Context) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("New").clicked() {
                    self.editor.clear_all();
                    self.document_path = None;
                    ui.close_menu();
                }
                if ui.button("Open...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("fideo graph", &["json"])
                        .pick_file()
                    {
                        self.open(path);
                    }
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Save").clicked() {
                    self.save();
                    ui.close_menu();
                }
                if ui.button("Save As...").clicked() {
                    self.save_as();
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Export Source...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("rust source", &["rs"])
                        .set_file_name("graph.rs")
                        .save_file()
                    {
                        if let Err(e) = self.editor.export(&path) {
                            tracing::error!(path = %path.display(), error = %e, "export failed");
                        }
                    }
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
            ui.menu_button("View", |ui| {
                ui.checkbox(&mut self.editor.options.profile, "Node timings");
                ui.checkbox(&mut self.editor.options.show_ids, "Entity ids");
                ui.checkbox(&mut self.show_debug, "Debug overlay");
            });
            if self.editor.needs_saving() {
                ui.label("● unsaved");
            }
        });
    }

    /// Realize the pending popup, if any, and feed the answer back.
    fn render_modal(&mut self, ctx: &Context) {
        let Some(request) = self.editor.modal().cloned() else {
            self.draft_seeded = false;
            return;
        };

        // Seed text buffers once per popup, not once per frame
        if !self.draft_seeded {
            self.draft = match &request {
                ModalRequest::EditFloat { value, .. } => fideo_graph::format_float(*value),
                ModalRequest::EditInt { value, .. } => value.to_string(),
                _ => String::new(),
            };
            self.draft_seeded = true;
        }

        let mut response = None;
        match request {
            ModalRequest::EditFloat { pin, name, .. } => {
                egui::Window::new(name)
                    .collapsible(false)
                    .resizable(false)
                    .show(ctx, |ui| {
                        ui.text_edit_singleline(&mut self.draft);
                        ui.horizontal(|ui| {
                            if ui.button("Cancel").clicked() {
                                response = Some(ModalResponse::Dismiss);
                            }
                            if ui.button("OK").clicked() {
                                if let Ok(value) = self.draft.trim().parse::<f32>() {
                                    response = Some(ModalResponse::FloatValue { pin, value });
                                }
                            }
                        });
                    });
            }
            ModalRequest::EditInt { pin, name, .. } => {
                egui::Window::new(name)
                    .collapsible(false)
                    .resizable(false)
                    .show(ctx, |ui| {
                        ui.text_edit_singleline(&mut self.draft);
                        ui.horizontal(|ui| {
                            if ui.button("Cancel").clicked() {
                                response = Some(ModalResponse::Dismiss);
                            }
                            if ui.button("OK").clicked() {
                                if let Ok(value) = self.draft.trim().parse::<i32>() {
                                    response = Some(ModalResponse::IntValue { pin, value });
                                }
                            }
                        });
                    });
            }
            ModalRequest::EditBool { pin, name, value } => {
                egui::Window::new(name)
                    .collapsible(false)
                    .resizable(false)
                    .show(ctx, |ui| {
                        ui.horizontal(|ui| {
                            if ui.selectable_label(!value, "Off").clicked() {
                                response = Some(ModalResponse::BoolValue { pin, value: false });
                            }
                            if ui.selectable_label(value, "On").clicked() {
                                response = Some(ModalResponse::BoolValue { pin, value: true });
                            }
                        });
                        if ui.button("Cancel").clicked() {
                            response = Some(ModalResponse::Dismiss);
                        }
                    });
            }
            ModalRequest::EditEnumeration {
                pin,
                name,
                labels,
                value,
            } => {
                egui::Window::new(name)
                    .collapsible(false)
                    .resizable(false)
                    .show(ctx, |ui| {
                        for label in &labels {
                            if ui.selectable_label(*label == value, label).clicked() {
                                response = Some(ModalResponse::EnumerationValue {
                                    pin,
                                    value: label.clone(),
                                });
                            }
                        }
                        ui.separator();
                        if ui.button("Cancel").clicked() {
                            response = Some(ModalResponse::Dismiss);
                        }
                    });
            }
            ModalRequest::ChooseBusFile { pin, .. } => {
                // rfd blocks, so there is no window to draw for this one
                response = Some(
                    match rfd::FileDialog::new()
                        .add_filter("audio", &["wav", "mp3", "ogg", "flac", "aif", "aiff"])
                        .pick_file()
                    {
                        Some(path) => ModalResponse::BusFile {
                            pin,
                            path: path.display().to_string(),
                        },
                        None => ModalResponse::Dismiss,
                    },
                );
            }
            ModalRequest::ConfirmDeleteNode { node, name } => {
                egui::Window::new(format!("Delete {name}?"))
                    .collapsible(false)
                    .resizable(false)
                    .show(ctx, |ui| {
                        ui.horizontal(|ui| {
                            if ui.button("Cancel").clicked() {
                                response = Some(ModalResponse::Dismiss);
                            }
                            if ui.button("Delete").clicked() {
                                response = Some(ModalResponse::DeleteNode { node });
                            }
                        });
                    });
            }
            ModalRequest::ConfirmDeleteConnection { connection } => {
                egui::Window::new("Delete connection?")
                    .collapsible(false)
                    .resizable(false)
                    .show(ctx, |ui| {
                        ui.horizontal(|ui| {
                            if ui.button("Cancel").clicked() {
                                response = Some(ModalResponse::Dismiss);
                            }
                            if ui.button("Delete").clicked() {
                                response = Some(ModalResponse::DeleteConnection { connection });
                            }
                        });
                    });
            }
            ModalRequest::ContextMenu { pos, kinds, group } => {
                let anchor = self.editor.canvas.to_window(pos);
                egui::Window::new("Create")
                    .collapsible(false)
                    .resizable(false)
                    .fixed_pos(egui::pos2(anchor.x, anchor.y))
                    .show(ctx, |ui| {
                        for kind in &kinds {
                            if ui.button(kind).clicked() {
                                response = Some(ModalResponse::CreateNode {
                                    kind: kind.clone(),
                                    pos,
                                    group,
                                });
                            }
                        }
                        ui.separator();
                        if ui.button("Group").clicked() {
                            response = Some(ModalResponse::CreateNode {
                                kind: "Group".to_string(),
                                pos,
                                group: None,
                            });
                        }
                        if ui.button("Cancel").clicked() {
                            response = Some(ModalResponse::Dismiss);
                        }
                    });
            }
        }

        if let Some(response) = response {
            self.editor.respond(response);
            self.draft_seeded = false;
        }
    }

    fn render_debug_overlay(&self, ctx: &Context) {
        egui::Window::new("Debug")
            .default_open(true)
            .show(ctx, |ui| {
                let canvas = &self.editor.canvas;
                ui.label(format!("scale: {:.2}", canvas.scale));
                ui.label(format!(
                    "offset: {:.0}, {:.0}",
                    canvas.origin_offset.x, canvas.origin_offset.y
                ));
                let hover = &self.editor.hover;
                ui.label(format!("hover node: {:?}", hover.node));
                ui.label(format!("hover pin: {:?}", hover.pin));
                ui.label(format!("hover connection: {:?}", hover.connection));
                ui.label(format!("nodes: {}", self.editor.store.node_count()));
            });
    }
}

impl eframe::App for FideoApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        TopBottomPanel::top("menu").show(ctx, |ui| {
            self.render_menu_bar(ui, ctx);
        });

        CentralPanel::default()
            .frame(Frame::new())
            .show(ctx, |ui| {
                let rect = ui.available_rect_before_wrap();
                let response = ui.allocate_rect(rect, Sense::click_and_drag());

                let pointer = ctx.input(|i| {
                    let pos = i
                        .pointer
                        .latest_pos()
                        .map(|p| Vec2::new(p.x, p.y))
                        .unwrap_or_default();
                    let scroll = i.raw_scroll_delta.y;
                    PointerFrame {
                        pos,
                        primary_down: i.pointer.primary_down(),
                        secondary_clicked: i.pointer.secondary_clicked(),
                        wheel: if scroll > 0.0 {
                            1.0
                        } else if scroll < 0.0 {
                            -1.0
                        } else {
                            0.0
                        },
                        dt: i.stable_dt,
                        in_viewport: response.hovered(),
                    }
                });

                let painter = ui.painter_at(rect);
                let mut surface = EguiSurface::new(&painter);
                let viewport = (
                    Vec2::new(rect.min.x, rect.min.y),
                    Vec2::new(rect.max.x, rect.max.y),
                );
                self.editor.frame(&pointer, viewport, &mut surface);
            });

        self.render_modal(ctx);
        if self.show_debug {
            self.render_debug_overlay(ctx);
        }

        // Gestures and the profiler strip want fresh frames
        ctx.request_repaint_after(std::time::Duration::from_millis(33));
    }
}
