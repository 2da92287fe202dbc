use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use eframe::egui;
use rfd::FileDialog;
use tracing::{info, warn};

use crate::config::{Config, ConfigManager};
use crate::core::converter::{self, ConversionResult};
use crate::core::encoding_resolver::EncodingResolver;
use crate::core::output_naming::has_extension;
use crate::utils::encoding::{describe_label, CATALOG};
use crate::utils::{clipboard, file_helper};

/// Last converted file, kept for preview and saving.
struct Converted {
    result: ConversionResult,
    source: Option<PathBuf>,
}

/// One row of the session history.
struct HistoryEntry {
    file: String,
    encoding: String,
    converted_at: DateTime<Local>,
    saved_to: Option<String>,
}

/// Main application state.
pub struct ConverterApp {
    config_manager: ConfigManager,
    config: Config,
    resolver: EncodingResolver,

    current: Option<Converted>,
    history: Vec<HistoryEntry>,

    status: String,
    status_is_error: bool,
}

impl ConverterApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config_manager = ConfigManager::new();
        let config = config_manager.load();
        info!(path = %config_manager.get_config_file_path().display(), "loaded config");

        Self {
            config_manager,
            config,
            resolver: EncodingResolver::new(),
            current: None,
            history: Vec::new(),
            status: "Drop a SQL file here or click Open".to_string(),
            status_is_error: false,
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
        self.status_is_error = false;
    }

    fn set_error(&mut self, message: impl Into<String>) {
        self.status = message.into();
        self.status_is_error = true;
        warn!(status = %self.status, "operation failed");
    }

    fn save_config(&mut self) {
        if let Err(e) = self.config_manager.save(&self.config) {
            self.set_error(format!("Failed to save settings: {}", e));
        }
    }

    fn browse_file(&mut self) {
        let extension = self.config.allowed_extension.trim_start_matches('.').to_string();
        let mut dialog = FileDialog::new().add_filter("SQL Files", &[extension.as_str()]);
        if !self.config.last_directory.is_empty() {
            dialog = dialog.set_directory(&self.config.last_directory);
        }

        if let Some(path) = dialog.pick_file() {
            if let Some(dir) = file_helper::get_directory(&path) {
                self.config.last_directory = dir;
                self.save_config();
            }
            self.open_path(&path);
        }
    }

    fn open_path(&mut self, path: &Path) {
        let name = file_helper::get_file_name(path).unwrap_or_default();
        match file_helper::read_file_bytes(path) {
            Ok(bytes) => self.convert(name, &bytes, Some(path.to_path_buf())),
            Err(e) => self.set_error(format!("Error: cannot read {}: {}", path.display(), e)),
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if let Some(bytes) = file.bytes {
                let name = if file.name.is_empty() {
                    file.path.as_deref().and_then(file_helper::get_file_name).unwrap_or_default()
                } else {
                    file.name.clone()
                };
                self.convert(name, &bytes, file.path);
            } else if let Some(path) = file.path {
                self.open_path(&path);
            }
        }
    }

    fn convert(&mut self, name: String, bytes: &[u8], source: Option<PathBuf>) {
        if !has_extension(&name, &self.config.allowed_extension) {
            self.set_error(format!(
                "Rejected {}: only {} files are accepted",
                name, self.config.allowed_extension
            ));
            return;
        }

        let result = match converter::convert(&self.resolver, &name, bytes, self.config.hint()) {
            Ok(result) => result,
            Err(e) => {
                self.set_error(format!("Error: {}", e));
                return;
            }
        };

        self.set_status(result.message.clone());
        self.history.push(HistoryEntry {
            file: result.original_name.clone(),
            encoding: result.encoding.clone(),
            converted_at: Local::now(),
            saved_to: None,
        });
        self.current = Some(Converted { result, source });

        if self.config.auto_copy {
            self.copy_result();
        }
        if self.config.auto_save {
            self.auto_save();
        }
    }

    fn copy_result(&mut self) {
        let Some(current) = &self.current else { return };
        if clipboard::copy_to_clipboard(&current.result.content) {
            let message = format!("{} (copied to clipboard)", current.result.message);
            self.set_status(message);
        } else {
            self.set_error("Failed to copy to clipboard");
        }
    }

    fn auto_save(&mut self) {
        let Some(current) = &self.current else { return };
        let path = file_helper::output_path(
            current.source.as_deref(),
            &self.config.output_dir,
            &current.result.output_name,
        );
        self.write_result(&path);
    }

    fn save_with_dialog(&mut self) {
        let Some(current) = &self.current else { return };
        let mut dialog = FileDialog::new().set_file_name(&current.result.output_name);
        if let Some(dir) = current.source.as_deref().and_then(|p| p.parent()) {
            dialog = dialog.set_directory(dir);
        }

        if let Some(path) = dialog.save_file() {
            self.write_result(&path);
        }
    }

    fn write_result(&mut self, path: &Path) {
        let Some(current) = &self.current else { return };
        match save_to(path, &current.result) {
            Ok(()) => {
                let saved = path.display().to_string();
                if let Some(entry) = self.history.last_mut() {
                    entry.saved_to = Some(saved.clone());
                }
                self.set_status(format!("Saved {}", saved));
            }
            Err(e) => self.set_error(format!("Error: {:#}", e)),
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("SQL UTF-8 Converter");
            ui.separator();

            if ui.button("📁 Open").clicked() {
                self.browse_file();
            }

            let has_result = self.current.is_some();
            if ui.add_enabled(has_result, egui::Button::new("💾 Save")).clicked() {
                self.save_with_dialog();
            }
            if ui.add_enabled(has_result, egui::Button::new("📋 Copy")).clicked() {
                self.copy_result();
            }

            ui.separator();

            ui.label("Encoding:");
            let selected = if self.config.encoding_hint.is_empty() {
                "Auto-detect".to_string()
            } else {
                describe_label(&self.config.encoding_hint)
            };
            let mut changed = false;
            egui::ComboBox::from_id_salt("encoding_selector")
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    changed |= ui
                        .selectable_value(&mut self.config.encoding_hint, String::new(), "Auto-detect")
                        .changed();
                    for &enc in CATALOG.iter() {
                        changed |= ui
                            .selectable_value(&mut self.config.encoding_hint, enc.to_string(), describe_label(enc))
                            .changed();
                    }
                });

            ui.separator();

            changed |= ui.checkbox(&mut self.config.auto_copy, "Auto Copy").changed();
            changed |= ui.checkbox(&mut self.config.auto_save, "Auto Save").changed();

            if changed {
                self.save_config();
            }
        });

        if self.config.auto_save {
            ui.horizontal(|ui| {
                ui.label("Output folder:");
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.config.output_dir)
                        .desired_width(360.0)
                        .hint_text("Beside the source file"),
                );
                if response.lost_focus() {
                    self.save_config();
                }
                if ui.button("Browse").clicked() {
                    if let Some(dir) = FileDialog::new().pick_folder() {
                        self.config.output_dir = dir.to_string_lossy().into_owned();
                        self.save_config();
                    }
                }
            });
        }
    }

    fn history_panel(&self, ui: &mut egui::Ui) {
        ui.heading("History");
        ui.separator();
        egui::ScrollArea::vertical().show(ui, |ui| {
            for entry in self.history.iter().rev() {
                ui.label(egui::RichText::new(&entry.file).strong());
                ui.label(format!(
                    "{}  {}",
                    entry.converted_at.format("%H:%M:%S"),
                    entry.encoding
                ));
                if let Some(saved) = &entry.saved_to {
                    ui.label(egui::RichText::new(saved).small().color(ACCENT));
                }
                ui.add_space(6.0);
            }
        });
    }

    fn result_panel(&self, ui: &mut egui::Ui) {
        let Some(current) = &self.current else {
            ui.centered_and_justified(|ui| {
                ui.label(
                    egui::RichText::new(format!(
                        "Drop a {} file anywhere in this window",
                        self.config.allowed_extension
                    ))
                    .size(18.0)
                    .color(DIM),
                );
            });
            return;
        };

        let result = &current.result;
        egui::Grid::new("result_info").num_columns(2).show(ui, |ui| {
            ui.label("Source:");
            ui.label(&result.original_name);
            ui.end_row();
            ui.label("Output:");
            ui.label(&result.output_name);
            ui.end_row();
            ui.label("Encoding:");
            ui.label(egui::RichText::new(&result.encoding).strong().color(ACCENT));
            ui.end_row();
            ui.label("Score:");
            match result.score {
                Some(score) => ui.label(score.to_string()),
                None => ui.label("hint"),
            };
            ui.end_row();
        });

        ui.separator();

        egui::ScrollArea::both().show(ui, |ui| {
            ui.add(
                egui::TextEdit::multiline(&mut result.content.as_str())
                    .code_editor()
                    .desired_width(f32::INFINITY),
            );
        });
    }
}

fn save_to(path: &Path, result: &ConversionResult) -> anyhow::Result<()> {
    file_helper::write_output(path, result.utf8_bytes())
        .with_context(|| format!("cannot write {}", path.display()))?;
    info!(path = %path.display(), "saved converted file");
    Ok(())
}

const ACCENT: egui::Color32 = egui::Color32::from_rgb(139, 233, 253);
const SUCCESS: egui::Color32 = egui::Color32::from_rgb(80, 250, 123);
const ERROR: egui::Color32 = egui::Color32::from_rgb(255, 85, 85);
const DIM: egui::Color32 = egui::Color32::from_rgb(98, 114, 164);

/// Dark theme with the same palette as the status colors above.
pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();

    let background = egui::Color32::from_rgb(40, 42, 54);
    let current_line = egui::Color32::from_rgb(68, 71, 90);
    let foreground = egui::Color32::from_rgb(248, 248, 242);

    visuals.widgets.noninteractive.bg_fill = background;
    visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, foreground);
    visuals.widgets.inactive.bg_fill = current_line;
    visuals.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, foreground);
    visuals.widgets.hovered.bg_fill = DIM;
    visuals.selection.bg_fill = DIM;
    visuals.window_fill = background;
    visuals.panel_fill = background;
    visuals.hyperlink_color = ACCENT;

    ctx.set_visuals(visuals);
}

impl eframe::App for ConverterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.toolbar(ui);
        });

        egui::TopBottomPanel::bottom("statusbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let color = if self.status_is_error { ERROR } else { SUCCESS };
                ui.colored_label(color, &self.status);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(concat!("v", env!("CARGO_PKG_VERSION")));
                });
            });
        });

        egui::SidePanel::right("history")
            .default_width(200.0)
            .resizable(true)
            .show(ctx, |ui| self.history_panel(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            self.result_panel(ui);
        });

        // Highlight the window while files hover over it
        if ctx.input(|i| !i.raw.hovered_files.is_empty()) {
            let painter = ctx.layer_painter(egui::LayerId::new(
                egui::Order::Foreground,
                egui::Id::new("drop_overlay"),
            ));
            let screen = ctx.screen_rect();
            painter.rect_filled(screen, 0.0, egui::Color32::from_black_alpha(160));
            painter.text(
                screen.center(),
                egui::Align2::CENTER_CENTER,
                "Drop to convert",
                egui::FontId::proportional(28.0),
                ACCENT,
            );
        }
    }
}
