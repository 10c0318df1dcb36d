use ascii_fx::config::{MAX_OUTPUT_WIDTH, MIN_OUTPUT_WIDTH};
use ascii_fx::decode::encode_png;
use ascii_fx::luminance::PRESETS;
use ascii_fx::{AsciiArt, Effect, Output, PixelBuffer, ReactiveModel};
use eframe::egui;
use eframe::egui::text::LayoutJob;
use std::path::Path;
use std::time::{Duration, Instant};

/// Font size of the ASCII output
const ASCII_FONT_SIZE: f32 = 10.0;

/// Repaint interval while a background decode is in flight
const DECODE_POLL: Duration = Duration::from_millis(50);

/// Main application state for the ASCII FX GUI
pub struct FxApp {
    model: ReactiveModel,

    /// Texture handle for the source image
    input_texture: Option<egui::TextureHandle>,
    /// Texture handle for filtered image output
    output_texture: Option<egui::TextureHandle>,
    /// Colour-annotated layout of the ASCII output
    ascii_job: Option<LayoutJob>,
    /// Model generation the cached output views were built from
    shown_generation: u64,

    /// Text typed into the intensity field
    intensity_text: String,
    /// Text typed into the alphabet field
    alphabet_text: String,

    /// A decode was requested and has not come back yet
    decoding: bool,
    /// Message from file operations or the About box
    status: Option<String>,
}

impl Default for FxApp {
    fn default() -> Self {
        let model = ReactiveModel::new();
        let alphabet_text = model.state().alphabet_text.clone();
        Self {
            model,
            input_texture: None,
            output_texture: None,
            ascii_job: None,
            shown_generation: 0,
            intensity_text: "0".to_string(),
            alphabet_text,
            decoding: false,
            status: None,
        }
    }
}

impl FxApp {
    /// Create a new ASCII FX application
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self::default()
    }

    /// Read an image file and hand it to the background decoder
    pub fn load_image(&mut self, path: &Path) {
        match self.model.load_file(path) {
            Ok(_) => {
                self.decoding = true;
                self.status = None;
            }
            Err(e) => {
                log::warn!("failed to read {}: {e}", path.display());
                self.status = Some(format!("Failed to read {}: {e}", path.display()));
            }
        }
    }

    /// Save the current output: PNG for images, text or HTML for ASCII art
    pub fn save_output(&self, path: &Path) -> Result<(), String> {
        let bytes = match self.model.output() {
            Some(Output::Image(img)) => encode_png(img).map_err(|e| e.to_string())?,
            Some(Output::Ascii(art)) => {
                let is_html = path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
                if is_html {
                    html_document(art).into_bytes()
                } else {
                    art.to_text(self.model.state().render.color_annotated)
                        .into_bytes()
                }
            }
            None => return Err("No output to save".to_string()),
        };
        std::fs::write(path, bytes).map_err(|e| format!("Failed to save: {e}"))
    }

    fn sync_intensity_text(&mut self) {
        self.intensity_text = format!("{}", self.model.state().effect.intensity);
    }

    /// Render the control panel UI
    fn render_controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Controls");
        ui.separator();

        ui.collapsing("Effect", |ui| {
            let current = self.model.state().effect.effect;
            let mut selected = current;
            egui::ComboBox::from_label("Effect")
                .selected_text(selected.label())
                .show_ui(ui, |ui| {
                    for effect in Effect::ALL {
                        ui.selectable_value(&mut selected, effect, effect.label());
                    }
                });
            if selected != current {
                self.model.select_effect(selected);
                self.sync_intensity_text();
            }

            // Only effects with a parameter get an intensity control
            if let Some(range) = self.model.intensity_range() {
                let mut value = range.clamp(self.model.state().effect.intensity);
                let slider = egui::Slider::new(&mut value, range.min..=range.max)
                    .step_by(range.step)
                    .text("Intensity");
                if ui.add(slider).changed() {
                    self.model.set_intensity(value);
                    self.sync_intensity_text();
                }

                let response = ui
                    .add(egui::TextEdit::singleline(&mut self.intensity_text).desired_width(80.0))
                    .on_hover_text("Exact intensity, applied when the field loses focus");
                if response.lost_focus() {
                    if let Err(e) = self.model.set_intensity_text(&self.intensity_text) {
                        self.status = Some(e.to_string());
                    }
                    self.sync_intensity_text();
                }
            }
        });

        ui.add_space(8.0);

        ui.collapsing("ASCII", |ui| {
            let mut ascii_mode = self.model.state().render.ascii_mode;
            if ui
                .checkbox(&mut ascii_mode, "ASCII Mode")
                .on_hover_text("Render the filtered image as characters")
                .changed()
            {
                self.model.set_ascii_mode(ascii_mode);
            }

            let mut color = self.model.state().render.color_annotated;
            if ui
                .checkbox(&mut color, "Colour Characters")
                .on_hover_text("Keep each character's source colour")
                .changed()
            {
                self.model.set_color_annotated(color);
            }

            let mut width = self.model.state().render.output_width;
            if ui
                .add(
                    egui::Slider::new(&mut width, MIN_OUTPUT_WIDTH..=MAX_OUTPUT_WIDTH)
                        .text("Width"),
                )
                .on_hover_text("Characters per row")
                .changed()
                && let Err(e) = self.model.set_output_width(width)
            {
                self.status = Some(e.to_string());
            }

            ui.add_space(4.0);

            let current = self.model.state().alphabet_text.clone();
            let selected = PRESETS
                .iter()
                .find(|(_, chars)| *chars == current)
                .map_or("Custom", |(name, _)| *name);
            egui::ComboBox::from_label("Alphabet")
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    for (name, chars) in PRESETS {
                        if ui.selectable_label(current == chars, name).clicked() {
                            self.model.select_alphabet_preset(chars);
                            self.alphabet_text = chars.to_string();
                        }
                    }
                });

            if ui
                .add(
                    egui::TextEdit::singleline(&mut self.alphabet_text)
                        .font(egui::TextStyle::Monospace),
                )
                .on_hover_text("Characters from darkest to brightest")
                .changed()
            {
                self.model.set_alphabet_text(&self.alphabet_text);
            }
        });

        ui.add_space(16.0);
        ui.separator();

        if self.decoding {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Decoding...");
            });
        }

        // Show processing time
        let elapsed = self.model.last_duration();
        if !elapsed.is_zero() {
            ui.label(format!(
                "Last process: {:.1} ms",
                elapsed.as_secs_f64() * 1000.0
            ));
        }
    }

    /// Drop cached views of the output when the model produced a new one
    fn refresh_output_cache(&mut self) {
        let generation = self.model.generation();
        if generation != self.shown_generation {
            self.output_texture = None;
            self.ascii_job = None;
            self.shown_generation = generation;
        }
    }

    /// Convert a pixel buffer to an egui ColorImage
    fn to_color_image(img: &PixelBuffer) -> egui::ColorImage {
        let size = [img.width() as usize, img.height() as usize];
        egui::ColorImage::from_rgba_unmultiplied(size, img.as_raw())
    }

    /// Display an image in the UI
    fn display_image(
        ui: &mut egui::Ui,
        image: Option<&PixelBuffer>,
        texture: &mut Option<egui::TextureHandle>,
        label: &str,
    ) {
        ui.vertical(|ui| {
            ui.heading(label);

            let Some(img) = image else {
                ui.label("No image loaded");
                return;
            };

            if texture.is_none() {
                *texture = Some(ui.ctx().load_texture(
                    label,
                    Self::to_color_image(img),
                    egui::TextureOptions::default(),
                ));
            }

            if let Some(tex) = texture {
                let size = tex.size_vec2();
                let max_size = ui.available_size();
                // Allow upscaling for small images, but limit to reasonable max scale
                let scale = ((max_size.x / size.x).min(max_size.y / size.y)).min(4.0);

                ui.image((tex.id(), size * scale));
                ui.label(format!(
                    "{}x{} (scale: {:.1}x)",
                    img.width(),
                    img.height(),
                    scale
                ));
            }
        });
    }

    /// Display ASCII art as monospace text, coloured per character if enabled
    fn display_ascii(
        ui: &mut egui::Ui,
        art: &AsciiArt,
        color_annotated: bool,
        job: &mut Option<LayoutJob>,
    ) {
        ui.vertical(|ui| {
            ui.heading("ASCII Output");

            egui::ScrollArea::both().show(ui, |ui| {
                if color_annotated {
                    let job = job.get_or_insert_with(|| colored_layout(art));
                    ui.label(job.clone());
                } else {
                    ui.label(
                        egui::RichText::new(art.to_plain_text())
                            .monospace()
                            .size(ASCII_FONT_SIZE),
                    );
                }
            });

            ui.label(format!("{}x{} characters", art.width(), art.height()));
        });
    }
}

/// One text section per run of equally coloured characters
fn colored_layout(art: &AsciiArt) -> LayoutJob {
    let font_id = egui::FontId::monospace(ASCII_FONT_SIZE);
    let mut job = LayoutJob::default();
    let mut run = String::new();
    let mut run_color = None;

    let flush = |job: &mut LayoutJob, run: &mut String, color: Option<[u8; 3]>| {
        if run.is_empty() {
            return;
        }
        let [r, g, b] = color.unwrap_or([255, 255, 255]);
        job.append(
            run.as_str(),
            0.0,
            egui::TextFormat::simple(font_id.clone(), egui::Color32::from_rgb(r, g, b)),
        );
        run.clear();
    };

    for row in art.rows() {
        for cell in row {
            if run_color != Some(cell.rgb) {
                flush(&mut job, &mut run, run_color);
                run_color = Some(cell.rgb);
            }
            run.push(cell.ch);
        }
        run.push('\n');
    }
    flush(&mut job, &mut run, run_color);
    job
}

/// Standalone HTML page around the colour-annotated markup
fn html_document(art: &AsciiArt) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <style>body{{background:#000}} i{{font-style:normal}}</style>\n</head>\n\
         <body>\n<pre>\n{}</pre>\n</body>\n</html>\n",
        art.to_markup()
    )
}

impl eframe::App for FxApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.model.poll_decoded() {
            self.decoding = false;
            self.input_texture = None;
        }
        self.model.tick(Instant::now());
        self.refresh_output_cache();

        // Wake up for the debounced recompute or a pending decode
        if let Some(deadline) = self.model.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(Instant::now()));
        }
        if self.decoding {
            ctx.request_repaint_after(DECODE_POLL);
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Image...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", &["png", "jpg", "jpeg", "gif", "bmp", "webp"])
                            .pick_file()
                        {
                            self.load_image(&path);
                        }
                        ui.close();
                    }

                    if ui.button("Save Output...").clicked() {
                        let dialog = match self.model.output() {
                            Some(Output::Ascii(_)) => rfd::FileDialog::new()
                                .add_filter("Text", &["txt"])
                                .add_filter("HTML", &["html"]),
                            _ => rfd::FileDialog::new().add_filter("PNG", &["png"]),
                        };
                        if let Some(path) = dialog.save_file()
                            && let Err(e) = self.save_output(&path)
                        {
                            log::warn!("saving {} failed: {e}", path.display());
                            self.status = Some(e);
                        }
                        ui.close();
                    }

                    ui.separator();

                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        self.status = Some(
                            "ASCII FX\nImage effects and ASCII art\n\nBuilt with Rust + egui"
                                .to_string(),
                        );
                        ui.close();
                    }
                });
            });
        });

        // Left panel: Controls
        egui::SidePanel::left("control_panel")
            .resizable(true)
            .default_width(250.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.render_controls(ui);
                });
            });

        // Controls may have recomputed immediately
        self.refresh_output_cache();

        // Central panel: source and output
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(e) = self.model.last_error() {
                ui.colored_label(egui::Color32::RED, e.to_string());
                ui.separator();
            }
            if let Some(ref msg) = self.status {
                ui.colored_label(egui::Color32::YELLOW, msg);
                if ui.button("Dismiss").clicked() {
                    self.status = None;
                }
                ui.separator();
            }

            ui.horizontal(|ui| {
                let half_width = ui.available_width() / 2.0 - 8.0;
                let source = self.model.state().source.clone();

                ui.allocate_ui_with_layout(
                    egui::vec2(half_width, ui.available_height()),
                    egui::Layout::top_down(egui::Align::Center),
                    |ui| {
                        Self::display_image(
                            ui,
                            source.as_deref(),
                            &mut self.input_texture,
                            "Original",
                        );
                    },
                );

                ui.separator();

                let color_annotated = self.model.state().render.color_annotated;
                ui.allocate_ui_with_layout(
                    egui::vec2(half_width, ui.available_height()),
                    egui::Layout::top_down(egui::Align::Center),
                    |ui| match self.model.output() {
                        Some(Output::Ascii(art)) => {
                            Self::display_ascii(ui, art, color_annotated, &mut self.ascii_job);
                        }
                        Some(Output::Image(img)) => {
                            Self::display_image(ui, Some(img), &mut self.output_texture, "Output");
                        }
                        None => {
                            Self::display_image(ui, None, &mut self.output_texture, "Output");
                        }
                    },
                );
            });
        });
    }
}
