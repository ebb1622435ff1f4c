use eframe::egui;
use std::time::{Duration, Instant};

use crate::cli::DeckSource;
use crate::config::Config;
use crate::deck::stepper::{DeckCommand, DeckController, Moved};
use crate::render::painter::{EguiMeasure, StageCanvas, draw_badge, draw_stage};
use crate::stage::{Stage, StageConfig};
use crate::theme::Theme;
use crate::tokens::{decode_header, pretty_claims};
use crate::watch::{DeckWatcher, WatchEvent};

const TOAST_DURATION: f32 = 2.5;
const TOAST_FADE: f32 = 0.5;
const DOUBLE_TAP: f32 = 1.0;
const MAX_TOASTS: usize = 4;

/// How the presenter starts, from the command line and config.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub windowed: bool,
    /// Zero-based.
    pub start_slide: Option<usize>,
    pub watch: bool,
}

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        let fade_start = TOAST_DURATION - TOAST_FADE;
        if elapsed < fade_start {
            1.0
        } else if elapsed < TOAST_DURATION {
            1.0 - (elapsed - fade_start) / TOAST_FADE
        } else {
            0.0
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= TOAST_DURATION
    }
}

struct PresentationApp {
    controller: DeckController,
    stage: Stage,
    stage_config: StageConfig,
    theme: Theme,
    /// The scene must be pushed to the stage on the next frame, once a
    /// painter is available to measure text.
    scene_dirty: bool,
    step_entered: Instant,
    watcher: Option<DeckWatcher>,
    toasts: Vec<Toast>,
    show_hud: bool,
    show_tokens: bool,
    show_claims: bool,
    last_esc: Option<Instant>,
}

impl PresentationApp {
    fn new(controller: DeckController, theme: Theme, stage_config: StageConfig) -> Self {
        let now = Instant::now();
        let mut app = Self {
            controller,
            stage: Stage::mount(now, stage_config.clone()),
            stage_config,
            theme,
            scene_dirty: true,
            step_entered: now,
            watcher: None,
            toasts: Vec::new(),
            show_hud: false,
            show_tokens: true,
            show_claims: false,
            last_esc: None,
        };
        app.collect_deck_toasts();
        app
    }

    fn toast(&mut self, message: impl Into<String>) {
        self.toasts.push(Toast::new(message));
        if self.toasts.len() > MAX_TOASTS {
            self.toasts.remove(0);
        }
    }

    fn collect_deck_toasts(&mut self) {
        for message in self.controller.take_toasts() {
            self.toast(message);
        }
    }

    fn dispatch(&mut self, command: DeckCommand) {
        let now = Instant::now();
        match self.controller.dispatch(command) {
            Moved::No => {}
            Moved::Step => {
                self.scene_dirty = true;
                self.step_entered = now;
            }
            Moved::Slide => {
                // Unmount the old slide before the new one claims the stage.
                self.stage.teardown();
                self.stage = Stage::mount(now, self.stage_config.clone());
                log::debug!(
                    "stage remounted for slide {} step {}",
                    self.controller.slide_index() + 1,
                    self.controller.step_index() + 1
                );
                self.scene_dirty = true;
                self.step_entered = now;
            }
        }
        self.collect_deck_toasts();
    }

    fn poll_watcher(&mut self) {
        let Some(watcher) = &self.watcher else {
            return;
        };
        for event in watcher.poll() {
            match event {
                WatchEvent::Reload(command) => {
                    self.dispatch(command);
                    self.toast("Deck reloaded");
                }
                WatchEvent::Invalid(message) => self.toast(format!("Reload failed: {message}")),
            }
        }
    }

    /// Time left before the current step advances on its own.
    fn auto_advance_remaining(&self) -> Option<Duration> {
        self.controller
            .auto_advance()
            .map(|delay| delay.saturating_sub(self.step_entered.elapsed()))
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        // Viewport commands sent inside ctx.input() would deadlock.
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();
        let mut commands: Vec<DeckCommand> = Vec::new();

        ctx.input(|i| {
            if i.key_pressed(egui::Key::Q) {
                viewport_cmds.push(egui::ViewportCommand::Close);
                return;
            }

            if i.key_pressed(egui::Key::Escape) {
                if self.show_hud {
                    self.show_hud = false;
                    return;
                }
                if self
                    .last_esc
                    .is_some_and(|last| last.elapsed().as_secs_f32() < DOUBLE_TAP)
                {
                    viewport_cmds.push(egui::ViewportCommand::Close);
                    return;
                }
                self.last_esc = Some(Instant::now());
                self.toasts.push(Toast::new("Press Esc again to exit"));
                return;
            }

            if i.key_pressed(egui::Key::F) {
                viewport_cmds.push(egui::ViewportCommand::Fullscreen(
                    !i.viewport().fullscreen.unwrap_or(false),
                ));
            }
            if i.key_pressed(egui::Key::D) {
                self.theme = self.theme.toggled();
            }
            if i.key_pressed(egui::Key::H) {
                self.show_hud = !self.show_hud;
            }
            if i.key_pressed(egui::Key::T) {
                self.show_tokens = !self.show_tokens;
            }
            if i.key_pressed(egui::Key::C) {
                self.show_claims = !self.show_claims;
            }

            if i.key_pressed(egui::Key::ArrowRight)
                || i.key_pressed(egui::Key::N)
                || i.key_pressed(egui::Key::Space)
            {
                commands.push(DeckCommand::Next);
            }
            if i.key_pressed(egui::Key::ArrowLeft) || i.key_pressed(egui::Key::P) {
                commands.push(DeckCommand::Previous);
            }
            if i.key_pressed(egui::Key::Home) {
                commands.push(DeckCommand::First);
            }
            if i.key_pressed(egui::Key::End) {
                commands.push(DeckCommand::Last);
            }
        });

        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }
        for command in commands {
            self.dispatch(command);
        }
    }

    fn draw(&mut self, ui: &egui::Ui, rect: egui::Rect) {
        let now = Instant::now();
        let canvas = StageCanvas::fit(rect);
        let measure = EguiMeasure::new(ui.painter());

        if self.scene_dirty {
            let view = self.controller.step_view();
            self.stage.set_scene(view.nodes, view.edges, &measure);
            self.scene_dirty = false;
        }
        self.stage.resize(rect.width(), rect.height());
        self.stage.tick(now, &measure);
        self.stage.on_frame();

        let painter = ui.painter();
        draw_stage(painter, &canvas, &self.stage, &self.theme);

        if let Some(badge) = &self.controller.current_step().badge {
            draw_badge(
                painter,
                &canvas,
                &self.stage,
                &badge.node,
                &badge.text,
                &self.theme,
            );
        }

        self.draw_title_and_caption(painter, &canvas);
        if self.show_tokens {
            self.draw_token_panel(painter, &canvas);
        }
        self.draw_chrome(painter, rect, canvas.scale);
        self.draw_toasts(painter, rect, canvas.scale);
        if self.show_hud {
            draw_hud(painter, &self.theme, rect, canvas.scale);
        }
    }

    fn draw_title_and_caption(&self, painter: &egui::Painter, canvas: &StageCanvas) {
        let scale = canvas.scale;
        let slide = self.controller.current_slide();
        let step = self.controller.current_step();

        let title = painter.layout_no_wrap(
            slide.title.clone(),
            egui::FontId::proportional(self.theme.title_size * 0.75 * scale),
            self.theme.heading_color,
        );
        painter.galley(
            canvas.rect.left_top() + egui::vec2(40.0 * scale, 24.0 * scale),
            title,
            self.theme.heading_color,
        );

        if step.caption.is_empty() {
            return;
        }
        let width = canvas.rect.width() - 80.0 * scale;
        let caption = painter.layout(
            step.caption.clone(),
            egui::FontId::proportional(self.theme.caption_size * scale),
            self.theme.foreground,
            width,
        );
        let pos = egui::pos2(
            canvas.rect.left() + 40.0 * scale,
            canvas.rect.bottom() - 40.0 * scale - caption.size().y,
        );
        painter.galley(pos, caption, self.theme.foreground);
    }

    fn draw_token_panel(&self, painter: &egui::Painter, canvas: &StageCanvas) {
        let wallet = self.controller.wallet();
        if wallet.is_empty() {
            return;
        }
        let scale = canvas.scale;
        let padding = 12.0 * scale;
        let line = self.theme.code_size * 1.4 * scale;
        let width = 360.0 * scale;
        let code = egui::FontId::monospace(self.theme.code_size * scale);
        let text_color = self.theme.code_foreground;

        let mut lines: Vec<(String, egui::Color32)> = wallet
            .tokens()
            .iter()
            .map(|t| (format!("{:<19} {}", t.kind.label(), t.short()), text_color))
            .collect();
        let latest = wallet.latest().filter(|_| self.show_claims);
        if let Some(token) = latest {
            lines.push((String::new(), text_color));
            if let Some(typ) = decode_header(&token.value)
                .and_then(|h| h["typ"].as_str().map(str::to_string))
            {
                lines.push((format!("typ: {typ}"), self.theme.heading_color));
            }
            if let Some(claims) = pretty_claims(&token.value) {
                lines.extend(claims.lines().map(|l| (l.to_string(), self.theme.accent)));
            }
        }

        let height = padding * 2.0 + line * (lines.len() as f32 + 1.0);
        let panel = egui::Rect::from_min_size(
            egui::pos2(
                canvas.rect.right() - width - 24.0 * scale,
                canvas.rect.top() + 24.0 * scale,
            ),
            egui::vec2(width, height),
        );
        painter.rect_filled(
            panel,
            8.0 * scale,
            Theme::with_opacity(self.theme.panel_background, 0.92),
        );
        painter.rect_stroke(
            panel,
            8.0 * scale,
            egui::Stroke::new(1.0, self.theme.card_border),
            egui::StrokeKind::Inside,
        );

        let mut y = panel.top() + padding;
        painter.text(
            egui::pos2(panel.left() + padding, y),
            egui::Align2::LEFT_TOP,
            "Tokens",
            egui::FontId::proportional(self.theme.code_size * scale),
            self.theme.heading_color,
        );
        y += line;
        for (text, color) in lines {
            painter.text(
                egui::pos2(panel.left() + padding, y),
                egui::Align2::LEFT_TOP,
                text,
                code.clone(),
                color,
            );
            y += line;
        }
    }

    fn draw_chrome(&self, painter: &egui::Painter, rect: egui::Rect, scale: f32) {
        let color = Theme::with_opacity(self.theme.foreground, 0.35);
        let font = egui::FontId::monospace(14.0 * scale);

        let counter = painter.layout_no_wrap(self.controller.position_label(), font.clone(), color);
        let pos = egui::pos2(
            rect.right() - counter.rect.width() - 16.0 * scale,
            rect.bottom() - 30.0 * scale,
        );
        painter.galley(pos, counter, color);

        let mut left = self.controller.current_step().name.clone();
        if let Some(watcher) = &self.watcher {
            left.push_str(&format!("  \u{00b7}  watching {}", watcher.path().display()));
        }
        if let Some(remaining) = self.auto_advance_remaining() {
            left.push_str(&format!("  \u{00b7}  next in {:.0}s", remaining.as_secs_f32().ceil()));
        }
        let galley = painter.layout_no_wrap(left, font, color);
        painter.galley(
            egui::pos2(rect.left() + 16.0 * scale, rect.bottom() - 30.0 * scale),
            galley,
            color,
        );
    }

    fn draw_toasts(&self, painter: &egui::Painter, rect: egui::Rect, scale: f32) {
        let padding = 14.0 * scale;
        let mut bottom = rect.bottom() - 80.0 * scale;
        for toast in self.toasts.iter().rev() {
            let opacity = toast.opacity();
            if opacity <= 0.0 {
                continue;
            }
            let color = Theme::with_opacity(self.theme.foreground, opacity * 0.95);
            let bg = Theme::with_opacity(self.theme.panel_background, opacity * 0.95);
            let galley = painter.layout_no_wrap(
                toast.message.clone(),
                egui::FontId::proportional(18.0 * scale),
                color,
            );
            let size = galley.rect.size() + egui::vec2(padding * 2.0, padding * 2.0);
            let toast_rect = egui::Rect::from_min_size(
                egui::pos2(rect.center().x - size.x / 2.0, bottom - size.y),
                size,
            );
            painter.rect_filled(toast_rect, 8.0 * scale, bg);
            painter.galley(toast_rect.min + egui::vec2(padding, padding), galley, color);
            bottom = toast_rect.top() - 8.0 * scale;
        }
    }

    /// Repaint continuously while something animates, otherwise sleep
    /// until the next stage timer or auto-advance.
    fn schedule_repaint(&self, ctx: &egui::Context) {
        if self.stage.is_pulsing() || !self.toasts.is_empty() {
            ctx.request_repaint();
            return;
        }
        let now = Instant::now();
        let wake = [self.stage.next_deadline(now), self.auto_advance_remaining()]
            .into_iter()
            .flatten()
            .min();
        if let Some(after) = wake {
            ctx.request_repaint_after(after);
        }
    }
}

impl eframe::App for PresentationApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_watcher();
        self.handle_keys(ctx);

        if self
            .auto_advance_remaining()
            .is_some_and(|left| left.is_zero())
        {
            log::debug!("auto-advancing from step '{}'", self.controller.current_step().name);
            self.dispatch(DeckCommand::Next);
        }

        self.toasts.retain(|t| !t.is_expired());

        let bg = self.theme.background;
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                ui.painter().rect_filled(rect, 0.0, bg);
                self.draw(ui, rect);
            });

        self.schedule_repaint(ctx);
    }
}

fn draw_hud(painter: &egui::Painter, theme: &Theme, rect: egui::Rect, scale: f32) {
    let shortcuts = [
        ("Space / N / \u{2192}", "Next step"),
        ("P / \u{2190}", "Previous step"),
        ("Home", "First slide"),
        ("End", "Last step"),
        ("T", "Toggle token panel"),
        ("C", "Toggle token claims"),
        ("D", "Toggle theme"),
        ("F", "Toggle fullscreen"),
        ("H", "Toggle this HUD"),
        ("Esc", "\u{00d7}2 exit"),
        ("Q", "Quit"),
    ];

    let bg = Theme::with_opacity(theme.panel_background, 0.95);
    let text_color = Theme::with_opacity(theme.foreground, 0.9);
    let key_color = Theme::with_opacity(theme.accent, 0.9);

    let padding = 24.0 * scale;
    let line_height = 32.0 * scale;
    let hud_height = shortcuts.len() as f32 * line_height + padding * 2.0 + 40.0 * scale;
    let hud_width = 360.0 * scale;
    let hud_rect = egui::Rect::from_center_size(rect.center(), egui::vec2(hud_width, hud_height));

    painter.rect_filled(hud_rect, 12.0 * scale, bg);
    painter.text(
        egui::pos2(hud_rect.left() + padding, hud_rect.top() + padding),
        egui::Align2::LEFT_TOP,
        "Keyboard Shortcuts",
        egui::FontId::proportional(20.0 * scale),
        Theme::with_opacity(theme.heading_color, 0.9),
    );

    let mut y = hud_rect.top() + padding + 40.0 * scale;
    for (key, desc) in shortcuts {
        painter.text(
            egui::pos2(hud_rect.left() + padding, y),
            egui::Align2::LEFT_TOP,
            key,
            egui::FontId::monospace(15.0 * scale),
            key_color,
        );
        painter.text(
            egui::pos2(hud_rect.left() + padding + 170.0 * scale, y),
            egui::Align2::LEFT_TOP,
            desc,
            egui::FontId::proportional(15.0 * scale),
            text_color,
        );
        y += line_height;
    }
}

pub fn run(source: DeckSource, options: LaunchOptions, config: &Config) -> anyhow::Result<()> {
    let deck = source.load()?;
    let title = format!("AuthDeck \u{00b7} {}", deck.title);
    let theme_name = deck
        .theme
        .as_deref()
        .or_else(|| config.theme())
        .unwrap_or("light");
    let theme = Theme::from_name(theme_name);
    let stage_config = config.to_stage_config();
    log::info!(
        "presenting '{}' ({} slides, {} steps)",
        deck.title,
        deck.slides.len(),
        deck.step_count()
    );

    let mut controller = DeckController::new(deck);
    if let Some(slide) = options.start_slide {
        controller.dispatch(DeckCommand::GoTo { slide, step: 0 });
    }

    let watch_path = match (&source, options.watch) {
        (DeckSource::File(path), true) => Some(path.clone()),
        _ => None,
    };

    let viewport = if options.windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };
    let native = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        &title,
        native,
        Box::new(move |cc| {
            let mut app = PresentationApp::new(controller, theme, stage_config);
            if let Some(path) = watch_path {
                let ctx = cc.egui_ctx.clone();
                match DeckWatcher::spawn(&path, move || ctx.request_repaint()) {
                    Ok(watcher) => app.watcher = Some(watcher),
                    Err(e) => {
                        log::warn!("live reload disabled: {e:#}");
                        app.toast("Live reload unavailable");
                    }
                }
            }
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
