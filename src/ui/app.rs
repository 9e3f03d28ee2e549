use std::fs;
use std::path::{Path, PathBuf};

use eframe::egui;
use log::{debug, warn};
use rfd::FileDialog;

use crate::backend::{CacheStatus, UserStats};
use crate::model::{ACCEPTED_EXTENSIONS, ImageRef, ModelError, PhotoFile};
use crate::runtime::{AppContext, Flow};
use crate::workflow::{
    AlbumTab, AppShell, AuthTab, Dispatch, JobKind, ModalPhase, NoticeKind, ShareError,
    ShareRequest, ShareResult, ShareTarget, View,
};

use super::repaint::{
    RepaintDecisionInputs, TIMER_REPAINT, should_request_periodic_repaint,
    should_request_repaint_now,
};
use super::textures::TextureCache;

const THUMBNAIL_SIZE: f32 = 180.0;
const PREVIEW_WIDTH: f32 = 560.0;
const ZOOM_STEP: f32 = 1.25;

#[derive(Debug, Clone, PartialEq)]
pub(super) enum UiAction {
    AuthTab(AuthTab),
    AlbumTab(AlbumTab),
    SubmitLogin,
    SubmitRegister,
    ChooseAlbumPhotos,
    ClearAlbumSelection,
    DroppedPaths(Vec<PathBuf>),
    Upload,
    ChooseProbe,
    Search,
    UpdateCache,
    RefreshStats,
    DeletePhoto,
    Logout,
    Preview(usize),
    Zoom(f32),
    ClosePreview,
    Share,
    DownloadMatch(usize),
    DownloadPreview,
    DismissNotice,
}

/// Desktop has no share sheet; the link is copied to the clipboard instead.
struct ClipboardShare;

impl ShareTarget for ClipboardShare {
    fn share(&self, _request: &ShareRequest<'_>) -> Result<(), ShareError> {
        Err(ShareError::Unsupported)
    }
}

pub struct SnapIdApp {
    shell: AppShell,
    textures: TextureCache,
    album_selection: Vec<PathBuf>,
    probe: Option<PathBuf>,
    delete_name: String,
    show_password: bool,
}

impl SnapIdApp {
    pub fn new(context: &AppContext) -> Self {
        let mut shell = context.shell(Flow::Full);
        shell.start();
        Self {
            shell,
            textures: TextureCache::default(),
            album_selection: Vec::new(),
            probe: None,
            delete_name: String::new(),
            show_password: false,
        }
    }

    fn collect_dropped_files(&self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let paths = dropped
            .into_iter()
            .filter_map(|file| file.path)
            .collect::<Vec<_>>();
        if !paths.is_empty() {
            actions.push(UiAction::DroppedPaths(paths));
        }
    }

    fn draw_notice(&self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        let Some(notice) = self.shell.state().notifications().current() else {
            return;
        };
        let (fill, text) = notice_colors(notice.kind);
        egui::TopBottomPanel::top("notice")
            .frame(egui::Frame::default().fill(fill).inner_margin(8.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(&notice.text).color(text).strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("✕").clicked() {
                            actions.push(UiAction::DismissNotice);
                        }
                    });
                });
            });
    }

    fn draw_startup(&self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(120.0);
                ui.spinner();
                ui.label("Connecting to SnapID...");
            });
        });
    }

    fn draw_auth(&mut self, ctx: &egui::Context, tab: AuthTab, actions: &mut Vec<UiAction>) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.heading("SnapID");
                ui.label("Find yourself in your photo album");
                ui.add_space(16.0);
                ui.horizontal(|ui| {
                    if ui.selectable_label(tab == AuthTab::Login, "Login").clicked() {
                        actions.push(UiAction::AuthTab(AuthTab::Login));
                    }
                    if ui
                        .selectable_label(tab == AuthTab::Register, "Register")
                        .clicked()
                    {
                        actions.push(UiAction::AuthTab(AuthTab::Register));
                    }
                });
                ui.add_space(8.0);

                let busy = self.shell.state().is_busy();
                let hide_password = !self.show_password;
                let form = match tab {
                    AuthTab::Login => self.shell.login_form_mut(),
                    AuthTab::Register => self.shell.register_form_mut(),
                };
                ui.add(
                    egui::TextEdit::singleline(&mut form.username)
                        .hint_text("Username")
                        .desired_width(260.0),
                );
                let password = ui.add(
                    egui::TextEdit::singleline(&mut form.password)
                        .hint_text("Password")
                        .password(hide_password)
                        .desired_width(260.0),
                );
                ui.checkbox(&mut self.show_password, "Show password");

                let label = match tab {
                    AuthTab::Login => "Login",
                    AuthTab::Register => "Create account",
                };
                let entered =
                    password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let clicked = ui.add_enabled(!busy, egui::Button::new(label)).clicked();
                if (clicked || entered) && !busy {
                    actions.push(match tab {
                        AuthTab::Login => UiAction::SubmitLogin,
                        AuthTab::Register => UiAction::SubmitRegister,
                    });
                }
                if busy {
                    ui.spinner();
                }
            });
        });
    }

    fn draw_album(&mut self, ctx: &egui::Context, tab: AlbumTab, actions: &mut Vec<UiAction>) {
        egui::TopBottomPanel::top("album-header").show(ctx, |ui| {
            let state = self.shell.state();
            ui.horizontal(|ui| {
                ui.heading("SnapID");
                if let Some(identity) = state.identity() {
                    ui.label(format!("Signed in as {identity}"));
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Logout").clicked() {
                        actions.push(UiAction::Logout);
                    }
                    if ui.button("Refresh stats").clicked() {
                        actions.push(UiAction::RefreshStats);
                    }
                    if ui.button("Update cache").clicked() {
                        actions.push(UiAction::UpdateCache);
                    }
                });
            });
            if let Some(stats) = state.stats() {
                ui.label(format_stats(stats));
            }
            ui.horizontal(|ui| {
                if ui
                    .selectable_label(tab == AlbumTab::Upload, "Upload album")
                    .clicked()
                {
                    actions.push(UiAction::AlbumTab(AlbumTab::Upload));
                }
                if ui
                    .selectable_label(tab == AlbumTab::Search, "Search")
                    .clicked()
                {
                    actions.push(UiAction::AlbumTab(AlbumTab::Search));
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match tab {
            AlbumTab::Upload => self.draw_upload(ui, actions),
            AlbumTab::Search => self.draw_search(ui, actions),
        });
    }

    fn draw_upload(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let state = self.shell.state();
        let busy = state.is_busy();

        ui.label("Add JPG or PNG photos (up to 16MB each) to your album.");
        ui.horizontal(|ui| {
            if ui.button("Choose photos...").clicked() {
                actions.push(UiAction::ChooseAlbumPhotos);
            }
            if !self.album_selection.is_empty() && ui.button("Clear").clicked() {
                actions.push(UiAction::ClearAlbumSelection);
            }
        });
        for path in &self.album_selection {
            ui.label(file_label(path));
        }
        let ready = !busy && !self.album_selection.is_empty();
        if ui
            .add_enabled(ready, egui::Button::new("Upload to album"))
            .clicked()
        {
            actions.push(UiAction::Upload);
        }
        if let Some(label) = state.upload().label() {
            let percent = self.shell.upload_percent();
            ui.add(
                egui::ProgressBar::new(f32::from(percent) / 100.0)
                    .text(format!("{label} {percent}%")),
            );
        }

        ui.separator();
        ui.label("Remove a photo from the album");
        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut self.delete_name).hint_text("File name"));
            let ready = !busy && !self.delete_name.trim().is_empty();
            if ui.add_enabled(ready, egui::Button::new("Delete")).clicked() {
                actions.push(UiAction::DeletePhoto);
            }
        });
    }

    fn draw_search(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let state = self.shell.state();
        let busy = state.is_busy();
        let searching = state
            .busy_job()
            .is_some_and(|ticket| ticket.kind == JobKind::Search);

        ui.label("Upload a photo with your face to find matching album photos.");
        ui.horizontal(|ui| {
            if ui.button("Choose photo...").clicked() {
                actions.push(UiAction::ChooseProbe);
            }
            match &self.probe {
                Some(path) => ui.label(file_label(path)),
                None => ui.weak("No photo selected"),
            };
        });
        if ui
            .add_enabled(!busy && self.probe.is_some(), egui::Button::new("Search"))
            .clicked()
        {
            actions.push(UiAction::Search);
        }
        if searching {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Searching...");
            });
            return;
        }

        let results = state.results();
        if state.shows_no_matches() {
            ui.add_space(12.0);
            ui.label(egui::RichText::new("No matches found in your album.").strong());
            ui.weak("Try a clearer photo or upload more pictures of yourself.");
            return;
        }
        if results.is_empty() {
            return;
        }

        ui.add_space(8.0);
        ui.heading(results.header());
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                for (index, found) in results.matches().iter().enumerate() {
                    let texture = self
                        .textures
                        .get_or_load(ui.ctx(), &found.preview)
                        .map(|texture| (texture.id(), texture.size_vec2()));
                    ui.group(|ui| {
                        ui.set_width(THUMBNAIL_SIZE);
                        ui.vertical(|ui| {
                            match texture {
                                Some((id, size)) => {
                                    let shown = fit_width(size, THUMBNAIL_SIZE);
                                    let image = egui::Image::new((id, shown))
                                        .sense(egui::Sense::click());
                                    if ui.add(image).clicked() {
                                        actions.push(UiAction::Preview(index));
                                    }
                                }
                                None => {
                                    ui.weak("Preview unavailable");
                                }
                            }
                            ui.label(egui::RichText::new(found.display_name()).small());
                            ui.label(format_similarity(found.similarity()));
                            ui.horizontal(|ui| {
                                if ui.small_button("Preview").clicked() {
                                    actions.push(UiAction::Preview(index));
                                }
                                if ui.small_button("Download").clicked() {
                                    actions.push(UiAction::DownloadMatch(index));
                                }
                            });
                        });
                    });
                }
            });
        });
    }

    fn draw_preview(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        let modal = self.shell.state().modal();
        let Some(image) = modal.image() else {
            return;
        };
        let closing = matches!(modal.phase(), ModalPhase::Closing { .. });
        let scale = modal.scale();
        let texture = self
            .textures
            .get_or_load(ctx, &image.preview)
            .map(|texture| (texture.id(), texture.size_vec2()));

        let mut open = true;
        egui::Window::new(image.title.as_str())
            .id(egui::Id::new("match-preview"))
            .collapsible(false)
            .resizable(true)
            .open(&mut open)
            .show(ctx, |ui| {
                if closing {
                    ui.multiply_opacity(0.4);
                }
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(modal.can_zoom_out(), egui::Button::new("-"))
                        .clicked()
                    {
                        actions.push(UiAction::Zoom(1.0 / ZOOM_STEP));
                    }
                    ui.label(format!("{:.0}%", scale * 100.0));
                    if ui
                        .add_enabled(modal.can_zoom_in(), egui::Button::new("+"))
                        .clicked()
                    {
                        actions.push(UiAction::Zoom(ZOOM_STEP));
                    }
                    ui.separator();
                    if ui.button("Share").clicked() {
                        actions.push(UiAction::Share);
                    }
                    if ui.button("Download original").clicked() {
                        actions.push(UiAction::DownloadPreview);
                    }
                });
                egui::ScrollArea::both().show(ui, |ui| match texture {
                    Some((id, size)) => {
                        let shown = fit_width(size, PREVIEW_WIDTH) * scale;
                        ui.image((id, shown));
                    }
                    None => {
                        ui.weak("Preview unavailable");
                    }
                });
                let zoom = ui.input(|i| i.zoom_delta());
                if (zoom - 1.0).abs() > f32::EPSILON && ui.rect_contains_pointer(ui.max_rect()) {
                    actions.push(UiAction::Zoom(zoom));
                }
            });

        let escape = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        if !closing && (!open || escape) {
            actions.push(UiAction::ClosePreview);
        }
    }

    fn apply_actions(&mut self, ctx: &egui::Context, actions: Vec<UiAction>) {
        for action in actions {
            debug!("ui action {action:?}");
            self.apply(ctx, action);
        }
    }

    fn apply(&mut self, ctx: &egui::Context, action: UiAction) {
        match action {
            UiAction::AuthTab(tab) => {
                self.shell.select_auth_tab(tab);
            }
            UiAction::AlbumTab(tab) => {
                self.shell.select_album_tab(tab);
            }
            UiAction::SubmitLogin => {
                self.shell.submit_login();
            }
            UiAction::SubmitRegister => {
                self.shell.submit_register();
            }
            UiAction::ChooseAlbumPhotos => {
                if let Some(paths) = photo_dialog().pick_files() {
                    self.album_selection.extend(paths);
                }
            }
            UiAction::ClearAlbumSelection => self.album_selection.clear(),
            UiAction::DroppedPaths(paths) => match self.shell.state().view() {
                View::Album(AlbumTab::Upload) => self.album_selection.extend(paths),
                View::Album(AlbumTab::Search) => self.probe = paths.into_iter().next(),
                View::Startup | View::Auth(_) => {}
            },
            UiAction::Upload => match load_photos(&self.album_selection) {
                Ok(files) => {
                    if matches!(self.shell.upload(files), Dispatch::Started(_)) {
                        self.album_selection.clear();
                    }
                }
                Err(error) => self.shell.notify(NoticeKind::Error, error.to_string()),
            },
            UiAction::ChooseProbe => {
                if let Some(path) = photo_dialog().pick_file() {
                    self.probe = Some(path);
                }
            }
            UiAction::Search => match self.probe.as_ref().map(PhotoFile::from_path).transpose() {
                Ok(file) => {
                    self.shell.search(file);
                }
                Err(error) => self.shell.notify(NoticeKind::Error, error.to_string()),
            },
            UiAction::UpdateCache => {
                self.shell.update_cache();
            }
            UiAction::RefreshStats => {
                self.shell.refresh_stats();
            }
            UiAction::DeletePhoto => {
                if matches!(self.shell.delete_photo(&self.delete_name), Dispatch::Started(_)) {
                    self.delete_name.clear();
                }
            }
            UiAction::Logout => {
                self.shell.logout();
                self.album_selection.clear();
                self.probe = None;
            }
            UiAction::Preview(index) => {
                self.shell.preview(index);
            }
            UiAction::Zoom(factor) => {
                self.shell.zoom_preview(factor);
            }
            UiAction::ClosePreview => self.shell.close_preview(),
            UiAction::Share => {
                if let ShareResult::LinkReady(link) = self.shell.share_preview(&ClipboardShare) {
                    ctx.copy_text(link);
                }
            }
            UiAction::DownloadMatch(index) => {
                let target = self
                    .shell
                    .state()
                    .results()
                    .get(index)
                    .map(|found| {
                        let name = format!("original_{}", found.display_name());
                        (found.original.clone(), name)
                    });
                if let Some((image, name)) = target {
                    self.download(&image, &name);
                }
            }
            UiAction::DownloadPreview => {
                let modal = self.shell.state().modal();
                let target = modal
                    .image()
                    .map(|image| image.original.clone())
                    .zip(modal.download_name());
                if let Some((image, name)) = target {
                    self.download(&image, &name);
                }
            }
            UiAction::DismissNotice => self.shell.dismiss_notification(),
        }
    }

    fn download(&mut self, image: &ImageRef, file_name: &str) {
        let Some(path) = FileDialog::new().set_file_name(file_name).save_file() else {
            return;
        };
        match save_image(image, &path) {
            Ok(()) => self
                .shell
                .notify(NoticeKind::Success, format!("Saved {}", path.display())),
            Err(error) => {
                warn!("could not save {}: {error}", path.display());
                self.shell.notify(NoticeKind::Error, error.to_string());
            }
        }
    }

    fn has_running_timers(&self) -> bool {
        let state = self.shell.state();
        state.notifications().current().is_some()
            || state.upload().label().is_some()
            || matches!(state.modal().phase(), ModalPhase::Closing { .. })
            || (self.shell.settings().cache_refresh.is_some()
                && state.session().is_authenticated())
    }
}

impl eframe::App for SnapIdApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut shell_state_changed = self.shell.poll();
        shell_state_changed |= self.shell.tick();
        if self.shell.state().results().is_empty() && !self.shell.state().modal().is_visible() {
            self.textures.clear();
        }

        let mut actions = Vec::new();
        self.collect_dropped_files(ctx, &mut actions);
        self.draw_notice(ctx, &mut actions);
        match self.shell.state().view() {
            View::Startup => self.draw_startup(ctx),
            View::Auth(tab) => self.draw_auth(ctx, tab, &mut actions),
            View::Album(tab) => self.draw_album(ctx, tab, &mut actions),
        }
        self.draw_preview(ctx, &mut actions);

        let has_pending_actions = !actions.is_empty();
        self.apply_actions(ctx, actions);

        let has_pending_jobs = self.shell.has_pending_jobs();
        let has_running_timers = self.has_running_timers();
        let repaint_inputs = ctx.input(|input| RepaintDecisionInputs {
            shell_state_changed,
            has_pending_actions,
            has_input_events: !input.events.is_empty(),
            has_pending_jobs,
            has_running_timers,
        });

        if should_request_repaint_now(repaint_inputs) {
            ctx.request_repaint();
        } else if should_request_periodic_repaint(repaint_inputs) {
            ctx.request_repaint_after(TIMER_REPAINT);
        }
    }
}

fn photo_dialog() -> FileDialog {
    FileDialog::new().add_filter("Photos", ACCEPTED_EXTENSIONS)
}

fn load_photos(paths: &[PathBuf]) -> Result<Vec<PhotoFile>, ModelError> {
    paths.iter().map(PhotoFile::from_path).collect()
}

fn save_image(image: &ImageRef, path: &Path) -> Result<(), ModelError> {
    let decoded = image.decode()?;
    fs::write(path, decoded.bytes)?;
    Ok(())
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn fit_width(size: egui::Vec2, width: f32) -> egui::Vec2 {
    if size.x <= 0.0 {
        return egui::vec2(width, width);
    }
    size * (width / size.x)
}

pub(super) fn notice_colors(kind: NoticeKind) -> (egui::Color32, egui::Color32) {
    match kind {
        NoticeKind::Success => (
            egui::Color32::from_rgb(220, 252, 231),
            egui::Color32::from_rgb(22, 101, 52),
        ),
        NoticeKind::Error => (
            egui::Color32::from_rgb(254, 226, 226),
            egui::Color32::from_rgb(153, 27, 27),
        ),
        NoticeKind::Info => (
            egui::Color32::from_rgb(219, 234, 254),
            egui::Color32::from_rgb(30, 64, 175),
        ),
    }
}

pub(super) fn format_similarity(similarity: f64) -> String {
    format!("{similarity:.1}% Match")
}

pub(super) fn format_stats(stats: &UserStats) -> String {
    let cache = match stats.cache_status {
        CacheStatus::Ready => "index ready",
        CacheStatus::Updating => "index updating",
        CacheStatus::Unknown => "index status unknown",
    };
    let photos = match stats.photo_count {
        1 => "1 photo".to_string(),
        count => format!("{count} photos"),
    };
    format!("{photos}, {} indexed ({cache})", stats.cached_embeddings)
}
