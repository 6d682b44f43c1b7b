use crate::browser::{self, DirEntry};
use crate::chat::{ChatClient, Sender, Transcript};
use crate::editor::info::EditorInfoCatalog;
use crate::event::AppEvent;
use crate::launch::{Dispatcher, LaunchRequest, LaunchTarget};
use crate::recent::RecentFiles;
use chrono::Local;
use eframe::egui::{self, Color32, RichText, ScrollArea};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError};

pub struct LauncherApp {
    rx: Receiver<AppEvent>,
    dispatcher: Dispatcher,
    chat: ChatClient,
    editor_info: EditorInfoCatalog,
    recent: RecentFiles,
    current_dir: PathBuf,
    entries: Vec<DirEntry>,
    path_input: String,
    selected_file: Option<PathBuf>,
    selected_editor: Option<String>,
    show_editor_info: bool,
    error_dialog: Option<String>,
    status: String,
    transcript: Transcript,
    chat_input: String,
    chat_open: bool,
    diagnostics_log: Vec<String>,
}

impl LauncherApp {
    pub fn new(
        rx: Receiver<AppEvent>,
        dispatcher: Dispatcher,
        chat: ChatClient,
        editor_info: EditorInfoCatalog,
        recent: RecentFiles,
        start_dir: PathBuf,
        warnings: Vec<String>,
    ) -> Self {
        let selected_editor = dispatcher.registry().ids().next().map(str::to_string);
        let status = if selected_editor.is_some() {
            format!("{} editor(s) available", dispatcher.registry().len())
        } else {
            "No editors found".to_string()
        };

        let mut app = Self {
            rx,
            dispatcher,
            chat,
            editor_info,
            recent,
            path_input: start_dir.display().to_string(),
            current_dir: start_dir.clone(),
            entries: Vec::new(),
            selected_file: None,
            selected_editor,
            show_editor_info: false,
            error_dialog: None,
            status,
            transcript: Transcript::default(),
            chat_input: String::new(),
            chat_open: true,
            diagnostics_log: Vec::new(),
        };

        for warning in warnings {
            app.log_diagnostic(format!("warning: {warning}"));
        }
        if !app.chat.has_api_key() {
            app.log_diagnostic("chat: no API key configured");
        }
        app.change_directory(start_dir);
        app
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log
            .push(format!("[{}] {}", Local::now().format("%H:%M:%S"), message.into()));
    }

    fn show_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.log_diagnostic(format!("error: {message}"));
        self.error_dialog = Some(message);
    }

    fn change_directory(&mut self, dir: PathBuf) {
        match browser::list_directory(&dir) {
            Ok(entries) => {
                self.entries = entries;
                self.path_input = dir.display().to_string();
                self.current_dir = dir;
            }
            Err(err) => self.show_error(format!("Cannot open {}: {err}", dir.display())),
        }
    }

    fn submit_path_input(&mut self) {
        let os_family = self.dispatcher.host().os_family();
        match browser::resolve_cd(&self.current_dir, &self.path_input, os_family) {
            Ok(dir) => self.change_directory(dir),
            Err(browser::BrowseError::Empty) => {}
            Err(err) => self.show_error(err.to_string()),
        }
    }

    fn go_up(&mut self) {
        if let Some(parent) = browser::parent_of(&self.current_dir) {
            self.change_directory(parent);
        }
    }

    /// The selected file, else the directory being browsed.
    fn launch_target(&self) -> PathBuf {
        self.selected_file
            .clone()
            .unwrap_or_else(|| self.current_dir.clone())
    }

    fn remember_recent(&mut self, file: &Path) {
        if !self.recent.add(file) {
            return;
        }
        if let Err(err) = self.recent.save() {
            self.log_diagnostic(format!(
                "failed to save recent files to {}: {err}",
                self.recent.path().display()
            ));
        }
    }

    fn launch_selected(&mut self) {
        let Some(editor_id) = self.selected_editor.clone() else {
            self.show_error("No editor selected.");
            return;
        };

        let target = self.launch_target();
        if target.is_file() {
            self.remember_recent(&target);
        }

        let target_path = target.to_string_lossy().into_owned();
        self.status = format!("Launching {editor_id}...");
        self.log_diagnostic(format!("launch requested: {editor_id} {target_path}"));
        let _ = self
            .dispatcher
            .launch(LaunchRequest::new(editor_id, target_path));
    }

    fn open_terminal_here(&mut self) {
        let directory = self.current_dir.to_string_lossy().into_owned();
        self.log_diagnostic(format!("terminal requested in {directory}"));
        let _ = self.dispatcher.open_terminal(directory);
    }

    fn open_recent(&mut self, index: usize) {
        let Some(entry) = self.recent.entries().get(index).cloned() else {
            return;
        };
        let file = PathBuf::from(&entry);
        if !file.exists() {
            self.recent.remove(index);
            if let Err(err) = self.recent.save() {
                self.log_diagnostic(format!("failed to save recent files: {err}"));
            }
            self.show_error(format!("File not found: {entry}"));
            return;
        }

        if let Some(parent) = browser::parent_of(&file) {
            self.change_directory(parent);
        }
        self.selected_file = Some(file);
        self.launch_selected();
    }

    fn submit_chat(&mut self) {
        let message = self.chat_input.trim().to_string();
        if message.is_empty() {
            return;
        }
        self.transcript.push_user(message.clone());
        let (request_id, _) = self.chat.send(message);
        self.transcript.push_pending(request_id);
        self.chat_input.clear();
    }

    fn drain_events(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Launch(outcome) => match outcome.result {
                Ok(plan) => {
                    self.status = match &outcome.target {
                        LaunchTarget::Editor(request) => format!("Launched {}", request.editor_id),
                        LaunchTarget::ShellWindow { .. } => "Terminal opened".to_string(),
                    };
                    self.log_diagnostic(format!("spawned: {}", plan.command_line));
                }
                Err(err) => {
                    self.status = "Launch failed".to_string();
                    let message = match &outcome.target {
                        LaunchTarget::Editor(_) => format!("Failed to launch editor: {err}"),
                        LaunchTarget::ShellWindow { .. } => format!("Failed to open terminal: {err}"),
                    };
                    self.show_error(message);
                }
            },
            AppEvent::ChatReply { request_id, text } => {
                self.transcript.resolve(request_id, text);
            }
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let host = self.dispatcher.host();
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Editor Launcher");
                ui.separator();
                let host_label = if host.is_wsl() {
                    format!("{} (WSL)", host.os_family())
                } else {
                    host.os_family().to_string()
                };
                ui.label(host_label);
                ui.separator();
                ui.label(RichText::new(&self.status).color(Color32::LIGHT_GREEN));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.toggle_value(&mut self.chat_open, "Assistant");
                });
            });
        });
    }

    fn render_files_panel(&mut self, ctx: &egui::Context) {
        let mut navigate_to: Option<PathBuf> = None;
        let mut launch_now = false;
        let mut recent_clicked: Option<usize> = None;
        let mut go_up = false;
        let mut submit_path = false;
        let mut open_terminal = false;

        egui::SidePanel::left("files_panel")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                ui.heading("Files");
                ui.horizontal(|ui| {
                    go_up = ui.button("Up").clicked();
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.path_input)
                            .desired_width(f32::INFINITY),
                    );
                    submit_path =
                        response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                });
                open_terminal = ui.button("Open Terminal Here").clicked();
                ui.separator();

                let list_height = (ui.available_height() - 200.0).max(120.0);
                ScrollArea::vertical()
                    .id_salt("directory_listing")
                    .max_height(list_height)
                    .show(ui, |ui| {
                        for entry in &self.entries {
                            if entry.is_dir() {
                                if ui.button(format!("[dir] {}", entry.name)).clicked() {
                                    navigate_to = Some(entry.path.clone());
                                }
                                continue;
                            }

                            let selected = self.selected_file.as_ref() == Some(&entry.path);
                            let text = if entry.is_text {
                                RichText::new(&entry.name).strong()
                            } else {
                                RichText::new(&entry.name)
                            };
                            let response = ui.selectable_label(selected, text);
                            if response.clicked() {
                                self.selected_file = Some(entry.path.clone());
                            }
                            if response.double_clicked() {
                                self.selected_file = Some(entry.path.clone());
                                launch_now = true;
                            }
                        }
                    });

                ui.separator();
                ui.strong("Recent Files");
                for (index, entry) in self.recent.existing() {
                    let name = Path::new(entry)
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| entry.to_string());
                    if ui.button(name).on_hover_text(entry).clicked() {
                        recent_clicked = Some(index);
                    }
                }
            });

        if go_up {
            self.go_up();
        }
        if submit_path {
            self.submit_path_input();
        }
        if open_terminal {
            self.open_terminal_here();
        }
        if let Some(dir) = navigate_to {
            self.selected_file = None;
            self.change_directory(dir);
        }
        if let Some(index) = recent_clicked {
            self.open_recent(index);
        }
        if launch_now {
            self.launch_selected();
        }
    }

    fn render_chat_panel(&mut self, ctx: &egui::Context) {
        if !self.chat_open {
            return;
        }

        let mut send_now = false;
        egui::SidePanel::right("chat_panel")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| {
                ui.heading("Assistant");
                ui.separator();

                let transcript_height = (ui.available_height() - 60.0).max(120.0);
                ScrollArea::vertical()
                    .id_salt("chat_transcript")
                    .max_height(transcript_height)
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for message in self.transcript.messages() {
                            let (who, color) = match message.sender {
                                Sender::User => ("You", Color32::LIGHT_BLUE),
                                Sender::Bot => ("Assistant", Color32::LIGHT_GREEN),
                            };
                            ui.label(
                                RichText::new(format!("{who}  {}", message.time_label()))
                                    .small()
                                    .color(color),
                            );
                            if message.pending.is_some() {
                                ui.label(RichText::new(&message.content).italics());
                            } else {
                                ui.label(&message.content);
                            }
                            ui.add_space(6.0);
                        }
                    });

                ui.separator();
                ui.horizontal(|ui| {
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.chat_input)
                            .desired_width(ui.available_width() - 60.0)
                            .hint_text("Ask something..."),
                    );
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        send_now = true;
                    }
                    send_now |= ui
                        .add_enabled(
                            !self.chat_input.trim().is_empty(),
                            egui::Button::new("Send"),
                        )
                        .clicked();
                });
            });

        if send_now {
            self.submit_chat();
        }
    }

    fn render_center_panel(&mut self, ctx: &egui::Context) {
        let mut launch_now = false;
        let target = self.launch_target();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Launch");
            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Editor:");
                let selected_text = self
                    .selected_editor
                    .clone()
                    .unwrap_or_else(|| "none".to_string());
                egui::ComboBox::from_id_salt("editor_picker")
                    .selected_text(selected_text)
                    .show_ui(ui, |ui| {
                        for editor in self.dispatcher.registry().iter() {
                            let label = if editor.via_bridge {
                                format!("{} (WSL)", editor.id)
                            } else {
                                editor.id.clone()
                            };
                            ui.selectable_value(
                                &mut self.selected_editor,
                                Some(editor.id.clone()),
                                label,
                            );
                        }
                    });
                if ui
                    .add_enabled(self.selected_editor.is_some(), egui::Button::new("Info"))
                    .clicked()
                {
                    self.show_editor_info = true;
                }
            });

            ui.label(format!("Target: {}", target.display()));
            if self.selected_file.is_some() && ui.small_button("Clear selection").clicked() {
                self.selected_file = None;
            }

            launch_now = ui
                .add_enabled(
                    !self.dispatcher.registry().is_empty(),
                    egui::Button::new("Launch"),
                )
                .clicked();

            ui.separator();
            egui::CollapsingHeader::new("Diagnostics")
                .default_open(false)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("diagnostics_log")
                        .max_height(180.0)
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for entry in &self.diagnostics_log {
                                ui.label(entry);
                            }
                        });
                });
        });

        if launch_now {
            self.launch_selected();
        }
    }

    fn render_editor_info(&mut self, ctx: &egui::Context) {
        if !self.show_editor_info {
            return;
        }
        let Some(editor_id) = self.selected_editor.clone() else {
            self.show_editor_info = false;
            return;
        };

        let text = self
            .dispatcher
            .registry()
            .get(&editor_id)
            .and_then(|editor| self.editor_info.describe(&editor.id, &editor.invocation_path))
            .unwrap_or_else(|| format!("No information available for {editor_id}."));
        let title = self
            .editor_info
            .get(&editor_id)
            .map(|info| format!("{} {}", info.icon, info.name))
            .unwrap_or_else(|| editor_id.clone());

        egui::Window::new(title)
            .id(egui::Id::new("editor_info_window"))
            .open(&mut self.show_editor_info)
            .collapsible(false)
            .show(ctx, |ui| {
                ui.label(text);
            });
    }

    fn render_error_dialog(&mut self, ctx: &egui::Context) {
        let Some(message) = self.error_dialog.clone() else {
            return;
        };

        let mut dismissed = false;
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(RichText::new(message).color(Color32::RED));
                dismissed = ui.button("OK").clicked();
            });
        if dismissed {
            self.error_dialog = None;
        }
    }
}

impl eframe::App for LauncherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        self.render_top_bar(ctx);
        self.render_files_panel(ctx);
        self.render_chat_panel(ctx);
        self.render_center_panel(ctx);
        self.render_editor_info(ctx);
        self.render_error_dialog(ctx);
    }
}
