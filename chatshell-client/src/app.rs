use std::path::PathBuf;

use chatshell_client::{
    config::ClientArgs,
    shell::ShellState,
    ui_layout::{
        CONVERSATIONS_W, HEADER_FONT_SIZE, HEADER_H, SEND_BUTTON_W, SIDEBAR_W, WINDOW_BUTTON_W,
        composer_width,
    },
};
use chatshell_core::NavItem;
use chatshell_supervisor::{SupervisedClient, start, supervise};
use eframe::egui;
use tracing::info;

pub struct ChatShellApp {
    args: ClientArgs,
    log_path: PathBuf,
    state: ShellState,
    client: Option<SupervisedClient>,
    scroll_to_latest: bool,
}

impl ChatShellApp {
    pub fn new(cc: &eframe::CreationContext<'_>, args: ClientArgs, log_path: PathBuf) -> Self {
        let mut app = Self {
            args,
            log_path,
            state: ShellState::new(),
            client: None,
            scroll_to_latest: false,
        };
        app.launch_client(cc.egui_ctx.clone());
        app
    }

    fn launch_client(&mut self, ctx: egui::Context) {
        let launch = start(&self.args.client_bin, &self.args.config)
            .and_then(|handle| supervise(handle, move || ctx.request_repaint()));
        self.client = self.state.attach_client(launch);
    }

    fn poll_monitor_events(&mut self) {
        let Some(client) = &self.client else {
            return;
        };
        while let Ok(event) = client.events.try_recv() {
            self.state.apply_monitor_event(event);
        }
    }

    // The reader thread is not joined here; it ends on its own once the
    // killed process closes the pipe.
    fn shutdown_client(&mut self) {
        if let Some(mut client) = self.client.take() {
            info!(pid = client.pid(), "window closing; stopping client");
            client.handle.terminate();
        }
    }

    fn show_header(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("status_header")
            .exact_height(HEADER_H)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.spacing_mut().item_spacing.x = 5.0;
                    ui.label(
                        egui::RichText::new(self.state.identity_label()).size(HEADER_FONT_SIZE),
                    );
                    ui.label(
                        egui::RichText::new(self.state.connection_label()).size(HEADER_FONT_SIZE),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        show_window_controls(ui);
                    });
                });
            });
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.label(egui::RichText::new(&self.state.status_message).small());
        });
    }

    fn show_sidebar(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("sidebar")
            .resizable(false)
            .exact_width(SIDEBAR_W)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                for item in NavItem::ALL {
                    let selected = self.state.nav == item;
                    if ui.selectable_label(selected, item.label()).clicked() && !selected {
                        info!(panel = item.key(), "switching panel");
                        self.state.nav = item;
                    }
                    ui.add_space(5.0);
                }
            });
    }

    fn show_chat(&mut self, ui: &mut egui::Ui) {
        egui::SidePanel::left("conversations")
            .resizable(false)
            .exact_width(CONVERSATIONS_W)
            .show_inside(ui, |ui| {
                ui.label("Conversations");
                ui.separator();
                egui::ScrollArea::vertical()
                    .id_salt("conversation_list")
                    .show(ui, |ui| {
                        for entry in &self.state.conversations {
                            ui.label(&entry.label);
                        }
                    });
            });

        egui::TopBottomPanel::bottom("composer")
            .resizable(false)
            .show_inside(ui, |ui| {
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    let width = composer_width(ui.available_width(), ui.spacing().item_spacing.x);
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.state.composer.text)
                            .hint_text("Type your message...")
                            .desired_width(width),
                    );
                    let pressed_enter =
                        response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    let button_h = ui.spacing().interact_size.y;
                    let clicked_send = ui
                        .add_sized([SEND_BUTTON_W, button_h], egui::Button::new("Send"))
                        .clicked();

                    if pressed_enter || clicked_send {
                        if self.state.submit_composer().is_some() {
                            self.scroll_to_latest = true;
                        }
                        response.request_focus();
                    }
                });
                ui.add_space(4.0);
            });

        egui::CentralPanel::default().show_inside(ui, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("chat_history")
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for message in &self.state.history {
                        ui.horizontal_wrapped(|ui| {
                            ui.label(egui::RichText::new(format!("{}:", message.sender)).strong());
                            ui.label(&message.text);
                        });
                    }
                    if self.scroll_to_latest {
                        ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                        self.scroll_to_latest = false;
                    }
                });
        });
    }

    fn show_files(&mut self, ui: &mut egui::Ui) {
        ui.add_space(6.0);
        if ui.button("Select File").clicked() {
            if let Some(path) = rfd::FileDialog::new().set_title("Select File").pick_file() {
                let path = path.display().to_string();
                info!(path = %path, "file selected");
                self.state.files.select(path);
            }
        }
        ui.label(self.state.files.label());
        ui.add(egui::ProgressBar::new(self.state.files.progress_fraction()).show_percentage());
    }

    fn show_settings(&self, ui: &mut egui::Ui) {
        ui.heading("Settings");
        ui.separator();
        egui::Grid::new("settings_grid")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                ui.label("Client binary");
                ui.monospace(self.args.client_bin.display().to_string());
                ui.end_row();

                ui.label("Client config");
                ui.monospace(self.args.config.display().to_string());
                ui.end_row();

                ui.label("Client process");
                match self.state.client_pid {
                    Some(pid) => ui.monospace(format!("running (pid {pid})")),
                    None => ui.monospace("not running"),
                };
                ui.end_row();

                ui.label("Log file");
                ui.monospace(self.log_path.display().to_string());
                ui.end_row();
            });
    }
}

fn show_window_controls(ui: &mut egui::Ui) {
    // Laid out right to left: close first.
    let size = [WINDOW_BUTTON_W, ui.spacing().interact_size.y];
    if ui.add_sized(size, egui::Button::new("✕")).clicked() {
        ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
    }
    if ui.add_sized(size, egui::Button::new("□")).clicked() {
        let maximized = ui.ctx().input(|i| i.viewport().maximized.unwrap_or(false));
        ui.ctx()
            .send_viewport_cmd(egui::ViewportCommand::Maximized(!maximized));
    }
    if ui.add_sized(size, egui::Button::new("—")).clicked() {
        ui.ctx()
            .send_viewport_cmd(egui::ViewportCommand::Minimized(true));
    }
}

impl eframe::App for ChatShellApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_monitor_events();

        if ctx.input(|i| i.viewport().close_requested()) {
            self.shutdown_client();
        }

        self.show_header(ctx);
        self.show_status_bar(ctx);
        self.show_sidebar(ctx);

        egui::CentralPanel::default().show(ctx, |ui| match self.state.nav {
            NavItem::Chat => self.show_chat(ui),
            NavItem::Files => self.show_files(ui),
            NavItem::Settings => self.show_settings(ui),
        });
    }
}

impl Drop for ChatShellApp {
    fn drop(&mut self) {
        self.shutdown_client();
    }
}
