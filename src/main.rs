mod app;
mod browser;
mod chat;
mod config;
mod editor;
mod event;
mod host;
mod launch;
mod logging;
mod recent;

use app::LauncherApp;
use chat::ChatClient;
use config::AppConfig;
use editor::info::EditorInfoCatalog;
use editor::probe::SystemProbe;
use eframe::egui;
use event::EventSender;
use host::HostContext;
use launch::spawn::SystemSpawner;
use launch::Dispatcher;
use recent::RecentFiles;
use std::sync::Arc;

const EDITOR_INFO_FILE_NAME: &str = "editor_info.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = AppConfig::load();
    let host = HostContext::detect();

    let probe = Arc::new(SystemProbe::default());
    let registry = editor::discover(
        &config.editors.candidates,
        &config.editors.terminal_editors,
        host,
        probe.as_ref(),
    );
    if registry.is_empty() {
        tracing::warn!("no editors found");
    } else {
        let found: Vec<&str> = registry.ids().collect();
        tracing::info!("editors available: {}", found.join(", "));
    }

    let mut warnings = Vec::new();
    let (editor_info, info_warnings) =
        EditorInfoCatalog::load(&config::config_dir().join(EDITOR_INFO_FILE_NAME));
    warnings.extend(info_warnings);
    let (recent, recent_warning) = RecentFiles::load(config.recent_files.resolved_path());
    warnings.extend(recent_warning);
    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("editor-launcher-runtime")
        .build()?;

    let (events, rx) = EventSender::channel();
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        host,
        config.terminals.clone(),
        probe,
        Arc::new(SystemSpawner),
        runtime.handle().clone(),
        events.clone(),
    );
    let chat = ChatClient::new(&config.chat, runtime.handle().clone(), events.clone());

    let app = LauncherApp::new(
        rx,
        dispatcher,
        chat,
        editor_info,
        recent,
        config.start_directory(),
        warnings,
    );
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 760.0])
            .with_min_inner_size([900.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Editor Launcher",
        native_options,
        Box::new(move |creation_context| {
            events.attach(&creation_context.egui_ctx);
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
