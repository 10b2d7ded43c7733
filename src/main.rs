use adw::Application;
use adw::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> glib::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let app = Application::builder()
        .application_id("br.com.bigchat.BigChatGtk")
        .build();
    app.connect_activate(bigchat_gtk::ui::build_ui);
    app.run()
}
