use std::sync::Arc;

use adw::Application;
use adw::prelude::*;

use crate::api::client::ApiClient;
use crate::app::{AppConfig, initial_route};
use crate::session::SessionStore;
use crate::state::{Notice, Route};
use crate::storage::SessionStorage;

pub mod chat_view;
pub mod login;
pub mod main_window;
pub mod register;
pub mod sidebar;

/// What every window needs: the application, the loaded config and the one
/// API client (which carries the shared session).
#[derive(Clone)]
pub struct UiContext {
    pub app: Application,
    pub config: AppConfig,
    pub client: ApiClient,
}

impl UiContext {
    /// Opens the window for `route`. The caller closes its own window.
    pub fn navigate(&self, route: Route, notice: Option<Notice>) {
        match route {
            Route::Login => login::show_login_window(self, notice),
            Route::Register => register::show_register_window(self),
            Route::Home => main_window::show_main_window(self, notice),
        }
    }
}

pub fn build_ui(app: &Application) {
    let config = AppConfig::load();
    let session = Arc::new(SessionStore::open(SessionStorage::default_location()));
    let client = match ApiClient::from_config(&config, session) {
        Ok(client) => client,
        Err(e) => {
            log::error!("cannot use API url {:?}: {e}", config.api_url);
            app.quit();
            return;
        }
    };
    log::info!("using API at {}", client.transport().base_url());
    let ctx = UiContext {
        app: app.clone(),
        config,
        client,
    };
    let route = initial_route(ctx.client.session());
    ctx.navigate(route, None);
}

pub(crate) fn toast(overlay: &adw::ToastOverlay, notice: &Notice) {
    let toast = adw::Toast::new(&notice.text());
    toast.set_timeout(4);
    overlay.add_toast(toast);
}

pub(crate) fn entry(placeholder: &str) -> gtk4::Entry {
    let entry = gtk4::Entry::new();
    entry.set_placeholder_text(Some(placeholder));
    entry.set_hexpand(true);
    entry
}

pub(crate) fn password_entry(placeholder: &str) -> gtk4::PasswordEntry {
    let entry = gtk4::PasswordEntry::new();
    entry.set_placeholder_text(Some(placeholder));
    entry.set_show_peek_icon(true);
    entry.set_hexpand(true);
    entry
}

/// A `Cliente` / `Empresa` radio pair; the first starts active.
pub(crate) fn role_picker() -> (gtk4::Box, gtk4::CheckButton, gtk4::CheckButton) {
    let row = gtk4::Box::new(gtk4::Orientation::Horizontal, 12);
    let client = gtk4::CheckButton::with_label("Cliente");
    let company = gtk4::CheckButton::with_label("Empresa");
    company.set_group(Some(&client));
    client.set_active(true);
    row.append(&client);
    row.append(&company);
    (row, client, company)
}

/// Header bar on top, toast overlay below, like every window in the app.
pub(crate) fn framed(title: &str, overlay: &adw::ToastOverlay) -> gtk4::Box {
    let container = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    let title = gtk4::Label::new(Some(title));
    header.set_title_widget(Some(&title));
    container.append(&header);
    container.append(overlay);
    container
}
