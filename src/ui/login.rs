use std::rc::Rc;

use adw::prelude::*;
use gtk4 as gtk;

use crate::api::models::{Role, User};
use crate::error::ClientError;
use crate::state::auth::{self, LoginForm};
use crate::state::{Notice, Route};
use crate::ui::UiContext;

pub fn show_login_window(ctx: &UiContext, notice: Option<Notice>) {
    let window = adw::ApplicationWindow::builder()
        .application(&ctx.app)
        .title("BigChatBrasil")
        .default_width(420)
        .default_height(360)
        .resizable(false)
        .build();

    let toast_overlay = adw::ToastOverlay::new();

    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.set_margin_top(24);
    root.set_margin_bottom(24);
    root.set_margin_start(24);
    root.set_margin_end(24);

    let title = gtk::Label::new(Some("Entrar"));
    title.add_css_class("title-2");
    title.set_halign(gtk::Align::Start);
    root.append(&title);

    let subtitle = gtk::Label::new(Some("Acesse sua conta BigChatBrasil"));
    subtitle.add_css_class("dim-label");
    subtitle.set_halign(gtk::Align::Start);
    root.append(&subtitle);

    let email_entry = crate::ui::entry("seu@email.com");
    email_entry.set_input_purpose(gtk::InputPurpose::Email);
    let pass_entry = crate::ui::password_entry("Senha");
    let (role_row, client_check, _) = crate::ui::role_picker();

    let form = gtk::Box::new(gtk::Orientation::Vertical, 8);
    form.append(&email_entry);
    form.append(&pass_entry);
    form.append(&role_row);
    root.append(&form);

    let status = gtk::Label::new(None);
    status.add_css_class("dim-label");
    status.set_halign(gtk::Align::Start);
    root.append(&status);

    let login_btn = gtk::Button::with_label("Entrar");
    login_btn.add_css_class("suggested-action");
    login_btn.set_halign(gtk::Align::End);
    root.append(&login_btn);

    let register_btn = gtk::Button::with_label("Não tem conta? Cadastre-se");
    register_btn.add_css_class("flat");
    register_btn.set_halign(gtk::Align::Center);
    root.append(&register_btn);

    toast_overlay.set_child(Some(&root));
    window.set_content(Some(&crate::ui::framed("BigChatBrasil", &toast_overlay)));

    if let Some(notice) = &notice {
        crate::ui::toast(&toast_overlay, notice);
    }

    let on_login = {
        let ctx = ctx.clone();
        let window = window.clone();
        let overlay = toast_overlay.clone();
        let login_btn = login_btn.clone();
        let email_entry = email_entry.clone();
        let pass_entry = pass_entry.clone();
        move || {
            let form = LoginForm {
                email: email_entry.text().to_string(),
                password: pass_entry.text().to_string(),
                role: if client_check.is_active() {
                    Role::Cliente
                } else {
                    Role::Empresa
                },
            };
            if let Err(e) = form.validate() {
                crate::ui::toast(&overlay, &Notice::from_validation(&e));
                return;
            }

            status.set_label("Entrando…");
            login_btn.set_sensitive(false);

            let client = ctx.client.clone();
            let rx: glib::Receiver<Result<User, ClientError>> =
                crate::utils::run_async_to_main(async move { auth::login(&client, &form).await });

            let ctx = ctx.clone();
            let window = window.clone();
            let overlay = overlay.clone();
            let status = status.clone();
            let login_btn = login_btn.clone();
            rx.attach(None, move |res| {
                let (route, notice) = auth::login_outcome(&res);
                match route {
                    Some(route) => {
                        ctx.navigate(route, Some(notice));
                        window.close();
                    }
                    None => {
                        status.set_label("");
                        login_btn.set_sensitive(true);
                        crate::ui::toast(&overlay, &notice);
                    }
                }
                glib::ControlFlow::Continue
            });
        }
    };

    let on_login: Rc<dyn Fn()> = Rc::new(on_login);
    {
        let on_login = on_login.clone();
        login_btn.connect_clicked(move |_| (on_login)());
    }
    {
        let on_login = on_login.clone();
        email_entry.connect_activate(move |_| (on_login)());
    }
    {
        let on_login = on_login.clone();
        pass_entry.connect_activate(move |_| (on_login)());
    }
    {
        let ctx = ctx.clone();
        let window = window.clone();
        register_btn.connect_clicked(move |_| {
            ctx.navigate(Route::Register, None);
            window.close();
        });
    }

    window.present();
}
