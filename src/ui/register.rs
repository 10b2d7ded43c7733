use std::rc::Rc;

use adw::prelude::*;
use gtk4 as gtk;

use crate::error::ClientError;
use crate::state::auth::{self, ClientRegistration, CompanyRegistration, RegistrationForm};
use crate::state::{Notice, Route};
use crate::ui::UiContext;

struct ClientFields {
    name: gtk::Entry,
    surname: gtk::Entry,
    sex: gtk::DropDown,
    email: gtk::Entry,
    tax_id: gtk::Entry,
    phone: gtk::Entry,
    about: gtk::Entry,
    password: gtk::PasswordEntry,
    confirmation: gtk::PasswordEntry,
}

struct CompanyFields {
    legal_name: gtk::Entry,
    cnpj: gtk::Entry,
    phone: gtk::Entry,
    email: gtk::Entry,
    password: gtk::PasswordEntry,
    confirmation: gtk::PasswordEntry,
}

const SEX_OPTIONS: [&str; 4] = ["Não informar", "Feminino", "Masculino", "Outro"];

impl ClientFields {
    fn new() -> (Self, gtk::Box) {
        let fields = Self {
            name: crate::ui::entry("Nome"),
            surname: crate::ui::entry("Sobrenome"),
            sex: gtk::DropDown::from_strings(&SEX_OPTIONS),
            email: crate::ui::entry("Email"),
            tax_id: crate::ui::entry("CPF"),
            phone: crate::ui::entry("Telefone"),
            about: crate::ui::entry("Sobre você (opcional)"),
            password: crate::ui::password_entry("Senha"),
            confirmation: crate::ui::password_entry("Confirme a senha"),
        };
        let names = gtk::Box::new(gtk::Orientation::Horizontal, 8);
        names.append(&fields.name);
        names.append(&fields.surname);

        let page = gtk::Box::new(gtk::Orientation::Vertical, 8);
        page.append(&names);
        page.append(&fields.sex);
        page.append(&fields.email);
        page.append(&fields.tax_id);
        page.append(&fields.phone);
        page.append(&fields.about);
        page.append(&fields.password);
        page.append(&fields.confirmation);
        (fields, page)
    }

    fn form(&self) -> ClientRegistration {
        let sex = match self.sex.selected() {
            0 => String::new(),
            i => SEX_OPTIONS
                .get(i as usize)
                .map(|s| s.to_string())
                .unwrap_or_default(),
        };
        ClientRegistration {
            name: self.name.text().to_string(),
            surname: self.surname.text().to_string(),
            sex,
            email: self.email.text().to_string(),
            tax_id: self.tax_id.text().to_string(),
            password: self.password.text().to_string(),
            password_confirmation: self.confirmation.text().to_string(),
            phone: self.phone.text().to_string(),
            about: self.about.text().to_string(),
        }
    }
}

impl CompanyFields {
    fn new() -> (Self, gtk::Box) {
        let fields = Self {
            legal_name: crate::ui::entry("Razão social"),
            cnpj: crate::ui::entry("CNPJ"),
            phone: crate::ui::entry("Telefone"),
            email: crate::ui::entry("Email"),
            password: crate::ui::password_entry("Senha"),
            confirmation: crate::ui::password_entry("Confirme a senha"),
        };
        let page = gtk::Box::new(gtk::Orientation::Vertical, 8);
        page.append(&fields.legal_name);
        page.append(&fields.cnpj);
        page.append(&fields.phone);
        page.append(&fields.email);
        page.append(&fields.password);
        page.append(&fields.confirmation);
        (fields, page)
    }

    fn form(&self) -> CompanyRegistration {
        CompanyRegistration {
            legal_name: self.legal_name.text().to_string(),
            cnpj: self.cnpj.text().to_string(),
            phone: self.phone.text().to_string(),
            email: self.email.text().to_string(),
            password: self.password.text().to_string(),
            password_confirmation: self.confirmation.text().to_string(),
        }
    }
}

pub fn show_register_window(ctx: &UiContext) {
    let window = adw::ApplicationWindow::builder()
        .application(&ctx.app)
        .title("Cadastro - BigChatBrasil")
        .default_width(460)
        .default_height(640)
        .build();

    let toast_overlay = adw::ToastOverlay::new();

    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.set_margin_top(24);
    root.set_margin_bottom(24);
    root.set_margin_start(24);
    root.set_margin_end(24);

    let title = gtk::Label::new(Some("Criar conta"));
    title.add_css_class("title-2");
    title.set_halign(gtk::Align::Start);
    root.append(&title);

    let (role_row, client_check, _) = crate::ui::role_picker();
    root.append(&role_row);

    let (client_fields, client_page) = ClientFields::new();
    let (company_fields, company_page) = CompanyFields::new();
    company_page.set_visible(false);
    root.append(&client_page);
    root.append(&company_page);

    {
        let client_page = client_page.clone();
        let company_page = company_page.clone();
        client_check.connect_toggled(move |check| {
            client_page.set_visible(check.is_active());
            company_page.set_visible(!check.is_active());
        });
    }

    let submit_btn = gtk::Button::with_label("Cadastrar");
    submit_btn.add_css_class("suggested-action");
    submit_btn.set_halign(gtk::Align::End);
    root.append(&submit_btn);

    let login_btn = gtk::Button::with_label("Já tem conta? Entrar");
    login_btn.add_css_class("flat");
    login_btn.set_halign(gtk::Align::Center);
    root.append(&login_btn);

    let scroller = gtk::ScrolledWindow::builder()
        .vexpand(true)
        .hscrollbar_policy(gtk::PolicyType::Never)
        .child(&root)
        .build();
    toast_overlay.set_child(Some(&scroller));
    window.set_content(Some(&crate::ui::framed("BigChatBrasil", &toast_overlay)));

    let on_submit = {
        let ctx = ctx.clone();
        let window = window.clone();
        let overlay = toast_overlay.clone();
        let submit_btn = submit_btn.clone();
        move || {
            let form = if client_check.is_active() {
                RegistrationForm::Client(client_fields.form())
            } else {
                RegistrationForm::Company(company_fields.form())
            };
            if let Err(e) = form.validate() {
                crate::ui::toast(&overlay, &Notice::from_validation(&e));
                return;
            }
            submit_btn.set_sensitive(false);

            let client = ctx.client.clone();
            let rx: glib::Receiver<Result<(), ClientError>> =
                crate::utils::run_async_to_main(async move { auth::register(&client, &form).await });

            let ctx = ctx.clone();
            let window = window.clone();
            let overlay = overlay.clone();
            let submit_btn = submit_btn.clone();
            rx.attach(None, move |res| {
                let (route, notice) = auth::register_outcome(&res);
                match route {
                    Some(route) => {
                        ctx.navigate(route, Some(notice));
                        window.close();
                    }
                    None => {
                        submit_btn.set_sensitive(true);
                        crate::ui::toast(&overlay, &notice);
                    }
                }
                glib::ControlFlow::Continue
            });
        }
    };

    let on_submit: Rc<dyn Fn()> = Rc::new(on_submit);
    {
        let on_submit = on_submit.clone();
        submit_btn.connect_clicked(move |_| (on_submit)());
    }
    {
        let ctx = ctx.clone();
        let window = window.clone();
        login_btn.connect_clicked(move |_| {
            ctx.navigate(Route::Login, None);
            window.close();
        });
    }

    window.present();
}
