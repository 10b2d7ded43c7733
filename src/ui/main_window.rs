use std::cell::RefCell;
use std::rc::{Rc, Weak};

use adw::prelude::*;

use crate::api::models::User;
use crate::error::ClientError;
use crate::poll::{FocusTrigger, PollHandle, spawn_poller};
use crate::state::auth;
use crate::state::{
    ChatController, ChatTarget, ConversationController, Notice, RefreshCause, RefreshOutcome,
};
use crate::ui::UiContext;
use crate::ui::chat_view::ChatView;
use crate::ui::sidebar::Sidebar;
use crate::utils::RUNTIME;

/// Results coming back from the runtime to the main loop.
enum Update {
    Conversations,
    Messages(RefreshOutcome),
}

/// State shared by the home window's callbacks.
struct Home {
    me: User,
    overlay: adw::ToastOverlay,
    sidebar: Sidebar,
    chat_view: ChatView,
    conversations: ConversationController,
    chat: ChatController,
    updates: glib::Sender<Update>,
    conversation_focus: FocusTrigger,
}

impl Home {
    fn render_sidebar(&self) {
        self.sidebar.render(&self.conversations.snapshot());
    }

    fn render_chat(&self) {
        self.chat.with_state(|s| self.chat_view.render(s, &self.me));
    }

    fn apply(&self, update: Update) {
        match update {
            Update::Conversations => {
                self.render_sidebar();
                self.retitle_open_chat();
            }
            Update::Messages(RefreshOutcome::Skipped | RefreshOutcome::Stale) => {}
            Update::Messages(_) => self.render_chat(),
        }
    }

    /// The slot is claimed here on the main loop so the next render already
    /// sees the loading state; only the request runs on the runtime.
    fn refresh_chat(&self, cause: RefreshCause) {
        let Some(ticket) = self.chat.begin_refresh(cause) else {
            return;
        };
        let chat = self.chat.clone();
        let tx = self.updates.clone();
        crate::utils::spawn_async(async move {
            let outcome = chat.fetch(ticket).await;
            let _ = tx.send(Update::Messages(outcome));
        });
    }

    fn open(&self, target: ChatTarget) {
        if self.chat.open(target) {
            self.chat_view.sync_input("");
            self.refresh_chat(RefreshCause::Open);
        }
        self.render_chat();
    }

    /// Carries renamed counterparts from the list into the open chat header.
    fn retitle_open_chat(&self) {
        let selected = self
            .conversations
            .with_state(|s| s.selected().map(ChatTarget::from));
        if let Some(target) = selected {
            if self.chat.with_state(|s| s.retitle(target)) {
                self.render_chat();
            }
        }
    }

    fn select(&self, id: &str) {
        let selected = self.conversations.with_state(|s| s.select(id).cloned());
        if let Some(conversation) = selected {
            self.open(ChatTarget::from(&conversation));
        }
    }

    fn send(self: &Rc<Self>) {
        self.chat_view.set_sending(true);
        let chat = self.chat.clone();
        let tx = self.updates.clone();
        let rx = crate::utils::run_async_to_main(async move {
            if let Some(reconcile) = chat.send().await? {
                tokio::spawn(async move {
                    if let Ok(outcome) = reconcile.await {
                        let _ = tx.send(Update::Messages(outcome));
                    }
                });
            }
            Ok::<(), ClientError>(())
        });

        let home = self.clone();
        rx.attach(None, move |res| {
            home.chat_view.set_sending(false);
            match res {
                Ok(()) => {
                    let input = home.chat.with_state(|s| s.input().to_string());
                    home.chat_view.sync_input(&input);
                    // a first message may have created a conversation
                    home.conversation_focus.fire();
                }
                Err(e) => crate::ui::toast(
                    &home.overlay,
                    &Notice::from_client_error("Erro ao enviar mensagem", &e),
                ),
            }
            home.render_chat();
            glib::ControlFlow::Continue
        });
    }

    fn start_conversation(self: &Rc<Self>, email: String) {
        let chat = self.chat.clone();
        let rx = crate::utils::run_async_to_main(async move { chat.start_conversation(&email).await });

        let home = self.clone();
        rx.attach(None, move |res| {
            match res {
                Ok(target) => {
                    let existing = home
                        .conversations
                        .with_state(|s| s.find_with(&target.recipient).map(|c| c.id.clone()));
                    match existing {
                        Some(id) => home.select(&id),
                        None => {
                            home.conversations.with_state(|s| s.clear_selection());
                            home.chat_view.sync_input("");
                            home.render_chat();
                        }
                    }
                    home.render_sidebar();
                }
                Err(e) => crate::ui::toast(
                    &home.overlay,
                    &Notice::from_client_error("Erro ao iniciar conversa", &e),
                ),
            }
            glib::ControlFlow::Continue
        });
    }
}

pub fn show_main_window(ctx: &UiContext, notice: Option<Notice>) {
    let Some(me) = ctx.client.session().current_user() else {
        log::info!("no session, showing login");
        ctx.navigate(crate::state::Route::Login, None);
        return;
    };

    let window = adw::ApplicationWindow::builder()
        .application(&ctx.app)
        .title("BigChatBrasil")
        .default_width(1000)
        .default_height(680)
        .build();

    let overlay = adw::ToastOverlay::new();

    let split = adw::Flap::builder()
        .reveal_flap(true)
        .locked(true)
        .modal(false)
        .build();

    let sidebar = Sidebar::new(me.role);
    split.set_flap(Some(&sidebar.widget()));
    let chat_view = ChatView::new(me.role);
    split.set_content(Some(&chat_view.widget()));
    overlay.set_child(Some(&split));

    let container = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    let title = adw::WindowTitle::new("BigChatBrasil", &format!("{} · {}", me.name, me.role.label()));
    header.set_title_widget(Some(&title));

    let logout_btn = gtk4::Button::with_label("Sair");
    header.pack_end(&logout_btn);
    let new_chat_btn = gtk4::Button::with_label(me.role.add_contact_label());
    new_chat_btn.add_css_class("suggested-action");
    header.pack_end(&new_chat_btn);
    container.append(&header);
    container.append(&overlay);
    window.set_content(Some(&container));

    let (tx, rx) = crate::utils::glib_channel::<Update>();
    let conversation_focus = FocusTrigger::new();
    let message_focus = FocusTrigger::new();

    let home = Rc::new(Home {
        me,
        overlay,
        sidebar,
        chat_view,
        conversations: ConversationController::new(ctx.client.clone()),
        chat: ChatController::new(ctx.client.clone(), ctx.config.reconcile_delay()),
        updates: tx.clone(),
        conversation_focus: conversation_focus.clone(),
    });

    {
        let home: Weak<Home> = Rc::downgrade(&home);
        rx.attach(None, move |update| match home.upgrade() {
            Some(home) => {
                home.apply(update);
                glib::ControlFlow::Continue
            }
            None => glib::ControlFlow::Break,
        });
    }

    let conversation_poller = {
        let conversations = home.conversations.clone();
        let tx = tx.clone();
        spawn_poller(
            RUNTIME.handle(),
            ctx.config.conversation_refresh(),
            Some(conversation_focus.clone()),
            move || {
                let conversations = conversations.clone();
                let tx = tx.clone();
                async move {
                    conversations.poll_tick().await;
                    let _ = tx.send(Update::Conversations);
                }
            },
        )
    };
    let message_poller = {
        let chat = home.chat.clone();
        spawn_poller(
            RUNTIME.handle(),
            ctx.config.message_refresh(),
            Some(message_focus.clone()),
            move || {
                let chat = chat.clone();
                let tx = tx.clone();
                async move {
                    let outcome = chat.poll_tick().await;
                    if outcome != RefreshOutcome::Skipped {
                        let _ = tx.send(Update::Messages(outcome));
                    }
                }
            },
        )
    };
    let pollers: Rc<RefCell<Option<(PollHandle, PollHandle)>>> =
        Rc::new(RefCell::new(Some((conversation_poller, message_poller))));

    window.connect_is_active_notify(move |w| {
        if w.is_active() {
            conversation_focus.fire();
            message_focus.fire();
        }
    });

    {
        let pollers = pollers.clone();
        window.connect_close_request(move |_| {
            if let Some((conversations, messages)) = pollers.borrow_mut().take() {
                conversations.stop();
                messages.stop();
                log::debug!("home window closed, pollers stopped");
            }
            glib::Propagation::Proceed
        });
    }

    {
        let h = home.clone();
        home.sidebar.connect_selected(move |id| h.select(&id));
    }
    {
        let h = home.clone();
        home.sidebar.connect_search_changed(move |term| {
            h.conversations.with_state(|s| s.set_search_term(term));
            h.render_sidebar();
        });
    }
    {
        let h = home.clone();
        home.chat_view
            .connect_input_changed(move |text| h.chat.with_state(|s| s.set_input(text)));
    }
    {
        let h = home.clone();
        home.chat_view
            .connect_input_left(move || h.chat.with_state(|s| s.blur()));
    }
    {
        let h = home.clone();
        home.chat_view.connect_send(move || h.send());
    }

    {
        let ctx = ctx.clone();
        let window = window.clone();
        logout_btn.connect_clicked(move |_| {
            let route = auth::logout(ctx.client.session());
            ctx.navigate(route, None);
            window.close();
        });
    }

    {
        let home = home.clone();
        let parent = window.clone();
        new_chat_btn.connect_clicked(move |_| show_new_conversation_dialog(&parent, &home));
    }

    home.render_sidebar();
    home.render_chat();
    if let Some(notice) = &notice {
        crate::ui::toast(&home.overlay, notice);
    }
    window.present();
}

fn show_new_conversation_dialog(parent: &adw::ApplicationWindow, home: &Rc<Home>) {
    let dialog = gtk4::Dialog::builder()
        .title(home.me.role.add_contact_label())
        .transient_for(parent)
        .modal(true)
        .build();
    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 12);
    content.set_margin_top(12);
    content.set_margin_bottom(12);
    content.set_margin_start(12);
    content.set_margin_end(12);

    let info = gtk4::Label::new(Some("Informe o email para iniciar uma conversa:"));
    info.set_halign(gtk4::Align::Start);
    content.append(&info);

    let entry = crate::ui::entry("email@exemplo.com");
    entry.set_input_purpose(gtk4::InputPurpose::Email);
    content.append(&entry);
    dialog.content_area().append(&content);

    let _ = dialog.add_button("Cancelar", gtk4::ResponseType::Cancel);
    let ok_btn = dialog.add_button("Iniciar", gtk4::ResponseType::Ok);
    ok_btn.add_css_class("suggested-action");
    dialog.set_default_response(gtk4::ResponseType::Ok);

    {
        let dialog = dialog.clone();
        entry.connect_activate(move |_| dialog.response(gtk4::ResponseType::Ok));
    }

    let home = home.clone();
    dialog.connect_response(move |dlg, resp| {
        if resp == gtk4::ResponseType::Ok {
            home.start_conversation(entry.text().to_string());
        }
        dlg.close();
    });

    dialog.present();
}
