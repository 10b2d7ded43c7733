use std::cell::Cell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::prelude::*;

use crate::api::models::{Message, Role, User};
use crate::state::ChatState;

/// Right-hand pane: a prompt while nothing is open, otherwise the header,
/// the message list and the input row.
pub struct ChatView {
    stack: gtk::Stack,
    title: gtk::Label,
    spinner: gtk::Spinner,
    messages_box: gtk::Box,
    scroller: gtk::ScrolledWindow,
    entry: gtk::Entry,
    send_btn: gtk::Button,
    // set while the view itself rewrites the entry, so it is not taken as typing
    syncing: Rc<Cell<bool>>,
}

impl ChatView {
    pub fn new(role: Role) -> Self {
        let stack = gtk::Stack::new();
        stack.set_hexpand(true);
        stack.set_vexpand(true);

        let placeholder = adw::StatusPage::builder()
            .icon_name("chat-bubbles-empty-symbolic")
            .title(role.select_prompt())
            .build();
        stack.add_named(&placeholder, Some("empty"));

        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);

        let header = gtk::Box::new(gtk::Orientation::Horizontal, 8);
        let title = gtk::Label::new(None);
        title.add_css_class("title-4");
        title.set_halign(gtk::Align::Start);
        title.set_hexpand(true);
        let spinner = gtk::Spinner::new();
        header.append(&title);
        header.append(&spinner);
        root.append(&header);

        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hexpand(true)
            .hscrollbar_policy(gtk::PolicyType::Never)
            .build();
        let messages_box = gtk::Box::new(gtk::Orientation::Vertical, 6);
        scroller.set_child(Some(&messages_box));
        root.append(&scroller);

        let input_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let entry = gtk::Entry::new();
        entry.set_hexpand(true);
        entry.set_placeholder_text(Some("Digite sua mensagem…"));
        let send_btn = gtk::Button::with_label("Enviar");
        send_btn.add_css_class("suggested-action");
        input_row.append(&entry);
        input_row.append(&send_btn);
        root.append(&input_row);

        stack.add_named(&root, Some("chat"));
        stack.set_visible_child_name("empty");

        Self {
            stack,
            title,
            spinner,
            messages_box,
            scroller,
            entry,
            send_btn,
            syncing: Rc::new(Cell::new(false)),
        }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.stack.clone().upcast()
    }

    /// Fires for user edits of the input only.
    pub fn connect_input_changed<F: Fn(String) + 'static>(&self, f: F) {
        let syncing = self.syncing.clone();
        self.entry.connect_changed(move |entry| {
            if !syncing.get() {
                f(entry.text().to_string());
            }
        });
    }

    pub fn connect_input_left<F: Fn() + 'static>(&self, f: F) {
        let focus = gtk::EventControllerFocus::new();
        focus.connect_leave(move |_| f());
        self.entry.add_controller(focus);
    }

    pub fn connect_send<F: Fn() + 'static>(&self, f: F) {
        let f = Rc::new(f);
        {
            let f = f.clone();
            self.send_btn.connect_clicked(move |_| f());
        }
        self.entry.connect_activate(move |_| f());
    }

    pub fn set_sending(&self, sending: bool) {
        self.send_btn.set_sensitive(!sending);
    }

    /// Puts the state's input text into the entry when they differ.
    pub fn sync_input(&self, input: &str) {
        if self.entry.text().as_str() != input {
            self.syncing.set(true);
            self.entry.set_text(input);
            self.syncing.set(false);
        }
    }

    pub fn render(&self, state: &ChatState, me: &User) {
        let Some(target) = state.target() else {
            self.stack.set_visible_child_name("empty");
            self.spinner.stop();
            return;
        };
        self.stack.set_visible_child_name("chat");
        self.title.set_label(&target.title);

        let loading = state.shows_spinner();
        if loading {
            self.spinner.start();
        } else {
            self.spinner.stop();
        }

        while let Some(child) = self.messages_box.first_child() {
            self.messages_box.remove(&child);
        }
        if state.messages().is_empty() && !loading {
            let hint = gtk::Label::new(Some("Nenhuma mensagem ainda. Envie a primeira!"));
            hint.add_css_class("dim-label");
            hint.set_vexpand(true);
            self.messages_box.append(&hint);
        }
        for message in state.messages() {
            self.messages_box.append(&bubble(message, message.is_from(me)));
        }

        let adj = self.scroller.vadjustment();
        adj.set_value(adj.upper());
    }
}

fn bubble(message: &Message, mine: bool) -> gtk::Box {
    let bubble = gtk::Box::new(gtk::Orientation::Vertical, 2);
    bubble.add_css_class("card");
    bubble.set_halign(if mine { gtk::Align::End } else { gtk::Align::Start });

    let text = gtk::Label::new(Some(&message.content));
    text.set_wrap(true);
    text.set_max_width_chars(48);
    text.set_xalign(0.0);
    text.set_selectable(true);
    text.set_margin_top(6);
    text.set_margin_start(10);
    text.set_margin_end(10);
    bubble.append(&text);

    let time = gtk::Label::new(Some(message.time_label()));
    time.add_css_class("caption");
    time.add_css_class("dim-label");
    time.set_halign(gtk::Align::End);
    time.set_margin_bottom(4);
    time.set_margin_end(10);
    bubble.append(&time);
    bubble
}
