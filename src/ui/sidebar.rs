use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::prelude::*;

use crate::api::models::{Conversation, Role};
use crate::state::ConversationList;

/// Conversation list with its search box. Rows are rebuilt on every refresh.
pub struct Sidebar {
    root: gtk::Box,
    search: gtk::SearchEntry,
    list: gtk::ListBox,
    empty: gtk::Label,
    role: Role,
    row_ids: Rc<RefCell<Vec<String>>>,
}

impl Sidebar {
    /// `role` is the signed-in user's; the list shows the other side.
    pub fn new(role: Role) -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);
        root.set_width_request(300);

        let title = gtk::Label::new(Some(role.counterpart_label()));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        root.append(&title);

        let search = gtk::SearchEntry::builder()
            .placeholder_text(role.search_placeholder())
            .build();
        root.append(&search);

        let list = gtk::ListBox::new();
        list.add_css_class("navigation-sidebar");
        list.set_selection_mode(gtk::SelectionMode::Single);
        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hscrollbar_policy(gtk::PolicyType::Never)
            .child(&list)
            .build();
        root.append(&scroller);

        let empty = gtk::Label::new(Some(role.empty_list_label()));
        empty.add_css_class("dim-label");
        empty.set_wrap(true);
        empty.set_vexpand(true);
        empty.set_valign(gtk::Align::Start);
        root.append(&empty);

        Self {
            root,
            search,
            list,
            empty,
            role,
            row_ids: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    /// Called with the conversation id when a row is clicked.
    pub fn connect_selected<F: Fn(String) + 'static>(&self, f: F) {
        let ids = self.row_ids.clone();
        self.list.connect_row_activated(move |_, row| {
            let id = usize::try_from(row.index())
                .ok()
                .and_then(|i| ids.borrow().get(i).cloned());
            if let Some(id) = id {
                f(id);
            }
        });
    }

    pub fn connect_search_changed<F: Fn(String) + 'static>(&self, f: F) {
        self.search
            .connect_search_changed(move |entry| f(entry.text().to_string()));
    }

    pub fn render(&self, state: &ConversationList) {
        while let Some(child) = self.list.first_child() {
            self.list.remove(&child);
        }
        let items = state.filtered();
        let mut ids = self.row_ids.borrow_mut();
        ids.clear();

        match state.empty_message(self.role) {
            Some(text) => {
                self.empty.set_label(text);
                self.empty.set_visible(true);
            }
            None => self.empty.set_visible(false),
        }

        for conv in items {
            let row = gtk::ListBoxRow::new();
            row.set_child(Some(&conversation_row(conv)));
            self.list.append(&row);
            if state.is_selected(&conv.id) {
                self.list.select_row(Some(&row));
            }
            ids.push(conv.id.clone());
        }
    }
}

fn conversation_row(conv: &Conversation) -> gtk::Box {
    let row = gtk::Box::new(gtk::Orientation::Horizontal, 10);
    row.set_margin_top(6);
    row.set_margin_bottom(6);
    row.set_margin_start(4);
    row.set_margin_end(4);

    let avatar = adw::Avatar::new(36, Some(&conv.counterpart_name), true);
    row.append(&avatar);

    let text = gtk::Box::new(gtk::Orientation::Vertical, 2);
    text.set_hexpand(true);
    let name = gtk::Label::new(Some(&conv.counterpart_name));
    name.add_css_class("heading");
    name.set_halign(gtk::Align::Start);
    name.set_ellipsize(gtk::pango::EllipsizeMode::End);
    let preview = gtk::Label::new(Some(conv.preview()));
    preview.add_css_class("dim-label");
    preview.set_halign(gtk::Align::Start);
    preview.set_ellipsize(gtk::pango::EllipsizeMode::End);
    text.append(&name);
    text.append(&preview);
    row.append(&text);

    let meta = gtk::Box::new(gtk::Orientation::Vertical, 2);
    meta.set_valign(gtk::Align::Center);
    if let Some(time) = conv.time_label() {
        let time = gtk::Label::new(Some(time));
        time.add_css_class("caption");
        time.add_css_class("dim-label");
        meta.append(&time);
    }
    if conv.unread > 0 {
        let badge = gtk::Label::new(Some(&conv.unread.to_string()));
        badge.add_css_class("caption");
        badge.add_css_class("accent");
        badge.set_halign(gtk::Align::End);
        meta.append(&badge);
    }
    row.append(&meta);
    row
}
