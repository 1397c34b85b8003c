//! Interactive session.
//!
//! [`Session`] owns everything the terminal UI mutates: the router, the user
//! store, the filter inputs, cursors, dialogs and the AI panel. Key presses
//! and background results are applied one at a time; rendering only ever
//! sees a [`SessionSnapshot`].

use async_channel::Sender;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use tracing::{debug, warn};

use crate::{
    ai::{AiOutcome, AiReply, AiRequest, Mode, EXAMPLE_PROMPTS},
    catalog::{Catalog, Category, Emoji, SKIN_TONES},
    collections::{Collection, COLLECTION_COLORS, COLLECTION_GLYPHS},
    error::EmojidexResult,
    filter::{filter, toggle_category},
    router::{Action, Router, View},
    store::{KvStore, UserStore},
};

/// Emoji per grid row
pub const GRID_COLUMNS: usize = 8;

/// Recents shown above the home grid
pub const RECENTS_SHOWN: usize = 10;

/// Which input of the current view receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Search box on home, prompt box on suggest
    #[default]
    Input,
    /// Category chips on home
    Chips,
    /// Recently viewed row on home
    Recents,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Name,
    Glyph,
    Color,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Name => FormField::Glyph,
            FormField::Glyph => FormField::Color,
            FormField::Color => FormField::Name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollectionForm {
    pub name: String,
    pub glyph: usize,
    pub color: usize,
    pub field: FormField,
    /// Reopen the collection picker after submitting
    pub from_picker: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    NewCollection(CollectionForm),
    /// Membership picker for the emoji being viewed
    AddToCollection { cursor: usize },
    ConfirmDelete { id: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AiPanel {
    pub mode: Mode,
    pub prompt: String,
    /// Sequence number of the outstanding request
    pub pending: Option<u64>,
    pub reply: Option<AiReply>,
    next_example: usize,
}

/// How the session reaches the AI worker
#[derive(Debug, Clone)]
pub enum AiLink {
    Ready(Sender<AiRequest>),
    /// Reason shown when the user tries to submit
    Disabled(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct Session {
    catalog: Catalog,
    store: UserStore<Box<dyn KvStore>>,
    router: Router,
    focus: Focus,
    query: String,
    categories: Vec<Category>,
    /// 0 is the "All" chip, then one chip per category
    chip_cursor: usize,
    cursor: usize,
    recent_cursor: usize,
    skin_tone: usize,
    dialog: Option<Dialog>,
    ai: AiPanel,
    ai_link: AiLink,
    next_seq: u64,
    notice: Option<Notice>,
    /// Whether the current notice has reached a frame
    notice_shown: bool,
}

impl Session {
    pub fn new(catalog: Catalog, store: UserStore<Box<dyn KvStore>>, start: View) -> Self {
        let mut session = Self {
            catalog,
            store,
            router: Router::starting_at(start),
            focus: Focus::default(),
            query: String::new(),
            categories: Vec::new(),
            chip_cursor: 0,
            cursor: 0,
            recent_cursor: 0,
            skin_tone: 0,
            dialog: None,
            ai: AiPanel::default(),
            ai_link: AiLink::Disabled("AI suggestions are not configured".to_string()),
            next_seq: 0,
            notice: None,
            notice_shown: false,
        };
        session.reset_view_input();
        session
    }

    pub fn with_ai(mut self, link: AiLink) -> Self {
        self.ai_link = link;
        self
    }

    pub fn view(&self) -> &View {
        self.router.current()
    }

    pub fn store(&self) -> &UserStore<Box<dyn KvStore>> {
        &self.store
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn set_notice(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notice = Some(Notice {
            level,
            text: text.into(),
        });
        self.notice_shown = false;
    }

    /// Records that the current notice has been drawn. A notice survives key
    /// presses until this has happened once.
    pub fn mark_rendered(&mut self) {
        self.notice_shown = self.notice.is_some();
    }

    fn report(&mut self, result: EmojidexResult<()>) {
        if let Err(e) = result {
            warn!(error = %e, "operation failed");
            self.set_notice(NoticeLevel::Error, e.to_string());
        }
    }

    /// Selectable emoji of the current view, in display order
    pub fn items(&self) -> Vec<&'static Emoji> {
        match self.view() {
            View::Home => filter(&self.catalog, &self.query, &self.categories),
            View::Favorites => self.catalog.resolve(self.store.favorites()),
            View::Collection { id } => self
                .store
                .collection(id)
                .map(|c| self.catalog.resolve(&c.emoji_codepoints))
                .unwrap_or_default(),
            View::Suggest => self.ai.reply.as_ref().map(AiReply::emojis).unwrap_or_default(),
            View::Landing | View::Emoji { .. } | View::Collections => Vec::new(),
        }
    }

    /// Recently viewed emoji on home. Hidden while a search or category
    /// filter is active.
    pub fn recent_items(&self) -> Vec<&'static Emoji> {
        if *self.view() != View::Home || !self.query.is_empty() || !self.categories.is_empty() {
            return Vec::new();
        }
        self.catalog
            .resolve(self.store.recents())
            .into_iter()
            .take(RECENTS_SHOWN)
            .collect()
    }

    fn item_count(&self) -> usize {
        match self.view() {
            View::Collections => self.store.collections().len(),
            _ => self.items().len(),
        }
    }

    fn selected(&self) -> Option<&'static Emoji> {
        self.items().get(self.cursor).copied()
    }

    fn selected_collection(&self) -> Option<&Collection> {
        self.store.collections().get(self.cursor)
    }

    fn current_emoji(&self) -> Option<&'static Emoji> {
        match self.view() {
            View::Emoji { emoji, .. } => Some(*emoji),
            _ => None,
        }
    }

    /// Applies a router action and resets per-view input on a change.
    pub fn dispatch(&mut self, action: Action) {
        let leaving_suggest = *self.view() == View::Suggest;
        let result = self.router.dispatch(action, &mut self.store);

        if leaving_suggest && *self.view() != View::Suggest {
            // Late results for this page are dropped.
            self.ai.pending = None;
        }
        if !matches!(result, Ok(false)) {
            self.reset_view_input();
        }
        self.report(result.map(|_| ()));
    }

    fn reset_view_input(&mut self) {
        self.cursor = 0;
        self.recent_cursor = 0;
        self.skin_tone = 0;
        self.dialog = None;
        self.focus = match self.view() {
            View::Home => Focus::Input,
            View::Suggest if self.ai.reply.is_none() => Focus::Input,
            _ => Focus::Grid,
        };
    }

    fn move_cursor(&mut self, delta: isize) {
        let count = self.item_count();
        if count == 0 {
            self.cursor = 0;
            return;
        }
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, count as isize - 1) as usize;
    }

    fn clamp_cursor(&mut self) {
        self.move_cursor(0);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if self.notice_shown {
            self.notice = None;
            self.notice_shown = false;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        if self.dialog.is_some() {
            self.handle_dialog_key(key);
            return Flow::Continue;
        }

        match self.view().clone() {
            View::Landing => match key.code {
                KeyCode::Enter => self.dispatch(Action::GetStarted),
                KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
                _ => {}
            },
            View::Home => self.handle_home_key(key),
            View::Emoji { emoji, .. } => self.handle_emoji_key(key, emoji),
            View::Collections => self.handle_collections_key(key),
            View::Collection { id } => self.handle_collection_key(key, id),
            View::Favorites => self.handle_favorites_key(key),
            View::Suggest => self.handle_suggest_key(key),
        }

        Flow::Continue
    }

    /// Grid navigation and the hub shortcuts shared by every emoji grid.
    /// Returns whether the key was consumed.
    fn handle_grid_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Left => self.move_cursor(-1),
            KeyCode::Right => self.move_cursor(1),
            KeyCode::Up => self.move_cursor(-(GRID_COLUMNS as isize)),
            KeyCode::Down => self.move_cursor(GRID_COLUMNS as isize),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.item_count().saturating_sub(1),
            KeyCode::Enter => {
                if let Some(emoji) = self.selected() {
                    self.dispatch(Action::SelectEmoji(emoji));
                }
            }
            KeyCode::Char('f') => {
                if let Some(emoji) = self.selected() {
                    self.toggle_favorite(emoji);
                }
            }
            KeyCode::Char('c') => self.dispatch(Action::OpenCollections),
            KeyCode::Char('v') => self.dispatch(Action::OpenFavorites),
            KeyCode::Char('i') => self.dispatch(Action::OpenSuggest),
            KeyCode::Esc => self.dispatch(Action::Back),
            _ => return false,
        }
        true
    }

    /// Recents when there are any to show, else the grid
    fn below_chips(&self) -> Focus {
        if self.recent_items().is_empty() {
            Focus::Grid
        } else {
            Focus::Recents
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Tab {
            self.focus = match self.focus {
                Focus::Input => Focus::Chips,
                Focus::Chips => self.below_chips(),
                Focus::Recents => Focus::Grid,
                Focus::Grid => Focus::Input,
            };
            return;
        }

        match self.focus {
            Focus::Input => match key.code {
                KeyCode::Char(c) => {
                    self.query.push(c);
                    self.cursor = 0;
                }
                KeyCode::Backspace => {
                    self.query.pop();
                    self.cursor = 0;
                }
                KeyCode::Down | KeyCode::Enter => self.focus = Focus::Grid,
                KeyCode::Esc if !self.query.is_empty() => {
                    self.query.clear();
                    self.cursor = 0;
                }
                KeyCode::Esc => self.dispatch(Action::Back),
                _ => {}
            },
            Focus::Chips => match key.code {
                KeyCode::Left => self.chip_cursor = self.chip_cursor.saturating_sub(1),
                KeyCode::Right => self.chip_cursor = (self.chip_cursor + 1).min(Category::ALL.len()),
                KeyCode::Char(' ') | KeyCode::Enter => {
                    match self.chip_cursor.checked_sub(1) {
                        Some(index) => toggle_category(&mut self.categories, Category::ALL[index]),
                        None => self.categories.clear(),
                    }
                    self.cursor = 0;
                }
                KeyCode::Up => self.focus = Focus::Input,
                KeyCode::Down => self.focus = self.below_chips(),
                KeyCode::Esc => self.dispatch(Action::Back),
                _ => {}
            },
            Focus::Recents => self.handle_recents_key(key),
            Focus::Grid => match key.code {
                KeyCode::Char('/') => self.focus = Focus::Input,
                KeyCode::Up if self.cursor < GRID_COLUMNS => {
                    self.focus = if self.recent_items().is_empty() {
                        Focus::Chips
                    } else {
                        Focus::Recents
                    };
                }
                _ => {
                    self.handle_grid_key(key);
                }
            },
        }
    }

    fn handle_recents_key(&mut self, key: KeyEvent) {
        let recents = self.recent_items();
        let Some(last) = recents.len().checked_sub(1) else {
            self.focus = Focus::Grid;
            return;
        };
        self.recent_cursor = self.recent_cursor.min(last);
        let selected = recents[self.recent_cursor];

        match key.code {
            KeyCode::Left => self.recent_cursor = self.recent_cursor.saturating_sub(1),
            KeyCode::Right => self.recent_cursor = (self.recent_cursor + 1).min(last),
            KeyCode::Enter => self.dispatch(Action::SelectEmoji(selected)),
            KeyCode::Char('f') => self.toggle_favorite(selected),
            KeyCode::Up => self.focus = Focus::Chips,
            KeyCode::Down => self.focus = Focus::Grid,
            KeyCode::Char('/') => self.focus = Focus::Input,
            KeyCode::Esc => self.dispatch(Action::Back),
            _ => {}
        }
    }

    fn handle_emoji_key(&mut self, key: KeyEvent, emoji: &'static Emoji) {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => self.dispatch(Action::Back),
            KeyCode::Char('f') => self.toggle_favorite(emoji),
            KeyCode::Char('s') if emoji.has_skin_tone => {
                self.skin_tone = (self.skin_tone + 1) % SKIN_TONES.len();
            }
            KeyCode::Char('s') => {
                self.set_notice(NoticeLevel::Info, format!("{} has no skin tone variants", emoji.name));
            }
            KeyCode::Char('a') => self.dialog = Some(Dialog::AddToCollection { cursor: 0 }),
            _ => {}
        }
    }

    fn handle_collections_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::Enter => {
                if let Some(id) = self.selected_collection().map(|c| c.id.clone()) {
                    self.dispatch(Action::SelectCollection(id));
                }
            }
            KeyCode::Char('n') => {
                self.dialog = Some(Dialog::NewCollection(CollectionForm::default()));
            }
            KeyCode::Char('d') => self.confirm_delete(self.selected_collection().cloned()),
            KeyCode::Char('v') => self.dispatch(Action::OpenFavorites),
            KeyCode::Char('i') => self.dispatch(Action::OpenSuggest),
            KeyCode::Esc => self.dispatch(Action::Back),
            _ => {}
        }
    }

    fn handle_collection_key(&mut self, key: KeyEvent, id: String) {
        match key.code {
            KeyCode::Char('x') => {
                if let Some(emoji) = self.selected() {
                    let result = self.store.remove_from_collection(&id, emoji.codepoint);
                    self.report(result);
                    self.clamp_cursor();
                }
            }
            KeyCode::Char('d') => self.confirm_delete(self.store.collection(&id).cloned()),
            _ => {
                self.handle_grid_key(key);
            }
        }
    }

    fn handle_favorites_key(&mut self, key: KeyEvent) {
        self.handle_grid_key(key);
        self.clamp_cursor();
    }

    fn handle_suggest_key(&mut self, key: KeyEvent) {
        match self.focus {
            Focus::Input | Focus::Chips | Focus::Recents => match key.code {
                KeyCode::Char(c) => self.ai.prompt.push(c),
                KeyCode::Backspace => {
                    self.ai.prompt.pop();
                }
                KeyCode::Enter => self.submit_prompt(),
                KeyCode::Tab | KeyCode::Down => self.focus = Focus::Grid,
                KeyCode::Esc => self.dispatch(Action::Back),
                _ => {}
            },
            Focus::Grid => match key.code {
                KeyCode::Tab | KeyCode::Char('/') => self.focus = Focus::Input,
                KeyCode::Char('m') => self.ai.mode = self.ai.mode.next(),
                KeyCode::Char('e') => {
                    let example = EXAMPLE_PROMPTS[self.ai.next_example % EXAMPLE_PROMPTS.len()];
                    self.ai.next_example += 1;
                    self.ai.prompt = example.to_string();
                    self.focus = Focus::Input;
                }
                _ => {
                    self.handle_grid_key(key);
                }
            },
        }
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        let Some(dialog) = self.dialog.take() else {
            return;
        };

        self.dialog = match dialog {
            Dialog::NewCollection(form) => self.handle_form_key(key, form),
            Dialog::AddToCollection { cursor } => self.handle_picker_key(key, cursor),
            Dialog::ConfirmDelete { id, name } => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    let existed = self.store.collection(&id).is_some();
                    self.dispatch(Action::DeleteCollection(id.clone()));
                    if existed && self.store.collection(&id).is_none() {
                        self.set_notice(NoticeLevel::Success, format!("Deleted \"{name}\""));
                    }
                    self.clamp_cursor();
                    None
                }
                KeyCode::Char('n') | KeyCode::Esc => None,
                _ => Some(Dialog::ConfirmDelete { id, name }),
            },
        };
    }

    fn handle_form_key(&mut self, key: KeyEvent, mut form: CollectionForm) -> Option<Dialog> {
        match (key.code, form.field) {
            (KeyCode::Esc, _) if form.from_picker => {
                return Some(Dialog::AddToCollection { cursor: 0 });
            }
            (KeyCode::Esc, _) => return None,
            (KeyCode::Tab, _) => form.field = form.field.next(),
            (KeyCode::Enter, _) => return self.submit_form(form),
            (KeyCode::Char(c), FormField::Name) => form.name.push(c),
            (KeyCode::Backspace, FormField::Name) => {
                form.name.pop();
            }
            (KeyCode::Left, FormField::Glyph) => {
                form.glyph = (form.glyph + COLLECTION_GLYPHS.len() - 1) % COLLECTION_GLYPHS.len();
            }
            (KeyCode::Right, FormField::Glyph) => {
                form.glyph = (form.glyph + 1) % COLLECTION_GLYPHS.len();
            }
            (KeyCode::Left, FormField::Color) => {
                form.color = (form.color + COLLECTION_COLORS.len() - 1) % COLLECTION_COLORS.len();
            }
            (KeyCode::Right, FormField::Color) => {
                form.color = (form.color + 1) % COLLECTION_COLORS.len();
            }
            _ => {}
        }
        Some(Dialog::NewCollection(form))
    }

    fn submit_form(&mut self, form: CollectionForm) -> Option<Dialog> {
        let created = self.store.create_collection(
            &form.name,
            COLLECTION_GLYPHS[form.glyph % COLLECTION_GLYPHS.len()],
            COLLECTION_COLORS[form.color % COLLECTION_COLORS.len()],
        );

        match created {
            Ok(Some(collection)) => {
                self.set_notice(NoticeLevel::Success, format!("Created \"{}\"", collection.name));
                let position = self.store.collections().len().saturating_sub(1);
                if form.from_picker {
                    Some(Dialog::AddToCollection { cursor: position })
                } else {
                    None
                }
            }
            Ok(None) => {
                self.set_notice(NoticeLevel::Info, "Give the collection a name");
                Some(Dialog::NewCollection(form))
            }
            Err(e) => {
                self.set_notice(NoticeLevel::Error, e.to_string());
                Some(Dialog::NewCollection(form))
            }
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent, cursor: usize) -> Option<Dialog> {
        let count = self.store.collections().len();
        match key.code {
            KeyCode::Up => Some(Dialog::AddToCollection {
                cursor: cursor.saturating_sub(1),
            }),
            KeyCode::Down => Some(Dialog::AddToCollection {
                cursor: (cursor + 1).min(count.saturating_sub(1)),
            }),
            KeyCode::Enter | KeyCode::Char(' ') => {
                let target = self
                    .store
                    .collections()
                    .get(cursor)
                    .map(|c| (c.id.clone(), c.name.clone()));
                if let (Some((id, name)), Some(emoji)) = (target, self.current_emoji()) {
                    match self.store.toggle_collection_member(&id, emoji.codepoint) {
                        Ok(Some(true)) => {
                            self.set_notice(NoticeLevel::Success, format!("Added to \"{name}\""))
                        }
                        Ok(Some(false)) => {
                            self.set_notice(NoticeLevel::Info, format!("Removed from \"{name}\""))
                        }
                        Ok(None) => {}
                        Err(e) => self.set_notice(NoticeLevel::Error, e.to_string()),
                    }
                }
                Some(Dialog::AddToCollection { cursor })
            }
            KeyCode::Char('n') => Some(Dialog::NewCollection(CollectionForm {
                from_picker: true,
                ..CollectionForm::default()
            })),
            KeyCode::Esc => None,
            _ => Some(Dialog::AddToCollection { cursor }),
        }
    }

    fn confirm_delete(&mut self, collection: Option<Collection>) {
        if let Some(collection) = collection {
            self.dialog = Some(Dialog::ConfirmDelete {
                id: collection.id,
                name: collection.name,
            });
        }
    }

    fn toggle_favorite(&mut self, emoji: &'static Emoji) {
        match self.store.toggle_favorite(emoji.codepoint) {
            Ok(true) => self.set_notice(NoticeLevel::Success, format!("Added {} to favorites", emoji.name)),
            Ok(false) => self.set_notice(NoticeLevel::Info, format!("Removed {} from favorites", emoji.name)),
            Err(e) => self.set_notice(NoticeLevel::Error, e.to_string()),
        }
    }

    /// Queues the prompt for the AI worker. Ignored while a request is
    /// outstanding.
    pub fn submit_prompt(&mut self) {
        if self.ai.pending.is_some() {
            return;
        }
        let text = self.ai.prompt.trim().to_string();
        if text.is_empty() {
            self.set_notice(NoticeLevel::Error, "Please enter a prompt");
            return;
        }

        let sender = match &self.ai_link {
            AiLink::Ready(sender) => sender.clone(),
            AiLink::Disabled(reason) => {
                let reason = reason.clone();
                self.set_notice(NoticeLevel::Error, reason);
                return;
            }
        };

        self.next_seq += 1;
        let request = AiRequest {
            seq: self.next_seq,
            mode: self.ai.mode,
            text,
        };
        match sender.try_send(request) {
            Ok(()) => {
                debug!(seq = self.next_seq, mode = %self.ai.mode, "queued ai request");
                self.ai.pending = Some(self.next_seq);
                self.ai.reply = None;
                self.cursor = 0;
            }
            Err(_) => self.set_notice(NoticeLevel::Error, "The AI worker has stopped"),
        }
    }

    /// Applies a worker result if it answers the outstanding request.
    pub fn handle_outcome(&mut self, outcome: &AiOutcome) {
        if self.ai.pending != Some(outcome.seq) || *self.view() != View::Suggest {
            debug!(seq = outcome.seq, "dropping stale ai outcome");
            return;
        }
        self.ai.pending = None;

        match &outcome.result {
            Ok(reply) => {
                let found = reply.emojis().len();
                self.ai.reply = Some(reply.clone());
                self.cursor = 0;
                self.focus = Focus::Grid;
                self.set_notice(NoticeLevel::Success, format!("{found} emoji found"));
            }
            Err(msg) => self.set_notice(NoticeLevel::Error, msg.clone()),
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let step = match self.view() {
            View::Collections => 1,
            _ => GRID_COLUMNS as isize,
        };
        match mouse.kind {
            MouseEventKind::ScrollDown => self.move_cursor(step),
            MouseEventKind::ScrollUp => self.move_cursor(-step),
            _ => {}
        }
    }

    pub fn snapshot(&self, running: bool) -> SessionSnapshot {
        SessionSnapshot {
            running,
            view: self.view().clone(),
            focus: self.focus,
            query: self.query.clone(),
            categories: self.categories.clone(),
            chip_cursor: self.chip_cursor,
            cursor: self.cursor,
            items: self.items(),
            recents: self.recent_items(),
            recent_cursor: self.recent_cursor,
            favorites: self.store.favorites().to_vec(),
            collections: self.store.collections().to_vec(),
            skin_tone: self.skin_tone,
            dialog: self.dialog.clone(),
            ai: self.ai.clone(),
            ai_ready: matches!(self.ai_link, AiLink::Ready(_)),
            notice: self.notice.clone(),
        }
    }
}

/// Owned copy of everything the renderer reads
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub running: bool,
    pub view: View,
    pub focus: Focus,
    pub query: String,
    pub categories: Vec<Category>,
    pub chip_cursor: usize,
    pub cursor: usize,
    pub items: Vec<&'static Emoji>,
    /// Empty unless home is unfiltered
    pub recents: Vec<&'static Emoji>,
    pub recent_cursor: usize,
    pub favorites: Vec<String>,
    pub collections: Vec<Collection>,
    pub skin_tone: usize,
    pub dialog: Option<Dialog>,
    pub ai: AiPanel,
    pub ai_ready: bool,
    pub notice: Option<Notice>,
}

impl SessionSnapshot {
    pub fn is_favorite(&self, codepoint: &str) -> bool {
        self.favorites.iter().any(|cp| cp == codepoint)
    }

    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ai::Suggestion,
        router::Origin,
        store::MemoryStore,
    };
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn press(session: &mut Session, codes: &[KeyCode]) {
        for code in codes {
            session.handle_key(key(*code));
        }
    }

    fn type_text(session: &mut Session, text: &str) {
        for c in text.chars() {
            session.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn session_at(view: View) -> Session {
        let store = UserStore::open(Box::new(MemoryStore::new()) as Box<dyn KvStore>);
        Session::new(Catalog::builtin(), store, view)
    }

    #[test]
    fn test_landing_to_home_and_search() {
        let mut session = session_at(View::Landing);
        press(&mut session, &[KeyCode::Enter]);
        assert_eq!(session.view(), &View::Home);
        assert_eq!(session.focus, Focus::Input);

        type_text(&mut session, "koala");
        let names: Vec<_> = session.items().iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Koala"]);

        press(&mut session, &[KeyCode::Esc]);
        assert!(session.query.is_empty());
        press(&mut session, &[KeyCode::Esc]);
        assert_eq!(session.view(), &View::Landing);
    }

    #[test]
    fn test_category_chips() {
        let mut session = session_at(View::Home);
        press(&mut session, &[KeyCode::Tab, KeyCode::Right, KeyCode::Right, KeyCode::Enter]);
        assert_eq!(session.categories, vec![Category::Gestures]);
        assert!(session.items().iter().all(|e| e.category == Category::Gestures));

        press(&mut session, &[KeyCode::Left, KeyCode::Left, KeyCode::Enter]);
        assert!(session.categories.is_empty());
    }

    #[test]
    fn test_open_emoji_favorite_and_back() {
        let mut session = session_at(View::Home);
        press(&mut session, &[KeyCode::Tab, KeyCode::Tab]);
        assert_eq!(session.focus, Focus::Grid);

        press(&mut session, &[KeyCode::Right, KeyCode::Enter]);
        let second = &Catalog::builtin().all()[1];
        assert_eq!(
            session.view(),
            &View::Emoji {
                emoji: second,
                origin: Origin::Home
            }
        );
        assert_eq!(session.store().recents(), [second.codepoint.to_string()].as_slice());

        press(&mut session, &[KeyCode::Char('f')]);
        assert!(session.store().is_favorite(second.codepoint));
        assert_eq!(session.notice().map(|n| n.level), Some(NoticeLevel::Success));

        session.mark_rendered();
        press(&mut session, &[KeyCode::Esc]);
        assert_eq!(session.view(), &View::Home);
        assert_eq!(session.notice(), None);
    }

    #[test]
    fn test_open_emoji_from_recents() {
        let catalog = Catalog::builtin();
        let pizza = catalog.find("U+1F355").unwrap();
        let mut session = session_at(View::Home);
        session.store.record_recent("U+1F355").unwrap();
        session.store.record_recent("U+1F525").unwrap();

        press(&mut session, &[KeyCode::Tab, KeyCode::Tab]);
        assert_eq!(session.focus, Focus::Recents);

        press(&mut session, &[KeyCode::Right, KeyCode::Enter]);
        assert_eq!(
            session.view(),
            &View::Emoji {
                emoji: pizza,
                origin: Origin::Home
            }
        );
        assert_eq!(session.store().recents()[0], "U+1F355");

        press(&mut session, &[KeyCode::Esc]);
        assert_eq!(session.view(), &View::Home);
        assert_eq!(session.snapshot(true).recents.len(), 2);
    }

    #[test]
    fn test_recents_hidden_while_filtering() {
        let mut session = session_at(View::Home);
        session.store.record_recent("U+1F355").unwrap();

        type_text(&mut session, "koala");
        assert!(session.snapshot(true).recents.is_empty());

        press(&mut session, &[KeyCode::Esc]);
        assert_eq!(session.snapshot(true).recents.len(), 1);

        press(&mut session, &[KeyCode::Tab, KeyCode::Right, KeyCode::Enter]);
        assert_eq!(session.categories, vec![Category::Smileys]);
        assert!(session.snapshot(true).recents.is_empty());

        // The hidden row is skipped in the focus cycle.
        press(&mut session, &[KeyCode::Tab]);
        assert_eq!(session.focus, Focus::Grid);
    }

    #[test]
    fn test_skin_tone_cycles_only_when_supported() {
        let catalog = Catalog::builtin();
        let wave = catalog.all().iter().find(|e| e.has_skin_tone).unwrap();
        let mut session = session_at(View::Home);
        session.dispatch(Action::SelectEmoji(wave));

        press(&mut session, &[KeyCode::Char('s'), KeyCode::Char('s')]);
        assert_eq!(session.skin_tone, 2);

        let grin = catalog.find("U+1F600").unwrap();
        session.dispatch(Action::Back);
        session.dispatch(Action::SelectEmoji(grin));
        press(&mut session, &[KeyCode::Char('s')]);
        assert_eq!(session.skin_tone, 0);
        assert_eq!(session.notice().map(|n| n.level), Some(NoticeLevel::Info));
    }

    #[test]
    fn test_create_collection_from_picker_and_add() {
        let pizza = Catalog::builtin().find("U+1F355").unwrap();
        let mut session = session_at(View::Home);
        session.dispatch(Action::SelectEmoji(pizza));

        press(&mut session, &[KeyCode::Char('a'), KeyCode::Char('n')]);
        assert!(matches!(session.dialog, Some(Dialog::NewCollection(_))));

        press(&mut session, &[KeyCode::Enter]);
        assert!(session.store().collections().is_empty());
        assert!(matches!(session.dialog, Some(Dialog::NewCollection(_))));

        type_text(&mut session, "Food");
        press(&mut session, &[KeyCode::Tab, KeyCode::Right, KeyCode::Enter]);
        assert_eq!(session.store().collections().len(), 1);
        assert_eq!(session.store().collections()[0].emoji, COLLECTION_GLYPHS[1]);
        assert_eq!(session.dialog, Some(Dialog::AddToCollection { cursor: 0 }));

        press(&mut session, &[KeyCode::Enter]);
        assert!(session.store().collections()[0].contains("U+1F355"));
        press(&mut session, &[KeyCode::Char(' ')]);
        assert!(!session.store().collections()[0].contains("U+1F355"));

        press(&mut session, &[KeyCode::Esc]);
        assert_eq!(session.dialog, None);
    }

    #[test]
    fn test_delete_collection_while_viewing() {
        let mut session = session_at(View::Collections);
        press(&mut session, &[KeyCode::Char('n')]);
        type_text(&mut session, "Work");
        press(&mut session, &[KeyCode::Enter]);
        assert_eq!(session.store().collections().len(), 1);

        press(&mut session, &[KeyCode::Enter]);
        assert!(matches!(session.view(), View::Collection { .. }));

        press(&mut session, &[KeyCode::Char('d'), KeyCode::Char('n')]);
        assert_eq!(session.store().collections().len(), 1);

        press(&mut session, &[KeyCode::Char('d'), KeyCode::Char('y')]);
        assert_eq!(session.view(), &View::Collections);
        assert!(session.store().collections().is_empty());
        assert_eq!(session.notice().map(|n| n.level), Some(NoticeLevel::Success));
    }

    #[test]
    fn test_unfavorite_from_favorites_clamps_cursor() {
        let mut session = session_at(View::Favorites);
        session.store.toggle_favorite("U+1F600").unwrap();
        session.store.toggle_favorite("U+1F525").unwrap();

        press(&mut session, &[KeyCode::Right, KeyCode::Char('f')]);
        assert_eq!(session.store().favorites(), ["U+1F600".to_string()].as_slice());
        assert_eq!(session.cursor, 0);
    }

    #[test]
    fn test_submit_requires_prompt_and_link() {
        let mut session = session_at(View::Suggest);
        press(&mut session, &[KeyCode::Enter]);
        assert_eq!(
            session.notice().map(|n| n.text.as_str()),
            Some("Please enter a prompt")
        );

        type_text(&mut session, "hello");
        press(&mut session, &[KeyCode::Enter]);
        assert_eq!(session.ai.pending, None);
        assert_eq!(session.notice().map(|n| n.level), Some(NoticeLevel::Error));
    }

    fn suggest_session() -> (Session, async_channel::Receiver<AiRequest>) {
        let (tx, rx) = async_channel::unbounded();
        let session = session_at(View::Suggest).with_ai(AiLink::Ready(tx));
        (session, rx)
    }

    fn reply_for(codepoint: &str) -> AiReply {
        AiReply::Suggestions(vec![Suggestion {
            emoji: Catalog::builtin().find(codepoint).unwrap(),
            reason: "fits".into(),
            relevance: 9,
        }])
    }

    #[test]
    fn test_ai_round_trip() {
        let (mut session, rx) = suggest_session();
        type_text(&mut session, "Late night coding session");
        press(&mut session, &[KeyCode::Enter]);

        let request = rx.try_recv().unwrap();
        assert_eq!(request.seq, 1);
        assert_eq!(request.text, "Late night coding session");
        assert_eq!(session.ai.pending, Some(1));

        // Submit is ignored while the request is outstanding.
        press(&mut session, &[KeyCode::Enter]);
        assert!(rx.try_recv().is_err());

        session.handle_outcome(&AiOutcome {
            seq: 1,
            result: Ok(reply_for("U+1F4BB")),
        });
        assert_eq!(session.ai.pending, None);
        assert_eq!(session.focus, Focus::Grid);
        assert_eq!(session.items()[0].name, "Laptop");

        press(&mut session, &[KeyCode::Enter]);
        assert!(matches!(session.view(), View::Emoji { origin: Origin::Suggest, .. }));
        press(&mut session, &[KeyCode::Esc]);
        assert_eq!(session.view(), &View::Suggest);
        assert_eq!(session.items()[0].name, "Laptop");
    }

    #[test]
    fn test_stale_and_late_outcomes_are_ignored() {
        let (mut session, rx) = suggest_session();
        type_text(&mut session, "party");
        press(&mut session, &[KeyCode::Enter]);
        let request = rx.try_recv().unwrap();

        session.handle_outcome(&AiOutcome {
            seq: request.seq + 1,
            result: Ok(reply_for("U+1F600")),
        });
        assert_eq!(session.ai.reply, None);
        assert_eq!(session.ai.pending, Some(request.seq));

        press(&mut session, &[KeyCode::Esc]);
        assert_eq!(session.view(), &View::Home);
        session.dispatch(Action::OpenSuggest);
        session.handle_outcome(&AiOutcome {
            seq: request.seq,
            result: Ok(reply_for("U+1F600")),
        });
        assert_eq!(session.ai.reply, None);
    }

    #[test]
    fn test_failed_outcome_becomes_notice() {
        let (mut session, rx) = suggest_session();
        type_text(&mut session, "rainy day");
        press(&mut session, &[KeyCode::Enter]);
        let request = rx.try_recv().unwrap();

        session.handle_outcome(&AiOutcome {
            seq: request.seq,
            result: Err("Network error: timed out".into()),
        });
        let notice = session.notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.text.contains("timed out"));
        assert_eq!(session.ai.pending, None);
    }

    #[test]
    fn test_mode_and_examples() {
        let mut session = session_at(View::Suggest);
        press(&mut session, &[KeyCode::Tab, KeyCode::Char('m')]);
        assert_eq!(session.ai.mode, Mode::Sentiment);

        press(&mut session, &[KeyCode::Char('e')]);
        assert_eq!(session.ai.prompt, EXAMPLE_PROMPTS[0]);
        assert_eq!(session.focus, Focus::Input);
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let mut session = session_at(View::Suggest);
        let flow = session.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(flow, Flow::Quit);
        assert!(session.ai.prompt.is_empty());
    }

    #[test]
    fn test_snapshot_reflects_store() {
        let mut session = session_at(View::Home);
        session.store.toggle_favorite("U+1F525").unwrap();
        session.store.record_recent("U+1F355").unwrap();

        let snapshot = session.snapshot(true);
        assert!(snapshot.running);
        assert!(snapshot.is_favorite("U+1F525"));
        assert_eq!(snapshot.recents.len(), 1);
        assert_eq!(snapshot.items.len(), Catalog::builtin().len());
    }
}
