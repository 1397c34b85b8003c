//! View routing.
//!
//! Exactly one [`View`] is active. [`Router::dispatch`] applies an [`Action`];
//! actions that are not valid for the active view are ignored.

use tracing::debug;

use crate::{
    catalog::Emoji,
    error::EmojidexResult,
    store::{KvStore, UserStore},
};

/// The view an emoji detail page was opened from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Home,
    Favorites,
    Collection(String),
    Suggest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Landing,
    Home,
    Emoji {
        emoji: &'static Emoji,
        origin: Origin,
    },
    Collections,
    /// Holds the id only; membership is read from the store on render
    Collection {
        id: String,
    },
    Favorites,
    Suggest,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Landing => "Welcome",
            View::Home => "Browse",
            View::Emoji { .. } => "Emoji",
            View::Collections => "Collections",
            View::Collection { .. } => "Collection",
            View::Favorites => "Favorites",
            View::Suggest => "AI Suggestions",
        }
    }

    /// Views that list emoji and can open a detail page
    fn as_origin(&self) -> Option<Origin> {
        match self {
            View::Home => Some(Origin::Home),
            View::Favorites => Some(Origin::Favorites),
            View::Collection { id } => Some(Origin::Collection(id.clone())),
            View::Suggest => Some(Origin::Suggest),
            View::Landing | View::Emoji { .. } | View::Collections => None,
        }
    }

    fn is_hub(&self) -> bool {
        matches!(
            self,
            View::Home | View::Favorites | View::Collections | View::Suggest
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    GetStarted,
    SelectEmoji(&'static Emoji),
    Back,
    OpenCollections,
    OpenFavorites,
    OpenSuggest,
    SelectCollection(String),
    DeleteCollection(String),
}

#[derive(Debug, Clone)]
pub struct Router {
    view: View,
}

impl Router {
    pub fn new() -> Self {
        Self::starting_at(View::Landing)
    }

    pub fn starting_at(view: View) -> Self {
        Self { view }
    }

    pub fn current(&self) -> &View {
        &self.view
    }

    /// Applies `action`. Returns whether the view changed.
    ///
    /// Selecting an emoji records it as recent; the view changes even if that
    /// write fails, in which case the error is returned.
    pub fn dispatch<K: KvStore>(
        &mut self,
        action: Action,
        store: &mut UserStore<K>,
    ) -> EmojidexResult<bool> {
        let next = match (self.view.clone(), action) {
            (View::Landing, Action::GetStarted) => View::Home,

            (current, Action::SelectEmoji(emoji)) => {
                let Some(origin) = current.as_origin() else {
                    return Ok(false);
                };
                self.go(View::Emoji { emoji, origin });
                store.record_recent(emoji.codepoint)?;
                return Ok(true);
            }

            (View::Emoji { origin, .. }, Action::Back) => match origin {
                Origin::Home => View::Home,
                Origin::Favorites => View::Favorites,
                Origin::Suggest => View::Suggest,
                Origin::Collection(id) if store.collection(&id).is_some() => {
                    View::Collection { id }
                }
                Origin::Collection(_) => View::Collections,
            },
            (View::Collection { .. }, Action::Back) => View::Collections,
            (View::Favorites | View::Collections | View::Suggest, Action::Back) => View::Home,
            (View::Home, Action::Back) => View::Landing,

            (current, Action::OpenCollections) if current.is_hub() => View::Collections,
            (current, Action::OpenFavorites) if current.is_hub() => View::Favorites,
            (current, Action::OpenSuggest) if current.is_hub() => View::Suggest,

            (View::Collections, Action::SelectCollection(id))
                if store.collection(&id).is_some() =>
            {
                View::Collection { id }
            }

            (View::Collection { id: open }, Action::DeleteCollection(id)) if open == id => {
                store.delete_collection(&id)?;
                View::Collections
            }
            (View::Collections, Action::DeleteCollection(id)) => {
                return store.delete_collection(&id).map(|_| false);
            }

            _ => return Ok(false),
        };

        self.go(next);
        Ok(true)
    }

    fn go(&mut self, next: View) {
        debug!(from = self.view.title(), to = next.title(), "view transition");
        self.view = next;
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::Catalog, store::MemoryStore};
    use pretty_assertions::assert_eq;

    fn emoji(codepoint: &str) -> &'static Emoji {
        Catalog::builtin().find(codepoint).unwrap()
    }

    fn setup() -> (Router, UserStore<MemoryStore>) {
        (Router::new(), UserStore::open(MemoryStore::new()))
    }

    #[test]
    fn test_initial_view_is_landing() {
        assert_eq!(Router::new().current(), &View::Landing);
    }

    #[test]
    fn test_get_started_then_select_emoji_records_recent() {
        let (mut router, mut store) = setup();
        assert!(router.dispatch(Action::GetStarted, &mut store).unwrap());
        assert_eq!(router.current(), &View::Home);

        let pizza = emoji("U+1F355");
        assert!(router.dispatch(Action::SelectEmoji(pizza), &mut store).unwrap());
        assert_eq!(
            router.current(),
            &View::Emoji {
                emoji: pizza,
                origin: Origin::Home
            }
        );
        assert_eq!(store.recents(), ["U+1F355".to_string()].as_slice());

        assert!(router.dispatch(Action::Back, &mut store).unwrap());
        assert_eq!(router.current(), &View::Home);
    }

    #[test]
    fn test_back_returns_to_opener() {
        let (_, mut store) = setup();
        let mut router = Router::starting_at(View::Favorites);

        router.dispatch(Action::SelectEmoji(emoji("U+2764")), &mut store).unwrap();
        router.dispatch(Action::Back, &mut store).unwrap();
        assert_eq!(router.current(), &View::Favorites);
    }

    #[test]
    fn test_collection_navigation_and_delete_while_viewing() {
        let (_, mut store) = setup();
        let work = store.create_collection("Work", "💼", "#000").unwrap().unwrap();
        store.toggle_favorite("U+1F4BB").unwrap();
        let mut router = Router::starting_at(View::Home);

        router.dispatch(Action::OpenCollections, &mut store).unwrap();
        assert_eq!(router.current(), &View::Collections);

        router
            .dispatch(Action::SelectCollection(work.id.clone()), &mut store)
            .unwrap();
        assert_eq!(router.current(), &View::Collection { id: work.id.clone() });

        router
            .dispatch(Action::DeleteCollection(work.id.clone()), &mut store)
            .unwrap();
        assert_eq!(router.current(), &View::Collections);
        assert!(store.collections().is_empty());
        assert_eq!(store.favorites(), ["U+1F4BB".to_string()].as_slice());

        router.dispatch(Action::Back, &mut store).unwrap();
        assert_eq!(router.current(), &View::Home);
    }

    #[test]
    fn test_back_to_deleted_collection_falls_back_to_index() {
        let (_, mut store) = setup();
        let work = store.create_collection("Work", "💼", "#000").unwrap().unwrap();
        let mut router = Router::starting_at(View::Collection { id: work.id.clone() });

        router.dispatch(Action::SelectEmoji(emoji("U+1F4BB")), &mut store).unwrap();
        store.delete_collection(&work.id).unwrap();
        router.dispatch(Action::Back, &mut store).unwrap();
        assert_eq!(router.current(), &View::Collections);
    }

    #[test]
    fn test_invalid_actions_are_ignored() {
        let (mut router, mut store) = setup();

        assert!(!router.dispatch(Action::Back, &mut store).unwrap());
        assert!(!router
            .dispatch(Action::SelectEmoji(emoji("U+1F600")), &mut store)
            .unwrap());
        assert!(!router.dispatch(Action::OpenFavorites, &mut store).unwrap());
        assert!(!router
            .dispatch(Action::SelectCollection("missing".into()), &mut store)
            .unwrap());
        assert_eq!(router.current(), &View::Landing);
        assert!(store.recents().is_empty());
    }

    #[test]
    fn test_unknown_collection_cannot_be_opened() {
        let (_, mut store) = setup();
        let mut router = Router::starting_at(View::Collections);
        assert!(!router
            .dispatch(Action::SelectCollection("missing".into()), &mut store)
            .unwrap());
        assert_eq!(router.current(), &View::Collections);
    }

    #[test]
    fn test_suggest_round_trip() {
        let (_, mut store) = setup();
        let mut router = Router::starting_at(View::Home);

        router.dispatch(Action::OpenSuggest, &mut store).unwrap();
        assert_eq!(router.current(), &View::Suggest);

        router.dispatch(Action::SelectEmoji(emoji("U+1F382")), &mut store).unwrap();
        router.dispatch(Action::Back, &mut store).unwrap();
        assert_eq!(router.current(), &View::Suggest);

        router.dispatch(Action::Back, &mut store).unwrap();
        assert_eq!(router.current(), &View::Home);
    }

    #[test]
    fn test_delete_from_index_stays_on_index() {
        let (_, mut store) = setup();
        let work = store.create_collection("Work", "💼", "#000").unwrap().unwrap();
        let mut router = Router::starting_at(View::Collections);

        assert!(!router
            .dispatch(Action::DeleteCollection(work.id), &mut store)
            .unwrap());
        assert_eq!(router.current(), &View::Collections);
        assert!(store.collections().is_empty());
    }
}
