//! Static emoji dataset.
//!
//! The catalog is immutable and shared by every other component. Records are
//! keyed by their codepoint string (`U+XXXX`).

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::EmojidexError;

/// Closed set of catalog categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    Smileys,
    Gestures,
    Animals,
    Food,
    Travel,
    Activities,
    Objects,
    Symbols,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Smileys,
        Category::Gestures,
        Category::Animals,
        Category::Food,
        Category::Travel,
        Category::Activities,
        Category::Objects,
        Category::Symbols,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Smileys => "Smileys",
            Category::Gestures => "Gestures",
            Category::Animals => "Animals",
            Category::Food => "Food",
            Category::Travel => "Travel",
            Category::Activities => "Activities",
            Category::Objects => "Objects",
            Category::Symbols => "Symbols",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = EmojidexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EmojidexError::invalid_input(s, "unknown category"))
    }
}

/// How one vendor renders an emoji.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmojiDesign {
    pub platform: &'static str,
    pub image: &'static str,
}

/// A single catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Emoji {
    pub glyph: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub keywords: &'static [&'static str],
    pub codepoint: &'static str,
    pub has_skin_tone: bool,
    pub meaning: Option<&'static str>,
    pub designs: &'static [EmojiDesign],
    pub unicode_name: Option<&'static str>,
    pub vendor_name: Option<&'static str>,
    pub also_known_as: Option<&'static str>,
    pub shortcode: Option<&'static str>,
    pub proposal: Option<&'static str>,
}

impl Emoji {
    pub const fn new(
        glyph: &'static str,
        name: &'static str,
        category: Category,
        keywords: &'static [&'static str],
        codepoint: &'static str,
    ) -> Self {
        Self {
            glyph,
            name,
            category,
            keywords,
            codepoint,
            has_skin_tone: false,
            meaning: None,
            designs: &[],
            unicode_name: None,
            vendor_name: None,
            also_known_as: None,
            shortcode: None,
            proposal: None,
        }
    }

    const fn skin_tones(self) -> Self {
        Self {
            has_skin_tone: true,
            ..self
        }
    }

    /// Glyph with the given skin tone applied. Emoji without skin tone support
    /// ignore the selection.
    pub fn glyph_with_tone(&self, tone: &SkinTone) -> String {
        if self.has_skin_tone {
            format!("{}{}", self.glyph, tone.modifier)
        } else {
            self.glyph.to_string()
        }
    }
}

/// A skin tone modifier suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkinTone {
    pub label: &'static str,
    pub modifier: &'static str,
}

pub const SKIN_TONES: [SkinTone; 6] = [
    SkinTone { label: "Default", modifier: "" },
    SkinTone { label: "Light", modifier: "\u{1F3FB}" },
    SkinTone { label: "Medium-Light", modifier: "\u{1F3FC}" },
    SkinTone { label: "Medium", modifier: "\u{1F3FD}" },
    SkinTone { label: "Medium-Dark", modifier: "\u{1F3FE}" },
    SkinTone { label: "Dark", modifier: "\u{1F3FF}" },
];

/// Read-only view over a static emoji list.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    emojis: &'static [Emoji],
}

impl Catalog {
    pub const fn new(emojis: &'static [Emoji]) -> Self {
        Self { emojis }
    }

    /// The bundled dataset
    pub const fn builtin() -> Self {
        Self::new(EMOJIS)
    }

    pub fn all(&self) -> &'static [Emoji] {
        self.emojis
    }

    pub fn len(&self) -> usize {
        self.emojis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emojis.is_empty()
    }

    pub fn find(&self, codepoint: &str) -> Option<&'static Emoji> {
        self.emojis.iter().find(|e| e.codepoint == codepoint)
    }

    /// Maps codepoints to records in the given order, skipping stale entries.
    pub fn resolve<S: AsRef<str>>(&self, codepoints: &[S]) -> Vec<&'static Emoji> {
        codepoints
            .iter()
            .filter_map(|cp| self.find(cp.as_ref()))
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

use Category::*;

pub static EMOJIS: &[Emoji] = &[
    Emoji {
        has_skin_tone: false,
        meaning: Some(
            "A classic happy face expressing joy, excitement, or general positivity. \
             Often used to convey cheerfulness or friendliness in conversations.",
        ),
        designs: &[
            EmojiDesign { platform: "Apple", image: "😀" },
            EmojiDesign { platform: "Google", image: "😀" },
            EmojiDesign { platform: "Samsung", image: "😀" },
            EmojiDesign { platform: "Microsoft", image: "😀" },
            EmojiDesign { platform: "Twitter", image: "😀" },
            EmojiDesign { platform: "Facebook", image: "😀" },
        ],
        unicode_name: Some("GRINNING FACE"),
        vendor_name: Some("Grinning Face"),
        also_known_as: Some("Happy Face, Smiley Face"),
        shortcode: Some(":grinning:"),
        proposal: Some("Unicode 6.1 (2012)"),
        ..Emoji::new("😀", "Grinning Face", Smileys, &["smile", "happy", "joy"], "U+1F600")
    },
    Emoji::new("😃", "Grinning Face with Big Eyes", Smileys, &["smile", "happy"], "U+1F603"),
    Emoji::new("😄", "Grinning Face with Smiling Eyes", Smileys, &["smile", "happy", "joy"], "U+1F604"),
    Emoji::new("😁", "Beaming Face with Smiling Eyes", Smileys, &["smile", "happy"], "U+1F601"),
    Emoji::new("😊", "Smiling Face with Smiling Eyes", Smileys, &["smile", "blush"], "U+1F60A"),
    Emoji::new("😍", "Smiling Face with Heart-Eyes", Smileys, &["love", "heart", "like"], "U+1F60D"),
    Emoji::new("🥰", "Smiling Face with Hearts", Smileys, &["love", "like", "affection"], "U+1F970"),
    Emoji::new("😘", "Face Blowing a Kiss", Smileys, &["kiss", "love"], "U+1F618"),
    Emoji::new("😂", "Face with Tears of Joy", Smileys, &["laugh", "lol", "funny"], "U+1F602"),
    Emoji::new("🤣", "Rolling on the Floor Laughing", Smileys, &["laugh", "lol", "rofl"], "U+1F923"),
    Emoji::new("😎", "Smiling Face with Sunglasses", Smileys, &["cool", "swagger"], "U+1F60E"),
    Emoji::new("🤔", "Thinking Face", Smileys, &["think", "hmm", "consider"], "U+1F914"),
    Emoji::new("😴", "Sleeping Face", Smileys, &["sleep", "zzz", "tired"], "U+1F634"),
    Emoji::new("😢", "Crying Face", Smileys, &["sad", "cry", "tear"], "U+1F622"),
    Emoji::new("😭", "Loudly Crying Face", Smileys, &["cry", "sad", "tears"], "U+1F62D"),
    Emoji::new("😱", "Face Screaming in Fear", Smileys, &["scared", "shock", "scream"], "U+1F631"),
    Emoji::new("🤯", "Exploding Head", Smileys, &["mind blown", "shock"], "U+1F92F"),
    Emoji::new("😡", "Enraged Face", Smileys, &["angry", "mad", "rage"], "U+1F621"),
    Emoji::new("👍", "Thumbs Up", Gestures, &["like", "yes", "approve"], "U+1F44D").skin_tones(),
    Emoji::new("👎", "Thumbs Down", Gestures, &["dislike", "no"], "U+1F44E").skin_tones(),
    Emoji::new("👋", "Waving Hand", Gestures, &["hello", "hi", "bye"], "U+1F44B").skin_tones(),
    Emoji::new("🤚", "Raised Back of Hand", Gestures, &["hand", "stop"], "U+1F91A").skin_tones(),
    Emoji::new("✋", "Raised Hand", Gestures, &["hand", "stop", "high five"], "U+270B").skin_tones(),
    Emoji::new("🙏", "Folded Hands", Gestures, &["pray", "thanks", "please"], "U+1F64F").skin_tones(),
    Emoji::new("💪", "Flexed Biceps", Gestures, &["strong", "muscle", "power"], "U+1F4AA").skin_tones(),
    Emoji::new("🤝", "Handshake", Gestures, &["deal", "agreement", "shake"], "U+1F91D"),
    Emoji::new("🐶", "Dog Face", Animals, &["dog", "puppy", "pet"], "U+1F436"),
    Emoji::new("🐱", "Cat Face", Animals, &["cat", "kitten", "pet"], "U+1F431"),
    Emoji::new("🐭", "Mouse Face", Animals, &["mouse", "rodent"], "U+1F42D"),
    Emoji::new("🐰", "Rabbit Face", Animals, &["bunny", "rabbit"], "U+1F430"),
    Emoji::new("🦊", "Fox", Animals, &["fox", "animal"], "U+1F98A"),
    Emoji::new("🐻", "Bear", Animals, &["bear", "animal"], "U+1F43B"),
    Emoji::new("🐼", "Panda", Animals, &["panda", "bear"], "U+1F43C"),
    Emoji::new("🐨", "Koala", Animals, &["koala", "bear"], "U+1F428"),
    Emoji::new("🐯", "Tiger Face", Animals, &["tiger", "cat"], "U+1F42F"),
    Emoji::new("🦁", "Lion", Animals, &["lion", "king"], "U+1F981"),
    Emoji::new("🍕", "Pizza", Food, &["pizza", "food", "italian"], "U+1F355"),
    Emoji::new("🍔", "Hamburger", Food, &["burger", "food", "fast food"], "U+1F354"),
    Emoji::new("🍟", "French Fries", Food, &["fries", "food"], "U+1F35F"),
    Emoji::new("🌭", "Hot Dog", Food, &["hotdog", "food"], "U+1F32D"),
    Emoji::new("🍿", "Popcorn", Food, &["popcorn", "snack", "movie"], "U+1F37F"),
    Emoji::new("🍩", "Doughnut", Food, &["donut", "sweet", "dessert"], "U+1F369"),
    Emoji::new("🍪", "Cookie", Food, &["cookie", "sweet"], "U+1F36A"),
    Emoji::new("🎂", "Birthday Cake", Food, &["cake", "birthday"], "U+1F382"),
    Emoji::new("🍰", "Shortcake", Food, &["cake", "dessert"], "U+1F370"),
    Emoji::new("🍫", "Chocolate Bar", Food, &["chocolate", "sweet"], "U+1F36B"),
    Emoji::new("✈️", "Airplane", Travel, &["plane", "travel", "fly"], "U+2708"),
    Emoji::new("🚗", "Automobile", Travel, &["car", "vehicle"], "U+1F697"),
    Emoji::new("🚕", "Taxi", Travel, &["taxi", "car"], "U+1F695"),
    Emoji::new("🚙", "Sport Utility Vehicle", Travel, &["suv", "car"], "U+1F699"),
    Emoji::new("🚌", "Bus", Travel, &["bus", "vehicle"], "U+1F68C"),
    Emoji::new("🚂", "Locomotive", Travel, &["train", "locomotive"], "U+1F682"),
    Emoji::new("🚢", "Ship", Travel, &["ship", "boat"], "U+1F6A2"),
    Emoji::new("🏠", "House", Travel, &["home", "house"], "U+1F3E0"),
    Emoji::new("🏨", "Hotel", Travel, &["hotel", "building"], "U+1F3E8"),
    Emoji::new("🏖️", "Beach with Umbrella", Travel, &["beach", "vacation"], "U+1F3D6"),
    Emoji::new("⚽", "Soccer Ball", Activities, &["soccer", "football", "sport"], "U+26BD"),
    Emoji::new("🏀", "Basketball", Activities, &["basketball", "sport"], "U+1F3C0"),
    Emoji::new("🏈", "American Football", Activities, &["football", "sport"], "U+1F3C8"),
    Emoji::new("⚾", "Baseball", Activities, &["baseball", "sport"], "U+26BE"),
    Emoji::new("🎮", "Video Game", Activities, &["game", "gaming", "controller"], "U+1F3AE"),
    Emoji::new("🎯", "Bullseye", Activities, &["target", "goal", "dart"], "U+1F3AF"),
    Emoji::new("🎨", "Artist Palette", Activities, &["art", "paint", "creative"], "U+1F3A8"),
    Emoji::new("🎬", "Clapper Board", Activities, &["movie", "film"], "U+1F3AC"),
    Emoji::new("🎵", "Musical Note", Activities, &["music", "note"], "U+1F3B5"),
    Emoji::new("🎸", "Guitar", Activities, &["guitar", "music"], "U+1F3B8"),
    Emoji::new("💻", "Laptop", Objects, &["computer", "laptop", "tech"], "U+1F4BB"),
    Emoji::new("📱", "Mobile Phone", Objects, &["phone", "mobile", "smartphone"], "U+1F4F1"),
    Emoji::new("⌚", "Watch", Objects, &["watch", "time"], "U+231A"),
    Emoji::new("📷", "Camera", Objects, &["camera", "photo"], "U+1F4F7"),
    Emoji::new("💡", "Light Bulb", Objects, &["idea", "light", "bulb"], "U+1F4A1"),
    Emoji::new("📚", "Books", Objects, &["books", "reading"], "U+1F4DA"),
    Emoji::new("✏️", "Pencil", Objects, &["pencil", "write"], "U+270F"),
    Emoji::new("🔑", "Key", Objects, &["key", "unlock"], "U+1F511"),
    Emoji::new("🎁", "Wrapped Gift", Objects, &["gift", "present"], "U+1F381"),
    Emoji::new("🔔", "Bell", Objects, &["bell", "notification"], "U+1F514"),
    Emoji::new("❤️", "Red Heart", Symbols, &["heart", "love"], "U+2764"),
    Emoji::new("💙", "Blue Heart", Symbols, &["heart", "love", "blue"], "U+1F499"),
    Emoji::new("💚", "Green Heart", Symbols, &["heart", "love", "green"], "U+1F49A"),
    Emoji::new("💛", "Yellow Heart", Symbols, &["heart", "love", "yellow"], "U+1F49B"),
    Emoji::new("🔥", "Fire", Symbols, &["fire", "hot", "flame"], "U+1F525"),
    Emoji::new("⭐", "Star", Symbols, &["star", "favorite"], "U+2B50"),
    Emoji::new("✨", "Sparkles", Symbols, &["sparkle", "shine"], "U+2728"),
    Emoji::new("💯", "Hundred Points", Symbols, &["100", "perfect"], "U+1F4AF"),
    Emoji::new("✅", "Check Mark Button", Symbols, &["check", "done", "yes"], "U+2705"),
    Emoji::new("❌", "Cross Mark", Symbols, &["x", "no", "wrong"], "U+274C"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn test_codepoints_are_unique() {
        let catalog = Catalog::builtin();
        let unique: HashSet<_> = catalog.all().iter().map(|e| e.codepoint).collect();
        assert_eq!(unique.len(), catalog.len());
    }

    #[test]
    fn test_codepoint_format() {
        for emoji in Catalog::builtin().all() {
            let hex = emoji.codepoint.strip_prefix("U+").expect("U+ prefix");
            assert!(u32::from_str_radix(hex, 16).is_ok(), "{}", emoji.codepoint);
        }
    }

    #[test]
    fn test_every_category_is_populated() {
        let catalog = Catalog::builtin();
        for category in Category::ALL {
            assert!(catalog.all().iter().any(|e| e.category == category));
        }
    }

    #[test]
    fn test_resolve_skips_stale_codepoints() {
        let catalog = Catalog::builtin();
        let resolved = catalog.resolve(&["U+1F355", "U+0000", "U+1F600"]);
        let names: Vec<_> = resolved.iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Pizza", "Grinning Face"]);
    }

    #[test]
    fn test_skin_tone_applies_only_when_supported() {
        let catalog = Catalog::builtin();
        let thumbs = catalog.find("U+1F44D").unwrap();
        let dog = catalog.find("U+1F436").unwrap();
        let dark = &SKIN_TONES[5];

        assert_eq!(thumbs.glyph_with_tone(dark), "👍\u{1F3FF}");
        assert_eq!(dog.glyph_with_tone(dark), "🐶");
        assert_eq!(thumbs.glyph_with_tone(&SKIN_TONES[0]), "👍");
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("food".parse::<Category>().unwrap(), Category::Food);
        assert_eq!(" Symbols ".parse::<Category>().unwrap(), Category::Symbols);
        assert!("Plants".parse::<Category>().is_err());
    }

    #[test]
    fn test_detailed_record() {
        let grinning = Catalog::builtin().find("U+1F600").unwrap();
        assert_eq!(grinning.designs.len(), 6);
        assert_eq!(grinning.shortcode, Some(":grinning:"));
        assert!(grinning.meaning.is_some());
    }
}
