/// A thematic category and the words that signal it.
#[derive(Debug)]
pub struct Theme {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

pub static THEMES: &[Theme] = &[
    Theme {
        name: "pool",
        keywords: &["pool", "piscine", "swimming", "swim", "baignade", "jacuzzi"],
    },
    Theme {
        name: "beach",
        keywords: &["beach", "plage", "sea", "mer", "ocean", "océan", "sand", "sable", "waves"],
    },
    Theme {
        name: "view",
        keywords: &["view", "vue", "panorama", "sunset", "sunrise", "coucher", "horizon", "skyline"],
    },
    Theme {
        name: "food",
        keywords: &[
            "food", "restaurant", "dish", "plat", "cuisine", "chef", "breakfast", "brunch",
            "dinner", "dîner", "lunch", "déjeuner", "meal", "repas",
        ],
    },
    Theme {
        name: "bar",
        keywords: &["bar", "cocktail", "drink", "boisson", "wine", "vin", "apéritif", "rooftop"],
    },
    Theme {
        name: "room",
        keywords: &["room", "chambre", "suite", "bed", "lit", "bedroom", "bathroom", "balcony", "balcon"],
    },
    Theme {
        name: "spa",
        keywords: &["spa", "massage", "wellness", "sauna", "hammam", "bien-être", "soin"],
    },
    Theme {
        name: "lobby",
        keywords: &["lobby", "reception", "réception", "accueil", "entrance", "entrée", "hall"],
    },
    Theme {
        name: "garden",
        keywords: &["garden", "jardin", "terrace", "terrasse", "nature", "patio"],
    },
    Theme {
        name: "activity",
        keywords: &["activity", "activité", "sport", "gym", "fitness", "yoga", "hike", "randonnée", "tennis"],
    },
];

/// French elided articles and conjunctions ("l'océan", "jusqu'au").
const ELISIONS: &[&str] = &["l", "d", "j", "m", "n", "s", "t", "c", "qu", "jusqu", "lorsqu", "puisqu"];

fn strip_elision(word: &str) -> &str {
    match word.split_once(['\'', '\u{2019}']) {
        Some((head, rest)) if ELISIONS.contains(&head) && !rest.is_empty() => rest,
        _ => word,
    }
}

/// Lowercase whitespace-separated words with surrounding punctuation and
/// leading French elisions stripped. Empty words are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            let w = w
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            strip_elision(&w).to_string()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// A token signals a keyword when it is the keyword, or for keywords of
/// four letters or more, when it starts with it ("pools", "terrasses").
fn signals(token: &str, keyword: &str) -> bool {
    token == keyword || (keyword.chars().count() >= 4 && token.starts_with(keyword))
}

/// Names of the themes any of `tokens` signal, in table order.
pub fn themes_in(tokens: &[String]) -> Vec<&'static str> {
    THEMES
        .iter()
        .filter(|theme| {
            theme
                .keywords
                .iter()
                .any(|kw| tokens.iter().any(|t| signals(t, kw)))
        })
        .map(|theme| theme.name)
        .collect()
}
