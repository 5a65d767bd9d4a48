use std::collections::HashMap;

lazy_static::lazy_static! {
    static ref EMOJIS: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        // tokens
        map.insert("FTM", "967285237686108212");
        map.insert("SPIRIT", "967285237962924163");
        map.insert("TOMB", "967285237904179211");
        map.insert("REAPER", "967285238306857063");
        map.insert("BOO", "967285238042599434");
        map.insert("SPELL", "967285238063587358");
        map.insert("BTC", "967285237879013388");
        // ui
        map.insert("GOOD_MORNING", "967285238306840576");
        map.insert("REVOKE", "967285238055174195");
        map.insert("REPLY", "967285237983875122");
        map.insert("PROFILE", "967285238394925086");
        map.insert("DEFI", "933281365586227210");
        map.insert("BLANK", "967287119448014868");
        map.insert("PREV_PAGE", "967285237958705162");
        map.insert("NEXT_PAGE", "967285238000676895");
        map
    };
}

/// Custom guild emoji markup for `key`, or an empty string when the bot has no such emoji.
pub fn get_emoji(key: &str) -> String {
    get_emoji_with(key, false)
}

pub fn get_emoji_with(key: &str, animated: bool) -> String {
    let upper = key.to_uppercase();
    match EMOJIS.get(upper.as_str()) {
        Some(id) => format!(
            "<{}:{}:{}>",
            if animated { "a" } else { "" },
            key.replace('-', "_").to_lowercase(),
            id
        ),
        None => String::new(),
    }
}
