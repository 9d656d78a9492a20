//! ID3 genre conventions
//!
//! ID3v1 stored genres as an index into a fixed table, and ID3v2.3 allowed
//! `(N)` references to that table to be mixed with free text. Both forms are
//! still common in the wild.

/// ID3v1 genres with the Winamp extensions, indexed by genre code
const GENRE_TABLE: &[&str] = &[
    "Blues", "Classic Rock", "Country", "Dance", "Disco", "Funk", "Grunge", "Hip-Hop", "Jazz",
    "Metal", "New Age", "Oldies", "Other", "Pop", "R&B", "Rap", "Reggae", "Rock", "Techno",
    "Industrial", "Alternative", "Ska", "Death Metal", "Pranks", "Soundtrack", "Euro-Techno",
    "Ambient", "Trip-Hop", "Vocal", "Jazz+Funk", "Fusion", "Trance", "Classical",
    "Instrumental", "Acid", "House", "Game", "Sound Clip", "Gospel", "Noise", "AlternRock",
    "Bass", "Soul", "Punk", "Space", "Meditative", "Instrumental Pop", "Instrumental Rock",
    "Ethnic", "Gothic", "Darkwave", "Techno-Industrial", "Electronic", "Pop-Folk", "Eurodance",
    "Dream", "Southern Rock", "Comedy", "Cult", "Gangsta", "Top 40", "Christian Rap",
    "Pop/Funk", "Jungle", "Native American", "Cabaret", "New Wave", "Psychadelic", "Rave",
    "Showtunes", "Trailer", "Lo-Fi", "Tribal", "Acid Punk", "Acid Jazz", "Polka", "Retro",
    "Musical", "Rock & Roll", "Hard Rock", "Folk", "Folk-Rock", "National Folk", "Swing",
    "Fast Fusion", "Bebob", "Latin", "Revival", "Celtic", "Bluegrass", "Avantgarde",
    "Gothic Rock", "Progressive Rock", "Psychedelic Rock", "Symphonic Rock", "Slow Rock",
    "Big Band", "Chorus", "Easy Listening", "Acoustic", "Humour", "Speech", "Chanson", "Opera",
    "Chamber Music", "Sonata", "Symphony", "Booty Bass", "Primus", "Porn Groove", "Satire",
    "Slow Jam", "Club", "Tango", "Samba", "Folklore", "Ballad", "Power Ballad", "Rhythmic Soul",
    "Freestyle", "Duet", "Punk Rock", "Drum Solo", "A capella", "Euro-House", "Dance Hall",
    "Goa", "Drum & Bass", "Club-House", "Hardcore", "Terror", "Indie", "Britpop", "Negerpunk",
    "Polsk Punk", "Beat", "Christian Gangsta", "Heavy Metal", "Black Metal", "Crossover",
    "Contemporary Christian", "Christian Rock", "Merengue", "Salsa", "Thrash Metal", "Anime",
    "JPop", "Synthpop", "Abstract", "Art Rock", "Baroque", "Bhangra", "Big Beat", "Breakbeat",
    "Chillout", "Downtempo", "Dub", "EBM", "Eclectic", "Electro", "Electroclash", "Emo",
    "Experimental", "Garage", "Global", "IDM", "Illbient", "Industro-Goth", "Jam Band",
    "Krautrock", "Leftfield", "Lounge", "Math Rock", "New Romantic", "Nu-Breakz", "Post-Punk",
    "Post-Rock", "Psytrance", "Shoegaze", "Space Rock", "Trop Rock", "World Music",
    "Neoclassical", "Audiobook", "Audio Theatre", "Neue Deutsche Welle", "Podcast",
    "Indie Rock", "G-Funk", "Dubstep", "Garage Rock", "Psybient", "Future Garage",
];

/// Resolve ID3 genre codes in a genre tag.
///
/// Returns `None` when a single value holds no ID3 formatting, leaving it to
/// separator splitting. Multiple values only have their numeric codes mapped.
pub fn parse_id3_genre_names(values: &[String]) -> Option<Vec<String>> {
    match values {
        [single] => match id3v1_genre(single) {
            Some(name) => Some(vec![name.to_string()]),
            None => id3v2_genre(single),
        },
        _ => Some(
            values
                .iter()
                .map(|value| id3v1_genre(value).map_or_else(|| value.clone(), str::to_string))
                .collect(),
        ),
    }
}

/// A bare genre code, or the `CR`/`RX` shorthands.
fn id3v1_genre(value: &str) -> Option<&'static str> {
    match value {
        "CR" => Some("Cover"),
        "RX" => Some("Remix"),
        _ => value
            .parse::<usize>()
            .ok()
            .and_then(|code| GENRE_TABLE.get(code).copied()),
    }
}

/// ID3v2.3 `(N)(M)Name` form. A literal leading parenthesis is escaped as `((`.
fn id3v2_genre(value: &str) -> Option<Vec<String>> {
    let mut genres: Vec<String> = Vec::new();
    let mut push = |genre: String| {
        if !genres.contains(&genre) {
            genres.push(genre);
        }
    };

    let mut rest = value;
    while let Some((code, remainder)) = genre_reference(rest) {
        if let Some(name) = id3v1_genre(code) {
            push(name.to_string());
        }
        rest = remainder;
    }

    if !rest.is_empty() {
        match rest.strip_prefix("((") {
            Some(escaped) => push(format!("({}", escaped)),
            None => push(rest.to_string()),
        }
    }

    if genres.len() == 1 && genres[0] == value {
        return None;
    }
    Some(genres)
}

/// Split a leading `(N)`, `(CR)` or `(RX)` off `value`.
fn genre_reference(value: &str) -> Option<(&str, &str)> {
    let inner = value.strip_prefix('(')?;
    let end = inner.find(')')?;
    let code = &inner[..end];
    let valid = code == "CR"
        || code == "RX"
        || (!code.is_empty() && code.bytes().all(|b| b.is_ascii_digit()));
    valid.then(|| (code, &inner[end + 1..]))
}
