//! # Tag Parser
//!
//! Turns the raw per-format maps reported by a [`TagReader`](bridge_traits::TagReader)
//! into [`ParsedTags`].
//!
//! Every field is looked up through an ordered chain of keys spanning the
//! Vorbis/FLAC (`xiph`), MP4 and ID3v2 families; the first key holding a
//! non-blank value wins. Values are trimmed and blank values dropped before
//! any lookup happens.

use std::collections::{BTreeMap, HashMap};

use bridge_traits::RawTags;
use core_library::models::{Date, FileHandle, ParsedTags, ReplayGain};
use tracing::trace;

use crate::error::{MetadataError, Result};

const ITUNES: &str = "----:COM.APPLE.ITUNES:";

/// Album artist given to compilations that name none
pub const VARIOUS_ARTISTS: &str = "Various Artists";

#[derive(Debug, Clone, Copy)]
enum Key {
    Xiph(&'static str),
    Mp4(&'static str),
    /// Freeform `----:com.apple.iTunes:<NAME>` atom
    Itunes(&'static str),
    Id3(&'static str),
    /// User text frame `TXXX:<DESC>`
    Txxx(&'static str),
}

use Key::{Id3, Itunes, Mp4, Txxx, Xiph};

const MUSICBRAINZ_TRACK_ID: &[Key] = &[
    Xiph("MUSICBRAINZ_RELEASETRACKID"),
    Xiph("MUSICBRAINZ RELEASE TRACK ID"),
    Itunes("MUSICBRAINZ RELEASE TRACK ID"),
    Itunes("MUSICBRAINZ_RELEASETRACKID"),
    Txxx("MUSICBRAINZ RELEASE TRACK ID"),
    Txxx("MUSICBRAINZ_RELEASETRACKID"),
];

const TITLE: &[Key] = &[Xiph("TITLE"), Mp4("©nam"), Mp4("©trk"), Id3("TIT2")];

const TITLE_SORT: &[Key] = &[Xiph("TITLESORT"), Mp4("sonm"), Id3("TSOT")];

const TRACK_TOTAL: &[&str] = &["TOTALTRACKS", "TRACKTOTAL", "TRACKC"];

const TRACK_SLASH: &[Key] = &[Mp4("trkn"), Id3("TRCK")];

const DISC_TOTAL: &[&str] = &["TOTALDISCS", "DISCTOTAL", "DISCC"];

const DISC_SLASH: &[Key] = &[Mp4("disk"), Id3("TPOS")];

const SUBTITLE: &[Key] = &[Xiph("DISCSUBTITLE"), Id3("TSST")];

const DATE: &[Key] = &[
    Xiph("ORIGINALDATE"),
    Xiph("DATE"),
    Xiph("YEAR"),
    Mp4("©day"),
    Id3("TDOR"),
    Id3("TDRC"),
    Id3("TDRL"),
];

const ALBUM_MUSICBRAINZ_ID: &[Key] = &[
    Xiph("MUSICBRAINZ_ALBUMID"),
    Xiph("MUSICBRAINZ ALBUM ID"),
    Itunes("MUSICBRAINZ ALBUM ID"),
    Itunes("MUSICBRAINZ_ALBUMID"),
    Txxx("MUSICBRAINZ ALBUM ID"),
    Txxx("MUSICBRAINZ_ALBUMID"),
];

const ALBUM: &[Key] = &[Xiph("ALBUM"), Mp4("©alb"), Id3("TALB")];

const ALBUM_SORT: &[Key] = &[Xiph("ALBUMSORT"), Mp4("soal"), Id3("TSOA")];

const RELEASE_TYPES: &[Key] = &[
    Xiph("RELEASETYPE"),
    Xiph("MUSICBRAINZ ALBUM TYPE"),
    Itunes("MUSICBRAINZ ALBUM TYPE"),
    Itunes("RELEASETYPE"),
    // Some taggers write the release type into the grouping field
    Mp4("©grp"),
    Txxx("MUSICBRAINZ ALBUM TYPE"),
    Txxx("RELEASETYPE"),
    Id3("GRP1"),
];

const ARTIST_MUSICBRAINZ_IDS: &[Key] = &[
    Xiph("MUSICBRAINZ_ARTISTID"),
    Xiph("MUSICBRAINZ ARTIST ID"),
    Itunes("MUSICBRAINZ ARTIST ID"),
    Itunes("MUSICBRAINZ_ARTISTID"),
    Txxx("MUSICBRAINZ ARTIST ID"),
    Txxx("MUSICBRAINZ_ARTISTID"),
];

const ARTISTS: &[Key] = &[
    Xiph("ARTISTS"),
    Xiph("ARTIST"),
    Itunes("ARTISTS"),
    Mp4("©ART"),
    Itunes("ARTIST"),
    Txxx("ARTISTS"),
    Id3("TPE1"),
    Txxx("ARTIST"),
];

const ARTIST_SORT: &[Key] = &[
    Xiph("ARTISTSSORT"),
    Xiph("ARTISTS_SORT"),
    Xiph("ARTISTS SORT"),
    Xiph("ARTISTSORT"),
    Xiph("ARTIST SORT"),
    Itunes("ARTISTSSORT"),
    Itunes("ARTISTS_SORT"),
    Itunes("ARTISTS SORT"),
    Mp4("soar"),
    Itunes("ARTISTSORT"),
    Itunes("ARTIST SORT"),
    Txxx("ARTISTSSORT"),
    Txxx("ARTISTS_SORT"),
    Txxx("ARTISTS SORT"),
    Id3("TSOP"),
    Txxx("ARTISTSORT"),
    Txxx("ARTIST SORT"),
];

const ALBUM_ARTIST_MUSICBRAINZ_IDS: &[Key] = &[
    Xiph("MUSICBRAINZ_ALBUMARTISTID"),
    Xiph("MUSICBRAINZ ALBUM ARTIST ID"),
    Itunes("MUSICBRAINZ ALBUM ARTIST ID"),
    Itunes("MUSICBRAINZ_ALBUMARTISTID"),
    Txxx("MUSICBRAINZ ALBUM ARTIST ID"),
    Txxx("MUSICBRAINZ_ALBUMARTISTID"),
];

const ALBUM_ARTISTS: &[Key] = &[
    Xiph("ALBUMARTISTS"),
    Xiph("ALBUM_ARTISTS"),
    Xiph("ALBUM ARTISTS"),
    Xiph("ALBUMARTIST"),
    Xiph("ALBUM ARTIST"),
    Itunes("ALBUMARTISTS"),
    Itunes("ALBUM_ARTISTS"),
    Itunes("ALBUM ARTISTS"),
    Mp4("aART"),
    Itunes("ALBUMARTIST"),
    Itunes("ALBUM ARTIST"),
    Txxx("ALBUMARTISTS"),
    Txxx("ALBUM_ARTISTS"),
    Txxx("ALBUM ARTISTS"),
    Id3("TPE2"),
    Txxx("ALBUMARTIST"),
    Txxx("ALBUM ARTIST"),
];

const ALBUM_ARTIST_SORT: &[Key] = &[
    Xiph("ALBUMARTISTSSORT"),
    Xiph("ALBUMARTISTS_SORT"),
    Xiph("ALBUMARTISTS SORT"),
    Xiph("ALBUMARTISTSORT"),
    Xiph("ALBUM ARTIST SORT"),
    Itunes("ALBUMARTISTSSORT"),
    Itunes("ALBUMARTISTS_SORT"),
    Itunes("ALBUMARTISTS SORT"),
    Mp4("soaa"),
    Itunes("ALBUMARTISTSORT"),
    Itunes("ALBUM ARTIST SORT"),
    Txxx("ALBUMARTISTSSORT"),
    Txxx("ALBUMARTISTS_SORT"),
    Txxx("ALBUMARTISTS SORT"),
    Id3("TSO2"),
    Txxx("ALBUMARTISTSORT"),
    Txxx("ALBUM ARTIST SORT"),
];

const GENRES: &[Key] = &[Xiph("GENRE"), Mp4("©gen"), Mp4("gnre"), Id3("TCON")];

const COMPILATION: &[Key] = &[
    Xiph("COMPILATION"),
    Xiph("ITUNESCOMPILATION"),
    Mp4("cpil"),
    Itunes("COMPILATION"),
    Itunes("ITUNESCOMPILATION"),
    Id3("TCMP"),
    Txxx("COMPILATION"),
    Txxx("ITUNESCOMPILATION"),
];

const TRACK_GAIN: &[Key] = &[
    Xiph("REPLAYGAIN_TRACK_GAIN"),
    Itunes("REPLAYGAIN_TRACK_GAIN"),
    Txxx("REPLAYGAIN_TRACK_GAIN"),
];

const ALBUM_GAIN: &[Key] = &[
    Xiph("REPLAYGAIN_ALBUM_GAIN"),
    Itunes("REPLAYGAIN_ALBUM_GAIN"),
    Txxx("REPLAYGAIN_ALBUM_GAIN"),
];

/// Whitespace-corrected view of [`RawTags`] with case-normalized freeform keys.
struct Fields {
    xiph: HashMap<String, Vec<String>>,
    mp4: HashMap<String, Vec<String>>,
    id3v2: HashMap<String, Vec<String>>,
}

impl Fields {
    fn new(raw: &RawTags) -> Self {
        Self {
            xiph: correct(&raw.xiph, |key| key.to_uppercase()),
            mp4: correct(&raw.mp4, |key| {
                if key.starts_with("----") {
                    key.to_uppercase()
                } else {
                    key.to_string()
                }
            }),
            id3v2: correct(&raw.id3v2, |key| match key.strip_prefix("TXXX:") {
                Some(description) => format!("TXXX:{}", description.to_uppercase()),
                None => key.to_string(),
            }),
        }
    }

    fn get(&self, key: Key) -> Option<&[String]> {
        let values = match key {
            Xiph(name) => self.xiph.get(name),
            Mp4(name) => self.mp4.get(name),
            Itunes(name) => self.mp4.get(&format!("{ITUNES}{name}")),
            Id3(name) => self.id3v2.get(name),
            Txxx(name) => self.id3v2.get(&format!("TXXX:{name}")),
        };
        values.map(Vec::as_slice)
    }

    fn list(&self, chain: &[Key]) -> Option<&[String]> {
        chain.iter().find_map(|key| self.get(*key))
    }

    fn first(&self, chain: &[Key]) -> Option<&str> {
        self.list(chain)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    fn owned_list(&self, chain: &[Key]) -> Vec<String> {
        self.list(chain).map(<[String]>::to_vec).unwrap_or_default()
    }

    fn position(&self, xiph: &'static str, totals: &[&'static str], slash: &[Key]) -> Option<u32> {
        self.xiph_position(xiph, totals)
            .or_else(|| self.first(slash).and_then(slash_position))
    }

    fn xiph_position(&self, key: &'static str, totals: &[&'static str]) -> Option<u32> {
        let value = self.first(&[Xiph(key)])?;
        if value.contains('/') {
            return slash_position(value);
        }
        let total = totals
            .iter()
            .find_map(|total| self.first(&[Xiph(*total)]))
            .and_then(parse_int);
        valid_position(parse_int(value), total)
    }

    fn date(&self) -> Option<Date> {
        DATE.iter()
            .filter_map(|key| self.get(*key).and_then(|values| values.first()))
            .find_map(|value| Date::parse(value))
            .or_else(|| self.id3v23_date())
    }

    /// ID3v2.3 splits the date over year (`TORY`/`TYER`), `DDMM` (`TDAT`)
    /// and `HHMM` (`TIME`) frames.
    fn id3v23_date(&self) -> Option<Date> {
        let year = self
            .first(&[Id3("TORY"), Id3("TYER")])
            .and_then(|value| value.parse::<i64>().ok())?;

        let Some(tdat) = self.first(&[Id3("TDAT")]).and_then(four_digits) else {
            return Date::from_year(year);
        };
        let (day, month) = tdat;

        match self.first(&[Id3("TIME")]).and_then(four_digits) {
            Some((hour, minute)) => Date::from_ymdhm(year, month, day, hour, minute),
            None => Date::from_ymd(year, month, day),
        }
    }

    fn is_compilation(&self) -> bool {
        matches!(self.list(COMPILATION), Some([flag]) if flag == "1")
    }

    fn gain(&self, r128: &'static str, chain: &[Key]) -> Option<f32> {
        self.first(&[Xiph(r128)])
            .and_then(parse_gain)
            .map(|q78| q78 / 256.0 + 5.0)
            .or_else(|| self.first(chain).and_then(parse_gain))
            .filter(|gain| *gain != 0.0)
    }
}

fn correct<F>(map: &HashMap<String, Vec<String>>, key: F) -> HashMap<String, Vec<String>>
where
    F: Fn(&str) -> String,
{
    // Keys that collapse onto one name merge in sorted order, not hash order
    let sorted: BTreeMap<&String, &Vec<String>> = map.iter().collect();
    let mut corrected: HashMap<String, Vec<String>> = HashMap::new();
    for (name, values) in sorted {
        let values: Vec<String> = values
            .iter()
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect();
        if !values.is_empty() {
            corrected.entry(key(name)).or_default().extend(values);
        }
    }
    corrected
}

fn parse_int(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}

/// A position of zero only survives when a total accompanies it
fn valid_position(position: Option<u32>, total: Option<u32>) -> Option<u32> {
    let position = position?;
    (position > 0 || total.unwrap_or(0) > 0).then_some(position)
}

/// `n/total`, or a bare `n`
fn slash_position(value: &str) -> Option<u32> {
    let mut parts = value.splitn(2, '/');
    let position = parts.next().and_then(parse_int);
    let total = parts.next().and_then(parse_int);
    valid_position(position, total)
}

fn four_digits(value: &str) -> Option<(i64, i64)> {
    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let high = value[..2].parse().ok()?;
    let low = value[2..].parse().ok()?;
    Some((high, low))
}

fn parse_gain(value: &str) -> Option<f32> {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().ok()
}

/// Normalizes raw container metadata into [`ParsedTags`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TagParser;

impl TagParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse the raw tags read from `file`.
    ///
    /// # Errors
    ///
    /// [`MetadataError::MissingRequiredTag`] when there is neither a title
    /// tag nor a usable file name to stand in for one.
    pub fn parse(&self, file: &FileHandle, raw: &RawTags) -> Result<ParsedTags> {
        let fields = Fields::new(raw);

        let name = fields.first(TITLE).map(str::to_string);
        if name.is_none() && file.stem().map_or(true, |stem| stem.trim().is_empty()) {
            return Err(MetadataError::MissingRequiredTag {
                path: file.path.clone(),
            });
        }

        let mut tags = ParsedTags {
            duration_ms: raw.duration_ms.unwrap_or_default(),
            replay_gain: ReplayGain {
                track: fields.gain("R128_TRACK_GAIN", TRACK_GAIN),
                album: fields.gain("R128_ALBUM_GAIN", ALBUM_GAIN),
            },
            musicbrainz_id: fields.first(MUSICBRAINZ_TRACK_ID).map(str::to_string),
            name,
            sort_name: fields.first(TITLE_SORT).map(str::to_string),
            track: fields.position("TRACKNUMBER", TRACK_TOTAL, TRACK_SLASH),
            disc: fields.position("DISCNUMBER", DISC_TOTAL, DISC_SLASH),
            subtitle: fields.first(SUBTITLE).map(str::to_string),
            date: fields.date(),
            album_musicbrainz_id: fields.first(ALBUM_MUSICBRAINZ_ID).map(str::to_string),
            album_name: fields.first(ALBUM).map(str::to_string),
            album_sort_name: fields.first(ALBUM_SORT).map(str::to_string),
            release_types: fields.owned_list(RELEASE_TYPES),
            artist_musicbrainz_ids: fields.owned_list(ARTIST_MUSICBRAINZ_IDS),
            artist_names: fields.owned_list(ARTISTS),
            artist_sort_names: fields.owned_list(ARTIST_SORT),
            album_artist_musicbrainz_ids: fields.owned_list(ALBUM_ARTIST_MUSICBRAINZ_IDS),
            album_artist_names: fields.owned_list(ALBUM_ARTISTS),
            album_artist_sort_names: fields.owned_list(ALBUM_ARTIST_SORT),
            genre_names: fields.owned_list(GENRES),
        };

        if fields.is_compilation() {
            if tags.album_artist_names.is_empty() {
                tags.album_artist_names = vec![VARIOUS_ARTISTS.to_string()];
            }
            if tags.release_types.is_empty() {
                tags.release_types = vec!["compilation".to_string()];
            }
        }

        trace!(path = %file.path.display(), "Parsed tags");
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file() -> FileHandle {
        FileHandle::new("/music/Album/01 Song.flac", "/music", 1_000, 2_048)
    }

    fn parse(raw: &RawTags) -> ParsedTags {
        TagParser::new().parse(&file(), raw).unwrap()
    }

    #[test]
    fn test_xiph_fields() {
        let mut raw = RawTags {
            duration_ms: Some(215_000),
            ..Default::default()
        };
        raw.push_xiph("title", "  Windowlicker ");
        raw.push_xiph("artist", "Aphex Twin");
        raw.push_xiph("album", "Windowlicker");
        raw.push_xiph("date", "1999-03-22");
        raw.push_xiph("tracknumber", "1");
        raw.push_xiph("tracktotal", "3");
        raw.push_xiph("genre", "IDM");
        raw.push_xiph("genre", "");

        let tags = parse(&raw);
        assert_eq!(tags.name.as_deref(), Some("Windowlicker"));
        assert_eq!(tags.artist_names, vec!["Aphex Twin"]);
        assert_eq!(tags.album_name.as_deref(), Some("Windowlicker"));
        assert_eq!(tags.date.map(|d| d.to_string()), Some("1999-03-22".into()));
        assert_eq!(tags.track, Some(1));
        assert_eq!(tags.genre_names, vec!["IDM"]);
        assert_eq!(tags.duration_ms, 215_000);
    }

    #[test]
    fn test_chain_prefers_earlier_keys() {
        let mut raw = RawTags::default();
        raw.push_xiph("ARTIST", "Single");
        raw.push_xiph("ARTISTS", "First");
        raw.push_xiph("ARTISTS", "Second");
        raw.push_id3v2("TPE1", "Ignored");

        assert_eq!(parse(&raw).artist_names, vec!["First", "Second"]);
    }

    #[test]
    fn test_case_variant_keys_merge_in_key_order() {
        // Every map gets its own hasher seed, so each pass may iterate differently
        for _ in 0..8 {
            let mut raw = RawTags::default();
            raw.xiph.insert("artist".into(), vec!["Lower".into()]);
            raw.xiph.insert("Artist".into(), vec!["Mixed".into()]);
            raw.xiph.insert("ARTIST".into(), vec!["Upper".into()]);

            assert_eq!(parse(&raw).artist_names, vec!["Upper", "Mixed", "Lower"]);
        }
    }

    #[test]
    fn test_id3v2_fields() {
        let mut raw = RawTags::default();
        raw.push_id3v2("TIT2", "Idioteque");
        raw.push_id3v2("TRCK", "8/10");
        raw.push_id3v2("TPOS", "0/1");
        raw.push_id3v2("TXXX:MusicBrainz Album Id", "9b6ad9e3-bd6e-4e39-9a52-5bbb0cfc1cd2");
        raw.push_id3v2("TPE2", "Radiohead");

        let tags = parse(&raw);
        assert_eq!(tags.track, Some(8));
        assert_eq!(tags.disc, Some(0));
        assert_eq!(
            tags.album_musicbrainz_id.as_deref(),
            Some("9b6ad9e3-bd6e-4e39-9a52-5bbb0cfc1cd2")
        );
        assert_eq!(tags.album_artist_names, vec!["Radiohead"]);
    }

    #[test]
    fn test_mp4_fields() {
        let mut raw = RawTags::default();
        raw.push_mp4("©nam", "Roygbiv");
        raw.push_mp4("aART", "Boards of Canada");
        raw.push_mp4("trkn", "5/17");
        raw.push_mp4("----:com.apple.iTunes:MusicBrainz Artist Id", "a");
        raw.push_mp4("----:com.apple.iTunes:MusicBrainz Artist Id", "b");

        let tags = parse(&raw);
        assert_eq!(tags.name.as_deref(), Some("Roygbiv"));
        assert_eq!(tags.track, Some(5));
        assert_eq!(tags.artist_musicbrainz_ids, vec!["a", "b"]);
    }

    #[test]
    fn test_position_rule() {
        assert_eq!(slash_position("3/12"), Some(3));
        assert_eq!(slash_position("0/12"), Some(0));
        assert_eq!(slash_position("0"), None);
        assert_eq!(slash_position("0/0"), None);
        assert_eq!(slash_position("7"), Some(7));
        assert_eq!(slash_position("x/2"), None);

        let mut raw = RawTags::default();
        raw.push_xiph("DISCNUMBER", "0");
        assert_eq!(parse(&raw).disc, None);

        raw.push_xiph("DISCTOTAL", "2");
        assert_eq!(parse(&raw).disc, Some(0));
    }

    #[test]
    fn test_xiph_position_falls_back_to_slash_fields() {
        let mut raw = RawTags::default();
        raw.push_xiph("TRACKNUMBER", "0");
        raw.push_id3v2("TRCK", "4");

        assert_eq!(parse(&raw).track, Some(4));
    }

    #[test]
    fn test_id3v23_date() {
        let mut raw = RawTags::default();
        raw.push_id3v2("TYER", "2003");
        assert_eq!(parse(&raw).date.map(|d| d.to_string()), Some("2003".into()));

        raw.push_id3v2("TDAT", "0906");
        assert_eq!(
            parse(&raw).date.map(|d| d.to_string()),
            Some("2003-06-09".into())
        );

        raw.push_id3v2("TIME", "1345");
        let date = parse(&raw).date.unwrap();
        assert_eq!(date.month(), Some(6));
        assert_eq!(date.day(), Some(9));
    }

    #[test]
    fn test_unparseable_date_falls_through_chain() {
        let mut raw = RawTags::default();
        raw.push_xiph("ORIGINALDATE", "unknown");
        raw.push_xiph("DATE", "2011");

        assert_eq!(parse(&raw).date.map(|d| d.year()), Some(2011));
    }

    #[test]
    fn test_compilation_defaults() {
        let mut raw = RawTags::default();
        raw.push_mp4("cpil", "1");

        let tags = parse(&raw);
        assert_eq!(tags.album_artist_names, vec![VARIOUS_ARTISTS]);
        assert_eq!(tags.release_types, vec!["compilation"]);

        let mut raw = RawTags::default();
        raw.push_id3v2("TCMP", "1");
        raw.push_id3v2("TPE2", "DJ Shadow");
        raw.push_id3v2("TXXX:RELEASETYPE", "album");
        let tags = parse(&raw);
        assert_eq!(tags.album_artist_names, vec!["DJ Shadow"]);
        assert_eq!(tags.release_types, vec!["album"]);
    }

    #[test]
    fn test_compilation_requires_exact_flag() {
        let mut raw = RawTags::default();
        raw.push_xiph("COMPILATION", "0");
        assert!(parse(&raw).album_artist_names.is_empty());
    }

    #[test]
    fn test_replay_gain() {
        let mut raw = RawTags::default();
        raw.push_xiph("REPLAYGAIN_TRACK_GAIN", "-6.48 dB");
        raw.push_xiph("R128_ALBUM_GAIN", "-512");
        raw.push_id3v2("TXXX:REPLAYGAIN_ALBUM_GAIN", "+1.0 dB");

        let gain = parse(&raw).replay_gain;
        assert_eq!(gain.track, Some(-6.48));
        assert_eq!(gain.album, Some(3.0));
    }

    #[test]
    fn test_zero_gain_is_absent() {
        let mut raw = RawTags::default();
        raw.push_xiph("REPLAYGAIN_TRACK_GAIN", "0.00 dB");
        assert_eq!(parse(&raw).replay_gain.track, None);
    }

    #[test]
    fn test_missing_title_uses_file_name() {
        let tags = parse(&RawTags::default());
        assert_eq!(tags.name, None);
        assert_eq!(tags.name_or_file(&file()), Some("01 Song"));
    }

    #[test]
    fn test_missing_title_without_file_name_fails() {
        let nameless = FileHandle::new("/", "/", 0, 0);
        let result = TagParser::new().parse(&nameless, &RawTags::default());
        assert!(matches!(
            result,
            Err(MetadataError::MissingRequiredTag { .. })
        ));
    }
}
