//! Static table of cities the console already knows how to place.
//!
//! Each entry stores the latitude and longitude as a packed hex blob (two
//! big-endian 16-bit fixed-point values) plus the display name. Matching is
//! case-insensitive on the ASCII-transliterated name, so "Zürich", "zurich"
//! and "ZURICH" all hit the same row.

use crate::location::CoordinateBlock;
use crate::utils::ascii_fold;
use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GazetteerEntry {
    pub key: &'static str,
    pub packed: &'static str,
    pub display_name: &'static str,
}

impl GazetteerEntry {
    /// Unpack the stored blob into a full coordinate block.
    ///
    /// The table is checked by tests, so a blob that fails to decode means
    /// the row itself is corrupt; it is reported as `None`.
    pub fn coordinates(&self) -> Option<CoordinateBlock> {
        let raw = hex::decode(self.packed).ok()?;
        let [lat_hi, lat_lo, lng_hi, lng_lo] = raw.as_slice() else {
            return None;
        };
        Some(CoordinateBlock::from_raw(
            u16::from_be_bytes([*lat_hi, *lat_lo]),
            u16::from_be_bytes([*lng_hi, *lng_lo]),
        ))
    }
}

const CITIES: &[(&str, &str, &str)] = &[
    ("AMSTERDAM", "253d0379", "Amsterdam"),
    ("ATLANTA", "17ffc3fe", "Atlanta"),
    ("BAGHDAD", "17b71f95", "Baghdad"),
    ("BALTIMORE", "1bf0c986", "Baltimore"),
    ("BANGKOK", "09c7477a", "Bangkok"),
    ("BEIJING", "1c6252cc", "Beijing"),
    ("BEIRUT", "1818193e", "Beirut"),
    ("BERLIN", "25590988", "Berlin"),
    ("BOSTON", "1e1fcd78", "Boston"),
    ("BRUSSELS", "2427031b", "Brussels"),
    ("CAIRO", "155e1638", "Cairo"),
    ("CHICAGO", "1dc2c1ac", "Chicago"),
    ("CINCINNATI", "1bd9c3f2", "Cincinnati"),
    ("CLEVELAND", "1d82c5e8", "Cleveland"),
    ("DALLAS", "1750bb2b", "Dallas"),
    ("DENVER", "1c42b559", "Denver"),
    ("DETROIT", "1e1ac4f2", "Detroit"),
    ("DJIBOUTI", "083f1eaf", "Djibouti"),
    ("DUBLIN", "25e2fb8d", "Dublin"),
    ("GENEVA", "20d0045c", "Geneva"),
    ("GIBRALTAR", "19b3fc32", "Gibraltar"),
    ("GUATEMALA CITY", "0a61bfb5", "Guatemala City"),
    ("HAVANA", "1076c571", "Havana"),
    ("HELSINKI", "2ac911bb", "Helsinki"),
    ("HONG KONG", "0ff95147", "Hong Kong"),
    ("HONOLULU", "0f268fbf", "Honolulu"),
    ("HOUSTON", "152abc30", "Houston"),
    ("INDIANAPOLIS", "1c47c2bc", "Indianapolis"),
    ("ISLAMABAD", "17f63407", "Islamabad"),
    ("ISTANBUL", "1d32149f", "Istanbul"),
    ("JERUSALEM", "1696190a", "Jerusalem"),
    ("JOHANNESBURG", "ed6913f2", "Johannesburg"),
    ("KUWAIT CITY", "14e2221e", "Kuwait City"),
    ("LAS VEGAS", "19b9ae21", "Las Vegas"),
    ("LONDON", "24a0ffeb", "London"),
    ("LOS ANGELES", "1837abeb", "Los Angeles"),
    ("LUXEMBOURG", "2347045b", "Luxembourg"),
    ("MACAU", "0fcc50c8", "Macau"),
    ("MADRID", "1cb3fd62", "Madrid"),
    ("MEXICO CITY", "0dd1b981", "Mexico City"),
    ("MIAMI", "1253c6fa", "Miami"),
    ("MILAN", "20550688", "Milan"),
    ("MILWAUKEE", "1e9ac17e", "Milwaukee"),
    ("MINNEAPOLIS", "1ffcbdae", "Minneapolis"),
    ("MONACO", "1f160549", "Monaco"),
    ("MONTREAL", "2051cbbf", "Montréal"),
    ("MOSCOW", "27a81abf", "Moscow"),
    ("MUNICH", "223a0837", "Munich"),
    ("NEW DELHI", "145636e5", "New Delhi"),
    ("NEW ORLEANS", "154dbff3", "New Orleans"),
    ("NEW YORK", "1cf3cb60", "New York"),
    ("OKLAHOMA CITY", "1938baa8", "Oklahoma City"),
    ("PANAMA CITY", "0664c787", "Panama City"),
    ("PARIS", "22bd01ab", "Paris"),
    ("PHILADELPHIA", "1c69ca8d", "Philadelphia"),
    ("PHOENIX", "17c9b04e", "Phoenix"),
    ("PITTSBURGH", "1cc1c71e", "Pittsburgh"),
    ("PRAGUE", "239b0a43", "Prague"),
    ("QUEBEC CITY", "214ccd6b", "Quebec City"),
    ("RIO DE JANEIRO", "efb8e142", "Rio de Janeiro"),
    ("ROME", "1dca08e1", "Rome"),
    ("SALT LAKE CITY", "1cfcb06f", "Salt Lake City"),
    ("SAN ANTONIO", "14ecb9f6", "San Antonio"),
    ("SAN DIEGO", "1743acb1", "San Diego"),
    ("SAN FRANCISCO", "1adca8f3", "San Francisco"),
    ("SAN MARINO", "1f3d08d7", "San Marino"),
    ("SAO PAULO", "ef44deda", "São Paulo"),
    ("SEATTLE", "21daa903", "Seattle"),
    ("SHANGHAI", "16385661", "Shanghai"),
    ("SINGAPORE", "00eb49da", "Singapore"),
    ("ST. LOUIS", "1b77bfdc", "St. Louis"),
    ("STOCKHOLM", "2a200cd5", "Stockholm"),
    ("SYDNEY", "e7e76b8c", "Sydney"),
    ("TOKYO", "19606363", "Tokyo"),
    ("TORONTO", "1f13c787", "Toronto"),
    ("UNITED NATIONS", "1cf0cb78", "United Nations"),
    ("VATICAN CITY", "1dcc08db", "Vatican City"),
    ("VIENNA", "223d0ba0", "Vienna"),
    ("WASHINGTON", "1ba8c938", "Washington"),
    ("ZURICH", "21a40610", "Zürich"),
];

static GAZETTEER: Lazy<HashMap<&'static str, GazetteerEntry>> = Lazy::new(|| {
    CITIES
        .iter()
        .map(|&(key, packed, display_name)| {
            (
                key,
                GazetteerEntry {
                    key,
                    packed,
                    display_name,
                },
            )
        })
        .collect()
});

/// Normalised lookup key for a free-text place name.
pub fn gazetteer_key(name: &str) -> String {
    ascii_fold(name.trim()).to_uppercase()
}

pub fn lookup(name: &str) -> Option<&'static GazetteerEntry> {
    GAZETTEER.get(gazetteer_key(name).as_str())
}

pub fn len() -> usize {
    GAZETTEER.len()
}
