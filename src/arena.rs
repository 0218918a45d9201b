/// Arena short-names known to the supported client versions. Replays
/// reference arenas either by this full form or by the form without the
/// numeric prefix.
static ARENAS: phf::Set<&'static str> = phf::phf_set! {
    "01_karelia",
    "02_malinovka",
    "03_campania",
    "04_himmelsdorf",
    "05_prohorovka",
    "06_ensk",
    "07_lakeville",
    "08_ruinberg",
    "10_hills",
    "11_murovanka",
    "13_erlenberg",
    "14_siegfried_line",
    "15_komarin",
    "17_munchen",
    "18_cliff",
    "19_monastery",
    "22_slough",
    "23_westfeld",
    "28_desert",
    "29_el_hallouf",
    "31_airfield",
    "33_fjord",
    "34_redshire",
    "35_steppes",
    "36_fishing_bay",
    "37_caucasus",
    "38_mannerheim_line",
    "39_crimea",
    "44_north_america",
    "45_north_america",
    "47_canada_a",
    "51_asia",
    "60_asia_miao",
    "63_tundra",
    "73_asia_korea",
    "84_winter",
    "87_ruinberg_on_fire",
};

/// Maps the arena name found in the metadata block onto its canonical
/// short-name. Names that cannot be resolved are passed through unchanged.
pub fn canonicalize(name: &str) -> String {
    if ARENAS.contains(name) {
        return name.to_owned();
    }

    // "north_america" is ambiguous between two arenas and resolved the
    // same way the game client does
    if name == "north_america" {
        return "44_north_america".to_owned();
    }

    match ARENAS.iter().find(|full| full.get(3..) == Some(name)) {
        Some(full) => (*full).to_owned(),
        None => name.to_owned(),
    }
}
