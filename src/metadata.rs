use std::collections::BTreeSet;

#[derive(Debug)]
pub enum MetadataError {
    Json(serde_json::Error),
}

/// Battle metadata recovered from the `game begin` JSON block
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Player id of the client that recorded the replay, 0 when unknown
    pub recorder_id: u32,
    /// Player rosters of both teams
    pub teams: [BTreeSet<u32>; 2],
    /// Canonical arena short-name
    pub map_name: String,
    /// 3-letter game mode code (`ctf`, `dom`, `ass`, `nat`)
    pub game_mode: String,
}

#[derive(Debug, serde::Deserialize)]
struct BattleStart {
    #[serde(rename = "playerName")]
    player_name: String,
    #[serde(rename = "mapName")]
    map_name: String,
    /// Mode field of clients before 8.0
    #[serde(rename = "gameplayType")]
    gameplay_type: Option<String>,
    /// Mode field from 8.0 onwards
    #[serde(rename = "gameplayID")]
    gameplay_id: Option<String>,
    vehicles: std::collections::HashMap<String, Vehicle>,
}

#[derive(Debug, serde::Deserialize)]
struct Vehicle {
    name: String,
    team: i64,
}

/// Decodes the `game begin` block into battle metadata.
///
/// The recorder is located by matching `playerName` against the vehicle
/// roster. Vehicle entries with an unparseable id or a team outside 1/2
/// are skipped.
pub fn decode(block: &[u8]) -> Result<Metadata, MetadataError> {
    let raw: BattleStart = serde_json::from_slice(block).map_err(MetadataError::Json)?;

    let mode = raw
        .gameplay_type
        .or(raw.gameplay_id)
        .unwrap_or_default();

    let mut metadata = Metadata {
        map_name: crate::arena::canonicalize(&raw.map_name),
        game_mode: mode.chars().take(3).collect(),
        ..Default::default()
    };

    for (key, vehicle) in raw.vehicles.iter() {
        let player_id: u32 = match key.parse() {
            Ok(id) => id,
            Err(_) => continue,
        };
        let team = match vehicle.team {
            1 => 0,
            2 => 1,
            _ => continue,
        };

        metadata.teams[team].insert(player_id);
        if vehicle.name == raw.player_name {
            metadata.recorder_id = player_id;
        }
    }

    Ok(metadata)
}
