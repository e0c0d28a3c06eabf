use serde::Serialize;

/// A clock preset players can queue for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeControl {
    pub label: &'static str,
    /// Seconds on each clock at the start
    pub base_time: u32,
    /// Seconds added after each move
    pub increment: u32,
}

const fn preset(label: &'static str, base_time: u32, increment: u32) -> TimeControl {
    TimeControl {
        label,
        base_time,
        increment,
    }
}

pub static PRESETS: [(&str, TimeControl); 11] = [
    ("BULLET1", preset("1+0 Bullet", 60, 0)),
    ("BULLET2", preset("2+1 Bullet", 120, 1)),
    ("BLITZ1", preset("3+0 Blitz", 180, 0)),
    ("BLITZ2", preset("3+2 Blitz", 180, 2)),
    ("BLITZ3", preset("5+0 Blitz", 300, 0)),
    ("BLITZ4", preset("5+3 Blitz", 300, 3)),
    ("RAPID1", preset("10+0 Rapid", 600, 0)),
    ("RAPID2", preset("10+5 Rapid", 600, 5)),
    ("RAPID3", preset("15+10 Rapid", 900, 10)),
    ("CLASSICAL1", preset("30+0 Classical", 1800, 0)),
    ("CLASSICAL2", preset("30+20 Classical", 1800, 20)),
];

pub fn lookup(id: &str) -> Option<&'static TimeControl> {
    PRESETS
        .iter()
        .find(|(preset_id, _)| *preset_id == id)
        .map(|(_, tc)| tc)
}
