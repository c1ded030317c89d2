use std::f32::consts::PI;

use tessel_blocks::{BlockId, ITEMS};
use tessel_geom::Vec3;
use tessel_proto::MAX_NAME_LEN;

/// Remote players tracked at once.
pub const MAX_PLAYERS: usize = 128;
/// Crosshair targeting reach and angular tolerance.
const CROSSHAIR_RANGE: f32 = 96.0;
const CROSSHAIR_ANGLE: f32 = 5.0 * PI / 180.0;

/// Pose with the time it was observed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub rx: f32,
    pub ry: f32,
    pub t: f64,
}

impl PlayerState {
    pub fn new(x: f32, y: f32, z: f32, rx: f32, ry: f32) -> Self {
        Self {
            x,
            y,
            z,
            rx,
            ry,
            t: 0.0,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    #[inline]
    pub fn set_position(&mut self, p: Vec3) {
        self.x = p.x;
        self.y = p.y;
        self.z = p.z;
    }
}

/// The player this client controls.
#[derive(Clone, Debug, Default)]
pub struct LocalPlayer {
    pub id: i32,
    pub state: PlayerState,
    pub flying: bool,
    pub item_index: usize,
    /// Vertical velocity in units per second.
    pub dy: f32,
}

impl LocalPlayer {
    pub fn item(&self) -> BlockId {
        ITEMS[self.item_index]
    }

    pub fn next_item(&mut self) {
        self.item_index = (self.item_index + 1) % ITEMS.len();
    }

    pub fn prev_item(&mut self) {
        self.item_index = self.item_index.checked_sub(1).unwrap_or(ITEMS.len() - 1);
    }

    /// Selects slot `index`; out-of-range indices are ignored.
    pub fn select_item(&mut self, index: usize) {
        if index < ITEMS.len() {
            self.item_index = index;
        }
    }

    /// Selects the slot holding `block`, if it is placeable.
    pub fn pick_item(&mut self, block: BlockId) -> bool {
        match ITEMS.iter().position(|&w| w == block) {
            Some(i) => {
                self.item_index = i;
                true
            }
            None => false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RemotePlayer {
    pub id: i32,
    pub name: String,
    /// Pose shown this frame.
    pub state: PlayerState,
    prev: PlayerState,
    latest: PlayerState,
}

impl RemotePlayer {
    fn new(id: i32, pose: PlayerState) -> Self {
        Self {
            id,
            name: format!("player{id}"),
            state: pose,
            prev: pose,
            latest: pose,
        }
    }

    /// Pushes a new snapshot; yaw is unwrapped so interpolation takes the short way round.
    fn observe(&mut self, mut pose: PlayerState, now: f64) {
        pose.t = now;
        self.prev = self.latest;
        self.latest = pose;
        if self.latest.rx - self.prev.rx > PI {
            self.prev.rx += 2.0 * PI;
        }
        if self.prev.rx - self.latest.rx > PI {
            self.prev.rx -= 2.0 * PI;
        }
    }

    /// Blends between the two snapshots, spreading motion over their observed interval.
    pub fn interpolate(&mut self, now: f64) {
        let (a, b) = (&self.prev, &self.latest);
        let span = (b.t - a.t).clamp(0.1, 1.0);
        let p = (((now - b.t) / span) as f32).min(1.0);
        let lerp = |from: f32, to: f32| from + (to - from) * p;
        self.state = PlayerState {
            x: lerp(a.x, b.x),
            y: lerp(a.y, b.y),
            z: lerp(a.z, b.z),
            rx: lerp(a.rx, b.rx),
            ry: lerp(a.ry, b.ry),
            t: now,
        };
    }
}

/// Bounded table of remote players; removal swaps the last entry into the hole.
#[derive(Clone, Debug)]
pub struct Players {
    list: Vec<RemotePlayer>,
}

impl Default for Players {
    fn default() -> Self {
        Self::new()
    }
}

impl Players {
    pub fn new() -> Self {
        Self {
            list: Vec::with_capacity(MAX_PLAYERS),
        }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn get(&self, id: i32) -> Option<&RemotePlayer> {
        self.list.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RemotePlayer> + '_ {
        self.list.iter()
    }

    /// Records a position for `id`, creating the entry when there is room.
    pub fn observe(&mut self, id: i32, pose: PlayerState, now: f64) -> bool {
        if let Some(p) = self.list.iter_mut().find(|p| p.id == id) {
            p.observe(pose, now);
            return true;
        }
        if self.list.len() >= MAX_PLAYERS {
            log::debug!("player table full; ignoring player {id}");
            return false;
        }
        let mut player = RemotePlayer::new(id, pose);
        player.observe(pose, now);
        player.observe(pose, now);
        player.state = player.latest;
        log::trace!(target: "events", "player {id} joined");
        self.list.push(player);
        true
    }

    pub fn remove(&mut self, id: i32) -> Option<RemotePlayer> {
        let i = self.list.iter().position(|p| p.id == id)?;
        Some(self.list.swap_remove(i))
    }

    /// Renames a known player; the name is cut to the wire limit.
    pub fn rename(&mut self, id: i32, name: &str) -> bool {
        let Some(p) = self.list.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        let mut end = name.len().min(MAX_NAME_LEN);
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        p.name = name[..end].to_string();
        true
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }

    pub fn interpolate(&mut self, now: f64) {
        for p in &mut self.list {
            p.interpolate(now);
        }
    }

    /// Nearest remote player within range whose offset from the sight line is inside the angular tolerance.
    pub fn crosshair(&self, viewer: &PlayerState) -> Option<&RemotePlayer> {
        let eye = viewer.position();
        let sight = Vec3::sight(viewer.rx, viewer.ry);
        let mut best: Option<(f32, &RemotePlayer)> = None;
        for other in &self.list {
            let to = other.state.position() - eye;
            let d = to.length();
            if d <= 0.0 || d >= CROSSHAIR_RANGE {
                continue;
            }
            let off = (other.state.position() - (eye + sight * d)).length();
            if off / d < CROSSHAIR_ANGLE && best.is_none_or(|(b, _)| d < b) {
                best = Some((d, other));
            }
        }
        best.map(|(_, p)| p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_wrap_both_ways() {
        let mut me = LocalPlayer::default();
        me.prev_item();
        assert_eq!(me.item_index, ITEMS.len() - 1);
        me.next_item();
        assert_eq!(me.item_index, 0);
        me.select_item(ITEMS.len());
        assert_eq!(me.item_index, 0);
        assert!(me.pick_item(ITEMS[5]));
        assert_eq!(me.item(), ITEMS[5]);
        assert!(!me.pick_item(0));
    }

    #[test]
    fn interpolation_moves_over_observed_interval() {
        let mut players = Players::new();
        players.observe(3, PlayerState::new(0.0, 0.0, 0.0, 0.0, 0.0), 10.0);
        players.observe(3, PlayerState::new(10.0, 0.0, 0.0, 0.0, 0.0), 10.5);
        players.interpolate(10.75);
        let s = players.get(3).unwrap().state;
        assert!((s.x - 5.0).abs() < 1e-4);
        players.interpolate(20.0);
        assert_eq!(players.get(3).unwrap().state.x, 10.0);
    }

    #[test]
    fn yaw_takes_short_way_round() {
        let mut players = Players::new();
        players.observe(1, PlayerState::new(0.0, 0.0, 0.0, 0.1, 0.0), 0.0);
        players.observe(1, PlayerState::new(0.0, 0.0, 0.0, 2.0 * PI - 0.1, 0.0), 1.0);
        players.interpolate(1.5);
        let rx = players.get(1).unwrap().state.rx;
        assert!(rx > 2.0 * PI - 0.15 && rx < 2.0 * PI + 0.15, "rx={rx}");
    }

    #[test]
    fn table_is_bounded_and_swap_removes() {
        let mut players = Players::new();
        for id in 0..(MAX_PLAYERS as i32 + 5) {
            players.observe(id, PlayerState::default(), 0.0);
        }
        assert_eq!(players.len(), MAX_PLAYERS);
        assert_eq!(players.get(0).unwrap().name, "player0");
        assert!(players.remove(0).is_some());
        assert_eq!(players.iter().next().unwrap().id, MAX_PLAYERS as i32 - 1);
        assert!(players.rename(5, &"x".repeat(50)));
        assert_eq!(players.get(5).unwrap().name.len(), MAX_NAME_LEN);
    }

    #[test]
    fn crosshair_picks_nearest_in_cone() {
        let mut players = Players::new();
        // Yaw pi looks down +z.
        players.observe(1, PlayerState::new(0.0, 0.0, 20.0, 0.0, 0.0), 0.0);
        players.observe(2, PlayerState::new(0.0, 0.0, 10.0, 0.0, 0.0), 0.0);
        players.observe(3, PlayerState::new(5.0, 0.0, 5.0, 0.0, 0.0), 0.0);
        players.observe(4, PlayerState::new(0.0, 0.0, 200.0, 0.0, 0.0), 0.0);
        let me = PlayerState::new(0.0, 0.0, 0.0, PI, 0.0);
        assert_eq!(players.crosshair(&me).map(|p| p.id), Some(2));
        let away = PlayerState::new(0.0, 0.0, 0.0, 0.0, 0.0);
        assert!(players.crosshair(&away).is_none());
    }
}
