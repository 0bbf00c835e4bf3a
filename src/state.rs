use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::body::CelestialBody;
use crate::catalog::LoadedSystem;
use crate::clock::SimClock;
use crate::compositor::{hit_test, ScreenPosition};

pub type SharedState = Arc<RwLock<AppState>>;

/// Everything the redraw and input tasks share. System switches are staged in
/// `pending` and only become visible at [`AppState::apply_pending`], which the
/// redraw task calls before taking its frame snapshot.
#[derive(Debug)]
pub struct AppState {
    system: LoadedSystem,
    pending: Option<LoadedSystem>,
    pub selected: usize,
    pub show_details: bool,
    pub clock: SimClock,
    pub status: Option<String>,
    /// Screen offset of the orbital view inside the terminal.
    view_origin: (i32, i32),
    positions: BTreeMap<String, ScreenPosition>,
}

impl AppState {
    pub fn new(system: LoadedSystem, clock: SimClock) -> Self {
        Self {
            system,
            pending: None,
            selected: 0,
            show_details: false,
            clock,
            status: None,
            view_origin: (0, 0),
            positions: BTreeMap::new(),
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }

    pub fn system(&self) -> &LoadedSystem {
        &self.system
    }

    /// Cheap snapshot of the current body list.
    pub fn bodies(&self) -> Arc<[CelestialBody]> {
        Arc::clone(&self.system.bodies)
    }

    pub fn stage(&mut self, system: LoadedSystem) {
        self.pending = Some(system);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Swaps in a staged system. Returns true when a switch happened.
    pub fn apply_pending(&mut self) -> bool {
        let Some(next) = self.pending.take() else {
            return false;
        };
        info!(system = %next.key, bodies = next.bodies.len(), "switched star system");
        self.system = next;
        self.selected = 0;
        self.show_details = false;
        self.positions.clear();
        true
    }

    pub fn selected_body(&self) -> Option<&CelestialBody> {
        self.system.bodies.get(self.selected)
    }

    pub fn select_next(&mut self) {
        let n = self.system.bodies.len();
        if n > 0 {
            self.selected = (self.selected + 1) % n;
        }
    }

    pub fn select_prev(&mut self) {
        let n = self.system.bodies.len();
        if n > 0 {
            self.selected = (self.selected + n - 1) % n;
        }
    }

    /// Positions of the last drawn frame, in orbital-view coordinates.
    pub fn record_frame(&mut self, origin: (i32, i32), positions: BTreeMap<String, ScreenPosition>) {
        self.view_origin = origin;
        self.positions = positions;
    }

    /// Selects the body under a terminal cell. Returns its name on a hit.
    pub fn click(&mut self, col: i32, row: i32) -> Option<String> {
        let (ox, oy) = self.view_origin;
        let (name, pos) = hit_test(&self.positions, col - ox, row - oy)?;
        let name = name.to_string();
        self.selected = pos.body_index;
        Some(name)
    }
}
