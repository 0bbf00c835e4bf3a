use anyhow::{Context, Result};
use chrono::Utc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::catalog::{Catalog, LoadedSystem};
use crate::clock::SimClock;
use crate::compositor::{Compositor, FrameTime};
use crate::config::Settings;
use crate::input::{collect_input_nonblocking, map_event_to_action, Action};
use crate::state::{AppState, SharedState};
use crate::term::{blit_grid, draw_hud, Layout, Terminal};

const INPUT_POLL: Duration = Duration::from_millis(20);

/// Session choices that are not persisted.
#[derive(Clone, Debug)]
pub struct Launch {
    pub system: String,
    pub remote: bool,
    pub api_base: String,
}

/// Loads the starting system. A failed remote fetch falls back to the
/// built-in Sol table and is reported through the returned status message.
pub async fn load_initial(catalog: &mut Catalog, launch: &Launch) -> Result<(LoadedSystem, Option<String>)> {
    let mut status = None;
    if launch.remote {
        let fetched = match ApiClient::new(&launch.api_base) {
            Ok(client) => client.fetch_sol().await,
            Err(e) => Err(e),
        };
        match fetched {
            Ok(sol) => catalog.insert(sol),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "remote fetch failed; using built-in Solar System");
                status = Some(format!("remote fetch failed: {e:#}"));
            }
        }
    }
    let system = catalog
        .load(&launch.system)
        .with_context(|| format!("load star system {:?}", launch.system))?;
    info!(system = %system.key, bodies = system.bodies.len(), "loaded star system");
    Ok((system, status))
}

/// Renders a single frame of the orbital view as plain text.
pub fn snapshot(system: &LoadedSystem, settings: &Settings, width: usize, height: usize) -> String {
    let mut compositor = Compositor::new(settings.aspect_ratio);
    let time = FrameTime { instant: Utc::now(), elapsed_secs: 0.0 };
    compositor.render_at(&system.bodies, width, height, time).grid.to_string()
}

/// Runs the interactive explorer until the user quits.
pub async fn run(settings: &Settings, launch: Launch) -> Result<()> {
    let mut catalog = Catalog::scan(&settings.systems_dir).context("scan systems directory")?;
    let (system, status) = load_initial(&mut catalog, &launch).await?;

    let mut st = AppState::new(system, SimClock::new(Utc::now(), settings.warp_days_per_sec));
    st.status = status;
    let shared = st.shared();

    let term = Terminal::begin().context("terminal setup failed")?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let redraw = spawn_redraw(shared.clone(), term, settings, shutdown_rx);

    let result = input_loop(&shared, &mut catalog, &redraw).await;
    shutdown_tx.send(true).ok();
    let redraw_result = redraw.await.context("redraw task panicked")?;
    result?;
    redraw_result?;
    info!("shutdown");
    Ok(())
}

async fn input_loop(shared: &SharedState, catalog: &mut Catalog, redraw: &JoinHandle<Result<()>>) -> Result<()> {
    loop {
        if redraw.is_finished() {
            return Ok(());
        }
        for ev in collect_input_nonblocking(INPUT_POLL)? {
            let Some(action) = map_event_to_action(ev) else {
                continue;
            };
            if action == Action::Quit {
                return Ok(());
            }
            handle_action(shared, catalog, action).await;
        }
        tokio::task::yield_now().await;
    }
}

/// Applies one input action to the shared state.
pub async fn handle_action(shared: &SharedState, catalog: &mut Catalog, action: Action) {
    if action == Action::NextSystem {
        let current = {
            let st = shared.read().await;
            if st.has_pending() {
                return;
            }
            st.system().key.clone()
        };
        let next = catalog.next_after(&current);
        let loaded = catalog.load(&next);
        let mut st = shared.write().await;
        match loaded {
            Ok(system) => {
                st.status = None;
                st.stage(system);
            }
            Err(e) => {
                warn!(system = %next, error = %e, "star system load failed");
                st.status = Some(e.to_string());
            }
        }
        return;
    }

    let mut st = shared.write().await;
    match action {
        Action::SelectNext => st.select_next(),
        Action::SelectPrev => st.select_prev(),
        Action::ToggleDetails => st.show_details = !st.show_details,
        Action::TogglePause => st.clock.toggle_pause(),
        Action::Faster => st.clock.faster(),
        Action::Slower => st.clock.slower(),
        Action::ResetClock => st.clock.reset(Utc::now()),
        Action::Click { col, row } => {
            if let Some(name) = st.click(col as i32, row as i32) {
                debug!(body = %name, "selected by click");
                st.show_details = true;
            }
        }
        Action::Quit | Action::NextSystem => {}
    }
}

fn spawn_redraw(
    shared: SharedState,
    mut term: Terminal,
    settings: &Settings,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<Result<()>> {
    let every = settings.redraw_interval();
    let aspect = settings.aspect_ratio;
    let enable_color = settings.enable_color;
    tokio::spawn(async move {
        let mut compositor = Compositor::new(aspect);
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let started = Instant::now();
        let mut last = started;

        let result = loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break Ok(()),
            }
            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f64();
            last = now;
            if let Err(e) = draw_frame(&shared, &mut term, &mut compositor, dt, started, enable_color).await {
                break Err(e);
            }
        };
        term.end()?;
        result
    })
}

async fn draw_frame(
    shared: &SharedState,
    term: &mut Terminal,
    compositor: &mut Compositor,
    dt: f64,
    started: Instant,
    enable_color: bool,
) -> Result<()> {
    if term.resize_if_needed()? {
        debug!(cols = term.cols, rows = term.rows, "terminal resized");
    }
    let layout = Layout::new(term.cols, term.rows);
    let (w, h) = layout.view_size();
    let origin = layout.view_origin();

    let (bodies, instant) = {
        let mut st = shared.write().await;
        st.apply_pending();
        let instant = st.clock.tick(dt);
        (st.bodies(), instant)
    };

    let time = FrameTime { instant, elapsed_secs: started.elapsed().as_secs_f64() };
    let frame = compositor.render_at(&bodies, w, h, time);

    term.cur.clear();
    blit_grid(&mut term.cur, &frame.grid, origin, enable_color);
    {
        let mut st = shared.write().await;
        st.record_frame((origin.0 as i32, origin.1 as i32), frame.positions);
        draw_hud(&mut term.cur, layout, &st, enable_color);
    }
    term.present()
}
