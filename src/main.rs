//! Trellis demo
//!
//! Runs two scenes headlessly at a fixed timestep: crates dropped at seeded
//! random positions land on a static floor, pass through a trigger zone, and
//! a persistent director advances to the next scene and finally quits.
//!
//! Usage: `trellis [settings.json] [legacy|symmetric]`
//!
//! The optional second argument overrides the settings file's
//! `dynamic_resolution`.

use std::path::PathBuf;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use trellis::app::{self, App, AppState};
use trellis::collision::{Collider, Collision, Rect};
use trellis::consts::FIXED_DT;
use trellis::coroutine::{Coroutine, Step, Wait};
use trellis::platform::{HeadlessPlatform, Platform};
use trellis::renderer::{DrawHandle, Drawable};
use trellis::{Behavior, Context, DynamicResolution, GameObject, SceneBuilder, Settings};

const DIRECTOR_ID: i64 = 1;
const SCENE_SECONDS: f32 = 3.0;
const FLOOR_Y: f32 = 600.0;
const CRATE_SIZE: f32 = 24.0;
const FALL_SPEED: f32 = 240.0;
/// Hard stop in case the director never quits
const MAX_FRAMES: u64 = 60 * 30;

/// Moves every scene along after `SCENE_SECONDS`, quitting after the last
struct Director;

impl Behavior for Director {
    fn attach(&mut self, cx: &mut Context<'_>) -> anyhow::Result<()> {
        let mut waiting = false;
        cx.start_coroutine(Coroutine::from_fn(move |cx| {
            if !waiting {
                waiting = true;
                return Step::Yield(Wait::seconds(SCENE_SECONDS));
            }
            waiting = false;

            let scene = cx.scene().name().to_string();
            let frame = app::current::frame_count().unwrap_or(cx.time().frame);
            if scene == "warehouse" {
                log::info!("Director: done at frame {}", frame);
                cx.quit();
                Step::Done
            } else {
                log::info!("Director: leaving '{}' at frame {}", scene, frame);
                cx.load_next();
                Step::next_frame()
            }
        }));
        Ok(())
    }
}

/// Falls until it lands on something static
struct Falling {
    landed: bool,
}

impl Behavior for Falling {
    fn update(&mut self, cx: &mut Context<'_>) -> anyhow::Result<()> {
        if self.landed {
            return Ok(());
        }
        let dy = FALL_SPEED * cx.delta_time();
        if let Some(object) = cx.object_mut() {
            object.translate(Vec2::new(0.0, dy));
            if object.position().y > FLOOR_Y * 2.0 {
                anyhow::bail!("fell through the floor at {:?}", object.position());
            }
        }
        Ok(())
    }

    fn on_collision_enter(&mut self, cx: &mut Context<'_>, other: &Collision) -> anyhow::Result<()> {
        if other.is_static && !self.landed {
            self.landed = true;
            let name = cx.object().and_then(GameObject::name).unwrap_or("crate").to_string();
            log::debug!("{} landed at {:?}", name, cx.object().map(GameObject::position));
        }
        Ok(())
    }

    fn on_trigger_enter(&mut self, cx: &mut Context<'_>, _zone: &Collision) -> anyhow::Result<()> {
        log::info!("{} entered the zone", cx.object().and_then(GameObject::name).unwrap_or("crate"));
        Ok(())
    }
}

fn drawable(handle: u64, position: Vec2) -> Drawable {
    Drawable::new(DrawHandle(handle), position)
}

fn populate(builder: &mut SceneBuilder<'_>, seed: u64, crates: usize) -> trellis::Result<()> {
    let mut rng = Pcg32::seed_from_u64(seed);

    builder.add(
        0,
        GameObject::named("director")
            .persistent(DIRECTOR_ID)
            .with_behavior(Director),
    )?;

    let floor = Rect::new(0.0, FLOOR_Y, 1280.0, 40.0);
    builder.add(
        0,
        GameObject::named("floor")
            .with_position(floor.position)
            .with_collider(Collider::new(floor).with_static(true))
            .with_drawable(drawable(1, floor.position)),
    )?;

    let zone = Rect::new(0.0, 300.0, 1280.0, 60.0);
    builder.add(
        0,
        GameObject::named("zone")
            .with_position(zone.position)
            .with_collider(Collider::new(zone).with_trigger(true)),
    )?;

    for i in 0..crates {
        let position = Vec2::new(rng.random_range(0.0..1280.0 - CRATE_SIZE), rng.random_range(0.0..200.0));
        builder.add(
            10,
            GameObject::named(format!("crate-{}", i))
                .with_position(position)
                .with_collider(Collider::new(Rect::new(position.x, position.y, CRATE_SIZE, CRATE_SIZE)))
                .with_drawable(drawable(2, position))
                .with_behavior(Falling { landed: false }),
        )?;
    }

    builder.add(
        trellis::consts::DEFAULT_UI_LAYER_START,
        GameObject::named("hud").with_drawable(drawable(3, Vec2::new(16.0, 16.0))),
    )?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let settings_path = args.next().map(PathBuf::from);
    let mut settings = Settings::load_or_default(settings_path.as_deref());
    if let Some(mode) = args.next() {
        match DynamicResolution::from_str(&mode) {
            Some(resolution) => settings.dynamic_resolution = resolution,
            None => log::warn!("Unknown resolution mode '{}', keeping {}", mode, settings.dynamic_resolution.as_str()),
        }
    }
    log::info!(
        "{} starting ({}x{}, {} resolution)",
        settings.title,
        settings.width,
        settings.height,
        settings.dynamic_resolution.as_str()
    );

    let mut platform = HeadlessPlatform::new(settings.width, settings.height).with_max_frames(MAX_FRAMES);
    let mut app = App::new(settings);
    app.add_scene("yard", |builder| populate(builder, 7, 6))?;
    app.add_scene("warehouse", |builder| populate(builder, 42, 12))?;
    app.start()?;

    let _current = app.make_current();
    while app.state() == AppState::Running {
        let events = platform.poll_events();
        app.frame(FIXED_DT, events, platform.surface());
    }

    let time = app.world().time();
    log::info!(
        "Finished after {} frames ({:.2}s simulated), {} draws in the last frame",
        time.frame,
        time.elapsed,
        platform.surface.presented.len()
    );
    Ok(())
}
