//! Cricket Cup - time a swing against an incoming ball and chase a target.
//! Physics contacts and UI notifications travel over an event bus; the
//! match controller owns every rule.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use crease_engine::{EngineContext, EngineError, EventBus, Game, GameConfig, InputQueue, Scene};

use crate::config::MatchConfig;
use crate::controller::{MatchController, Swing};
use crate::controls::{Command, Controls};
use crate::models;
use crate::physics::{BallEvent, PhysicsAdapter, PitchPhysics, GRAVITY};
use crate::ui::UiEvent;

// Batter's-eye view from behind the crease
const VIEW_EYE: Vec3 = Vec3::new(0.0, 3.0, 12.0);
const VIEW_LOOK_AT: Vec3 = Vec3::ZERO;
// Trailing offset while a hit ball is in the air
const FOLLOW_OFFSET: Vec3 = Vec3::new(-5.0, 3.0, -5.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Collision,
    Ui,
}

#[derive(Debug, Clone)]
pub enum Signal {
    Ball(BallEvent),
    Ui(UiEvent),
}

pub struct CricketGame {
    match_config: MatchConfig,
    seed: u64,
    controller: Option<MatchController<PitchPhysics>>,
    controls: Controls,
    bus: EventBus<Topic, Signal>,
    /// Collisions waiting for the controller.
    inbox: Rc<RefCell<Vec<BallEvent>>>,
    /// Serialized UI events waiting for the host.
    outbox: Rc<RefCell<Vec<String>>>,
}

impl CricketGame {
    pub fn with_seed(seed: u64) -> Self {
        let inbox = Rc::new(RefCell::new(Vec::new()));
        let outbox = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        let sink = Rc::clone(&inbox);
        bus.subscribe(Topic::Collision, move |signal: &Signal| {
            if let Signal::Ball(event) = signal {
                sink.borrow_mut().push(*event);
            }
        });
        bus.subscribe(Topic::Collision, |signal: &Signal| {
            log::trace!("collision: {:?}", signal);
        });

        let sink = Rc::clone(&outbox);
        bus.subscribe(Topic::Ui, move |signal: &Signal| {
            if let Signal::Ui(event) = signal {
                if let Some(json) = event.to_json() {
                    sink.borrow_mut().push(json);
                }
            }
        });

        Self {
            match_config: MatchConfig::default(),
            seed,
            controller: None,
            controls: Controls::new(),
            bus,
            inbox,
            outbox,
        }
    }

    pub fn controller(&self) -> Option<&MatchController<PitchPhysics>> {
        self.controller.as_ref()
    }

    fn publish_ui(&mut self, event: UiEvent) {
        self.bus.publish(&Topic::Ui, &Signal::Ui(event));
    }

    fn flush_ui(&self, ctx: &mut EngineContext) {
        for json in self.outbox.borrow_mut().drain(..) {
            ctx.emit_event(json);
        }
    }
}

fn apply(controller: &mut MatchController<PitchPhysics>, command: Command, scene: &mut Scene) {
    let result = match command {
        Command::AttemptHit { hint } => controller.attempt_hit(hint, scene).map(|swing| {
            if let Swing::Hit(quality) = swing {
                log::debug!("swing connected: {:?}", quality);
            }
        }),
        Command::Start => controller.start_match(scene).map(|_| ()),
        Command::Restart => controller.restart(scene).map(|_| ()),
        Command::Pause => controller.pause(),
        Command::Resume => controller.resume(),
        Command::TogglePause => {
            if controller.state().paused {
                controller.resume()
            } else {
                controller.pause()
            }
        }
    };
    if let Err(err) = result {
        log::debug!("{:?} ignored: {}", command, err);
    }
}

impl Game for CricketGame {
    fn config(&self) -> GameConfig {
        GameConfig {
            gravity: GRAVITY,
            camera_eye: VIEW_EYE,
            camera_look_at: VIEW_LOOK_AT,
            ..GameConfig::default()
        }
    }

    fn configure(&mut self, json: &str) -> Result<(), EngineError> {
        let config = MatchConfig::from_json(json)?;
        log::info!("match config: {} overs, target {}..={}", config.max_overs, config.target_min, config.target_max);
        if let Some(controller) = self.controller.as_mut() {
            controller.set_config(config.clone());
        }
        self.match_config = config;
        Ok(())
    }

    fn init(&mut self, ctx: &mut EngineContext) -> Result<(), EngineError> {
        let engine = self.config();
        let physics = PitchPhysics::new(engine.gravity, engine.fixed_dt)?;
        models::spawn_models(&mut ctx.scene)?;

        self.controller = Some(MatchController::new(self.match_config.clone(), physics, self.seed));
        ctx.camera.snap_to(VIEW_EYE, VIEW_LOOK_AT);

        self.publish_ui(UiEvent::StartScreen { visible: true });
        self.flush_ui(ctx);
        Ok(())
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        let dt = self.config().fixed_dt;
        let Some(controller) = self.controller.as_mut() else {
            return;
        };

        for event in input.iter() {
            if let Some(command) = self.controls.translate(event) {
                apply(controller, command, &mut ctx.scene);
            }
        }

        // Physics, camera and polling all hold still while paused.
        if !controller.state().paused {
            controller.physics_mut().step(dt);
            for event in controller.physics_mut().drain_events() {
                self.bus.publish(&Topic::Collision, &Signal::Ball(event));
            }

            let contacts: Vec<BallEvent> = self.inbox.borrow_mut().drain(..).collect();
            for event in contacts {
                controller.on_ball_event(event);
            }

            controller.tick(dt, &mut ctx.scene);

            if controller.follow_ball() {
                if !ctx.camera.is_following() {
                    ctx.camera.follow(FOLLOW_OFFSET);
                }
            } else if ctx.camera.is_following() {
                ctx.camera.set_fixed(VIEW_EYE, VIEW_LOOK_AT);
            }
            ctx.camera.update(controller.physics().ball_position(), dt);
        }

        for event in controller.take_ui_events() {
            self.bus.publish(&Topic::Ui, &Signal::Ui(event));
        }
        self.flush_ui(ctx);
    }
}
