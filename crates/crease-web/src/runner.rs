use crease_engine::{
    build_model_buffer, EngineContext, EngineError, FixedTimestep, Game, GameConfig, InputEvent,
    InputQueue, ModelBuffer,
};

/// Generic game runner that wires up the engine loop.
///
/// Each concrete game creates a `thread_local!` GameRunner and exports free
/// functions via `#[wasm_bindgen]`, because wasm-bindgen cannot export
/// generic structs directly.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    model_buffer: ModelBuffer,
    timestep: FixedTimestep,
    config: GameConfig,
    initialized: bool,
    failure: Option<EngineError>,
    /// Events that survived into the host but have not been collected yet.
    outbox: Vec<String>,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        let timestep = FixedTimestep::new(config.fixed_dt);
        let ctx = EngineContext::with_config(&config);

        Self {
            game,
            ctx,
            input: InputQueue::new(),
            model_buffer: ModelBuffer::new(),
            timestep,
            config,
            initialized: false,
            failure: None,
            outbox: Vec::new(),
        }
    }

    /// Initialize the game. Call once after construction.
    ///
    /// A failure is recorded and reported to the host as an `Error` UI
    /// event; the runner then ignores ticks instead of panicking.
    pub fn init(&mut self) -> bool {
        self.config = self.game.config();
        self.timestep = FixedTimestep::new(self.config.fixed_dt);

        match self.game.init(&mut self.ctx) {
            Ok(()) => {
                self.initialized = true;
                self.failure = None;
                build_model_buffer(self.ctx.scene.iter(), &mut self.model_buffer);
                self.collect_events();
                true
            }
            Err(err) => {
                log::error!("initialization failed: {}", err);
                self.collect_events();
                self.outbox.push(error_event(&err));
                self.initialized = false;
                self.failure = Some(err);
                false
            }
        }
    }

    /// Forward host-supplied JSON settings to the game.
    pub fn configure(&mut self, json: &str) -> Result<(), EngineError> {
        self.game.configure(json).map_err(|err| {
            log::warn!("rejected configuration: {}", err);
            self.outbox.push(error_event(&err));
            err
        })
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one frame: fixed-step updates, then rebuild the model buffer.
    ///
    /// Frames longer than `max_frame_dt` (first frame, tab switches) are
    /// dropped; queued input waits for the next accepted frame.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }
        if dt.is_nan() || dt <= 0.0 || dt > self.config.max_frame_dt {
            log::debug!("dropping frame dt={}", dt);
            return;
        }

        let steps = self.timestep.accumulate(dt);
        for _ in 0..steps {
            self.game.update(&mut self.ctx, &self.input);
            // Input is consumed by the first fixed step only.
            self.input.drain();
        }

        build_model_buffer(self.ctx.scene.iter(), &mut self.model_buffer);
        self.collect_events();
    }

    fn collect_events(&mut self) {
        let events = self.ctx.take_events();
        self.outbox.extend(events);
    }

    // ---- Accessors read by the host via wasm_bindgen exports ----

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn failure(&self) -> Option<&EngineError> {
        self.failure.as_ref()
    }

    pub fn instances_ptr(&self) -> *const f32 {
        self.model_buffer.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.model_buffer.instance_count()
    }

    pub fn max_instances(&self) -> u32 {
        self.config.max_instances as u32
    }

    pub fn camera(&self) -> [f32; 6] {
        self.ctx.camera.to_array()
    }

    /// Projection times view, column-major.
    pub fn view_projection(&self) -> [f32; 16] {
        self.ctx.camera.uniform().to_cols_array()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.ctx.camera.resize(width, height);
    }

    /// Drain pending UI events as a JSON array string.
    pub fn take_ui_events(&mut self) -> String {
        let events = std::mem::take(&mut self.outbox);
        format!("[{}]", events.join(","))
    }

    pub fn game(&self) -> &G {
        &self.game
    }
}

fn error_event(err: &EngineError) -> String {
    serde_json::json!({
        "type": "Error",
        "message": err.user_message(),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crease_engine::Entity;

    struct Counter {
        updates: u32,
        fail: bool,
    }

    impl Game for Counter {
        fn init(&mut self, ctx: &mut EngineContext) -> Result<(), EngineError> {
            if self.fail {
                return Err(EngineError::init("physics", "unavailable"));
            }
            let id = ctx.next_id();
            ctx.scene.spawn(Entity::new(id).with_mesh(0));
            ctx.emit_event(r#"{"type":"Ready"}"#.to_string());
            Ok(())
        }

        fn update(&mut self, _ctx: &mut EngineContext, _input: &InputQueue) {
            self.updates += 1;
        }
    }

    #[test]
    fn init_builds_model_buffer() {
        let mut runner = GameRunner::new(Counter { updates: 0, fail: false });
        assert!(runner.init());
        assert_eq!(runner.instance_count(), 1);
        assert_eq!(runner.take_ui_events(), r#"[{"type":"Ready"}]"#);
        assert_eq!(runner.take_ui_events(), "[]");
    }

    #[test]
    fn failed_init_reports_and_ignores_ticks() {
        let mut runner = GameRunner::new(Counter { updates: 0, fail: true });
        assert!(!runner.init());
        assert!(!runner.is_initialized());
        assert!(runner.failure().is_some());

        runner.tick(1.0 / 60.0);
        assert_eq!(runner.game().updates, 0);

        let events = runner.take_ui_events();
        assert!(events.contains(r#""type":"Error""#), "{}", events);
    }

    #[test]
    fn long_frames_are_dropped() {
        let mut runner = GameRunner::new(Counter { updates: 0, fail: false });
        runner.init();

        runner.tick(0.5);
        assert_eq!(runner.game().updates, 0);

        runner.tick(1.0 / 60.0 + 0.0001);
        assert_eq!(runner.game().updates, 1);
    }

    #[test]
    fn resize_changes_projection() {
        let mut runner = GameRunner::new(Counter { updates: 0, fail: false });
        runner.init();
        let before = runner.view_projection();
        runner.resize(800.0, 800.0);
        let after = runner.view_projection();
        // x scale depends on aspect only
        assert_ne!(before[0], after[0]);
        assert_eq!(before[5], after[5]);
    }

    #[test]
    fn input_reaches_only_first_step() {
        struct Inputs(Vec<usize>);
        impl Game for Inputs {
            fn init(&mut self, _ctx: &mut EngineContext) -> Result<(), EngineError> {
                Ok(())
            }
            fn update(&mut self, _ctx: &mut EngineContext, input: &InputQueue) {
                self.0.push(input.len());
            }
        }

        let mut runner = GameRunner::new(Inputs(Vec::new()));
        runner.init();
        runner.push_input(InputEvent::KeyDown { key_code: 32 });
        runner.tick(0.06);
        assert_eq!(runner.game().0, vec![1, 0, 0]);
    }
}
