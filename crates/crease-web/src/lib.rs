pub mod runner;

pub use runner::GameRunner;

// Re-exported so games using `export_game!` need not depend on them directly.
pub use js_sys;

/// Custom event kinds the host sends through `game_custom_event`.
pub mod custom {
    pub const START: u32 = 1;
    pub const RESTART: u32 = 2;
    pub const PAUSE: u32 = 3;
    pub const RESUME: u32 = 4;
}

/// Generate all `#[wasm_bindgen]` exports for a game.
///
/// Generates:
/// - `thread_local!` storage for the GameRunner
/// - `with_runner()` helper function
/// - All wasm-bindgen exports (game_init, game_tick, input handlers, data accessors)
///
/// Every export is a no-op (returning a zero value) until `game_init` has
/// run, so a host calling out of order never traps.
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
/// use crease_engine::*;
///
/// mod game;
/// use game::MyGame;
///
/// crease_web::export_game!(MyGame, "my-game");
/// ```
///
/// # Arguments
///
/// - `$game_type`: a `crease_engine::Game` with a `with_seed(u64)` constructor
/// - `$game_name`: A string literal used in the initialization log message
#[macro_export]
macro_rules! export_game {
    ($game_type:ty, $game_name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::GameRunner<$game_type>>> = RefCell::new(None);
        }

        fn with_runner<R>(f: impl FnOnce(&mut $crate::GameRunner<$game_type>) -> R) -> Option<R> {
            RUNNER.with(|cell| {
                let mut borrow = cell.borrow_mut();
                match borrow.as_mut() {
                    Some(runner) => Some(f(runner)),
                    None => {
                        log::warn!("{}: called before game_init()", $game_name);
                        None
                    }
                }
            })
        }

        /// Returns `false` when the game failed to initialize; the error is
        /// queued as a UI event.
        #[wasm_bindgen]
        pub fn game_init(seed: f64) -> bool {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            let game = <$game_type>::with_seed(seed as u64);
            let runner = $crate::GameRunner::new(game);

            RUNNER.with(|cell| {
                *cell.borrow_mut() = Some(runner);
            });

            let ok = with_runner(|r| r.init()).unwrap_or(false);
            if ok {
                log::info!("{}: initialized", $game_name);
            }
            ok
        }

        #[wasm_bindgen]
        pub fn game_configure(json: &str) -> bool {
            with_runner(|r| r.configure(json).is_ok()).unwrap_or(false)
        }

        #[wasm_bindgen]
        pub fn game_tick(dt: f32) {
            with_runner(|r| r.tick(dt));
        }

        #[wasm_bindgen]
        pub fn game_pointer_down(x: f32, y: f32) {
            with_runner(|r| r.push_input(InputEvent::PointerDown { x, y }));
        }

        #[wasm_bindgen]
        pub fn game_pointer_up(x: f32, y: f32) {
            with_runner(|r| r.push_input(InputEvent::PointerUp { x, y }));
        }

        #[wasm_bindgen]
        pub fn game_key_down(key_code: u32) {
            with_runner(|r| r.push_input(InputEvent::KeyDown { key_code }));
        }

        #[wasm_bindgen]
        pub fn game_key_up(key_code: u32) {
            with_runner(|r| r.push_input(InputEvent::KeyUp { key_code }));
        }

        #[wasm_bindgen]
        pub fn game_set_visible(visible: bool) {
            with_runner(|r| r.push_input(InputEvent::Visibility { visible }));
        }

        #[wasm_bindgen]
        pub fn game_custom_event(kind: u32, a: f32, b: f32, c: f32) {
            with_runner(|r| r.push_input(InputEvent::Custom { kind, a, b, c }));
        }

        #[wasm_bindgen]
        pub fn game_resize(width: f32, height: f32) {
            with_runner(|r| r.resize(width, height));
        }

        // ---- Data accessors ----

        #[wasm_bindgen]
        pub fn get_instances_ptr() -> *const f32 {
            with_runner(|r| r.instances_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_instance_count() -> u32 {
            with_runner(|r| r.instance_count()).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn get_max_instances() -> u32 {
            with_runner(|r| r.max_instances()).unwrap_or(0)
        }

        /// Eye (x, y, z) followed by look-at (x, y, z).
        #[wasm_bindgen]
        pub fn get_camera() -> $crate::js_sys::Float32Array {
            let cam = with_runner(|r| r.camera()).unwrap_or([0.0; 6]);
            $crate::js_sys::Float32Array::from(&cam[..])
        }

        /// 4x4 view-projection matrix, column-major.
        #[wasm_bindgen]
        pub fn get_view_projection() -> $crate::js_sys::Float32Array {
            let m = with_runner(|r| r.view_projection()).unwrap_or([0.0; 16]);
            $crate::js_sys::Float32Array::from(&m[..])
        }

        /// JSON array of UI events since the last call.
        #[wasm_bindgen]
        pub fn take_ui_events() -> String {
            with_runner(|r| r.take_ui_events()).unwrap_or_else(|| "[]".to_string())
        }
    };
}
