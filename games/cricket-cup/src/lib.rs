use wasm_bindgen::prelude::*;
use crease_engine::*;

pub mod config;
pub mod controller;
pub mod controls;
pub mod error;
pub mod game;
pub mod models;
pub mod physics;
pub mod scoring;
pub mod state;
pub mod ui;

use game::CricketGame;

crease_web::export_game!(CricketGame, "cricket-cup");
